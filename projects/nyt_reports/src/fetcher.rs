//! Weekly bestseller list backfill.
//!
//! Walks backward from a start date one week at a time, stores each raw
//! response as a snapshot, and sleeps between calls to stay under the API's
//! rate limit. Calls never overlap.

use std::str::FromStr;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use diesel::PgConnection;
use interfaces_nyt_books::index::{fetch_list, FetchListError, ListResponse};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::snapshot::{
    models::NewSnapshot,
    queries::{insert_snapshot, InsertSnapshotError},
};

/// What to do when a single week's API call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum FailurePolicy {
    /// Stop the run at the first failing week.
    #[default]
    Abort,
    /// Log the failing week and move on to the next one.
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = FailurePolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::Skip),
            _ => Err(FailurePolicyParseError { value: value.to_string() }),
        }
    }
}

impl TryFrom<String> for FailurePolicy {
    type Error = FailurePolicyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown failure policy: {value}")]
pub struct FailurePolicyParseError {
    pub value: String,
}

pub struct FetchPlan<'a> {
    pub api_base_url: &'a str,
    pub api_key: &'a str,
    pub list_name: &'a str,
    pub start_date: NaiveDate,
    pub weeks: u32,
    pub pause: Duration,
    pub on_error: FailurePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Remote calls attempted, failed ones included.
    pub calls: u32,
    pub inserted: u32,
    pub skipped: Vec<NaiveDate>,
}

/// Destination for fetched snapshots.
pub trait SnapshotSink {
    fn insert_snapshot(&mut self, new: &NewSnapshot<'_>) -> Result<(), InsertSnapshotError>;
}

impl SnapshotSink for PgConnection {
    fn insert_snapshot(&mut self, new: &NewSnapshot<'_>) -> Result<(), InsertSnapshotError> {
        insert_snapshot(self, new).map(|_| ())
    }
}

#[derive(Debug, Error)]
pub enum FetchWeeklySnapshotsError {
    #[error("DateOutOfRange: {weeks} weeks back from {start}")]
    DateOutOfRange {
        start: NaiveDate,
        weeks: u32,
    },

    #[error("FetchList {date}: {source}")]
    FetchList {
        date: NaiveDate,
        #[source]
        source: FetchListError,
    },

    #[error("UnexpectedStatus {date}: {status}")]
    UnexpectedStatus {
        date: NaiveDate,
        status: StatusCode,
    },

    #[error("DecodeBody {date}: {source}")]
    DecodeBody {
        date: NaiveDate,
        #[source]
        source: serde_json::Error,
    },

    #[error("InsertSnapshot {date}: {source}")]
    InsertSnapshot {
        date: NaiveDate,
        #[source]
        source: InsertSnapshotError,
    },
}

impl FetchWeeklySnapshotsError {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateOutOfRange { start, .. } => *start,
            Self::FetchList { date, .. }
            | Self::UnexpectedStatus { date, .. }
            | Self::DecodeBody { date, .. }
            | Self::InsertSnapshot { date, .. } => *date,
        }
    }

    fn is_api_failure(&self) -> bool {
        !matches!(self, Self::InsertSnapshot { .. })
    }
}

/// `start`, `start - 7d`, `start - 14d`, ... `weeks` dates in total, or `None`
/// when the oldest one falls before the earliest representable date.
pub fn week_dates(start: NaiveDate, weeks: u32) -> Option<Vec<NaiveDate>> {
    (0..u64::from(weeks))
        .map(|k| start.checked_sub_days(Days::new(7 * k)))
        .collect()
}

pub async fn fetch_weekly_snapshots<S>(
    client: &Client,
    plan: &FetchPlan<'_>,
    sink: &mut S,
) -> Result<FetchReport, FetchWeeklySnapshotsError>
where
    S: SnapshotSink + ?Sized,
{
    let dates = week_dates(plan.start_date, plan.weeks).ok_or(
        FetchWeeklySnapshotsError::DateOutOfRange {
            start: plan.start_date,
            weeks: plan.weeks,
        },
    )?;
    let mut report = FetchReport::default();

    for (index, date) in dates.iter().copied().enumerate() {
        if index > 0 && !plan.pause.is_zero() {
            tokio::time::sleep(plan.pause).await;
        }

        report.calls += 1;

        match fetch_week(client, plan, date).await {
            Ok(body) => {
                let new = NewSnapshot {
                    id: Uuid::new_v4(),
                    list_name: plan.list_name,
                    list_date: date,
                    body: &body,
                    fetched_at: Utc::now().naive_utc(),
                };
                sink.insert_snapshot(&new)
                    .map_err(|source| FetchWeeklySnapshotsError::InsertSnapshot { date, source })?;
                report.inserted += 1;
                info!(%date, list = plan.list_name, call = report.calls, "stored bestseller snapshot");
            }
            Err(err) if plan.on_error == FailurePolicy::Skip && err.is_api_failure() => {
                warn!(%date, error = %err, "skipping week");
                report.skipped.push(date);
            }
            Err(err) => {
                error!(%date, error = %err, "aborting fetch run");
                return Err(err);
            }
        }
    }

    Ok(report)
}

async fn fetch_week(
    client: &Client,
    plan: &FetchPlan<'_>,
    date: NaiveDate,
) -> Result<Value, FetchWeeklySnapshotsError> {
    let ListResponse { body, status } =
        fetch_list(client, plan.api_base_url, plan.api_key, date, plan.list_name)
            .await
            .map_err(|source| FetchWeeklySnapshotsError::FetchList { date, source })?;

    if !status.is_success() {
        return Err(FetchWeeklySnapshotsError::UnexpectedStatus { date, status });
    }

    serde_json::from_str(&body).map_err(|source| FetchWeeklySnapshotsError::DecodeBody { date, source })
}
