use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use projects_nyt_reports::{
    db::snapshot::{models::NewSnapshot, queries::InsertSnapshotError},
    fetcher::{fetch_weekly_snapshots, FailurePolicy, FetchPlan, FetchWeeklySnapshotsError, SnapshotSink},
};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST: &str = "combined-print-and-e-book-nonfiction";

/// Keeps every inserted snapshot in memory.
#[derive(Default)]
struct RecordingSink {
    inserted: Vec<(String, NaiveDate, Value)>,
}

impl SnapshotSink for RecordingSink {
    fn insert_snapshot(&mut self, new: &NewSnapshot<'_>) -> Result<(), InsertSnapshotError> {
        self.inserted
            .push((new.list_name.to_string(), new.list_date, new.body.clone()));
        Ok(())
    }
}

/// Fails every insert.
struct BrokenSink;

impl SnapshotSink for BrokenSink {
    fn insert_snapshot(&mut self, _new: &NewSnapshot<'_>) -> Result<(), InsertSnapshotError> {
        Err(InsertSnapshotError::InsertSnapshot {
            source: diesel::result::Error::BrokenTransactionManager,
        })
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn list_body(date: &str) -> Value {
    json!({
        "status": "OK",
        "num_results": 1,
        "results": {
            "list_name": "Combined Print and E-Book Nonfiction",
            "published_date": date,
            "books": [{ "rank": 1, "title": "A BOOK", "author": "Someone" }]
        }
    })
}

fn plan<'a>(base: &'a str, start: NaiveDate, weeks: u32, on_error: FailurePolicy) -> FetchPlan<'a> {
    FetchPlan {
        api_base_url: base,
        api_key: "test-key",
        list_name: LIST,
        start_date: start,
        weeks,
        pause: Duration::ZERO,
        on_error,
    }
}

async fn mount_week(server: &MockServer, day: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/lists/{day}/{LIST}.json")))
        .and(query_param("api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(day)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn stores_one_snapshot_per_week_walking_backward() -> Result<()> {
    let server = MockServer::start().await;
    for day in ["2023-11-19", "2023-11-12", "2023-11-05", "2023-10-29"] {
        mount_week(&server, day).await;
    }

    let base = format!("{}/lists", server.uri());
    let mut sink = RecordingSink::default();
    let report = fetch_weekly_snapshots(
        &Client::new(),
        &plan(&base, date(2023, 11, 19), 4, FailurePolicy::Abort),
        &mut sink,
    )
    .await?;

    assert_eq!(report.calls, 4);
    assert_eq!(report.inserted, 4);
    assert!(report.skipped.is_empty());

    let dates: Vec<NaiveDate> = sink.inserted.iter().map(|(_, d, _)| *d).collect();
    assert_eq!(
        dates,
        vec![date(2023, 11, 19), date(2023, 11, 12), date(2023, 11, 5), date(2023, 10, 29)]
    );
    for (k, (list, d, body)) in sink.inserted.iter().enumerate() {
        assert_eq!(list, LIST);
        assert_eq!(*d, date(2023, 11, 19) - chrono::Duration::days(7 * k as i64));
        assert_eq!(body, &list_body(&d.format("%Y-%m-%d").to_string()));
    }
    Ok(())
}

#[tokio::test]
async fn zero_weeks_makes_no_calls() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut sink = RecordingSink::default();
    let report = fetch_weekly_snapshots(
        &Client::new(),
        &plan(&server.uri(), date(2023, 11, 19), 0, FailurePolicy::Abort),
        &mut sink,
    )
    .await?;

    assert_eq!(report.calls, 0);
    assert!(sink.inserted.is_empty());
    Ok(())
}

#[tokio::test]
async fn rerun_appends_duplicate_snapshots() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/lists/\d{4}-\d{2}-\d{2}/.+\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body("any")))
        .expect(4)
        .mount(&server)
        .await;

    let base = format!("{}/lists", server.uri());
    let fetch_plan = plan(&base, date(2022, 1, 2), 2, FailurePolicy::Abort);
    let mut sink = RecordingSink::default();

    fetch_weekly_snapshots(&Client::new(), &fetch_plan, &mut sink).await?;
    fetch_weekly_snapshots(&Client::new(), &fetch_plan, &mut sink).await?;

    let dates: Vec<NaiveDate> = sink.inserted.iter().map(|(_, d, _)| *d).collect();
    assert_eq!(
        dates,
        vec![date(2022, 1, 2), date(2021, 12, 26), date(2022, 1, 2), date(2021, 12, 26)]
    );
    Ok(())
}

#[tokio::test]
async fn error_status_aborts_run_by_default() -> Result<()> {
    let server = MockServer::start().await;
    mount_week(&server, "2023-11-19").await;
    Mock::given(method("GET"))
        .and(path(format!("/lists/2023-11-12/{LIST}.json")))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/lists", server.uri());
    let mut sink = RecordingSink::default();
    let err = fetch_weekly_snapshots(
        &Client::new(),
        &plan(&base, date(2023, 11, 19), 5, FailurePolicy::Abort),
        &mut sink,
    )
    .await
    .unwrap_err();

    match err {
        FetchWeeklySnapshotsError::UnexpectedStatus { date: failed, status } => {
            assert_eq!(failed, date(2023, 11, 12));
            assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(sink.inserted.len(), 1);
    Ok(())
}

#[tokio::test]
async fn malformed_json_aborts_run() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut sink = RecordingSink::default();
    let err = fetch_weekly_snapshots(
        &Client::new(),
        &plan(&server.uri(), date(2023, 11, 19), 3, FailurePolicy::Abort),
        &mut sink,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FetchWeeklySnapshotsError::DecodeBody { .. }));
    assert_eq!(err.date(), date(2023, 11, 19));
    assert!(sink.inserted.is_empty());
    Ok(())
}

#[tokio::test]
async fn skip_policy_records_failed_weeks_and_continues() -> Result<()> {
    let server = MockServer::start().await;
    mount_week(&server, "2023-11-19").await;
    Mock::given(method("GET"))
        .and(path(format!("/lists/2023-11-12/{LIST}.json")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/lists/2023-11-05/{LIST}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;
    mount_week(&server, "2023-10-29").await;

    let base = format!("{}/lists", server.uri());
    let mut sink = RecordingSink::default();
    let report = fetch_weekly_snapshots(
        &Client::new(),
        &plan(&base, date(2023, 11, 19), 4, FailurePolicy::Skip),
        &mut sink,
    )
    .await?;

    assert_eq!(report.calls, 4);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, vec![date(2023, 11, 12), date(2023, 11, 5)]);
    let dates: Vec<NaiveDate> = sink.inserted.iter().map(|(_, d, _)| *d).collect();
    assert_eq!(dates, vec![date(2023, 11, 19), date(2023, 10, 29)]);
    Ok(())
}

#[tokio::test]
async fn store_failure_is_fatal_even_when_skipping() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body("x")))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetch_weekly_snapshots(
        &Client::new(),
        &plan(&server.uri(), date(2023, 11, 19), 3, FailurePolicy::Skip),
        &mut BrokenSink,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FetchWeeklySnapshotsError::InsertSnapshot { .. }));
    Ok(())
}

#[tokio::test]
async fn pauses_between_calls_but_not_after_the_last() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body("x")))
        .expect(3)
        .mount(&server)
        .await;

    let base = server.uri();
    let mut fetch_plan = plan(&base, date(2023, 11, 19), 3, FailurePolicy::Abort);
    fetch_plan.pause = Duration::from_millis(150);

    let started = std::time::Instant::now();
    let mut sink = RecordingSink::default();
    fetch_weekly_snapshots(&Client::new(), &fetch_plan, &mut sink).await?;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
    assert_eq!(sink.inserted.len(), 3);
    Ok(())
}

#[tokio::test]
async fn plan_reaching_before_min_date_fails_without_calls() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body("x")))
        .expect(0)
        .mount(&server)
        .await;

    let base = server.uri();
    let start = NaiveDate::MIN + chrono::Duration::days(20);
    let mut sink = RecordingSink::default();
    let err = fetch_weekly_snapshots(
        &Client::new(),
        &plan(&base, start, 10, FailurePolicy::Skip),
        &mut sink,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        FetchWeeklySnapshotsError::DateOutOfRange { weeks: 10, .. }
    ));
    assert_eq!(err.date(), start);
    assert!(sink.inserted.is_empty());
    Ok(())
}
