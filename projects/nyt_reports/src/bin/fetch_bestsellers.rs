use diesel::{Connection, PgConnection};
use projects_nyt_reports::{
    config::{ConfigError, FetcherConfig, LogConfig},
    db::snapshot::queries::{count_snapshots, CountSnapshotsError},
    fetcher::{fetch_weekly_snapshots, FetchPlan, FetchWeeklySnapshotsError},
};
use reqwest::Client;
use thiserror::Error;
use tracing::info;
use utils_trace::tracing_init;

#[derive(Debug, Error)]
pub enum MainError {
    #[error("Config: {source}")]
    Config {
        #[source]
        source: ConfigError,
    },
    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },
    #[error("BuildHttpClient: {source}")]
    BuildHttpClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("EstablishConnection: {source}")]
    EstablishConnection {
        #[source]
        source: diesel::ConnectionError,
    },
    #[error("FetchWeeklySnapshots: {source}")]
    FetchWeeklySnapshots {
        #[source]
        source: FetchWeeklySnapshotsError,
    },
    #[error("CountSnapshots: {source}")]
    CountSnapshots {
        #[source]
        source: CountSnapshotsError,
    },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    // A missing .env file is fine, the variables may come from the shell.
    dotenvy::dotenv().ok();

    let log = LogConfig::from_env().map_err(|source| MainError::Config { source })?;
    let config = FetcherConfig::from_env().map_err(|source| MainError::Config { source })?;

    tracing_init(&log.level, log.format)
        .map_err(|source| MainError::TracingInit { source })?;

    let client = Client::builder()
        .build()
        .map_err(|source| MainError::BuildHttpClient { source })?;

    let mut conn = PgConnection::establish(&config.database_url)
        .map_err(|source| MainError::EstablishConnection { source })?;

    info!(
        list = %config.list_name,
        start = %config.start_date,
        weeks = config.weeks,
        pause_secs = config.pause_secs,
        "starting bestseller fetch"
    );

    let plan = FetchPlan {
        api_base_url: &config.api_base_url,
        api_key: &config.api_key,
        list_name: &config.list_name,
        start_date: config.start_date,
        weeks: config.weeks,
        pause: config.pause(),
        on_error: config.on_error,
    };

    let report = fetch_weekly_snapshots(&client, &plan, &mut conn)
        .await
        .map_err(|source| MainError::FetchWeeklySnapshots { source })?;

    let stored = count_snapshots(&mut conn, &config.list_name)
        .map_err(|source| MainError::CountSnapshots { source })?;

    info!(
        calls = report.calls,
        inserted = report.inserted,
        skipped = report.skipped.len(),
        stored,
        "bestseller data saved"
    );
    println!("The number of api calls: {}", report.calls);

    Ok(())
}
