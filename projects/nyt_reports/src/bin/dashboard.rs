use axum::serve;
use projects_nyt_reports::{
    config::{ConfigError, DashboardConfig, LogConfig},
    db::{build_pool, BuildPoolError},
    endpoints::router,
};
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
    #[error("BuildPool: {source}")]
    BuildPool {
        #[source]
        source: BuildPoolError,
    },
    #[error("TcpListenerBind: {source}")]
    TcpListenerBind {
        #[source]
        source: std::io::Error,
    },
    #[error("Serve: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    dotenvy::dotenv().ok();

    let log = LogConfig::from_env().map_err(|source| MainError::Config { source })?;
    let config = DashboardConfig::from_env().map_err(|source| MainError::Config { source })?;

    tracing_init(&log.level, log.format)
        .map_err(|source| MainError::TracingInit { source })?;

    let pool = build_pool(&config.database_url, config.pool_size)
        .map_err(|source| MainError::BuildPool { source })?;

    let app = router(pool);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|source| MainError::TcpListenerBind { source })?;

    info!("Dashboard running on addr: {}", config.addr);

    serve(listener, app)
        .await
        .map_err(|source| MainError::Serve { source })?;

    Ok(())
}
