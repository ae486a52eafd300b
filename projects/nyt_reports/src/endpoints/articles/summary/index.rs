use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use thiserror::Error;
use tracing::debug;

use crate::db::{article::queries::summarize_articles, PgPool};
use crate::utils::page::render_dashboard;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error("BlockingTask: {source}")]
    BlockingTask {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error(transparent)]
    SummarizeArticles {
        #[from]
        source: crate::db::article::queries::SummarizeArticlesError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::GetConnectionFromPool { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
            HandlerError::BlockingTask { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
            HandlerError::SummarizeArticles { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
        }
    }
}

/// Axum handler: GET /
///
/// Recomputes the summary on every load. Checkout and scan run on the blocking pool.
pub async fn handler(Extension(pool): Extension<PgPool>) -> Result<Html<String>, HandlerError> {
    let summary = tokio::task::spawn_blocking(move || -> Result<_, HandlerError> {
        let mut conn = pool.get()?;
        Ok(summarize_articles(&mut conn)?)
    })
    .await??;

    debug!(
        total = summary.total_articles,
        categories = summary.categories.len(),
        "rendered article summary"
    );

    Ok(Html(render_dashboard(&summary)))
}
