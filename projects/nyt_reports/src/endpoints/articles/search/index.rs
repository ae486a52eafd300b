use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::db::{
    article::{
        models::ArticleLink,
        queries::{normalize_query, search_articles, SEARCH_LIMIT},
    },
    PgPool,
};

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
    SearchArticles {
        #[from]
        source: crate::db::article::queries::SearchArticlesError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::GetConnectionFromPool { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
            HandlerError::BlockingTask { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
            HandlerError::SearchArticles { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
        }
    }
}

/// Query string for the endpoint.
#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

/// Axum handler: GET /articles/search?q=
///
/// Blank queries return an empty list without touching the database.
pub async fn handler(
    Extension(pool): Extension<PgPool>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ArticleLink>>, HandlerError> {
    let Some(query) = normalize_query(params.q.as_deref()) else {
        return Ok(Json(Vec::new()));
    };

    let links = tokio::task::spawn_blocking({
        let query = query.clone();
        move || -> Result<_, HandlerError> {
            let mut conn = pool.get()?;
            Ok(search_articles(&mut conn, &query, SEARCH_LIMIT)?)
        }
    })
    .await??;

    debug!(%query, hits = links.len(), "searched article keywords");

    Ok(Json(links))
}
