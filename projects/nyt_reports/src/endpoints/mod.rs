pub mod articles;

use axum::{routing::get, Extension, Router};

use crate::db::PgPool;
use crate::utils::page::SEARCH_PATH;
use articles::{search::index::handler as articles_search_handler, summary::index::handler as articles_summary_handler};

pub fn router(pool: PgPool) -> Router {
    Router::new()
        .route("/", get(articles_summary_handler))
        .route(SEARCH_PATH, get(articles_search_handler))
        .layer(Extension(pool))
}
