use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.nytimes.com/svc/books/v3/lists";

pub struct ListResponse {
    pub body: String,
    pub status: StatusCode,
}

/// Builds `{base_url}/{YYYY-MM-DD}/{list_name}.json`. The api key is passed separately as a query parameter.
pub fn list_url(base_url: &str, date: NaiveDate, list_name: &str) -> String {
    format!(
        "{}/{}/{}.json",
        base_url.trim_end_matches('/'),
        date.format("%Y-%m-%d"),
        list_name
    )
}

pub async fn fetch_list(
    client: &Client,
    base_url: &str,
    api_key: &str,
    date: NaiveDate,
    list_name: &str,
) -> Result<ListResponse, FetchListError> {
    let url = list_url(base_url, date, list_name);
    debug!(%url, "requesting bestseller list");

    let response = client
        .get(&url)
        .query(&[("api-key", api_key)])
        .header("Accept", "application/json")
        .header("User-Agent", "rust-client")
        .send()
        .await
        .map_err(|source| FetchListError::RequestSend { source: source.without_url() })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| FetchListError::ResponseRead { source: source.without_url() })?;

    Ok(ListResponse { body, status })
}

// Errors are stripped of their url since it carries the api key.
#[derive(Debug, Error)]
pub enum FetchListError {
    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}
