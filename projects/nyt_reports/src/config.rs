//! Environment-driven settings for both binaries.
//!
//! Each struct is deserialized from `config::Environment`, so a variable such
//! as `FETCH_WEEKS` lands in the field renamed `fetch_weeks`. Binaries call
//! `dotenvy::dotenv()` first, then `from_env`. Tests hand the environment
//! source a map instead.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::NaiveDate;
use config::{Config, Environment};
use interfaces_nyt_books::index::DEFAULT_BASE_URL;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use utils_trace::TraceFormat;

use crate::fetcher::FailurePolicy;

pub const DEFAULT_LIST_NAME: &str = "combined-print-and-e-book-nonfiction";
pub const DEFAULT_START_DATE: &str = "2023-11-19";
pub const DEFAULT_WEEKS: u32 = 500;
pub const DEFAULT_PAUSE_SECS: u64 = 12;
pub const DEFAULT_DASHBOARD_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_POOL_SIZE: u32 = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LoadConfig: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    #[serde(rename = "log_level", default = "default_log_level")]
    pub level: String,
    #[serde(rename = "log_format", default)]
    pub format: TraceFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FetcherConfig {
    pub database_url: String,
    #[serde(rename = "nyt_api_key")]
    pub api_key: String,
    #[serde(rename = "nyt_api_base_url", default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(rename = "nyt_list_name", default = "default_list_name")]
    pub list_name: String,
    #[serde(rename = "fetch_start_date", default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(rename = "fetch_weeks", default = "default_weeks")]
    pub weeks: u32,
    #[serde(rename = "fetch_pause_secs", default = "default_pause_secs")]
    pub pause_secs: u64,
    #[serde(rename = "fetch_on_error", default)]
    pub on_error: FailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DashboardConfig {
    pub database_url: String,
    #[serde(rename = "dashboard_addr", default = "default_dashboard_addr")]
    pub addr: SocketAddr,
    #[serde(rename = "dashboard_pool_size", default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_list_name() -> String {
    DEFAULT_LIST_NAME.to_string()
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, 19).unwrap_or_default()
}

fn default_weeks() -> u32 {
    DEFAULT_WEEKS
}

fn default_pause_secs() -> u64 {
    DEFAULT_PAUSE_SECS
}

fn default_dashboard_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}

/// Process environment; blank variables count as unset.
fn environment() -> Environment {
    Environment::default().ignore_empty(true)
}

fn load<T: DeserializeOwned>(source: Environment) -> Result<T, ConfigError> {
    let settings = Config::builder().add_source(source).build()?;
    Ok(settings.try_deserialize()?)
}

impl LogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(environment())
    }

    pub fn from_source(source: Environment) -> Result<Self, ConfigError> {
        load(source)
    }
}

impl FetcherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(environment())
    }

    pub fn from_source(source: Environment) -> Result<Self, ConfigError> {
        load(source)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.pause_secs)
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(environment())
    }

    pub fn from_source(source: Environment) -> Result<Self, ConfigError> {
        let config: Self = load(source)?;
        if config.pool_size == 0 {
            return Err(ConfigError::Invalid { key: "DASHBOARD_POOL_SIZE", value: "0".to_string() });
        }
        Ok(config)
    }
}
