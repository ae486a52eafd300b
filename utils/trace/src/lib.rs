use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Output layout of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TraceFormat {
    #[default]
    Compact,
    Pretty,
}

impl FromStr for TraceFormat {
    type Err = TraceFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(TraceFormat::Compact),
            "pretty" => Ok(TraceFormat::Pretty),
            _ => Err(TraceFormatParseError { value: value.to_string() }),
        }
    }
}

impl TryFrom<String> for TraceFormat {
    type Error = TraceFormatParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Error)]
#[error("Unknown trace format: {value}")]
pub struct TraceFormatParseError {
    pub value: String,
}

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn tracing_init(level: &str, format: TraceFormat) -> Result<(), TracingInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|source| TracingInitError::InvalidFilter { source })?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        TraceFormat::Compact => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().compact()),
        ),
        TraceFormat::Pretty => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().pretty()),
        ),
    }
    .map_err(|source| TracingInitError::SetGlobalDefault { source })?;

    Ok(())
}

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("Invalid filter config: {source}")]
    InvalidFilter {
        #[from]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to set global default subscriber: {source}")]
    SetGlobalDefault {
        #[from]
        source: tracing::subscriber::SetGlobalDefaultError,
    },
}
