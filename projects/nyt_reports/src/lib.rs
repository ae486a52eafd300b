//! NYT bestseller snapshots and article statistics
//!
//! - Weekly list backfill in `fetcher`
//! - Dashboard routes in `endpoints/`, page rendering and the summary fold in `utils/`
//! - PostgreSQL models and queries in `db/`
//! - Settings come from the environment, see `config`

pub mod config;
pub mod db;
pub mod endpoints;
pub mod fetcher;
pub mod utils;
