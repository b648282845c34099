//! Daemon configuration from environment variables

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// ISO region code to aggregate and forecast (e.g. "KH")
    pub region: String,

    /// API key for the measurements source; absent means run against the
    /// simulator instead
    pub api_key: Option<String>,

    /// Base URL of the measurements API
    pub api_base: String,

    /// Directory for cached series (default: data)
    pub cache_dir: String,

    /// Cache entry lifetime in seconds (default: 3600)
    pub cache_ttl_secs: i64,

    /// Directory holding model/scaler artifacts (default: models)
    pub models_dir: String,

    /// Max distinct stations pooled per fetch (default: 10)
    pub station_cap: usize,

    /// Days of history fetched for the forecast (default: 30)
    pub history_days: u32,

    /// Stations shown in the ranking table (default: 10)
    pub top_n: usize,
}

impl DaemonConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let region = env::var("AQ_REGION").context("AQ_REGION environment variable not set")?;

        let api_key = env::var("AQ_API_KEY").ok().filter(|k| !k.is_empty());

        let api_base =
            env::var("AQ_API_BASE").unwrap_or_else(|_| "https://api.openaq.org/v3/".to_string());

        let cache_dir = env::var("AQ_CACHE_DIR").unwrap_or_else(|_| "data".to_string());

        let cache_ttl_secs = env::var("AQ_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("Invalid AQ_CACHE_TTL_SECS")?;

        let models_dir = env::var("AQ_MODELS_DIR").unwrap_or_else(|_| "models".to_string());

        let station_cap = env::var("AQ_STATION_CAP")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("Invalid AQ_STATION_CAP")?;

        let history_days = env::var("AQ_HISTORY_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("Invalid AQ_HISTORY_DAYS")?;

        let top_n = env::var("AQ_TOP_N")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("Invalid AQ_TOP_N")?;

        Ok(Self {
            region,
            api_key,
            api_base,
            cache_dir,
            cache_ttl_secs,
            models_dir,
            station_cap,
            history_days,
            top_n,
        })
    }
}
