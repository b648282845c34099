//! AQ Daemon - regional air-quality aggregation and forecast
//!
//! This binary coordinates:
//! - Reading collection (HTTP source or simulator)
//! - Cache-first hourly/daily aggregation
//! - Ranking snapshot and 7-day forecast output

mod config;
mod run;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DaemonConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AQ daemon");

    let config = DaemonConfig::from_env()?;
    info!(
        region = %config.region,
        history_days = config.history_days,
        station_cap = config.station_cap,
        "Loaded configuration"
    );

    run::run(&config).await?;

    info!("AQ daemon finished");
    Ok(())
}
