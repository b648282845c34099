//! Single-shot pipeline run
//!
//! Fetch (cache-first), aggregate, then print the regional summary, the
//! station ranking, and the 7-day forecast for the configured region.

use anyhow::{Context, Result};
use chrono::Duration;
use tracing::{info, warn};

use aq_cache::{CacheKey, FsCache};
use aq_core::{
    aggregate_hourly, daily_from_hourly, forecast_with, mean_concentration, snapshot, aqi,
    CoreError, HourlyPoint, RankingEntry, Regressor,
};
use aq_model::load_region_model;
use aq_source::{FetchWindow, HttpSource, ReadingSource, SimulatedSource, SourceConfig};

use crate::config::DaemonConfig;

pub async fn run(config: &DaemonConfig) -> Result<()> {
    let cache = FsCache::new(&config.cache_dir, Duration::seconds(config.cache_ttl_secs))
        .context("Failed to open cache directory")?;

    let source = build_source(config)?;
    info!(source = source.name(), region = %config.region, "pipeline starting");

    let hourly = hourly_series(&*source, &cache, config).await?;
    print_summary(&config.region, &hourly);

    let ranking = ranking_snapshot(&*source, &cache, config).await?;
    print_ranking(&ranking);

    let daily = daily_from_hourly(&hourly).context("Daily resampling failed")?;
    info!(days = daily.len(), "daily series ready");

    let model = load_region_model(config.models_dir.as_ref(), &config.region)
        .context("Failed to load model artifacts")?;

    match forecast_with(&daily, model.as_ref().map(|m| m as &dyn Regressor)) {
        Ok(points) => {
            println!("7-day forecast for {}:", config.region);
            for point in &points {
                println!(
                    "  {}  {:>6.0} µg/m³  index {:>3}  {}",
                    point.day,
                    point.predicted_concentration,
                    point.predicted_index,
                    aqi::Category::from_index(point.predicted_index)
                );
            }
        }
        Err(CoreError::ModelUnavailable) => {
            warn!(region = %config.region, "no trained model for region; skipping forecast");
            println!("No trained model for {}; forecast unavailable.", config.region);
        }
        Err(CoreError::NoData) => {
            warn!(region = %config.region, "daily series empty; skipping forecast");
            println!("Not enough data for {}; forecast unavailable.", config.region);
        }
        Err(e @ CoreError::StepFailed { .. }) => {
            return Err(e).context("Forecast rollout failed");
        }
    }

    Ok(())
}

fn build_source(config: &DaemonConfig) -> Result<Box<dyn ReadingSource>> {
    match &config.api_key {
        Some(api_key) => {
            let mut source_config = SourceConfig::new(api_key.clone());
            source_config.base_url = config
                .api_base
                .parse()
                .context("Invalid AQ_API_BASE URL")?;
            source_config.station_cap = config.station_cap;
            Ok(Box::new(
                HttpSource::new(source_config).context("Failed to build HTTP source")?,
            ))
        }
        None => {
            warn!("AQ_API_KEY not set; using the simulated source");
            Ok(Box::new(SimulatedSource::new(config.station_cap)))
        }
    }
}

/// Hourly series for the configured history window, cache-first.
async fn hourly_series(
    source: &dyn ReadingSource,
    cache: &FsCache,
    config: &DaemonConfig,
) -> Result<Vec<HourlyPoint>> {
    let window = FetchWindow::days(config.history_days);
    let key = CacheKey::new(&config.region, window.descriptor());

    if let Some(hourly) = cache.get::<Vec<HourlyPoint>>(&key) {
        info!(points = hourly.len(), "hourly series from cache");
        return Ok(hourly);
    }

    let readings = source
        .list_readings(&config.region, window)
        .await
        .context("Fetching readings failed")?;
    info!(readings = readings.len(), "readings fetched");

    let hourly = aggregate_hourly(&readings).context("Hourly aggregation failed")?;
    if let Err(e) = cache.put(&key, &hourly) {
        warn!(error = %e, "failed to write hourly series to cache");
    }
    Ok(hourly)
}

/// Latest-per-station ranking, cache-first.
async fn ranking_snapshot(
    source: &dyn ReadingSource,
    cache: &FsCache,
    config: &DaemonConfig,
) -> Result<Vec<RankingEntry>> {
    let key = CacheKey::new(&config.region, "ranking");

    if let Some(ranking) = cache.get::<Vec<RankingEntry>>(&key) {
        info!(entries = ranking.len(), "ranking from cache");
        return Ok(ranking);
    }

    let latest = source
        .latest_by_station(&config.region)
        .await
        .context("Fetching latest readings failed")?;

    let ranking = snapshot(&latest, config.top_n);
    if let Err(e) = cache.put(&key, &ranking) {
        warn!(error = %e, "failed to write ranking to cache");
    }
    Ok(ranking)
}

fn print_summary(region: &str, hourly: &[HourlyPoint]) {
    let Some(mean) = mean_concentration(hourly) else {
        return;
    };
    let (index, category) = aqi::convert(mean);

    println!("{region} air quality");
    println!("╔══════════════════════════════════════════╗");
    println!("║  {index:>3}  US AQI        {:<24}║", category.to_string());
    println!("║  PM2.5 {mean:>7.2} µg/m³                    ║");
    println!("╚══════════════════════════════════════════╝");
}

fn print_ranking(ranking: &[RankingEntry]) {
    if ranking.is_empty() {
        return;
    }
    println!("Highest PM2.5 by station:");
    for (position, entry) in ranking.iter().enumerate() {
        println!(
            "  {:>2}. {:<32} {:>7.2} µg/m³  index {:>3}",
            position + 1,
            entry.station_name,
            entry.concentration,
            entry.index_value
        );
    }
}
