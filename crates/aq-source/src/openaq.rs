//! OpenAQ-style HTTP source
//!
//! Fetches the region's PM2.5-capable stations, then each station's
//! measurements, and flattens them into readings. One slow or failing
//! station does not fail the whole fetch; it is logged and skipped.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use aq_core::Reading;

use crate::{FetchWindow, ReadingSource, SourceError, SourceResult};

/// Parameter id the source assigns to PM2.5.
pub const PARAM_PM25: i64 = 2;

const DEFAULT_BASE_URL: &str = "https://api.openaq.org/v3/";

/// Stations listed per locations request; only the first
/// `station_cap` PM2.5-capable ones are fetched.
const LOCATION_LISTING_LIMIT: usize = 60;

/// Configuration for the HTTP source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub base_url: Url,
    pub api_key: String,

    /// Max distinct stations pooled per fetch
    pub station_cap: usize,

    /// Max measurement records requested per sensor
    pub page_limit: usize,
}

impl SourceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            api_key: api_key.into(),
            station_cap: 10,
            page_limit: 1000,
        }
    }
}

/// HTTP client for an OpenAQ-compatible measurements API.
pub struct HttpSource {
    config: SourceConfig,
    client: reqwest::Client,
}

// ---------------------------------------------------------------------------
// API response structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LocationsResponse {
    results: Vec<LocationRow>,
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    id: i64,
    name: String,
    #[serde(default)]
    sensors: Vec<SensorRow>,
}

#[derive(Debug, Deserialize)]
struct SensorRow {
    id: i64,
    parameter: ParameterRow,
}

#[derive(Debug, Deserialize)]
struct ParameterRow {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct MeasurementsResponse {
    results: Vec<MeasurementRow>,
}

#[derive(Debug, Deserialize)]
struct MeasurementRow {
    value: f64,
    period: PeriodRow,
}

#[derive(Debug, Deserialize)]
struct PeriodRow {
    #[serde(rename = "datetimeTo")]
    datetime_to: InstantRow,
}

#[derive(Debug, Deserialize)]
struct InstantRow {
    utc: DateTime<Utc>,
}

/// One station's PM2.5 sensor, resolved from the locations listing.
struct SensorRef {
    sensor_id: i64,
    station_id: i64,
    station_name: String,
}

impl HttpSource {
    pub fn new(config: SourceConfig) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> SourceResult<T> {
        let response = self
            .client
            .get(url)
            .header("X-API-Key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Http(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }

    fn endpoint(&self, path: &str) -> SourceResult<Url> {
        self.config
            .base_url
            .join(path)
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }

    /// List the region's stations and pick each one's PM2.5 sensor,
    /// stopping at the configured station cap.
    async fn pm25_sensors(&self, region: &str) -> SourceResult<Vec<SensorRef>> {
        let mut url = self.endpoint("locations")?;
        url.query_pairs_mut()
            .append_pair("iso", region)
            .append_pair("parameters_id", &PARAM_PM25.to_string())
            .append_pair("limit", &LOCATION_LISTING_LIMIT.to_string());

        let response: LocationsResponse = self.get_json(url).await?;
        debug!(region, locations = response.results.len(), "locations listed");

        let mut sensors = Vec::new();
        for location in response.results {
            if sensors.len() >= self.config.station_cap {
                break;
            }
            if let Some(sensor) = location.sensors.iter().find(|s| s.parameter.id == PARAM_PM25) {
                sensors.push(SensorRef {
                    sensor_id: sensor.id,
                    station_id: location.id,
                    station_name: location.name.clone(),
                });
            }
        }
        Ok(sensors)
    }

    async fn sensor_measurements(
        &self,
        sensor: &SensorRef,
        from: DateTime<Utc>,
    ) -> SourceResult<Vec<Reading>> {
        let mut url = self.endpoint(&format!("sensors/{}/measurements", sensor.sensor_id))?;
        url.query_pairs_mut()
            .append_pair("datetime_from", &from.to_rfc3339())
            .append_pair("limit", &self.config.page_limit.to_string());

        let response: MeasurementsResponse = self.get_json(url).await?;

        Ok(response
            .results
            .into_iter()
            .filter(|m| m.value >= 0.0)
            .map(|m| Reading {
                station_id: sensor.station_id.to_string(),
                station_name: sensor.station_name.clone(),
                timestamp: m.period.datetime_to.utc,
                concentration: m.value,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl ReadingSource for HttpSource {
    fn name(&self) -> &str {
        "openaq"
    }

    async fn list_readings(
        &self,
        region: &str,
        window: FetchWindow,
    ) -> SourceResult<Vec<Reading>> {
        let from = Utc::now() - Duration::days(i64::from(window.days));
        let sensors = self.pm25_sensors(region).await?;

        let mut readings = Vec::new();
        for sensor in &sensors {
            match self.sensor_measurements(sensor, from).await {
                Ok(mut batch) => readings.append(&mut batch),
                Err(e) => {
                    warn!(
                        station = %sensor.station_name,
                        error = %e,
                        "skipping station after fetch error"
                    );
                }
            }
        }

        debug!(
            region,
            stations = sensors.len(),
            readings = readings.len(),
            "fetch complete"
        );
        Ok(readings)
    }

    async fn latest_by_station(&self, region: &str) -> SourceResult<Vec<Reading>> {
        let from = Utc::now() - Duration::hours(1);
        let sensors = self.pm25_sensors(region).await?;

        let mut latest = Vec::new();
        for sensor in &sensors {
            match self.sensor_measurements(sensor, from).await {
                Ok(batch) => {
                    if let Some(reading) = batch.into_iter().last() {
                        latest.push(reading);
                    }
                }
                Err(e) => {
                    warn!(
                        station = %sensor.station_name,
                        error = %e,
                        "skipping station after fetch error"
                    );
                }
            }
        }
        Ok(latest)
    }
}
