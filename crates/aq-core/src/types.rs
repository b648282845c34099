//! Core data types for air-quality series

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single pollutant measurement reported by one station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    /// Source-assigned station identifier
    pub station_id: String,

    /// Human-readable station name
    pub station_name: String,

    /// Instant the measurement period ended
    pub timestamp: DateTime<Utc>,

    /// PM2.5 concentration in µg/m³
    pub concentration: f64,
}

/// Cross-station mean concentration for one clock hour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyPoint {
    /// Start of the hour (timestamps floored)
    pub hour: DateTime<Utc>,

    pub mean_concentration: f64,

    /// Index value derived from `mean_concentration`
    pub index_value: u16,
}

/// Cross-station mean concentration for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyPoint {
    pub day: NaiveDate,

    pub concentration: f64,

    /// `concentration[today] - concentration[yesterday]`; `None` exactly
    /// for the first point of a series
    pub first_difference: Option<f64>,
}

/// One day of the forecast horizon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub day: NaiveDate,

    /// Reconstructed absolute level, clamped at zero and rounded to the unit
    pub predicted_concentration: f64,

    pub predicted_index: u16,
}

/// One station's latest reading, ranked by severity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingEntry {
    pub station_name: String,
    pub concentration: f64,
    pub index_value: u16,
    pub observed_at: DateTime<Utc>,
}

/// Time-bucketing resolution for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grain {
    Hour,
    Day,
}

/// Output of [`crate::aggregate::aggregate`], one variant per grain.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Hourly(Vec<HourlyPoint>),
    Daily(Vec<DailyPoint>),
}
