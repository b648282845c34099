//! Multi-station temporal aggregation
//!
//! Merges raw per-station readings into a single hourly series, then a
//! daily series. All stations are pooled into one bucket per timestamp
//! before averaging, so a station reporting every 15 minutes weighs more
//! than one reporting hourly: the cross-station mean is over samples,
//! not over per-station means.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::aqi;
use crate::types::{DailyPoint, Grain, HourlyPoint, Reading, Series};
use crate::{CoreError, CoreResult};

const HOUR_SECS: i64 = 3600;

/// Floor a timestamp to the start of its clock hour.
pub fn floor_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = ts.timestamp();
    let floored = secs - secs.rem_euclid(HOUR_SECS);
    DateTime::from_timestamp(floored, 0).expect("hour floor stays in range")
}

/// Aggregate readings at the requested grain.
pub fn aggregate(readings: &[Reading], grain: Grain) -> CoreResult<Series> {
    match grain {
        Grain::Hour => Ok(Series::Hourly(aggregate_hourly(readings)?)),
        Grain::Day => {
            let hourly = aggregate_hourly(readings)?;
            Ok(Series::Daily(daily_from_hourly(&hourly)?))
        }
    }
}

/// Collapse readings into one point per distinct hour, ascending.
///
/// Fails with [`CoreError::NoData`] on empty input.
pub fn aggregate_hourly(readings: &[Reading]) -> CoreResult<Vec<HourlyPoint>> {
    if readings.is_empty() {
        return Err(CoreError::NoData);
    }

    // BTreeMap keys give the ascending sort for free
    let mut buckets: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for reading in readings {
        let secs = reading.timestamp.timestamp();
        buckets
            .entry(secs - secs.rem_euclid(HOUR_SECS))
            .or_default()
            .push(reading.concentration);
    }

    Ok(buckets
        .into_iter()
        .map(|(hour_secs, values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            HourlyPoint {
                hour: DateTime::from_timestamp(hour_secs, 0)
                    .expect("hour floor stays in range"),
                mean_concentration: mean,
                index_value: aqi::to_index(mean),
            }
        })
        .collect())
}

/// Resample an hourly series to one point per calendar day.
///
/// Days missing from the input are filled by linear interpolation between
/// the neighboring known days; a run of missing days at either edge takes
/// the nearest known value flatly. The first difference of the first day
/// is `None`, never zero.
pub fn daily_from_hourly(hourly: &[HourlyPoint]) -> CoreResult<Vec<DailyPoint>> {
    if hourly.is_empty() {
        return Err(CoreError::NoData);
    }

    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for point in hourly {
        buckets
            .entry(point.hour.date_naive())
            .or_default()
            .push(point.mean_concentration);
    }

    let known: Vec<(NaiveDate, f64)> = buckets
        .into_iter()
        .map(|(day, values)| (day, values.iter().sum::<f64>() / values.len() as f64))
        .collect();

    let filled = fill_daily_gaps(&known);

    Ok(filled
        .iter()
        .enumerate()
        .map(|(i, &(day, concentration))| DailyPoint {
            day,
            concentration,
            first_difference: if i == 0 {
                None
            } else {
                Some(concentration - filled[i - 1].1)
            },
        })
        .collect())
}

/// Mean concentration over an hourly window, for the regional summary.
pub fn mean_concentration(points: &[HourlyPoint]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().map(|p| p.mean_concentration).sum::<f64>() / points.len() as f64)
}

/// Expand `known` (ascending, non-empty) to a contiguous run of days,
/// interpolating concentrations for the missing ones.
fn fill_daily_gaps(known: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    let first = known[0].0;
    let last = known[known.len() - 1].0;

    let mut out = Vec::with_capacity(known.len());
    let mut next_known = 0;
    let mut day = first;
    while day <= last {
        if known[next_known].0 == day {
            out.push(known[next_known]);
            next_known += 1;
        } else {
            // Strictly between two known days: next_known > 0 here because
            // the cursor starts on a known day
            let (prev_day, prev_value) = known[next_known - 1];
            let (next_day, next_value) = known[next_known];
            let span = (next_day - prev_day).num_days() as f64;
            let t = (day - prev_day).num_days() as f64 / span;
            out.push((day, prev_value + (next_value - prev_value) * t));
        }
        day = day + Duration::days(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(station: &str, secs: i64, concentration: f64) -> Reading {
        Reading {
            station_id: station.to_string(),
            station_name: station.to_string(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            concentration,
        }
    }

    fn day_reading(day: &str, concentration: f64) -> Reading {
        let timestamp = format!("{day}T12:00:00Z").parse().unwrap();
        Reading {
            station_id: "s1".to_string(),
            station_name: "s1".to_string(),
            timestamp,
            concentration,
        }
    }

    #[test]
    fn test_empty_input_is_no_data() {
        assert_eq!(aggregate_hourly(&[]), Err(CoreError::NoData));
        assert_eq!(daily_from_hourly(&[]), Err(CoreError::NoData));
        assert_eq!(aggregate(&[], Grain::Day), Err(CoreError::NoData));
    }

    #[test]
    fn test_two_stations_same_hour_average() {
        let readings = vec![
            reading("a", 3_600_100, 10.0),
            reading("b", 3_600_500, 30.0),
        ];
        let hourly = aggregate_hourly(&readings).unwrap();

        assert_eq!(hourly.len(), 1);
        assert_eq!(hourly[0].hour.timestamp(), 3_600);
        assert_eq!(hourly[0].mean_concentration, 20.0);
        assert_eq!(hourly[0].index_value, aqi::to_index(20.0));
    }

    #[test]
    fn test_uneven_cadence_pools_samples() {
        // Station a reports twice in the hour, station b once: the mean is
        // over three samples, not over two station means
        let readings = vec![
            reading("a", 100, 10.0),
            reading("a", 200, 10.0),
            reading("b", 300, 40.0),
        ];
        let hourly = aggregate_hourly(&readings).unwrap();
        assert_eq!(hourly[0].mean_concentration, 20.0);
    }

    #[test]
    fn test_hourly_sorted_ascending() {
        let readings = vec![
            reading("a", 7_300, 5.0),
            reading("a", 100, 1.0),
            reading("a", 3_700, 3.0),
        ];
        let hourly = aggregate_hourly(&readings).unwrap();
        let hours: Vec<i64> = hourly.iter().map(|p| p.hour.timestamp()).collect();
        assert_eq!(hours, vec![0, 3_600, 7_200]);
    }

    #[test]
    fn test_hourly_idempotent() {
        let readings = vec![
            reading("a", 0, 10.0),
            reading("b", 60, 20.0),
            reading("a", 3_600, 30.0),
        ];
        let once = aggregate_hourly(&readings).unwrap();

        // Re-aggregate the aggregated series as if it were raw readings
        let as_readings: Vec<Reading> = once
            .iter()
            .map(|p| reading("merged", p.hour.timestamp(), p.mean_concentration))
            .collect();
        let twice = aggregate_hourly(&as_readings).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_daily_interpolates_missing_day() {
        let readings = vec![
            day_reading("2024-03-01", 10.0),
            day_reading("2024-03-03", 30.0),
        ];
        let hourly = aggregate_hourly(&readings).unwrap();
        let daily = daily_from_hourly(&hourly).unwrap();

        assert_eq!(daily.len(), 3);
        assert_eq!(daily[1].day.to_string(), "2024-03-02");
        assert_eq!(daily[1].concentration, 20.0);
    }

    #[test]
    fn test_daily_interpolates_across_longer_gap() {
        let readings = vec![
            day_reading("2024-03-01", 10.0),
            day_reading("2024-03-05", 50.0),
        ];
        let hourly = aggregate_hourly(&readings).unwrap();
        let daily = daily_from_hourly(&hourly).unwrap();

        let values: Vec<f64> = daily.iter().map(|p| p.concentration).collect();
        assert_eq!(values, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_first_difference_shape() {
        let readings = vec![
            day_reading("2024-03-01", 10.0),
            day_reading("2024-03-02", 14.0),
            day_reading("2024-03-03", 11.0),
        ];
        let hourly = aggregate_hourly(&readings).unwrap();
        let daily = daily_from_hourly(&hourly).unwrap();

        assert_eq!(daily[0].first_difference, None);
        assert_eq!(daily[1].first_difference, Some(4.0));
        assert_eq!(daily[2].first_difference, Some(-3.0));

        let diffs: Vec<f64> = daily.iter().filter_map(|p| p.first_difference).collect();
        assert_eq!(diffs.len(), daily.len() - 1);
    }

    #[test]
    fn test_daily_day_mean_is_mean_of_hourly_means() {
        // Two hours on the same day with different sample counts: the day
        // value averages the hourly points, not the raw samples
        let readings = vec![
            reading("a", 0, 10.0),
            reading("b", 60, 20.0),
            reading("a", 3_600, 30.0),
        ];
        let hourly = aggregate_hourly(&readings).unwrap();
        let daily = daily_from_hourly(&hourly).unwrap();

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].concentration, 22.5);
    }

    #[test]
    fn test_aggregate_dispatch() {
        let readings = vec![reading("a", 0, 10.0)];

        match aggregate(&readings, Grain::Hour).unwrap() {
            Series::Hourly(points) => assert_eq!(points.len(), 1),
            Series::Daily(_) => panic!("expected hourly series"),
        }
        match aggregate(&readings, Grain::Day).unwrap() {
            Series::Daily(points) => assert_eq!(points.len(), 1),
            Series::Hourly(_) => panic!("expected daily series"),
        }
    }

    #[test]
    fn test_mean_concentration() {
        assert_eq!(mean_concentration(&[]), None);

        let readings = vec![reading("a", 0, 10.0), reading("a", 3_600, 30.0)];
        let hourly = aggregate_hourly(&readings).unwrap();
        assert_eq!(mean_concentration(&hourly), Some(20.0));
    }

    #[test]
    fn test_floor_to_hour() {
        let ts = Utc.timestamp_opt(7_201, 0).unwrap();
        assert_eq!(floor_to_hour(ts).timestamp(), 7_200);

        let exact = Utc.timestamp_opt(7_200, 0).unwrap();
        assert_eq!(floor_to_hour(exact), exact);
    }
}
