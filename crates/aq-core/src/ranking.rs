//! Latest-reading ranking snapshot
//!
//! A cross-section of the region, independent of the time-series pipeline:
//! one most-recent reading per station, ranked by severity.

use crate::aqi;
use crate::types::{RankingEntry, Reading};

/// Default number of stations kept in a snapshot.
pub const DEFAULT_TOP_N: usize = 10;

/// Rank the latest reading of each station by concentration, worst first,
/// truncated to `top_n`.
///
/// The sort is stable: stations with equal concentrations keep their input
/// order, so the source's station-listing order is the only tie-break.
pub fn snapshot(latest: &[Reading], top_n: usize) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = latest
        .iter()
        .map(|reading| RankingEntry {
            station_name: reading.station_name.clone(),
            concentration: reading.concentration,
            index_value: aqi::to_index(reading.concentration),
            observed_at: reading.timestamp,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.concentration
            .partial_cmp(&a.concentration)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.truncate(top_n);
    entries
}
