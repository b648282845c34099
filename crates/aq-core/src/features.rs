//! Feature engineering for the difference-series regressor
//!
//! The vector layout below is a wire contract with the trained model
//! artifact: the order must match the order the model was fitted with.
//! Artifact files record their training order and the loader cross-checks
//! it against [`FEATURE_NAMES`].

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};

/// Number of features in the vector.
pub const FEATURE_COUNT: usize = 15;

/// Feature names in wire order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "lag_1",
    "lag_2",
    "lag_3",
    "lag_4",
    "lag_5",
    "lag_6",
    "lag_7",
    "lag_14",
    "lag_30",
    "rolling_mean_7",
    "rolling_std_7",
    "day_of_week_sin",
    "day_of_week_cos",
    "day_of_year_sin",
    "day_of_year_cos",
];

/// Seasonal period for the day-of-year encoding, in days.
const YEAR_PERIOD: f64 = 365.25;

/// The value `n` positions before the end of `history`, 0.0 when the
/// history is shorter than `n`.
fn lag(history: &[f64], n: usize) -> f64 {
    if history.len() >= n {
        history[history.len() - n]
    } else {
        0.0
    }
}

/// Build the feature vector for predicting `target`'s first difference.
///
/// Pure and total: short histories pad with zero, they never fail.
pub fn build_features(diff_history: &[f64], target: NaiveDate) -> [f64; FEATURE_COUNT] {
    let mut features = [0.0; FEATURE_COUNT];

    for n in 1..=7 {
        features[n - 1] = lag(diff_history, n);
    }
    features[7] = lag(diff_history, 14);
    features[8] = lag(diff_history, 30);

    // Rolling stats over the trailing 7 of the last 30 differences.
    // Mean falls back to the mean of whatever is available; sample std
    // (N-1) needs the full window and is zero otherwise.
    let recent = &diff_history[diff_history.len().saturating_sub(30)..];
    let window = &recent[recent.len().saturating_sub(7)..];
    if !window.is_empty() {
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        features[9] = mean;
        if window.len() >= 7 {
            let variance = window
                .iter()
                .map(|d| (d - mean).powi(2))
                .sum::<f64>()
                / (window.len() - 1) as f64;
            features[10] = variance.sqrt();
        }
    }

    let weekday = f64::from(target.weekday().num_days_from_monday());
    let week_angle = 2.0 * PI * weekday / 7.0;
    features[11] = week_angle.sin();
    features[12] = week_angle.cos();

    let ordinal = f64::from(target.ordinal());
    let year_angle = 2.0 * PI * ordinal / YEAR_PERIOD;
    features[13] = year_angle.sin();
    features[14] = year_angle.cos();

    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_lag_counts_from_end() {
        let history = vec![1.0, 2.0, 3.0, 4.0];
        let features = build_features(&history, date("2024-03-04"));

        assert_eq!(features[0], 4.0); // lag_1
        assert_eq!(features[1], 3.0); // lag_2
        assert_eq!(features[3], 1.0); // lag_4
        assert_eq!(features[4], 0.0); // lag_5 pads
        assert_eq!(features[7], 0.0); // lag_14 pads
        assert_eq!(features[8], 0.0); // lag_30 pads
    }

    #[test]
    fn test_short_history_rolling_stats() {
        let history = vec![2.0, 4.0];
        let features = build_features(&history, date("2024-03-04"));

        assert_eq!(features[9], 3.0); // mean of all available entries
        assert_eq!(features[10], 0.0); // std needs a full window
    }

    #[test]
    fn test_empty_history_is_all_zero_lags() {
        let features = build_features(&[], date("2024-03-04"));
        for i in 0..11 {
            assert_eq!(features[i], 0.0);
        }
    }

    #[test]
    fn test_rolling_stats_full_window() {
        // Constant differences: mean is the constant, std is zero
        let history = vec![5.0; 10];
        let features = build_features(&history, date("2024-03-04"));
        assert_eq!(features[9], 5.0);
        assert_eq!(features[10], 0.0);

        // 1..=7 has mean 4 and sample std sqrt(28/6)
        let history: Vec<f64> = (1..=7).map(f64::from).collect();
        let features = build_features(&history, date("2024-03-04"));
        assert_eq!(features[9], 4.0);
        assert!((features[10] - (28.0f64 / 6.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_window_ignores_older_than_30() {
        // 40 entries; the last 30 are all 1.0, the first 10 are huge
        let mut history = vec![1000.0; 10];
        history.extend(vec![1.0; 30]);
        let features = build_features(&history, date("2024-03-04"));
        assert_eq!(features[9], 1.0);
        assert_eq!(features[10], 0.0);
    }

    #[test]
    fn test_calendar_encodings() {
        // 2024-03-04 is a Monday: weekday angle 0
        let features = build_features(&[], date("2024-03-04"));
        assert!((features[11] - 0.0).abs() < 1e-12);
        assert!((features[12] - 1.0).abs() < 1e-12);

        // Day of year 64 for 2024-03-04 (leap year)
        let angle = 2.0 * PI * 64.0 / YEAR_PERIOD;
        assert!((features[13] - angle.sin()).abs() < 1e-12);
        assert!((features[14] - angle.cos()).abs() < 1e-12);
    }

    #[test]
    fn test_feature_names_match_layout() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_NAMES[0], "lag_1");
        assert_eq!(FEATURE_NAMES[8], "lag_30");
        assert_eq!(FEATURE_NAMES[10], "rolling_std_7");
        assert_eq!(FEATURE_NAMES[14], "day_of_year_cos");
    }
}
