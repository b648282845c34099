//! Seven-day autoregressive rollout
//!
//! The regressor predicts tomorrow's first difference; absolute levels
//! are reconstructed step by step and each predicted difference is fed
//! back into the lag history for the following step. Prediction error
//! therefore compounds across the horizon; that is the nature of a
//! difference-based rollout and is left as-is.

use anyhow::Result;
use chrono::Duration;

use crate::aqi;
use crate::features::{build_features, FEATURE_COUNT};
use crate::types::{DailyPoint, ForecastPoint};
use crate::{CoreError, CoreResult};

/// Days predicted per rollout.
pub const HORIZON_DAYS: usize = 7;

/// A trained one-step regressor over feature vectors.
///
/// `scale` must be applied to every feature vector before `predict`; the
/// two artifacts are fitted together and travel together.
pub trait Regressor {
    fn scale(&self, features: &[f64; FEATURE_COUNT]) -> Result<[f64; FEATURE_COUNT]>;

    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64>;
}

/// Forecast with an optional regressor, mapping absence to
/// [`CoreError::ModelUnavailable`].
pub fn forecast_with(
    daily: &[DailyPoint],
    model: Option<&dyn Regressor>,
) -> CoreResult<Vec<ForecastPoint>> {
    let model = model.ok_or(CoreError::ModelUnavailable)?;
    forecast(daily, model)
}

/// Roll the model forward [`HORIZON_DAYS`] days past the end of `daily`.
///
/// Strictly sequential: each step consumes the previous step's predicted
/// difference. A failure inside any step aborts the whole run with
/// [`CoreError::StepFailed`]; completed steps are never partially
/// returned.
pub fn forecast(daily: &[DailyPoint], model: &dyn Regressor) -> CoreResult<Vec<ForecastPoint>> {
    let last = daily.last().ok_or(CoreError::NoData)?;

    let mut history: Vec<f64> = daily.iter().filter_map(|p| p.first_difference).collect();
    let mut last_value = last.concentration;
    let current_date = last.day;

    let mut points = Vec::with_capacity(HORIZON_DAYS);
    for step in 1..=HORIZON_DAYS {
        let next_date = current_date + Duration::days(step as i64);

        let features = build_features(&history, next_date);
        let scaled = model.scale(&features).map_err(|e| CoreError::StepFailed {
            step,
            reason: e.to_string(),
        })?;
        let pred_diff = model.predict(&scaled).map_err(|e| CoreError::StepFailed {
            step,
            reason: e.to_string(),
        })?;

        let pred_value = (last_value + pred_diff).max(0.0);

        points.push(ForecastPoint {
            day: next_date,
            predicted_concentration: pred_value.round(),
            predicted_index: aqi::to_index(pred_value),
        });

        // Feed the predicted difference (not the level) back into the lag
        // history; the next step's reconstruction starts from pred_value
        history.push(pred_diff);
        last_value = pred_value;
    }

    Ok(points)
}
