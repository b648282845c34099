//! Serialized regressor artifacts
//!
//! A trained model ships as two JSON files per region: linear weights and
//! the standard scaler fitted alongside them. Loading adapts the pair to
//! the core [`Regressor`] trait. A missing artifact file means "no model
//! for this region", which degrades the forecast rather than failing it.

use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use aq_core::features::{FEATURE_COUNT, FEATURE_NAMES};
use aq_core::forecast::Regressor;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Artifact feature order mismatch at position {position}: expected {expected}, got {got}")]
    FeatureOrderMismatch {
        position: usize,
        expected: String,
        got: String,
    },

    #[error("Artifact shape mismatch: expected {FEATURE_COUNT} values, got {0}")]
    ShapeMismatch(usize),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Linear one-step model: `dot(coefficients, scaled features) + intercept`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    /// Feature order the model was trained with
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Per-feature standardization fitted with the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// A loaded model+scaler pair, usable as a [`Regressor`].
pub struct ArtifactRegressor {
    model: LinearModel,
    scaler: StandardScaler,
}

impl ArtifactRegressor {
    /// Validate shapes and feature order, rejecting artifacts trained with
    /// a different vector layout.
    pub fn new(model: LinearModel, scaler: StandardScaler) -> ModelResult<Self> {
        check_feature_names(&model.feature_names)?;
        check_feature_names(&scaler.feature_names)?;
        check_len(model.coefficients.len())?;
        check_len(scaler.mean.len())?;
        check_len(scaler.scale.len())?;
        Ok(Self { model, scaler })
    }
}

impl Regressor for ArtifactRegressor {
    fn scale(&self, features: &[f64; FEATURE_COUNT]) -> Result<[f64; FEATURE_COUNT]> {
        let mut scaled = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            let spread = self.scaler.scale[i];
            if spread == 0.0 {
                bail!("zero scale for feature {}", FEATURE_NAMES[i]);
            }
            scaled[i] = (features[i] - self.scaler.mean[i]) / spread;
        }
        Ok(scaled)
    }

    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64> {
        let dot: f64 = self
            .model
            .coefficients
            .iter()
            .zip(features.iter())
            .map(|(c, x)| c * x)
            .sum();
        Ok(dot + self.model.intercept)
    }
}

/// Load the model+scaler pair for a region.
///
/// Returns `Ok(None)` when either artifact file is absent; malformed or
/// mismatched artifacts are errors.
pub fn load_region_model(dir: &Path, region: &str) -> ModelResult<Option<ArtifactRegressor>> {
    let model_path = dir.join(format!("aqi_model_{region}.json"));
    let scaler_path = dir.join(format!("aqi_scaler_{region}.json"));

    if !model_path.exists() || !scaler_path.exists() {
        warn!(
            region,
            model = %model_path.display(),
            scaler = %scaler_path.display(),
            "model artifacts not found"
        );
        return Ok(None);
    }

    let model: LinearModel = serde_json::from_str(&fs::read_to_string(&model_path)?)?;
    let scaler: StandardScaler = serde_json::from_str(&fs::read_to_string(&scaler_path)?)?;

    let regressor = ArtifactRegressor::new(model, scaler)?;
    info!(region, "model and scaler loaded");
    Ok(Some(regressor))
}

fn check_feature_names(names: &[String]) -> ModelResult<()> {
    check_len(names.len())?;
    for (position, (got, expected)) in names.iter().zip(FEATURE_NAMES.iter()).enumerate() {
        if got != expected {
            return Err(ModelError::FeatureOrderMismatch {
                position,
                expected: expected.to_string(),
                got: got.clone(),
            });
        }
    }
    Ok(())
}

fn check_len(len: usize) -> ModelResult<()> {
    if len != FEATURE_COUNT {
        return Err(ModelError::ShapeMismatch(len));
    }
    Ok(())
}
