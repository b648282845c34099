//! Core series processing for regional air quality
//!
//! This crate provides the pure building blocks of the pipeline:
//! multi-station temporal aggregation, EPA index conversion, feature
//! engineering, and the autoregressive forecast rollout. Everything here
//! is synchronous and side-effect-free; all I/O lives in the collaborator
//! crates.

pub mod aggregate;
pub mod aqi;
pub mod features;
pub mod forecast;
pub mod ranking;
pub mod types;

pub use aggregate::*;
pub use aqi::*;
pub use features::*;
pub use forecast::*;
pub use ranking::*;
pub use types::*;

use thiserror::Error;

/// Failures surfaced by the core pipeline.
///
/// The three variants warrant different user-facing handling: empty input,
/// a missing trained model, and a model that rejected a feature vector
/// mid-rollout. Callers branch on them distinctly.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("no readings to aggregate")]
    NoData,

    #[error("forecast model unavailable")]
    ModelUnavailable,

    #[error("forecast step {step} failed: {reason}")]
    StepFailed { step: usize, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
