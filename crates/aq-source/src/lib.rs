//! Reading source adapters
//!
//! Everything that produces [`Reading`]s for a region lives here: the
//! OpenAQ-style HTTP client and a deterministic simulator for offline
//! runs. The rest of the pipeline only sees the [`ReadingSource`] trait.

pub mod openaq;
pub mod simulator;

pub use openaq::*;
pub use simulator::*;

use async_trait::async_trait;
use thiserror::Error;

use aq_core::Reading;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: status {0}")]
    Http(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Time window to fetch, counted back from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub days: u32,
}

impl FetchWindow {
    pub fn days(days: u32) -> Self {
        Self { days }
    }

    /// Cache key fragment for this window, e.g. `"30d"`.
    pub fn descriptor(&self) -> String {
        format!("{}d", self.days)
    }
}

/// Trait for all reading sources
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Source name/identifier
    fn name(&self) -> &str;

    /// All readings for the region over the window, flattened across
    /// stations. An empty result is not an error here; the aggregator is
    /// what rejects empty input.
    async fn list_readings(&self, region: &str, window: FetchWindow)
        -> SourceResult<Vec<Reading>>;

    /// The single most recent reading of each reporting station, for the
    /// ranking snapshot.
    async fn latest_by_station(&self, region: &str) -> SourceResult<Vec<Reading>>;
}
