//! EPA PM2.5 index conversion
//!
//! Piecewise-linear mapping from concentration (µg/m³) to the published
//! 0–500 US index scale. The breakpoint table is a correctness contract
//! with the published convention, not a tuning knob.

use serde::{Deserialize, Serialize};

/// Severity category on the index scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl Category {
    /// Category for an already-computed index value.
    pub fn from_index(index: u16) -> Self {
        match index {
            0..=50 => Category::Good,
            51..=100 => Category::Moderate,
            101..=150 => Category::UnhealthySensitive,
            151..=200 => Category::Unhealthy,
            201..=300 => Category::VeryUnhealthy,
            _ => Category::Hazardous,
        }
    }

    /// Published label string.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthySensitive => "Unhealthy for sensitive groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Breakpoint rows: (conc_lo, conc_hi, index_lo, index_hi).
/// Concentration upper bounds are inclusive.
const BREAKPOINTS: &[(f64, f64, u16, u16)] = &[
    (0.0, 12.0, 0, 50),
    (12.1, 35.4, 51, 100),
    (35.5, 55.4, 101, 150),
    (55.5, 150.4, 151, 200),
    (150.5, 250.4, 201, 300),
    (250.5, 350.4, 301, 400),
    (350.5, 500.4, 401, 500),
];

/// Maximum index value; concentrations above the table clamp here.
pub const INDEX_MAX: u16 = 500;

/// Convert a PM2.5 concentration to its index value.
///
/// Total over all real inputs: negative concentrations clamp to 0,
/// concentrations beyond the last breakpoint clamp to [`INDEX_MAX`].
pub fn to_index(concentration: f64) -> u16 {
    if concentration < 0.0 || concentration.is_nan() {
        return 0;
    }

    for &(conc_lo, conc_hi, index_lo, index_hi) in BREAKPOINTS {
        if concentration <= conc_hi {
            let slope = f64::from(index_hi - index_lo) / (conc_hi - conc_lo);
            let raw = f64::from(index_lo) + slope * (concentration - conc_lo);
            return raw.round() as u16;
        }
    }

    INDEX_MAX
}

/// Convert a concentration to its index value and severity category.
pub fn convert(concentration: f64) -> (u16, Category) {
    let index = to_index(concentration);
    (index, Category::from_index(index))
}
