//! Setup-time configuration errors.
//!
//! Only constructors and validators return these. The per-tick path never
//! fails; it degrades to zero force instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and > 0, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be finite and >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("point-of-sail table needs at least {min} zones, got {got}")]
    TooFewZones { min: usize, got: usize },

    #[error("zone `{name}` has an invalid range [{min}, {max})")]
    InvalidZoneRange { name: String, min: f64, max: f64 },

    #[error("zone `{name}` starts at {start}° but the previous zone ends at {expected}°")]
    ZoneGap { name: String, start: f64, expected: f64 },

    #[error("zones must cover exactly 0..=180°, coverage is [{start}, {end}]")]
    IncompleteCoverage { start: f64, end: f64 },

    #[error("hull drag must resist sideways motion more than forward motion (lateral {lateral} <= forward {forward})")]
    WeakKeel { forward: f64, lateral: f64 },

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Check that `value` is finite and strictly positive.
    pub fn require_positive(field: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Self::NonPositive { field, value })
        }
    }

    /// Check that `value` is finite and not negative.
    pub fn require_non_negative(field: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(Self::Negative { field, value })
        }
    }
}
