//! True wind, apparent wind, and the injected wind source.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::{clamp_magnitude, heading_to_vector, normalize_heading_deg};

/// Default ceiling on apparent-wind magnitude handed to the aero model [m/s].
pub const DEFAULT_APPARENT_WIND_CEILING_MPS: f64 = 30.0;

/// True wind: speed [m/s] and the compass heading the air moves toward [°].
///
/// Speed is kept >= 0 and the heading inside [0, 360); setters clamp/wrap
/// rather than reject.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "WindParts")]
pub struct WindState {
    speed_mps: f64,
    heading_deg: f64,
}

#[derive(Deserialize)]
struct WindParts {
    speed_mps: f64,
    heading_deg: f64,
}

impl From<WindParts> for WindState {
    fn from(p: WindParts) -> Self {
        Self::new(p.speed_mps, p.heading_deg)
    }
}

impl Default for WindState {
    fn default() -> Self {
        Self::calm()
    }
}

impl WindState {
    pub fn new(speed_mps: f64, heading_deg: f64) -> Self {
        let mut w = Self::calm();
        w.set_speed(speed_mps);
        w.set_heading(heading_deg);
        w
    }

    pub fn calm() -> Self {
        Self { speed_mps: 0.0, heading_deg: 0.0 }
    }

    pub fn speed_mps(&self) -> f64 {
        self.speed_mps
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub fn set_speed(&mut self, speed_mps: f64) {
        self.speed_mps = if speed_mps.is_finite() { speed_mps.max(0.0) } else { 0.0 };
    }

    pub fn set_heading(&mut self, heading_deg: f64) {
        self.heading_deg = normalize_heading_deg(heading_deg);
    }

    /// Unit vector the air moves along.
    pub fn direction(&self) -> Vector2<f64> {
        heading_to_vector(self.heading_deg)
    }

    /// Direction scaled by speed [m/s].
    pub fn wind_vector(&self) -> Vector2<f64> {
        self.direction() * self.speed_mps
    }
}

/// `apparent = true_wind - craft_velocity`. No clamping.
pub fn compute_apparent_wind(true_wind: &Vector2<f64>, craft_velocity: &Vector2<f64>) -> Vector2<f64> {
    true_wind - craft_velocity
}

/// Wind as seen by the sails, with a safety ceiling on apparent speed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindModel {
    pub state: WindState,
    /// Apparent wind is scaled down to this magnitude before aero evaluation.
    pub apparent_wind_ceiling_mps: f64,
}

impl Default for WindModel {
    fn default() -> Self {
        Self {
            state: WindState::calm(),
            apparent_wind_ceiling_mps: DEFAULT_APPARENT_WIND_CEILING_MPS,
        }
    }
}

impl WindModel {
    pub fn new(state: WindState) -> Self {
        Self { state, ..Self::default() }
    }

    pub fn with_ceiling(mut self, ceiling_mps: f64) -> Self {
        self.apparent_wind_ceiling_mps = ceiling_mps;
        self
    }

    pub fn wind_vector(&self) -> Vector2<f64> {
        self.state.wind_vector()
    }

    /// Apparent wind for a craft moving at `craft_velocity`, clamped to the
    /// ceiling. Non-finite craft velocity yields zero apparent wind.
    pub fn apparent_wind(&self, craft_velocity: &Vector2<f64>) -> Vector2<f64> {
        let raw = compute_apparent_wind(&self.wind_vector(), craft_velocity);
        clamp_magnitude(&raw, self.apparent_wind_ceiling_mps)
    }
}

/// Anything that can report the current true wind.
///
/// `None` means "no wind source configured"; callers treat that as a zero
/// sail contribution rather than an error.
pub trait WindSource {
    fn current_wind(&self) -> Option<WindState>;
}

impl WindSource for WindState {
    fn current_wind(&self) -> Option<WindState> {
        Some(*self)
    }
}

impl WindSource for WindModel {
    fn current_wind(&self) -> Option<WindState> {
        Some(self.state)
    }
}

impl<T: WindSource> WindSource for Option<T> {
    fn current_wind(&self) -> Option<WindState> {
        self.as_ref().and_then(WindSource::current_wind)
    }
}
