//! Point-of-sail zones.
//!
//! The yacht's angle to the apparent wind (0° = wind from dead astern,
//! 180° = head to wind, sign discarded) selects a zone. Zones are contiguous,
//! sorted, cover 0..=180°, and the last one is the terminal dead zone. Entering
//! the dead zone is faded linearly over `fade_width_deg` so efficiency has no
//! step at its boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use sail_core::{wrap_signed_deg, ConfigError};

/// Angles this close to 0° or 180° have no defined tack [°].
pub const TACK_DEAD_BAND_DEG: f64 = 1.0;

/// Default fade width into the dead zone [°].
pub const DEFAULT_FADE_WIDTH_DEG: f64 = 10.0;

const MIN_ZONES: usize = 2;
const COVERAGE_TOLERANCE_DEG: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointOfSailZone {
    pub name: String,
    pub min_angle_deg: f64,
    pub max_angle_deg: f64,
    /// Scales sail force. Negative = caught aback (brakes and pushes astern).
    pub efficiency: f64,
    /// Advisory only; not used by the force model.
    pub speed_multiplier: f64,
}

impl PointOfSailZone {
    pub fn new(name: &str, min_angle_deg: f64, max_angle_deg: f64, efficiency: f64, speed_multiplier: f64) -> Self {
        Self {
            name: name.to_owned(),
            min_angle_deg,
            max_angle_deg,
            efficiency,
            speed_multiplier,
        }
    }

    fn contains(&self, abs_angle_deg: f64) -> bool {
        abs_angle_deg >= self.min_angle_deg && abs_angle_deg < self.max_angle_deg
    }
}

/// Which side the wind comes over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tack {
    Port,
    Starboard,
}

impl fmt::Display for Tack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tack::Port => "port",
            Tack::Starboard => "starboard",
        })
    }
}

/// Validated, ordered set of zones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableParts")]
pub struct PointOfSailTable {
    zones: Vec<PointOfSailZone>,
    fade_width_deg: f64,
}

#[derive(Deserialize)]
struct TableParts {
    zones: Vec<PointOfSailZone>,
    #[serde(default = "default_fade_width")]
    fade_width_deg: f64,
}

fn default_fade_width() -> f64 {
    DEFAULT_FADE_WIDTH_DEG
}

impl TryFrom<TableParts> for PointOfSailTable {
    type Error = ConfigError;

    fn try_from(p: TableParts) -> Result<Self, Self::Error> {
        Self::new(p.zones, p.fade_width_deg)
    }
}

impl Default for PointOfSailTable {
    fn default() -> Self {
        Self {
            zones: vec![
                PointOfSailZone::new("run", 0.0, 45.0, 0.80, 0.70),
                PointOfSailZone::new("broad reach", 45.0, 80.0, 1.00, 1.00),
                PointOfSailZone::new("beam reach", 80.0, 110.0, 0.95, 0.90),
                PointOfSailZone::new("close reach", 110.0, 130.0, 0.80, 0.75),
                PointOfSailZone::new("close-hauled", 130.0, 150.0, 0.50, 0.50),
                PointOfSailZone::new("no-go zone", 150.0, 180.0, -0.30, 0.00),
            ],
            fade_width_deg: DEFAULT_FADE_WIDTH_DEG,
        }
    }
}

impl PointOfSailTable {
    /// Build a table, checking zones are sorted, contiguous and cover 0..=180°.
    pub fn new(zones: Vec<PointOfSailZone>, fade_width_deg: f64) -> Result<Self, ConfigError> {
        ConfigError::require_non_negative("fade_width_deg", fade_width_deg)?;
        if zones.len() < MIN_ZONES {
            return Err(ConfigError::TooFewZones { min: MIN_ZONES, got: zones.len() });
        }

        let mut expected_start = 0.0;
        for zone in &zones {
            let range_ok = zone.min_angle_deg.is_finite()
                && zone.max_angle_deg.is_finite()
                && zone.min_angle_deg < zone.max_angle_deg
                && zone.efficiency.is_finite()
                && zone.speed_multiplier.is_finite();
            if !range_ok {
                return Err(ConfigError::InvalidZoneRange {
                    name: zone.name.clone(),
                    min: zone.min_angle_deg,
                    max: zone.max_angle_deg,
                });
            }
            if (zone.min_angle_deg - expected_start).abs() > COVERAGE_TOLERANCE_DEG {
                return Err(ConfigError::ZoneGap {
                    name: zone.name.clone(),
                    start: zone.min_angle_deg,
                    expected: expected_start,
                });
            }
            expected_start = zone.max_angle_deg;
        }
        // The terminal zone must end exactly at 180° or it is unreachable.
        if (expected_start - 180.0).abs() > COVERAGE_TOLERANCE_DEG {
            return Err(ConfigError::IncompleteCoverage { start: 0.0, end: expected_start });
        }

        Ok(Self { zones, fade_width_deg })
    }

    pub fn zones(&self) -> &[PointOfSailZone] {
        &self.zones
    }

    pub fn fade_width_deg(&self) -> f64 {
        self.fade_width_deg
    }

    fn terminal(&self) -> &PointOfSailZone {
        &self.zones[self.zones.len() - 1]
    }

    fn penultimate(&self) -> &PointOfSailZone {
        &self.zones[self.zones.len() - 2]
    }

    /// Where the terminal (dead) zone begins [°].
    pub fn dead_zone_start(&self) -> f64 {
        self.terminal().min_angle_deg
    }

    /// First zone containing `abs_angle_deg`, else the terminal zone.
    pub fn zone_for_angle(&self, abs_angle_deg: f64) -> &PointOfSailZone {
        let a = sanitize(abs_angle_deg);
        self.zones
            .iter()
            .find(|z| z.contains(a))
            .unwrap_or_else(|| self.terminal())
    }

    /// Efficiency multiplier for a signed yacht-to-wind angle.
    pub fn efficiency(&self, signed_angle_deg: f64) -> f64 {
        self.faded(signed_angle_deg, |z| z.efficiency)
    }

    /// Advisory speed multiplier, faded the same way as efficiency.
    pub fn speed_multiplier(&self, signed_angle_deg: f64) -> f64 {
        self.faded(signed_angle_deg, |z| z.speed_multiplier)
    }

    fn faded(&self, signed_angle_deg: f64, pick: impl Fn(&PointOfSailZone) -> f64) -> f64 {
        let a = sanitize(signed_angle_deg);
        let start = self.dead_zone_start();
        let fade = self.fade_width_deg;
        if fade > 0.0 && a >= start && a < start + fade {
            let t = (a - start) / fade;
            let from = pick(self.penultimate());
            let to = pick(self.terminal());
            return from + (to - from) * t;
        }
        pick(self.zone_for_angle(a))
    }

    /// Tack from the sign of the yacht-to-wind angle; `None` within the
    /// dead-band around dead astern and head to wind.
    pub fn tack(&self, signed_angle_deg: f64) -> Option<Tack> {
        tack_for_angle(signed_angle_deg)
    }
}

/// Free-standing tack classification (positive = wind over starboard).
pub fn tack_for_angle(signed_angle_deg: f64) -> Option<Tack> {
    let a = wrap_signed_deg(signed_angle_deg);
    let abs = a.abs();
    if abs < TACK_DEAD_BAND_DEG || abs > 180.0 - TACK_DEAD_BAND_DEG {
        None
    } else if a > 0.0 {
        Some(Tack::Starboard)
    } else {
        Some(Tack::Port)
    }
}

// Wrap into (-180, 180] and drop the sign.
fn sanitize(angle_deg: f64) -> f64 {
    wrap_signed_deg(angle_deg).abs()
}
