//! A sail as mounted on the craft: geometry plus the controls the host moves.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use sail_aero::SailGeometry;
use sail_core::{heading_to_vector, local_to_world};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sail {
    pub name: String,
    pub geometry: SailGeometry,
    /// Mast position relative to the craft's centre, boat frame
    /// (x = starboard, y = forward) [m].
    #[serde(default)]
    pub mount_offset: Vector2<f64>,
    /// Boom angle off the centreline, positive to starboard [°].
    #[serde(default)]
    pub boom_angle_deg: f64,
    /// Fraction of the sail set, 0 = furled, 1 = fully deployed.
    #[serde(default = "fully_deployed")]
    pub deployed: f64,
    #[serde(default = "active")]
    pub active: bool,
}

fn fully_deployed() -> f64 {
    1.0
}

fn active() -> bool {
    true
}

impl Sail {
    pub fn new(name: &str, geometry: SailGeometry) -> Self {
        Self {
            name: name.to_owned(),
            geometry,
            mount_offset: Vector2::zeros(),
            boom_angle_deg: 0.0,
            deployed: fully_deployed(),
            active: true,
        }
    }

    pub fn with_mount_offset(mut self, offset: Vector2<f64>) -> Self {
        self.mount_offset = offset;
        self
    }

    pub fn with_boom_angle(mut self, boom_angle_deg: f64) -> Self {
        self.set_boom_angle(boom_angle_deg);
        self
    }

    /// Clamped to ±180°; non-finite input centres the boom.
    pub fn set_boom_angle(&mut self, boom_angle_deg: f64) {
        self.boom_angle_deg = if boom_angle_deg.is_finite() { boom_angle_deg.clamp(-180.0, 180.0) } else { 0.0 };
    }

    /// Clamped to [0, 1].
    pub fn set_deployed(&mut self, fraction: f64) {
        self.deployed = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    }

    /// World-frame chord: from the mast aft along the boom.
    pub fn chord_direction(&self, craft_heading_deg: f64) -> Vector2<f64> {
        heading_to_vector(craft_heading_deg + 180.0 - self.boom_angle_deg)
    }

    /// World-frame lever arm from the craft centre to the mast.
    pub fn lever_arm(&self, craft_heading_deg: f64) -> Vector2<f64> {
        local_to_world(&self.mount_offset, craft_heading_deg)
    }

    /// Geometry as the aero model should see it this tick, or `None` when the
    /// sail is inactive or furled.
    pub fn effective_geometry(&self, craft_heading_deg: f64) -> Option<SailGeometry> {
        if !self.active || self.deployed.is_nan() || self.deployed <= 0.0 {
            return None;
        }
        let mut geometry = self.geometry;
        // Reefing shrinks area, not the planform's proportions.
        geometry.aspect_ratio_override.get_or_insert(self.geometry.aspect_ratio());
        geometry.area_m2 *= self.deployed.min(1.0);
        geometry.set_chord_direction(self.chord_direction(craft_heading_deg));
        Some(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn main_sail() -> Sail {
        Sail::new("main", SailGeometry::new(20.0, 10.0).unwrap())
    }

    #[test]
    fn boom_eased_to_starboard_points_aft_and_right() {
        // Heading north: aft is south, starboard is east.
        let chord = main_sail().with_boom_angle(90.0).chord_direction(0.0);
        assert_relative_eq!(chord.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(chord.y, 0.0, epsilon = 1e-12);

        let centred = main_sail().chord_direction(0.0);
        assert_relative_eq!(centred.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn furling_scales_area_and_inactive_skips() {
        let mut sail = main_sail();
        sail.set_deployed(0.25);
        let geom = sail.effective_geometry(0.0).unwrap();
        assert_relative_eq!(geom.area_m2, 5.0);

        sail.set_deployed(0.0);
        assert!(sail.effective_geometry(0.0).is_none());

        sail.set_deployed(f64::NAN);
        assert_eq!(sail.deployed, 0.0);
        sail.deployed = f64::NAN;
        assert!(sail.effective_geometry(0.0).is_none());

        let mut off = main_sail();
        off.active = false;
        assert!(off.effective_geometry(0.0).is_none());
    }

    #[test]
    fn lever_arm_rotates_with_heading() {
        let sail = main_sail().with_mount_offset(Vector2::new(0.0, 2.0));
        let arm = sail.lever_arm(90.0);
        assert_relative_eq!(arm.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(arm.y, 0.0, epsilon = 1e-12);
    }
}
