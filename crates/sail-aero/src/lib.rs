//! sail-aero
//!
//! Aerodynamic force for a single sail in the horizontal plane. Given the
//! apparent wind, the sail's chord direction and the craft's heading/velocity,
//! produces a planar force plus a factor gating how much of it turns the boat.
//!
//! Pipeline per call:
//!   1. |apparent wind| < `min_wind_speed` → no force (treated as dead zone)
//!   2. α = signed angle wind → chord, yacht angle = signed angle heading → wind
//!   3. e = point-of-sail efficiency(yacht angle)
//!   4. e <= 0 → braking drag against craft velocity (+ push astern when e < 0)
//!   5. e > 0  → lift/drag from the coefficient curves:
//!
//!        q = ½ ρ V²,   L = C_L q S,   D = (C_Di + C_Dp) q S
//!        F = (l̂ L + ŵ D) · e · k,    l̂ = ŵ × ẑ  (flipped for α < 0)
//!
//! Every degenerate input degrades to zero force; nothing here fails.
//!
//! Coefficients come from a [`SailCoefficients`] provider. [`StallCurves`]
//! works out of the box; implement the trait for sail-specific polars.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use sail_core::{
    clamp_magnitude, heading_to_vector, is_finite2, normalize_or_zero, signed_angle_deg,
    ConfigError,
};
use sail_models::{induced_drag, lift_coefficient, parasitic_drag, PointOfSailTable};

/// Sea-level air density [kg/m³].
pub const AIR_DENSITY: f64 = 1.225;

/* ------------------------------- geometry ------------------------------- */

/// Planform of one sail plus its current chord direction (leading edge →
/// trailing edge, world frame).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SailGeometry {
    /// Sail area [m²], > 0.
    pub area_m2: f64,
    /// Luff length [m]; aspect ratio is `length² / area` unless overridden.
    pub length_m: f64,
    #[serde(default)]
    pub aspect_ratio_override: Option<f64>,
    #[serde(default = "default_chord")]
    pub chord_direction: Vector2<f64>,
}

fn default_chord() -> Vector2<f64> {
    Vector2::new(0.0, -1.0)
}

impl SailGeometry {
    pub fn new(area_m2: f64, length_m: f64) -> Result<Self, ConfigError> {
        ConfigError::require_positive("area_m2", area_m2)?;
        ConfigError::require_positive("length_m", length_m)?;
        Ok(Self {
            area_m2,
            length_m,
            aspect_ratio_override: None,
            chord_direction: default_chord(),
        })
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Result<Self, ConfigError> {
        self.aspect_ratio_override = Some(ConfigError::require_positive("aspect_ratio", aspect_ratio)?);
        Ok(self)
    }

    pub fn aspect_ratio(&self) -> f64 {
        match self.aspect_ratio_override {
            Some(ar) => ar,
            None if self.area_m2 > 0.0 => self.length_m * self.length_m / self.area_m2,
            None => 0.0,
        }
    }

    /// Store a new chord direction; zero-length input leaves a zero chord,
    /// which the model treats as "no force".
    pub fn set_chord_direction(&mut self, chord: Vector2<f64>) {
        self.chord_direction = normalize_or_zero(&chord);
    }

    pub fn with_chord_direction(mut self, chord: Vector2<f64>) -> Self {
        self.set_chord_direction(chord);
        self
    }

    fn is_usable(&self) -> bool {
        self.area_m2.is_finite()
            && self.area_m2 > 0.0
            && is_finite2(&self.chord_direction)
            && self.chord_direction.norm() > 0.5
    }
}

/* -------------------------------- config -------------------------------- */

/// Tunables for the aero model. Defaults follow the unified sail variant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AeroConfig {
    /// [kg/m³]
    pub air_density: f64,
    /// Peak lift coefficient (reached at the stall angle).
    pub max_cl: f64,
    /// Parasitic drag at and beyond 90° angle of attack.
    pub max_cd: f64,
    pub oswald_efficiency: f64,
    /// Gameplay scalar on the propulsive force.
    pub force_multiplier: f64,
    /// Ceiling on the magnitude of one sail's force [N].
    pub max_force_n: f64,
    /// Apparent wind below this counts as calm [m/s].
    pub min_wind_speed_mps: f64,
}

impl Default for AeroConfig {
    fn default() -> Self {
        Self {
            air_density: AIR_DENSITY,
            max_cl: 1.5,
            max_cd: 1.2,
            oswald_efficiency: 0.9,
            force_multiplier: 1.0,
            max_force_n: 50_000.0,
            min_wind_speed_mps: 1e-3,
        }
    }
}

impl AeroConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("air_density", self.air_density)?;
        ConfigError::require_non_negative("max_cl", self.max_cl)?;
        ConfigError::require_non_negative("max_cd", self.max_cd)?;
        ConfigError::require_positive("oswald_efficiency", self.oswald_efficiency)?;
        ConfigError::require_non_negative("force_multiplier", self.force_multiplier)?;
        ConfigError::require_positive("max_force_n", self.max_force_n)?;
        ConfigError::require_non_negative("min_wind_speed_mps", self.min_wind_speed_mps)?;
        Ok(())
    }
}

/* ----------------------------- coefficients ----------------------------- */

/// Lift and drag coefficients at one angle of attack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AeroCoefficients {
    pub lift: f64,
    /// Total drag = induced + parasitic.
    pub drag: f64,
    pub induced_drag: f64,
    pub parasitic_drag: f64,
}

/// The aerodynamic coefficient provider.
///
/// Angles are absolute angle of attack in degrees, 0..=180.
pub trait SailCoefficients {
    fn c_l(&self, abs_aoa_deg: f64) -> f64;
    fn c_d_parasitic(&self, abs_aoa_deg: f64) -> f64;
    fn c_d_induced(&self, c_l: f64, aspect_ratio: f64) -> f64;

    fn coefficients(&self, abs_aoa_deg: f64, aspect_ratio: f64) -> AeroCoefficients {
        let lift = self.c_l(abs_aoa_deg);
        let induced = self.c_d_induced(lift, aspect_ratio);
        let parasitic = self.c_d_parasitic(abs_aoa_deg);
        AeroCoefficients {
            lift,
            drag: induced + parasitic,
            induced_drag: induced,
            parasitic_drag: parasitic,
        }
    }
}

/// Piecewise stall model from `sail-models`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StallCurves {
    pub max_cl: f64,
    pub max_cd: f64,
    pub oswald_efficiency: f64,
}

impl From<&AeroConfig> for StallCurves {
    fn from(cfg: &AeroConfig) -> Self {
        Self {
            max_cl: cfg.max_cl,
            max_cd: cfg.max_cd,
            oswald_efficiency: cfg.oswald_efficiency,
        }
    }
}

impl Default for StallCurves {
    fn default() -> Self {
        Self::from(&AeroConfig::default())
    }
}

impl SailCoefficients for StallCurves {
    fn c_l(&self, abs_aoa_deg: f64) -> f64 {
        lift_coefficient(abs_aoa_deg, self.max_cl)
    }
    fn c_d_parasitic(&self, abs_aoa_deg: f64) -> f64 {
        parasitic_drag(abs_aoa_deg, self.max_cd)
    }
    fn c_d_induced(&self, c_l: f64, aspect_ratio: f64) -> f64 {
        induced_drag(c_l, self.oswald_efficiency, aspect_ratio)
    }
}

/* -------------------------------- result -------------------------------- */

/// Per-call craft/wind inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AeroInput {
    /// Apparent wind [m/s], already clamped by the caller.
    pub apparent_wind: Vector2<f64>,
    pub craft_heading_deg: f64,
    pub craft_velocity: Vector2<f64>,
}

/// Output of one sail evaluation. Built fresh each tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForceResult {
    /// Planar force [N].
    pub force: Vector2<f64>,
    /// How much of `force` may generate yaw torque (0 when backwinded).
    pub torque_multiplier: f64,
    pub in_dead_zone: bool,
    /// Signed, (-180, 180].
    pub angle_of_attack_deg: f64,
    pub yacht_angle_to_wind_deg: f64,
    pub efficiency: f64,
    pub coefficients: AeroCoefficients,
}

impl ForceResult {
    /// Zero force, flagged as dead zone.
    pub fn neutral() -> Self {
        Self {
            force: Vector2::zeros(),
            torque_multiplier: 0.0,
            in_dead_zone: true,
            angle_of_attack_deg: 0.0,
            yacht_angle_to_wind_deg: 0.0,
            efficiency: 0.0,
            coefficients: AeroCoefficients::default(),
        }
    }

    pub fn is_finite(&self) -> bool {
        is_finite2(&self.force) && self.torque_multiplier.is_finite()
    }
}

/* --------------------------------- model -------------------------------- */

/// Sail aerodynamics with a point-of-sail table and coefficient provider.
///
/// A missing table (`None`) makes every sail contribute zero force.
#[derive(Clone, Debug)]
pub struct SailAeroModel<C: SailCoefficients = StallCurves> {
    pub config: AeroConfig,
    pub table: Option<PointOfSailTable>,
    pub coefficients: C,
}

impl Default for SailAeroModel<StallCurves> {
    fn default() -> Self {
        Self::new(AeroConfig::default(), Some(PointOfSailTable::default()))
    }
}

impl SailAeroModel<StallCurves> {
    pub fn new(config: AeroConfig, table: Option<PointOfSailTable>) -> Self {
        Self {
            coefficients: StallCurves::from(&config),
            config,
            table,
        }
    }
}

impl<C: SailCoefficients> SailAeroModel<C> {
    pub fn with_coefficients(config: AeroConfig, table: Option<PointOfSailTable>, coefficients: C) -> Self {
        Self { config, table, coefficients }
    }

    /// Dynamic pressure ½ρV² [Pa].
    pub fn dynamic_pressure(&self, wind_speed_mps: f64) -> f64 {
        0.5 * self.config.air_density * wind_speed_mps * wind_speed_mps
    }

    /// Force on one sail. Never fails; degenerate input yields
    /// [`ForceResult::neutral`].
    pub fn compute(&self, sail: &SailGeometry, input: &AeroInput) -> ForceResult {
        let Some(table) = self.table.as_ref() else {
            return ForceResult::neutral();
        };
        if !sail.is_usable() || !is_finite2(&input.apparent_wind) {
            return ForceResult::neutral();
        }

        let wind_speed = input.apparent_wind.norm();
        if wind_speed < self.config.min_wind_speed_mps.max(f64::EPSILON) {
            return ForceResult::neutral();
        }
        let wind_dir = input.apparent_wind / wind_speed;

        let aoa = signed_angle_deg(&wind_dir, &sail.chord_direction);
        let yacht_angle = signed_angle_deg(&heading_to_vector(input.craft_heading_deg), &wind_dir);
        let efficiency = table.efficiency(yacht_angle);
        let q = self.dynamic_pressure(wind_speed);

        let mut result = if efficiency <= 0.0 {
            self.backwinded(sail, input, wind_dir, q, efficiency)
        } else {
            self.driving(sail, wind_dir, aoa, q, efficiency)
        };
        result.angle_of_attack_deg = aoa;
        result.yacht_angle_to_wind_deg = yacht_angle;
        result.efficiency = efficiency;

        if !result.is_finite() {
            warn!(aoa, yacht_angle, wind_speed, "non-finite sail force discarded");
            return ForceResult::neutral();
        }
        result.force = clamp_magnitude(&result.force, self.config.max_force_n);
        trace!(
            aoa,
            yacht_angle,
            efficiency,
            fx = result.force.x,
            fy = result.force.y,
            "sail force"
        );
        result
    }

    // Dead zone / caught aback: no drive, only braking (and a push astern).
    fn backwinded(
        &self,
        sail: &SailGeometry,
        input: &AeroInput,
        wind_dir: Vector2<f64>,
        q: f64,
        efficiency: f64,
    ) -> ForceResult {
        let against_motion = -normalize_or_zero(&input.craft_velocity);
        let qs = q * sail.area_m2;

        let force = if efficiency == 0.0 {
            against_motion * (0.5 * qs)
        } else {
            let e = efficiency.abs();
            let braking = against_motion * (e * qs);
            // Along the air flow; when head to wind this points astern.
            let push = wind_dir * (e * qs * 0.5);
            braking + push
        };

        ForceResult {
            force,
            torque_multiplier: 0.0,
            in_dead_zone: true,
            ..ForceResult::neutral()
        }
    }

    fn driving(
        &self,
        sail: &SailGeometry,
        wind_dir: Vector2<f64>,
        aoa: f64,
        q: f64,
        efficiency: f64,
    ) -> ForceResult {
        let coeffs = self.coefficients.coefficients(aoa.abs(), sail.aspect_ratio());
        let lift = coeffs.lift * q * sail.area_m2;
        let drag = coeffs.drag * q * sail.area_m2;

        let lift_dir = lift_direction(wind_dir, aoa);
        let force = (lift_dir * lift + wind_dir * drag) * (efficiency * self.config.force_multiplier);

        ForceResult {
            force,
            torque_multiplier: efficiency,
            in_dead_zone: false,
            angle_of_attack_deg: aoa,
            yacht_angle_to_wind_deg: 0.0,
            efficiency,
            coefficients: coeffs,
        }
    }
}

/// Lift acts perpendicular to the flow, `ŵ × ẑ`, on the side the chord
/// deflects the air away from. Negative angle of attack flips it.
pub fn lift_direction(wind_dir: Vector2<f64>, aoa_deg: f64) -> Vector2<f64> {
    let l = Vector3::new(wind_dir.x, wind_dir.y, 0.0).cross(&Vector3::z());
    let l = Vector2::new(l.x, l.y);
    if aoa_deg < 0.0 { -l } else { l }
}

/* --------------------------------- tests -------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sail() -> SailGeometry {
        SailGeometry::new(20.0, 10.0).unwrap()
    }

    fn beam_reach_model() -> SailAeroModel {
        SailAeroModel::new(
            AeroConfig { max_cl: 1.5, force_multiplier: 10.0, ..AeroConfig::default() },
            Some(PointOfSailTable::default()),
        )
    }

    // Chord rotated `aoa_deg` counter-clockwise from the flow.
    fn chord_at(wind_dir: Vector2<f64>, aoa_deg: f64) -> Vector2<f64> {
        let (s, c) = aoa_deg.to_radians().sin_cos();
        Vector2::new(wind_dir.x * c - wind_dir.y * s, wind_dir.x * s + wind_dir.y * c)
    }

    #[test]
    fn aspect_ratio_derives_or_overrides() {
        assert_relative_eq!(sail().aspect_ratio(), 5.0);
        assert_relative_eq!(sail().with_aspect_ratio(3.0).unwrap().aspect_ratio(), 3.0);
        assert!(SailGeometry::new(0.0, 10.0).is_err());
        assert!(sail().with_aspect_ratio(-1.0).is_err());
    }

    #[test]
    fn beam_reach_drives_forward() {
        let model = beam_reach_model();
        // Heading north, wind blowing east (from port).
        let wind = Vector2::new(10.0, 0.0);
        let geom = sail().with_chord_direction(chord_at(Vector2::new(1.0, 0.0), -22.5));
        let input = AeroInput { apparent_wind: wind, craft_heading_deg: 0.0, craft_velocity: Vector2::zeros() };

        let r = model.compute(&geom, &input);
        assert!(!r.in_dead_zone);
        assert_relative_eq!(r.angle_of_attack_deg, -22.5, epsilon = 1e-9);
        assert_relative_eq!(r.yacht_angle_to_wind_deg, -90.0, epsilon = 1e-9);
        assert_relative_eq!(r.efficiency, 0.95);
        assert_relative_eq!(r.torque_multiplier, 0.95);
        assert!(r.force.y > 0.0, "forward component {}", r.force.y);
        assert!(r.force.y > r.force.x, "force should be forward-biased: {:?}", r.force);
        assert!(r.force.norm() <= model.config.max_force_n);
    }

    #[test]
    fn mirrored_sail_flips_lift_only() {
        let model = beam_reach_model();
        let wind_dir = Vector2::new(1.0, 0.0);
        let input = AeroInput { apparent_wind: wind_dir * 8.0, craft_heading_deg: 0.0, craft_velocity: Vector2::zeros() };

        let a = model.compute(&sail().with_chord_direction(chord_at(wind_dir, 20.0)), &input);
        let b = model.compute(&sail().with_chord_direction(chord_at(wind_dir, -20.0)), &input);

        // Along-wind (drag) part identical, cross-wind (lift) part mirrored.
        assert_relative_eq!(a.force.x, b.force.x, epsilon = 1e-9);
        assert_relative_eq!(a.force.y, -b.force.y, epsilon = 1e-9);
        assert!(a.force.y.abs() > 1.0);
    }

    #[test]
    fn zero_wind_gives_zero_force() {
        let model = beam_reach_model();
        for aoa in [-180.0, -90.0, 0.0, 15.0, 90.0, 180.0] {
            let geom = sail().with_chord_direction(chord_at(Vector2::new(0.0, 1.0), aoa));
            let input = AeroInput { apparent_wind: Vector2::zeros(), craft_heading_deg: 37.0, craft_velocity: Vector2::new(2.0, 1.0) };
            let r = model.compute(&geom, &input);
            assert_eq!(r.force, Vector2::zeros());
            assert!(r.in_dead_zone);
        }
    }

    #[test]
    fn forces_are_finite_and_capped_at_boundary_angles() {
        let model = SailAeroModel::new(
            AeroConfig { force_multiplier: 1_000.0, max_force_n: 20_000.0, ..AeroConfig::default() },
            Some(PointOfSailTable::default()),
        );
        let wind_dir = Vector2::new(0.6, -0.8);
        for heading in [0.0, 45.0, 90.0, 180.0, 270.0] {
            for aoa in [0.0, 90.0, 180.0, -180.0, -90.0, 15.0] {
                let geom = sail().with_chord_direction(chord_at(wind_dir, aoa));
                let input = AeroInput {
                    apparent_wind: wind_dir * 30.0,
                    craft_heading_deg: heading,
                    craft_velocity: Vector2::new(3.0, -4.0),
                };
                let r = model.compute(&geom, &input);
                assert!(r.is_finite());
                assert!(r.force.norm() <= 20_000.0 + 1e-6, "{} at aoa {aoa}", r.force.norm());
            }
        }
    }

    #[test]
    fn caught_aback_brakes_and_pushes_astern() {
        let model = beam_reach_model();
        // Heading north; wind flows 170° CCW from the bow, i.e. almost head on.
        let wind_dir = chord_at(Vector2::new(0.0, 1.0), 170.0);
        let velocity = Vector2::new(0.0, 3.0);
        let input = AeroInput { apparent_wind: wind_dir * 10.0, craft_heading_deg: 0.0, craft_velocity: velocity };
        let r = model.compute(&sail().with_chord_direction(chord_at(wind_dir, 10.0)), &input);

        assert!(r.in_dead_zone);
        assert!(r.efficiency < 0.0);
        assert_eq!(r.torque_multiplier, 0.0);
        assert!(r.force.dot(&velocity) < 0.0, "force should oppose motion");

        // braking |e| q S astern plus half that along the flow
        let qs = model.dynamic_pressure(10.0) * 20.0;
        let expected = Vector2::new(0.0, -0.3 * qs) + wind_dir * (0.3 * qs * 0.5);
        assert_relative_eq!(r.force.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(r.force.y, expected.y, epsilon = 1e-9);
    }

    #[test]
    fn zero_efficiency_is_pure_drag() {
        let table = PointOfSailTable::new(
            vec![
                sail_models::PointOfSailZone::new("free", 0.0, 150.0, 1.0, 1.0),
                sail_models::PointOfSailZone::new("irons", 150.0, 180.0, 0.0, 0.0),
            ],
            0.0,
        )
        .unwrap();
        let model = SailAeroModel::new(AeroConfig::default(), Some(table));
        let input = AeroInput {
            apparent_wind: Vector2::new(0.0, -10.0),
            craft_heading_deg: 0.0,
            craft_velocity: Vector2::new(0.0, 2.0),
        };
        let r = model.compute(&sail().with_chord_direction(Vector2::new(0.0, -1.0)), &input);
        assert!(r.in_dead_zone);
        assert_relative_eq!(r.force.y, -0.5 * model.dynamic_pressure(10.0) * 20.0, epsilon = 1e-9);
        assert_relative_eq!(r.force.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn missing_table_or_chord_is_neutral() {
        let input = AeroInput { apparent_wind: Vector2::new(5.0, 0.0), craft_heading_deg: 0.0, craft_velocity: Vector2::zeros() };
        let no_table = SailAeroModel::new(AeroConfig::default(), None);
        assert_eq!(no_table.compute(&sail(), &input), ForceResult::neutral());

        let model = SailAeroModel::default();
        let bad = sail().with_chord_direction(Vector2::zeros());
        assert_eq!(model.compute(&bad, &input).force, Vector2::zeros());
    }

    struct FlatPlate;

    impl SailCoefficients for FlatPlate {
        fn c_l(&self, abs_aoa_deg: f64) -> f64 {
            2.0 * abs_aoa_deg.to_radians().sin() * abs_aoa_deg.to_radians().cos()
        }
        fn c_d_parasitic(&self, abs_aoa_deg: f64) -> f64 {
            2.0 * abs_aoa_deg.to_radians().sin().powi(2)
        }
        fn c_d_induced(&self, _c_l: f64, _aspect_ratio: f64) -> f64 {
            0.0
        }
    }

    #[test]
    fn custom_coefficients_plug_in() {
        let model = SailAeroModel::with_coefficients(AeroConfig::default(), Some(PointOfSailTable::default()), FlatPlate);
        let input = AeroInput { apparent_wind: Vector2::new(10.0, 0.0), craft_heading_deg: 0.0, craft_velocity: Vector2::zeros() };
        let r = model.compute(&sail().with_chord_direction(chord_at(Vector2::new(1.0, 0.0), -45.0)), &input);
        assert_relative_eq!(r.coefficients.lift, 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.coefficients.drag, 1.0, epsilon = 1e-12);
    }

    struct NanPolar;

    impl SailCoefficients for NanPolar {
        fn c_l(&self, _abs_aoa_deg: f64) -> f64 {
            f64::NAN
        }
        fn c_d_parasitic(&self, _abs_aoa_deg: f64) -> f64 {
            0.1
        }
        fn c_d_induced(&self, _c_l: f64, _aspect_ratio: f64) -> f64 {
            0.0
        }
    }

    #[test]
    fn non_finite_force_degrades_to_neutral() {
        let model = SailAeroModel::with_coefficients(AeroConfig::default(), Some(PointOfSailTable::default()), NanPolar);
        let input = AeroInput { apparent_wind: Vector2::new(10.0, 0.0), craft_heading_deg: 0.0, craft_velocity: Vector2::zeros() };
        let r = model.compute(&sail().with_chord_direction(chord_at(Vector2::new(1.0, 0.0), -22.5)), &input);
        assert_eq!(r, ForceResult::neutral());
        assert!(r.is_finite());
    }
}
