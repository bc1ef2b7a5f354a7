//! Tunables for the integrator, loadable from JSON.
//!
//! Every struct is `#[serde(default)]`, so a config file only needs the fields
//! it changes.

use serde::{Deserialize, Serialize};

use sail_aero::AeroConfig;
use sail_core::wind::DEFAULT_APPARENT_WIND_CEILING_MPS;
use sail_core::ConfigError;
use sail_models::PointOfSailTable;

/// How hull resistance scales with speed through the water.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HullDragModel {
    /// `F = -k v`
    Linear,
    /// `F = -k v |v|`
    #[default]
    Quadratic,
}

impl HullDragModel {
    /// Drag force along one axis for speed component `v`.
    pub fn resist(self, coefficient: f64, v: f64) -> f64 {
        match self {
            HullDragModel::Linear => -coefficient * v,
            HullDragModel::Quadratic => -coefficient * v * v.abs(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullConfig {
    pub mass_kg: f64,
    /// Yaw moment of inertia [kg·m²].
    pub moment_of_inertia: f64,
    pub drag_model: HullDragModel,
    /// Resistance along the keel.
    pub forward_drag: f64,
    /// Resistance across the keel; must exceed `forward_drag`.
    pub lateral_drag: f64,
    /// Yaw damping [N·m·s/rad].
    pub angular_drag: f64,
    /// Scales every sail's yaw torque.
    pub sail_torque_weight: f64,
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            mass_kg: 1500.0,
            moment_of_inertia: 6000.0,
            drag_model: HullDragModel::Quadratic,
            forward_drag: 60.0,
            lateral_drag: 1200.0,
            angular_drag: 4000.0,
            sail_torque_weight: 1.0,
        }
    }
}

impl HullConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("mass_kg", self.mass_kg)?;
        ConfigError::require_positive("moment_of_inertia", self.moment_of_inertia)?;
        ConfigError::require_non_negative("forward_drag", self.forward_drag)?;
        ConfigError::require_non_negative("lateral_drag", self.lateral_drag)?;
        ConfigError::require_non_negative("angular_drag", self.angular_drag)?;
        ConfigError::require_non_negative("sail_torque_weight", self.sail_torque_weight)?;
        if self.lateral_drag <= self.forward_drag {
            return Err(ConfigError::WeakKeel { forward: self.forward_drag, lateral: self.lateral_drag });
        }
        Ok(())
    }
}

/// Safety ceilings applied every tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyLimits {
    /// Apparent wind handed to the sails is clamped to this [m/s].
    pub apparent_wind_ceiling_mps: f64,
    /// Velocity is clamped to this magnitude [m/s].
    pub max_speed_mps: f64,
    /// Beyond this the state is considered blown up and reset [m/s].
    pub explosion_speed_mps: f64,
    /// Yaw rate beyond this also counts as blown up [rad/s].
    pub explosion_angular_velocity: f64,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            apparent_wind_ceiling_mps: DEFAULT_APPARENT_WIND_CEILING_MPS,
            max_speed_mps: 20.0,
            explosion_speed_mps: 100.0,
            explosion_angular_velocity: 20.0,
        }
    }
}

impl SafetyLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("apparent_wind_ceiling_mps", self.apparent_wind_ceiling_mps)?;
        ConfigError::require_positive("max_speed_mps", self.max_speed_mps)?;
        ConfigError::require_positive("explosion_speed_mps", self.explosion_speed_mps)?;
        ConfigError::require_positive("explosion_angular_velocity", self.explosion_angular_velocity)?;
        Ok(())
    }
}

/// Everything the integrator needs. `point_of_sail: null` in JSON disables
/// sail drive entirely (hull drag still applies).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub aero: AeroConfig,
    pub point_of_sail: Option<PointOfSailTable>,
    pub hull: HullConfig,
    pub limits: SafetyLimits,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            aero: AeroConfig::default(),
            point_of_sail: Some(PointOfSailTable::default()),
            hull: HullConfig::default(),
            limits: SafetyLimits::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aero.validate()?;
        self.hull.validate()?;
        self.limits.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SimConfig::from_json_str(
            r#"{ "aero": { "force_multiplier": 10.0 }, "hull": { "drag_model": "linear" } }"#,
        )
        .unwrap();
        assert_relative_eq!(cfg.aero.force_multiplier, 10.0);
        assert_relative_eq!(cfg.aero.max_cl, 1.5);
        assert_eq!(cfg.hull.drag_model, HullDragModel::Linear);
        assert!(cfg.point_of_sail.is_some());
    }

    #[test]
    fn null_table_disables_drive() {
        let cfg = SimConfig::from_json_str(r#"{ "point_of_sail": null }"#).unwrap();
        assert!(cfg.point_of_sail.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "hull": { "mass_kg": 0 } }"#),
            Err(ConfigError::NonPositive { field: "mass_kg", .. })
        ));
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "hull": { "lateral_drag": 10 } }"#),
            Err(ConfigError::WeakKeel { .. })
        ));
        assert!(matches!(SimConfig::from_json_str("{ not json"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn drag_models_oppose_motion() {
        assert_relative_eq!(HullDragModel::Linear.resist(2.0, 3.0), -6.0);
        assert_relative_eq!(HullDragModel::Quadratic.resist(2.0, -3.0), 18.0);
    }

    #[test]
    fn survives_a_json_round_trip() {
        let cfg = SimConfig::default();
        let back = SimConfig::from_json_str(&cfg.to_json_string().unwrap()).unwrap();
        assert_relative_eq!(back.hull.mass_kg, cfg.hull.mass_kg);
        assert_eq!(back.point_of_sail.map(|t| t.zones().len()), Some(6));
    }
}
