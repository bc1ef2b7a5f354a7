//! sail-integrator
//!
//! Fixed-step craft integrator. Each tick:
//! - resolve the wind once (apparent wind clamped to a safety ceiling)
//! - evaluate every active sail and sum forces; yaw torque from each sail's
//!   lever arm, gated by its torque multiplier
//! - add hull drag (forward/lateral split about the keel) and yaw damping
//! - semi-implicit Euler: `v += F/m·dt`, `ω += τ/I·dt`, then heading from `ω`
//!
//! Non-finite totals drop the tick (state untouched); runaway speeds reset the
//! craft to rest. Neither surfaces as an error.
//!
//! Conventions:
//! - Yaw rate `ω` and torque are counter-clockwise positive [rad/s, N·m].
//! - Heading is compass style, so it *decreases* for positive `ω`.
//!
//! The host's rigid body can stay authoritative: call
//! [`CraftIntegrator::sync_from_host`] before `step`, and read back
//! `velocity()` / `angular_velocity()` / `acceleration()` afterwards.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sail_aero::{AeroInput, ForceResult, SailAeroModel, SailCoefficients, StallCurves};
use sail_core::{
    clamp_magnitude, cross2, heading_to_vector, is_finite2, normalize_heading_deg, signed_angle_deg,
    WindModel, WindSource,
};
use sail_models::{point_of_sail::tack_for_angle, Tack};

pub mod config;
pub mod sail;

pub use config::{HullConfig, HullDragModel, SafetyLimits, SimConfig};
pub use sail::Sail;

/// Sails whose torque multiplier is at or below this do not steer.
pub const TORQUE_MULTIPLIER_THRESHOLD: f64 = 0.01;

/// The only state that persists across ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CraftState {
    /// [m/s], world frame
    pub velocity: Vector2<f64>,
    /// Yaw rate [rad/s], CCW positive
    pub angular_velocity: f64,
    /// Compass heading [°], [0, 360)
    pub heading_deg: f64,
}

/// One sail's contribution for HUD/diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SailReport {
    pub name: String,
    pub result: ForceResult,
    /// Yaw torque this sail added [N·m].
    pub torque: f64,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Total horizontal force applied [N].
    pub force: Vector2<f64>,
    /// Total yaw torque applied [N·m].
    pub torque: f64,
    pub acceleration: Vector2<f64>,
    pub angular_acceleration: f64,
    pub apparent_wind: Vector2<f64>,
    pub yacht_angle_to_wind_deg: f64,
    /// Point-of-sail efficiency for the craft as a whole.
    pub efficiency: f64,
    pub speed_multiplier: f64,
    pub tack: Option<Tack>,
    pub sails: Vec<SailReport>,
    /// Tick discarded: `dt` unusable.
    pub skipped: bool,
    /// Force/torque was non-finite and not applied.
    pub dropped: bool,
    /// Speed exceeded the explosion ceiling and the craft was reset.
    pub recovered: bool,
}

#[derive(Clone, Debug)]
pub struct CraftIntegrator<C: SailCoefficients = StallCurves> {
    model: SailAeroModel<C>,
    hull: HullConfig,
    limits: SafetyLimits,
    state: CraftState,
    acceleration: Vector2<f64>,
    angular_acceleration: f64,
}

impl CraftIntegrator<StallCurves> {
    pub fn new(config: &SimConfig) -> Self {
        Self::with_model(
            SailAeroModel::new(config.aero, config.point_of_sail.clone()),
            config.hull,
            config.limits,
        )
    }
}

impl Default for CraftIntegrator<StallCurves> {
    fn default() -> Self {
        Self::new(&SimConfig::default())
    }
}

impl<C: SailCoefficients> CraftIntegrator<C> {
    pub fn with_model(model: SailAeroModel<C>, hull: HullConfig, limits: SafetyLimits) -> Self {
        Self {
            model,
            hull,
            limits,
            state: CraftState::default(),
            acceleration: Vector2::zeros(),
            angular_acceleration: 0.0,
        }
    }

    pub fn model(&self) -> &SailAeroModel<C> {
        &self.model
    }

    pub fn state(&self) -> CraftState {
        self.state
    }

    pub fn velocity(&self) -> Vector2<f64> {
        self.state.velocity
    }

    pub fn angular_velocity(&self) -> f64 {
        self.state.angular_velocity
    }

    pub fn heading_deg(&self) -> f64 {
        self.state.heading_deg
    }

    /// Linear acceleration from the last applied tick [m/s²].
    pub fn acceleration(&self) -> Vector2<f64> {
        self.acceleration
    }

    pub fn angular_acceleration(&self) -> f64 {
        self.angular_acceleration
    }

    /// Overwrite kinematics from the host. Non-finite components become zero.
    pub fn sync_from_host(&mut self, velocity: Vector2<f64>, angular_velocity: f64, heading_deg: f64) {
        self.state.velocity = if is_finite2(&velocity) { velocity } else { Vector2::zeros() };
        self.state.angular_velocity = if angular_velocity.is_finite() { angular_velocity } else { 0.0 };
        self.state.heading_deg = normalize_heading_deg(heading_deg);
    }

    /// Zero velocity and yaw rate, keep the heading.
    pub fn reset_motion(&mut self) {
        self.state.velocity = Vector2::zeros();
        self.state.angular_velocity = 0.0;
        self.acceleration = Vector2::zeros();
        self.angular_acceleration = 0.0;
    }

    /// Advance one fixed step of `dt` seconds.
    pub fn step<W: WindSource + ?Sized>(&mut self, wind: &W, sails: &[Sail], dt: f64) -> TickReport {
        let mut report = TickReport::default();
        if !dt.is_finite() || dt <= 0.0 {
            debug!(dt, "tick skipped");
            report.skipped = true;
            return report;
        }

        let heading = self.state.heading_deg;
        let velocity = self.state.velocity;

        // Wind is read once, before any sail.
        let apparent = wind.current_wind().map(|w| {
            WindModel::new(w)
                .with_ceiling(self.limits.apparent_wind_ceiling_mps)
                .apparent_wind(&velocity)
        });

        let mut force = Vector2::zeros();
        let mut torque = 0.0;

        if let Some(apparent_wind) = apparent {
            report.apparent_wind = apparent_wind;
            self.describe_point_of_sail(&mut report, apparent_wind, heading);

            let input = AeroInput { apparent_wind, craft_heading_deg: heading, craft_velocity: velocity };
            for sail in sails {
                let Some(geometry) = sail.effective_geometry(heading) else {
                    continue;
                };
                // Non-finite sail forces come back neutral from the model.
                let result = self.model.compute(&geometry, &input);
                let sail_torque = if result.torque_multiplier > TORQUE_MULTIPLIER_THRESHOLD {
                    let lever = sail.lever_arm(heading);
                    cross2(&lever, &result.force) * self.hull.sail_torque_weight * result.torque_multiplier
                } else {
                    0.0
                };
                force += result.force;
                torque += sail_torque;
                report.sails.push(SailReport { name: sail.name.clone(), result, torque: sail_torque });
            }
        }

        force += self.hull_drag(velocity, heading);
        torque -= self.state.angular_velocity * self.hull.angular_drag;

        if !is_finite2(&force) || !torque.is_finite() {
            warn!(fx = force.x, fy = force.y, torque, "tick force discarded: non-finite total");
            report.dropped = true;
            return report;
        }

        let acceleration = force / self.hull.mass_kg;
        let angular_acceleration = torque / self.hull.moment_of_inertia;
        if !is_finite2(&acceleration) || !angular_acceleration.is_finite() {
            warn!("tick force discarded: non-finite acceleration");
            report.dropped = true;
            return report;
        }

        self.state.velocity += acceleration * dt;
        self.state.angular_velocity += angular_acceleration * dt;
        self.state.heading_deg = normalize_heading_deg(heading - self.state.angular_velocity.to_degrees() * dt);
        self.acceleration = acceleration;
        self.angular_acceleration = angular_acceleration;

        report.force = force;
        report.torque = torque;
        report.acceleration = acceleration;
        report.angular_acceleration = angular_acceleration;

        let speed = self.state.velocity.norm();
        if speed > self.limits.explosion_speed_mps
            || self.state.angular_velocity.abs() > self.limits.explosion_angular_velocity
        {
            warn!(
                speed,
                angular_velocity = self.state.angular_velocity,
                "craft state blew up; resetting to rest"
            );
            self.reset_motion();
            report.recovered = true;
            return report;
        }
        self.state.velocity = clamp_magnitude(&self.state.velocity, self.limits.max_speed_mps);

        debug!(
            fx = force.x,
            fy = force.y,
            torque,
            speed = self.state.velocity.norm(),
            heading = self.state.heading_deg,
            "tick"
        );
        report
    }

    // Hull resistance, split along and across the keel.
    fn hull_drag(&self, velocity: Vector2<f64>, heading_deg: f64) -> Vector2<f64> {
        let forward = heading_to_vector(heading_deg);
        let starboard = Vector2::new(forward.y, -forward.x);
        let model = self.hull.drag_model;

        let along = model.resist(self.hull.forward_drag, velocity.dot(&forward));
        let across = model.resist(self.hull.lateral_drag, velocity.dot(&starboard));
        forward * along + starboard * across
    }

    fn describe_point_of_sail(&self, report: &mut TickReport, apparent_wind: Vector2<f64>, heading_deg: f64) {
        if apparent_wind.norm() < self.model.config.min_wind_speed_mps.max(f64::EPSILON) {
            return;
        }
        let angle = signed_angle_deg(&heading_to_vector(heading_deg), &apparent_wind);
        report.yacht_angle_to_wind_deg = angle;
        report.tack = tack_for_angle(angle);
        if let Some(table) = self.model.table.as_ref() {
            report.efficiency = table.efficiency(angle);
            report.speed_multiplier = table.speed_multiplier(angle);
        }
    }
}
