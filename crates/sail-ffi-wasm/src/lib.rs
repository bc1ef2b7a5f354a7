// crates/sail-ffi-wasm/src/lib.rs
//
// WASM bindings: a per-tick `Simulation` handle plus a one-shot sail force.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

// --- our crates ---
use sail_aero::{AeroConfig, AeroInput, SailAeroModel, SailGeometry};
use sail_core::{ConfigError, WindModel, WindState};
use sail_integrator::{CraftIntegrator, Sail, SailReport, SimConfig, TickReport};
use sail_models::PointOfSailTable;

// Better panic messages in browser console
#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
}

fn js_err(e: &ConfigError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/* --------------------------- Shared DTOs (JS) --------------------------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsSail {
    pub name: String,
    pub area_m2: f64,
    pub length_m: f64,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
    #[serde(default)]
    pub mount_x: f64,
    #[serde(default)]
    pub mount_y: f64,
    #[serde(default)]
    pub boom_angle_deg: f64,
    #[serde(default = "one")]
    pub deployed: f64,
    #[serde(default = "yes")]
    pub active: bool,
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

impl TryFrom<JsSail> for Sail {
    type Error = ConfigError;

    fn try_from(s: JsSail) -> Result<Self, Self::Error> {
        let mut geometry = SailGeometry::new(s.area_m2, s.length_m)?;
        if let Some(ar) = s.aspect_ratio {
            geometry = geometry.with_aspect_ratio(ar)?;
        }
        let mut sail = Sail::new(&s.name, geometry)
            .with_mount_offset(Vector2::new(s.mount_x, s.mount_y))
            .with_boom_angle(s.boom_angle_deg);
        sail.set_deployed(s.deployed);
        sail.active = s.active;
        Ok(sail)
    }
}

/// Host kinematics for one tick. The host's rigid body is authoritative
/// unless `sync` is false.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JsTickInput {
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub angular_velocity: f64,
    pub heading_deg: f64,
    pub dt_s: f64,
    #[serde(default = "yes")]
    pub sync: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsSailOutput {
    pub name: String,
    pub force_x: f64,
    pub force_y: f64,
    pub torque: f64,
    pub angle_of_attack_deg: f64,
    pub efficiency: f64,
    pub in_dead_zone: bool,
}

impl From<&SailReport> for JsSailOutput {
    fn from(r: &SailReport) -> Self {
        Self {
            name: r.name.clone(),
            force_x: r.result.force.x,
            force_y: r.result.force.y,
            torque: r.torque,
            angle_of_attack_deg: r.result.angle_of_attack_deg,
            efficiency: r.result.efficiency,
            in_dead_zone: r.result.in_dead_zone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsTickOutput {
    pub force_x: f64,
    pub force_y: f64,
    pub torque: f64,
    pub accel_x: f64,
    pub accel_y: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub angular_velocity: f64,
    pub heading_deg: f64,
    pub apparent_wind_x: f64,
    pub apparent_wind_y: f64,
    pub efficiency: f64,
    pub speed_multiplier: f64,
    /// "port" | "starboard" | "" (undefined near dead astern / head to wind)
    pub tack: String,
    pub sails: Vec<JsSailOutput>,
    pub skipped: bool,
    pub dropped: bool,
    pub recovered: bool,
}

/* ------------------------------ Simulation ------------------------------ */

#[wasm_bindgen]
pub struct Simulation {
    integrator: CraftIntegrator,
    wind: Option<WindState>,
    sails: Vec<Sail>,
}

#[wasm_bindgen]
impl Simulation {
    /// `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Simulation, JsValue> {
        Self::from_config_str(config_json).map_err(|e| js_err(&e))
    }

    pub fn set_wind(&mut self, speed_mps: f64, heading_deg: f64) {
        self.wind = Some(WindState::new(speed_mps, heading_deg));
    }

    /// Sails then contribute nothing until wind is set again.
    pub fn clear_wind(&mut self) {
        self.wind = None;
    }

    pub fn set_sails(&mut self, sails: JsValue) -> Result<(), JsValue> {
        let sails: Vec<JsSail> = swb::from_value(sails)?;
        self.replace_sails(sails).map_err(|e| js_err(&e))
    }

    /// Returns false for an unknown sail index.
    pub fn set_boom_angle(&mut self, index: usize, boom_angle_deg: f64) -> bool {
        self.sails.get_mut(index).map(|s| s.set_boom_angle(boom_angle_deg)).is_some()
    }

    pub fn set_deployed(&mut self, index: usize, fraction: f64) -> bool {
        self.sails.get_mut(index).map(|s| s.set_deployed(fraction)).is_some()
    }

    pub fn set_active(&mut self, index: usize, active: bool) -> bool {
        self.sails.get_mut(index).map(|s| s.active = active).is_some()
    }

    pub fn step(&mut self, input: JsValue) -> Result<JsValue, JsValue> {
        let input: JsTickInput = swb::from_value(input)?;
        let out = self.tick(input);
        swb::to_value(&out).map_err(Into::into)
    }
}

impl Simulation {
    pub fn from_config_str(config_json: &str) -> Result<Self, ConfigError> {
        let config = if config_json.trim().is_empty() {
            SimConfig::default()
        } else {
            SimConfig::from_json_str(config_json)?
        };
        Ok(Self {
            integrator: CraftIntegrator::new(&config),
            wind: None,
            sails: Vec::new(),
        })
    }

    pub fn replace_sails(&mut self, sails: Vec<JsSail>) -> Result<(), ConfigError> {
        self.sails = sails.into_iter().map(Sail::try_from).collect::<Result<_, _>>()?;
        Ok(())
    }

    pub fn tick(&mut self, input: JsTickInput) -> JsTickOutput {
        if input.sync {
            self.integrator.sync_from_host(
                Vector2::new(input.velocity_x, input.velocity_y),
                input.angular_velocity,
                input.heading_deg,
            );
        }
        let report = self.integrator.step(&self.wind, &self.sails, input.dt_s);
        self.output(&report)
    }

    fn output(&self, report: &TickReport) -> JsTickOutput {
        let state = self.integrator.state();
        JsTickOutput {
            force_x: report.force.x,
            force_y: report.force.y,
            torque: report.torque,
            accel_x: report.acceleration.x,
            accel_y: report.acceleration.y,
            velocity_x: state.velocity.x,
            velocity_y: state.velocity.y,
            angular_velocity: state.angular_velocity,
            heading_deg: state.heading_deg,
            apparent_wind_x: report.apparent_wind.x,
            apparent_wind_y: report.apparent_wind.y,
            efficiency: report.efficiency,
            speed_multiplier: report.speed_multiplier,
            tack: report.tack.map(|t| t.to_string()).unwrap_or_default(),
            sails: report.sails.iter().map(JsSailOutput::from).collect(),
            skipped: report.skipped,
            dropped: report.dropped,
            recovered: report.recovered,
        }
    }
}

/* ---------------------------- One-shot force ---------------------------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsAeroInput {
    pub wind: JsWind,
    pub heading_deg: f64,
    #[serde(default)]
    pub velocity_x: f64,
    #[serde(default)]
    pub velocity_y: f64,
    pub sail: JsSail,
    #[serde(default)]
    pub aero: AeroConfig,
    #[serde(default)]
    pub apparent_wind_ceiling_mps: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JsWind {
    pub speed_mps: f64,
    pub heading_deg: f64,
}

/// Force on a single sail with the default point-of-sail table.
pub fn aero_force(input: JsAeroInput) -> Result<JsSailOutput, ConfigError> {
    input.aero.validate()?;
    let heading = input.heading_deg;
    let velocity = Vector2::new(input.velocity_x, input.velocity_y);
    let name = input.sail.name.clone();
    let sail = Sail::try_from(input.sail)?;

    let mut wind = WindModel::new(WindState::new(input.wind.speed_mps, input.wind.heading_deg));
    if let Some(ceiling) = input.apparent_wind_ceiling_mps {
        wind = wind.with_ceiling(ceiling);
    }
    let model = SailAeroModel::new(input.aero, Some(PointOfSailTable::default()));
    let aero_in = AeroInput {
        apparent_wind: wind.apparent_wind(&velocity),
        craft_heading_deg: heading,
        craft_velocity: velocity,
    };

    let result = match sail.effective_geometry(heading) {
        Some(geometry) => model.compute(&geometry, &aero_in),
        None => sail_aero::ForceResult::neutral(),
    };
    Ok(JsSailOutput {
        name,
        force_x: result.force.x,
        force_y: result.force.y,
        torque: 0.0,
        angle_of_attack_deg: result.angle_of_attack_deg,
        efficiency: result.efficiency,
        in_dead_zone: result.in_dead_zone,
    })
}

#[wasm_bindgen]
pub fn aero_force_js(input: JsValue) -> Result<JsValue, JsValue> {
    let inp: JsAeroInput = swb::from_value(input)?;
    let out = aero_force(inp).map_err(|e| js_err(&e))?;
    swb::to_value(&out).map_err(Into::into)
}
