//! Core sail-physics math utilities
//!
//! Includes:
//! - Heading & signed-angle helpers (compass headings, CCW signed angles)
//! - Horizontal-plane vector helpers on `nalgebra::Vector2<f64>`
//! - Wind representation & apparent wind (see [`wind`])
//! - Setup-time configuration errors (see [`error`])
//!
//! Conventions:
//! - Horizontal plane: x = east/right, y = north/forward, up = +z.
//! - Headings are compass style, degrees clockwise from +y, direction `(sin h, cos h)`.
//! - Signed angles between vectors are counter-clockwise positive, in (-180, 180].

pub mod error;
pub mod wind;

pub use error::ConfigError;
pub use nalgebra::Vector2;
pub use wind::{compute_apparent_wind, WindModel, WindSource, WindState};

/// Magnitudes below this are treated as "no direction".
pub const DIRECTION_EPSILON: f64 = 1e-3;

/// -------------------------
/// Angles
/// -------------------------

/// Wrap a heading into [0, 360). Non-finite input maps to 0.
pub fn normalize_heading_deg(heading_deg: f64) -> f64 {
    if !heading_deg.is_finite() {
        return 0.0;
    }
    let h = heading_deg.rem_euclid(360.0);
    // rem_euclid can round tiny negatives up to exactly 360.0
    if h >= 360.0 { 0.0 } else { h }
}

/// Wrap an angle into (-180, 180]. Non-finite input maps to 0.
pub fn wrap_signed_deg(angle_deg: f64) -> f64 {
    if !angle_deg.is_finite() {
        return 0.0;
    }
    let a = normalize_heading_deg(angle_deg);
    if a > 180.0 { a - 360.0 } else { a }
}

/// Unit vector for a compass heading.
pub fn heading_to_vector(heading_deg: f64) -> Vector2<f64> {
    let rad = heading_deg.to_radians();
    Vector2::new(rad.sin(), rad.cos())
}

/// Compass heading of a vector, [0, 360). Zero-length vectors give 0.
pub fn vector_to_heading(v: &Vector2<f64>) -> f64 {
    if v.norm() < f64::EPSILON {
        return 0.0;
    }
    normalize_heading_deg(v.x.atan2(v.y).to_degrees())
}

/// Signed angle from `from` to `to` around the up axis, degrees in (-180, 180].
///
/// Counter-clockwise is positive. Degenerate (zero-length or non-finite)
/// vectors yield 0.
pub fn signed_angle_deg(from: &Vector2<f64>, to: &Vector2<f64>) -> f64 {
    if !is_finite2(from) || !is_finite2(to) {
        return 0.0;
    }
    if from.norm() < f64::EPSILON || to.norm() < f64::EPSILON {
        return 0.0;
    }
    let deg = cross2(from, to).atan2(from.dot(to)).to_degrees();
    if deg <= -180.0 { 180.0 } else { deg }
}

/// -------------------------
/// Horizontal vectors
/// -------------------------

/// z-component of the 3D cross product of two planar vectors.
#[inline]
pub fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

#[inline]
pub fn is_finite2(v: &Vector2<f64>) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Unit vector, or zero when the input is shorter than [`DIRECTION_EPSILON`]
/// or not finite.
pub fn normalize_or_zero(v: &Vector2<f64>) -> Vector2<f64> {
    if !is_finite2(v) {
        return Vector2::zeros();
    }
    let n = v.norm();
    if n < DIRECTION_EPSILON { Vector2::zeros() } else { v / n }
}

/// Scale `v` down so its magnitude does not exceed `max`. Non-finite vectors
/// (or a non-finite / negative cap) collapse to zero.
pub fn clamp_magnitude(v: &Vector2<f64>, max: f64) -> Vector2<f64> {
    if !is_finite2(v) || !max.is_finite() || max <= 0.0 {
        return Vector2::zeros();
    }
    let n = v.norm();
    if n > max { v * (max / n) } else { *v }
}

/// Rotate a boat-local offset (x = starboard, y = forward) into the world
/// frame for a craft pointing at `heading_deg`.
pub fn local_to_world(local: &Vector2<f64>, heading_deg: f64) -> Vector2<f64> {
    let forward = heading_to_vector(heading_deg);
    let starboard = Vector2::new(forward.y, -forward.x);
    starboard * local.x + forward * local.y
}
