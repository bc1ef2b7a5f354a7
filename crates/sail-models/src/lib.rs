//! sail-models
//!
//! Sail coefficient curves implemented as piecewise-linear tables over the
//! absolute angle of attack in **degrees**, plus the point-of-sail table that
//! maps the yacht's angle to the wind onto an efficiency multiplier.
//!
//! Lift curve (fractions of `max_cl`):
//!
//!   0° → 0, 15° → 1, 30° → 0.53, 90° → 0.067, flat beyond
//!
//! i.e. lift peaks at 15° and stalls off after it. Parasitic drag:
//!
//!   0° → 0.05, 15° → 0.07, 30° → 0.3, 90° → `max_cd`, flat beyond
//!
//! Exports:
//!   - `lift_coefficient(abs_aoa, max_cl)`
//!   - `parasitic_drag(abs_aoa, max_cd)`
//!   - `induced_drag(cl, oswald, aspect_ratio)`
//!   - [`PointOfSailTable`], [`PointOfSailZone`], [`Tack`]

use std::f64::consts::PI;

pub mod point_of_sail;

pub use point_of_sail::{PointOfSailTable, PointOfSailZone, Tack};

/// One breakpoint of a piecewise-linear curve.
#[derive(Clone, Copy, Debug)]
pub struct Knot {
    pub angle_deg: f64,
    pub value: f64,
}

const fn knot(angle_deg: f64, value: f64) -> Knot {
    Knot { angle_deg, value }
}

/// Linear interpolation across `table`, which must be sorted by angle.
/// Flat (clamped) outside the first and last knot. Empty table gives 0.
pub fn eval_knots(angle_deg: f64, table: &[Knot]) -> f64 {
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
        return 0.0;
    };
    let x = if angle_deg.is_finite() { angle_deg } else { 0.0 };
    if x <= first.angle_deg {
        return first.value;
    }
    if x >= last.angle_deg {
        return last.value;
    }
    for pair in table.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if x < b.angle_deg {
            let span = (b.angle_deg - a.angle_deg).max(1e-9);
            let u = (x - a.angle_deg) / span;
            return a.value + u * (b.value - a.value);
        }
    }
    last.value
}

/* ------------------------------ lift curve ------------------------------ */

/// Angle of attack where lift peaks [°].
pub const STALL_ANGLE_DEG: f64 = 15.0;

const LIFT_SHAPE: &[Knot] = &[
    //   angle, fraction of max_cl
    knot(0.0, 0.0),
    knot(STALL_ANGLE_DEG, 1.0),
    knot(30.0, 0.53),
    knot(90.0, 0.067),
];

/// Sail lift coefficient for an absolute angle of attack [°].
pub fn lift_coefficient(abs_aoa_deg: f64, max_cl: f64) -> f64 {
    eval_knots(abs_aoa_deg.abs(), LIFT_SHAPE) * max_cl
}

/* ------------------------------ drag curves ----------------------------- */

/// Parasitic (profile + separation) drag for an absolute angle of attack [°].
pub fn parasitic_drag(abs_aoa_deg: f64, max_cd: f64) -> f64 {
    let table = [
        knot(0.0, 0.05),
        knot(STALL_ANGLE_DEG, 0.07),
        knot(30.0, 0.3),
        knot(90.0, max_cd),
    ];
    eval_knots(abs_aoa_deg.abs(), &table)
}

/// Induced drag `CL² / (π e AR)`. Zero when the span terms are degenerate.
pub fn induced_drag(cl: f64, oswald_efficiency: f64, aspect_ratio: f64) -> f64 {
    let denom = PI * oswald_efficiency * aspect_ratio;
    if !denom.is_finite() || denom <= f64::EPSILON {
        return 0.0;
    }
    cl * cl / denom
}

/* -------------------------------- tests -------------------------------- */
