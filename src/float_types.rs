// Our Real scalar type. Web Mercator metres reach ~2e7, which rules out f32.
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized tolerance used across the crate.
/// Can be overridden:
///  1) **Build-time**: set env var `SHADOWRS_TOLERANCE` (e.g. `SHADOWRS_TOLERANCE=1e-9 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before using the library
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_tolerance() -> Real {
    1e-9
}

/// Returns the current tolerance value.
/// If not set yet, it tries `SHADOWRS_TOLERANCE` (parsed as `Real`) and
/// falls back to the default.
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("SHADOWRS_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_tolerance()
    })
}

/// Set the tolerance programmatically once (subsequent calls are ignored).
/// Call near program start: `shadowrs::float_types::set_tolerance(1e-10);`
pub fn set_tolerance(value: Real) {
    let _ = TOLERANCE_CELL.set(value.max(Real::EPSILON));
}

/// Polygons (and holes) with an absolute area below this are treated as slivers.
#[inline]
pub fn sliver_area() -> Real {
    let tol = tolerance();
    tol * tol
}

/// Archimedes' constant (π)
pub const PI: Real = core::f64::consts::PI;

/// π/2
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;

/// π/4
pub const FRAC_PI_4: Real = core::f64::consts::FRAC_PI_4;

/// The full circle constant (τ)
pub const TAU: Real = core::f64::consts::TAU;

/// Degrees to radians
pub const RAD: Real = PI / 180.0;

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Earth and time constants
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Sphere radius of the closed-form Web Mercator (metres).
pub const EARTH_RADIUS: Real = 6_378_137.0;

/// Half the equatorial circumference in Web Mercator metres, as usually rounded.
pub const MERCATOR_HALF_EXTENT: Real = 20_037_508.34;

/// Mean earth radius used when converting a metric grid cell size into degrees.
pub const GRID_EARTH_RADIUS: Real = 6_371_004.0;

/// Seconds per hour.
pub const HOUR: Real = 3600.0;

/// Smallest padding (seconds) allowed between sunrise/sunset and the first/last sample.
pub const MIN_PADDING_SECONDS: i64 = 1800;
