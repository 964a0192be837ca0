//! Derived hemodynamic metrics
//!
//! Stroke volume is never stored: it is recomputed from the latest VTI and
//! the current vessel radius on every read, so it cannot go stale.

use std::f64::consts::PI;

/// Converts m³ to millilitres
pub const STROKE_VOLUME_UNIT_SCALE: f64 = 1_000_000.0;

/// Cross-sectional area (m²) of a circular vessel of radius `radius_m`
pub fn cross_sectional_area(radius_m: f64) -> f64 {
    PI * radius_m * radius_m
}

/// Stroke volume in millilitres from a VTI in metres and a radius in metres
pub fn stroke_volume_ml(vti_m: f64, radius_m: f64) -> f64 {
    vti_m * cross_sectional_area(radius_m) * STROKE_VOLUME_UNIT_SCALE
}
