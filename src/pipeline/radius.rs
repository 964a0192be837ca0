//! Shared vessel radius
//!
//! The radius is the one value written by a different actor (the user) than
//! the sample stream. It is stored as the bit pattern of an `f64` in an
//! `AtomicU64`, so every read sees a whole value and no lock is needed.

use crate::config::DEFAULT_VESSEL_RADIUS_M;
use crate::error::{Result, VtiError};
use crate::types::MILLI_SCALE;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cloneable handle to the current vessel radius (m)
#[derive(Debug, Clone)]
pub struct VesselRadius {
    bits: Arc<AtomicU64>,
}

impl VesselRadius {
    /// Create a handle holding `radius_m`
    pub fn new(radius_m: f64) -> Result<Self> {
        Self::check(radius_m)?;
        Ok(Self {
            bits: Arc::new(AtomicU64::new(radius_m.to_bits())),
        })
    }

    /// Current radius in metres
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Current radius in millimetres
    pub fn get_mm(&self) -> f64 {
        self.get() * MILLI_SCALE
    }

    /// Replace the radius. Rejected values leave the stored radius unchanged.
    pub fn set(&self, radius_m: f64) -> Result<()> {
        Self::check(radius_m)?;
        self.bits.store(radius_m.to_bits(), Ordering::Release);
        tracing::info!("Vessel radius set to {:.2} mm", radius_m * MILLI_SCALE);
        Ok(())
    }

    /// Replace the radius from a millimetre reading
    pub fn set_mm(&self, radius_mm: f64) -> Result<()> {
        self.set(radius_mm / MILLI_SCALE)
    }

    fn check(radius_m: f64) -> Result<()> {
        if radius_m.is_finite() && radius_m > 0.0 {
            Ok(())
        } else {
            Err(VtiError::InvalidRadius(radius_m))
        }
    }
}

impl Default for VesselRadius {
    fn default() -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(DEFAULT_VESSEL_RADIUS_M.to_bits())),
        }
    }
}
