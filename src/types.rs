//! Core data types for the VTI monitor
//!
//! This module contains the plain data structures handed between the
//! pipeline, its worker thread, and the presentation side.
//!
//! # Main Types
//!
//! - [`CycleReport`] - One completed ejection cycle with its VTI and stroke volume
//! - [`PipelineSnapshot`] - Everything the display reads, captured at one instant
//! - [`CollectionStats`] - Running counters kept by the worker
//!
//! # Units
//!
//! The pipeline works in SI units throughout (m/s, m, m³). The display uses
//! cm/s, cm, mm and ml; the helpers on each type convert on the way out.

use crate::analysis::DetectorState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// m/s → cm/s and m → cm
pub const CENTI_SCALE: f64 = 100.0;

/// m → mm
pub const MILLI_SCALE: f64 = 1000.0;

/// A single completed ejection cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Velocity-time integral in metres
    pub vti_m: f64,
    /// Stroke volume in millilitres at the radius current when the cycle ended
    pub stroke_volume_ml: f64,
    /// Number of samples integrated
    pub sample_count: usize,
    /// Wall-clock time the cycle was closed
    pub completed_at: DateTime<Utc>,
}

impl CycleReport {
    /// VTI in centimetres, as displayed
    pub fn vti_cm(&self) -> f64 {
        self.vti_m * CENTI_SCALE
    }
}

impl std::fmt::Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VTI {:.1} cm, SV {:.1} ml ({} samples)",
            self.vti_cm(),
            self.stroke_volume_ml,
            self.sample_count
        )
    }
}

/// Presentation-facing view of the pipeline at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    /// Latest smoothed velocity (m/s)
    pub velocity_m_s: f64,
    /// Rolling waveform, oldest first (m/s)
    pub waveform: Vec<f64>,
    /// VTI of the most recently completed cycle (m)
    pub vti_m: f64,
    /// Current vessel radius (m)
    pub vessel_radius_m: f64,
    /// Stroke volume derived from `vti_m` and `vessel_radius_m` (ml)
    pub stroke_volume_ml: f64,
    /// Detector state
    pub detector_state: DetectorState,
}

impl PipelineSnapshot {
    pub fn velocity_cm_s(&self) -> f64 {
        self.velocity_m_s * CENTI_SCALE
    }

    pub fn vti_cm(&self) -> f64 {
        self.vti_m * CENTI_SCALE
    }

    pub fn vessel_radius_mm(&self) -> f64 {
        self.vessel_radius_m * MILLI_SCALE
    }

    /// Waveform in cm/s for plotting
    pub fn waveform_cm_s(&self) -> Vec<f64> {
        self.waveform.iter().map(|v| v * CENTI_SCALE).collect()
    }
}

/// Statistics about sample processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Samples accepted by the pipeline (before downsampling)
    pub samples_received: u64,
    /// Samples that survived downsampling
    pub samples_kept: u64,
    /// Samples rejected as non-finite
    pub samples_rejected: u64,
    /// Cycles that produced a VTI
    pub cycles_completed: u64,
    /// Cycles too short to integrate
    pub degenerate_cycles: u64,
    /// Resets applied
    pub resets: u64,
    /// Number of messages dropped due to queue backpressure
    pub dropped_messages: u64,
}

impl CollectionStats {
    /// Fraction of received samples kept, as a percentage
    pub fn keep_rate(&self) -> f64 {
        if self.samples_received == 0 {
            0.0
        } else {
            (self.samples_kept as f64 / self.samples_received as f64) * 100.0
        }
    }
}
