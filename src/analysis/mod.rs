//! Analysis module for velocity signal processing
//!
//! This module provides the numeric building blocks of the VTI pipeline:
//! - Integer-factor downsampling
//! - Moving-average smoothing
//! - The rolling display waveform
//! - Hysteresis ejection-cycle detection
//! - Trapezoidal velocity-time integration
//! - Derived metrics (cross-sectional area, stroke volume)
//!
//! Every type here is a plain state value with no locking and no I/O. They
//! are composed by [`VtiPipeline`](crate::pipeline::VtiPipeline).

pub mod detector;
pub mod downsample;
pub mod integrator;
pub mod metrics;
pub mod smoothing;
pub mod waveform;

pub use detector::{CompletedCycle, CycleDetector, DetectorEvent, DetectorState};
pub use downsample::Downsampler;
pub use integrator::integrate_cycle;
pub use metrics::{cross_sectional_area, stroke_volume_ml, STROKE_VOLUME_UNIT_SCALE};
pub use smoothing::SmoothingFilter;
pub use waveform::RollingWaveform;
