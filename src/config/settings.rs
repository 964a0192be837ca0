//! Signal-processing settings for the VTI pipeline
//!
//! These are the options the pipeline is built from. They are fixed for the
//! lifetime of a [`VtiPipeline`](crate::pipeline::VtiPipeline); changing them
//! means building a new pipeline.
//!
//! # Signal Routing
//!
//! Two historical variants of the monitor disagree on how samples flow
//! through the front of the pipeline. Neither is treated as canonical; both
//! are selected explicitly:
//!
//! - [`DetectorInput`] - whether the cycle detector sees the raw or the
//!   smoothed velocity
//! - [`DownsampleMode`] - whether the downsampler gates entry into the
//!   smoothing filter or only gates what leaves it
//!
//! [`CycleBounds`] likewise chooses which confirmation runs are integrated.

use crate::error::{Result, VtiError};
use serde::{Deserialize, Serialize};

/// Default downsampling factor (keep every 3rd sample)
pub const DEFAULT_DOWNSAMPLE_FACTOR: usize = 3;

/// Default moving-average window
pub const DEFAULT_FILTER_WINDOW: usize = 5;

/// Default ejection threshold in m/s
pub const DEFAULT_EJECTION_THRESHOLD: f64 = 0.15;

/// Default number of consecutive qualifying samples to commit a transition
pub const DEFAULT_CONFIRMATION_COUNT: usize = 5;

/// Default number of points in the rolling display waveform
pub const DEFAULT_WAVEFORM_CAPACITY: usize = 300;

/// Default Doppler pulse repetition frequency in Hz
pub const DEFAULT_PRF_HZ: f64 = 1000.0;

/// Which velocity signal the cycle detector consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectorInput {
    /// The raw velocity of each kept sample
    Raw,
    /// The moving-average output
    #[default]
    Smoothed,
}

impl DetectorInput {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DetectorInput::Raw => "Raw",
            DetectorInput::Smoothed => "Smoothed",
        }
    }
}

/// How the downsampler relates to the smoothing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DownsampleMode {
    /// Only kept samples enter the smoothing filter
    #[default]
    GatesSmoothing,
    /// Every raw sample enters the smoothing filter; the downsampler only
    /// decides which filter outputs reach the waveform and detector
    Independent,
}

impl DownsampleMode {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DownsampleMode::GatesSmoothing => "Gates smoothing",
            DownsampleMode::Independent => "Independent",
        }
    }
}

/// Which samples make up a completed cycle
///
/// The detector commits a transition only after `confirmation_count`
/// consecutive qualifying samples, so both edges of a cycle carry a run of
/// samples whose membership is a matter of convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleBounds {
    /// The cycle spans the samples at or above threshold: the start
    /// confirmation run is included and the end confirmation run is not
    #[default]
    Threshold,
    /// The cycle starts at the sample that confirmed the start and runs
    /// through the end confirmation run
    Hysteresis,
}

impl CycleBounds {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            CycleBounds::Threshold => "Threshold",
            CycleBounds::Hysteresis => "Hysteresis",
        }
    }
}

/// Configuration record for the VTI pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Keep one raw sample out of every `downsample_factor`
    pub downsample_factor: usize,

    /// Moving-average window length, in samples
    pub filter_window: usize,

    /// Velocity (m/s) at or above which a sample counts as ejecting
    pub ejection_threshold: f64,

    /// Consecutive qualifying samples needed to start or end a cycle
    pub confirmation_count: usize,

    /// Number of points held by the rolling display waveform
    pub waveform_capacity: usize,

    /// Pulse repetition frequency (Hz); the integration step is its inverse
    pub pulse_repetition_frequency_hz: f64,

    /// Signal fed to the cycle detector
    pub detector_input: DetectorInput,

    /// Placement of the downsampler relative to the smoothing filter
    pub downsample_mode: DownsampleMode,

    /// Which confirmation runs belong to a completed cycle
    pub cycle_bounds: CycleBounds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            downsample_factor: DEFAULT_DOWNSAMPLE_FACTOR,
            filter_window: DEFAULT_FILTER_WINDOW,
            ejection_threshold: DEFAULT_EJECTION_THRESHOLD,
            confirmation_count: DEFAULT_CONFIRMATION_COUNT,
            waveform_capacity: DEFAULT_WAVEFORM_CAPACITY,
            pulse_repetition_frequency_hz: DEFAULT_PRF_HZ,
            detector_input: DetectorInput::default(),
            downsample_mode: DownsampleMode::default(),
            cycle_bounds: CycleBounds::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// The undownsampled, unsmoothed variant: every sample reaches the
    /// detector as-is and cycles use hysteresis bounds.
    pub fn legacy() -> Self {
        Self {
            downsample_factor: 1,
            filter_window: 1,
            detector_input: DetectorInput::Raw,
            cycle_bounds: CycleBounds::Hysteresis,
            ..Self::default()
        }
    }

    /// Set the downsampling factor
    pub fn with_downsample_factor(mut self, factor: usize) -> Self {
        self.downsample_factor = factor;
        self
    }

    /// Set the smoothing window
    pub fn with_filter_window(mut self, window: usize) -> Self {
        self.filter_window = window;
        self
    }

    /// Set the ejection threshold (m/s)
    pub fn with_ejection_threshold(mut self, threshold: f64) -> Self {
        self.ejection_threshold = threshold;
        self
    }

    /// Set the confirmation count
    pub fn with_confirmation_count(mut self, count: usize) -> Self {
        self.confirmation_count = count;
        self
    }

    /// Set the rolling waveform capacity
    pub fn with_waveform_capacity(mut self, capacity: usize) -> Self {
        self.waveform_capacity = capacity;
        self
    }

    /// Set the pulse repetition frequency (Hz)
    pub fn with_prf(mut self, prf_hz: f64) -> Self {
        self.pulse_repetition_frequency_hz = prf_hz;
        self
    }

    /// Select the detector's input signal
    pub fn with_detector_input(mut self, input: DetectorInput) -> Self {
        self.detector_input = input;
        self
    }

    /// Select where downsampling happens
    pub fn with_downsample_mode(mut self, mode: DownsampleMode) -> Self {
        self.downsample_mode = mode;
        self
    }

    /// Select which confirmation runs belong to a cycle
    pub fn with_cycle_bounds(mut self, bounds: CycleBounds) -> Self {
        self.cycle_bounds = bounds;
        self
    }

    /// Integration time step in seconds
    pub fn sample_interval(&self) -> f64 {
        1.0 / self.pulse_repetition_frequency_hz
    }

    /// Check every field against its valid range
    pub fn validate(&self) -> Result<()> {
        if self.downsample_factor == 0 {
            return Err(VtiError::Config(
                "downsample_factor must be at least 1".to_string(),
            ));
        }
        if self.filter_window == 0 {
            return Err(VtiError::Config(
                "filter_window must be at least 1".to_string(),
            ));
        }
        if !self.ejection_threshold.is_finite() {
            return Err(VtiError::Config(format!(
                "ejection_threshold must be finite, got {}",
                self.ejection_threshold
            )));
        }
        if self.confirmation_count == 0 {
            return Err(VtiError::Config(
                "confirmation_count must be at least 1".to_string(),
            ));
        }
        if self.waveform_capacity == 0 {
            return Err(VtiError::Config(
                "waveform_capacity must be at least 1".to_string(),
            ));
        }
        let prf = self.pulse_repetition_frequency_hz;
        if !prf.is_finite() || prf <= 0.0 {
            return Err(VtiError::Config(format!(
                "pulse_repetition_frequency_hz must be a positive number, got {}",
                prf
            )));
        }
        Ok(())
    }
}
