//! The VTI pipeline state value and its transition function.
//!
//! [`VtiPipeline`] owns every piece of per-stream state (downsampler count,
//! smoothing window, rolling waveform, detector, latest VTI) and advances it
//! one event at a time. It does no locking and no I/O; callers must invoke it
//! from a single thread in arrival order, which the
//! [`PipelineWorker`](crate::pipeline::PipelineWorker) guarantees.
//!
//! ```text
//! raw ─► Downsampler ─► SmoothingFilter ─┬─► RollingWaveform
//!                                        └─► CycleDetector ─► integrate ─► VTI
//! ```

use crate::analysis::{
    integrate_cycle, stroke_volume_ml, CycleDetector, DetectorEvent, DetectorState, Downsampler,
    RollingWaveform, SmoothingFilter,
};
use crate::config::{DetectorInput, DownsampleMode, PipelineConfig};
use crate::error::{Result, VtiError};
use crate::types::{PipelineSnapshot, CENTI_SCALE};

/// Input event for the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineEvent {
    /// One decoded velocity sample in m/s
    Sample(f64),
    /// Transport discontinuity; return to the initial state
    Reset,
}

/// What a cycle transition produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// The detector entered `Ejecting`
    Started,
    /// A cycle ended and its VTI replaced the previous one
    Completed { vti_m: f64, sample_count: usize },
    /// A cycle ended with too few samples to integrate; VTI unchanged
    Degenerate { sample_count: usize },
}

/// Result of applying one event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Dropped by the downsampler
    Discarded,
    /// Reached the waveform and detector
    Processed {
        smoothed: f64,
        cycle: Option<CycleOutcome>,
    },
    /// State returned to its initial condition
    Reset,
}

/// Sample-stream processor: downsample, smooth, detect, integrate
#[derive(Debug, Clone)]
pub struct VtiPipeline {
    config: PipelineConfig,
    downsampler: Downsampler,
    filter: SmoothingFilter,
    waveform: RollingWaveform,
    detector: CycleDetector,
    /// Latest smoothed velocity (m/s)
    velocity: f64,
    /// VTI of the most recently completed cycle (m)
    vti: f64,
    /// Integration step (s)
    dt: f64,
}

impl VtiPipeline {
    /// Build a pipeline in its initial state from a validated config
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            downsampler: Downsampler::new(config.downsample_factor),
            filter: SmoothingFilter::new(config.filter_window),
            waveform: RollingWaveform::new(config.waveform_capacity),
            detector: CycleDetector::new(
                config.ejection_threshold,
                config.confirmation_count,
                config.cycle_bounds,
            ),
            velocity: 0.0,
            vti: 0.0,
            dt: config.sample_interval(),
            config,
        })
    }

    /// Apply one event
    pub fn apply(&mut self, event: PipelineEvent) -> Result<SampleOutcome> {
        match event {
            PipelineEvent::Sample(value) => self.on_sample(value),
            PipelineEvent::Reset => {
                self.on_reset();
                Ok(SampleOutcome::Reset)
            }
        }
    }

    /// Process one raw velocity sample (m/s).
    ///
    /// Non-finite values are rejected before any state is touched, including
    /// the downsampler's arrival count.
    pub fn on_sample(&mut self, value: f64) -> Result<SampleOutcome> {
        if !value.is_finite() {
            tracing::warn!("Rejected non-finite sample: {}", value);
            return Err(VtiError::InvalidSample(value));
        }

        let kept = self.downsampler.accept();
        let smoothed = match self.config.downsample_mode {
            DownsampleMode::GatesSmoothing => {
                if !kept {
                    return Ok(SampleOutcome::Discarded);
                }
                self.filter.update(value)
            }
            DownsampleMode::Independent => {
                let smoothed = self.filter.update(value);
                if !kept {
                    return Ok(SampleOutcome::Discarded);
                }
                smoothed
            }
        };

        self.velocity = smoothed;
        self.waveform.push(smoothed);
        tracing::trace!(raw = value, smoothed, "Kept sample");

        let detector_value = match self.config.detector_input {
            DetectorInput::Raw => value,
            DetectorInput::Smoothed => smoothed,
        };

        let cycle = self.detector.update(detector_value).map(|event| match event {
            DetectorEvent::CycleStarted => CycleOutcome::Started,
            DetectorEvent::CycleEnded(cycle) => {
                let sample_count = cycle.samples.len();
                match integrate_cycle(&cycle.samples, self.dt) {
                    Some(vti) => {
                        self.vti = vti;
                        tracing::debug!(vti_m = vti, sample_count, "Cycle integrated");
                        CycleOutcome::Completed {
                            vti_m: vti,
                            sample_count,
                        }
                    }
                    None => {
                        tracing::warn!(sample_count, "Cycle too short to integrate");
                        CycleOutcome::Degenerate { sample_count }
                    }
                }
            }
        });

        Ok(SampleOutcome::Processed { smoothed, cycle })
    }

    /// Return every piece of state to its initial condition.
    ///
    /// Safe at any point, including mid-cycle; a partial cycle is dropped
    /// without being integrated.
    pub fn on_reset(&mut self) {
        self.downsampler.reset();
        self.filter.reset();
        self.waveform.reset();
        self.detector.reset();
        self.velocity = 0.0;
        self.vti = 0.0;
        tracing::debug!("Pipeline reset");
    }

    /// Latest smoothed velocity (m/s)
    pub fn instantaneous_velocity(&self) -> f64 {
        self.velocity
    }

    /// Latest smoothed velocity in display units (cm/s)
    pub fn instantaneous_velocity_cm_s(&self) -> f64 {
        self.velocity * CENTI_SCALE
    }

    /// Rolling waveform, oldest first
    pub fn waveform(&self) -> &RollingWaveform {
        &self.waveform
    }

    /// VTI of the most recently completed cycle (m)
    pub fn vti(&self) -> f64 {
        self.vti
    }

    /// VTI in display units (cm)
    pub fn vti_cm(&self) -> f64 {
        self.vti * CENTI_SCALE
    }

    /// Stroke volume (ml) for the current VTI at `radius_m`
    pub fn stroke_volume_ml(&self, radius_m: f64) -> f64 {
        stroke_volume_ml(self.vti, radius_m)
    }

    pub fn detector_state(&self) -> DetectorState {
        self.detector.state()
    }

    pub fn start_confirmations(&self) -> usize {
        self.detector.start_confirmations()
    }

    pub fn end_confirmations(&self) -> usize {
        self.detector.end_confirmations()
    }

    /// Samples accumulated in the cycle in progress
    pub fn cycle_buffer(&self) -> &[f64] {
        self.detector.cycle_buffer()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Capture everything the display reads
    pub fn snapshot(&self, radius_m: f64) -> PipelineSnapshot {
        PipelineSnapshot {
            velocity_m_s: self.velocity,
            waveform: self.waveform.snapshot(),
            vti_m: self.vti,
            vessel_radius_m: radius_m,
            stroke_volume_ml: self.stroke_volume_ml(radius_m),
            detector_state: self.detector.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CycleBounds;

    fn unfiltered() -> PipelineConfig {
        PipelineConfig::new()
            .with_downsample_factor(1)
            .with_filter_window(1)
    }

    #[test]
    fn test_initial_state() {
        let pipeline = VtiPipeline::new(PipelineConfig::default()).unwrap();
        assert_eq!(pipeline.vti(), 0.0);
        assert_eq!(pipeline.instantaneous_velocity(), 0.0);
        assert_eq!(pipeline.waveform().len(), 300);
        assert_eq!(pipeline.detector_state(), DetectorState::Idle);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = VtiPipeline::new(PipelineConfig::new().with_filter_window(0));
        assert!(matches!(result, Err(VtiError::Config(_))));
    }

    #[test]
    fn test_concrete_scenario() {
        let mut pipeline = VtiPipeline::new(unfiltered()).unwrap();

        for _ in 0..4 {
            pipeline.on_sample(0.2).unwrap();
        }
        assert_eq!(pipeline.detector_state(), DetectorState::Idle);
        let outcome = pipeline.on_sample(0.2).unwrap();
        assert_eq!(
            outcome,
            SampleOutcome::Processed {
                smoothed: 0.2,
                cycle: Some(CycleOutcome::Started)
            }
        );

        for _ in 0..3 {
            pipeline.on_sample(0.2).unwrap();
        }
        let mut last = None;
        for _ in 0..5 {
            last = Some(pipeline.on_sample(0.05).unwrap());
        }

        assert_eq!(pipeline.detector_state(), DetectorState::Idle);
        assert!((pipeline.vti() - 0.0014).abs() < 1e-12);
        match last {
            Some(SampleOutcome::Processed {
                cycle: Some(CycleOutcome::Completed { sample_count, .. }),
                ..
            }) => assert_eq!(sample_count, 8),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_downsampling_gates_processing() {
        let config = unfiltered().with_downsample_factor(3);
        let mut pipeline = VtiPipeline::new(config).unwrap();

        let kept: Vec<usize> = (1..=9)
            .filter(|_| {
                !matches!(pipeline.on_sample(0.1).unwrap(), SampleOutcome::Discarded)
            })
            .collect();
        assert_eq!(kept, vec![3, 6, 9]);
    }

    #[test]
    fn test_independent_mode_smooths_every_sample() {
        let config = PipelineConfig::new()
            .with_downsample_factor(2)
            .with_filter_window(2)
            .with_downsample_mode(DownsampleMode::Independent);
        let mut pipeline = VtiPipeline::new(config).unwrap();

        assert_eq!(pipeline.on_sample(1.0).unwrap(), SampleOutcome::Discarded);
        // Window holds [1.0, 3.0]
        match pipeline.on_sample(3.0).unwrap() {
            SampleOutcome::Processed { smoothed, .. } => assert!((smoothed - 2.0).abs() < 1e-12),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_gated_mode_only_smooths_kept_samples() {
        let config = PipelineConfig::new()
            .with_downsample_factor(2)
            .with_filter_window(2)
            .with_downsample_mode(DownsampleMode::GatesSmoothing);
        let mut pipeline = VtiPipeline::new(config).unwrap();

        pipeline.on_sample(1.0).unwrap();
        // Window holds [0.0, 3.0]
        match pipeline.on_sample(3.0).unwrap() {
            SampleOutcome::Processed { smoothed, .. } => assert!((smoothed - 1.5).abs() < 1e-12),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_detector_input_selection() {
        // The first smoothed value is 0.2 / 5, well under threshold
        let base = PipelineConfig::new()
            .with_downsample_factor(1)
            .with_confirmation_count(1);

        let mut raw = VtiPipeline::new(base.clone().with_detector_input(DetectorInput::Raw)).unwrap();
        let mut smoothed =
            VtiPipeline::new(base.with_detector_input(DetectorInput::Smoothed)).unwrap();

        raw.on_sample(0.2).unwrap();
        smoothed.on_sample(0.2).unwrap();
        assert_eq!(raw.detector_state(), DetectorState::Ejecting);
        assert_eq!(smoothed.detector_state(), DetectorState::Idle);
    }

    #[test]
    fn test_non_finite_rejected_without_mutation() {
        let mut pipeline = VtiPipeline::new(unfiltered().with_downsample_factor(2)).unwrap();
        pipeline.on_sample(0.3).unwrap();

        assert!(matches!(
            pipeline.on_sample(f64::NAN),
            Err(VtiError::InvalidSample(_))
        ));
        assert!(pipeline.on_sample(f64::INFINITY).is_err());

        // The arrival count did not move: this is still arrival 2
        assert!(matches!(
            pipeline.on_sample(0.3).unwrap(),
            SampleOutcome::Processed { .. }
        ));
    }

    #[test]
    fn test_degenerate_cycle_keeps_previous_vti() {
        let config = unfiltered()
            .with_confirmation_count(1)
            .with_cycle_bounds(CycleBounds::Threshold);
        let mut pipeline = VtiPipeline::new(config).unwrap();

        for v in [0.5, 0.5, 0.0] {
            pipeline.on_sample(v).unwrap();
        }
        let first = pipeline.vti();
        assert!(first > 0.0);

        // One sample above threshold: a single-sample cycle
        pipeline.on_sample(0.5).unwrap();
        let outcome = pipeline.on_sample(0.0).unwrap();
        assert_eq!(
            outcome,
            SampleOutcome::Processed {
                smoothed: 0.0,
                cycle: Some(CycleOutcome::Degenerate { sample_count: 1 })
            }
        );
        assert_eq!(pipeline.vti(), first);
    }

    #[test]
    fn test_each_cycle_replaces_vti() {
        let config = unfiltered().with_confirmation_count(2);
        let mut pipeline = VtiPipeline::new(config).unwrap();

        fn cycle(level: f64, pipeline: &mut VtiPipeline) -> f64 {
            for _ in 0..6 {
                pipeline.on_sample(level).unwrap();
            }
            for _ in 0..2 {
                pipeline.on_sample(0.0).unwrap();
            }
            pipeline.vti()
        }

        let big = cycle(0.8, &mut pipeline);
        let small = cycle(0.2, &mut pipeline);
        assert!(small < big);
        assert!((small - 5.0 * 0.001 * 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let config = unfiltered().with_waveform_capacity(10);
        let mut pipeline = VtiPipeline::new(config).unwrap();

        for _ in 0..10 {
            pipeline.on_sample(0.4).unwrap();
        }
        for _ in 0..5 {
            pipeline.on_sample(0.0).unwrap();
        }
        for _ in 0..7 {
            pipeline.on_sample(0.4).unwrap();
        }
        pipeline.on_sample(0.0).unwrap();
        assert!(pipeline.vti() > 0.0);
        assert_eq!(pipeline.detector_state(), DetectorState::Ejecting);

        assert_eq!(
            pipeline.apply(PipelineEvent::Reset).unwrap(),
            SampleOutcome::Reset
        );
        assert_eq!(pipeline.vti(), 0.0);
        assert_eq!(pipeline.instantaneous_velocity(), 0.0);
        assert_eq!(pipeline.waveform().snapshot(), vec![0.0; 10]);
        assert_eq!(pipeline.start_confirmations(), 0);
        assert_eq!(pipeline.end_confirmations(), 0);
        assert_eq!(pipeline.detector_state(), DetectorState::Idle);
        assert!(pipeline.cycle_buffer().is_empty());
    }

    #[test]
    fn test_snapshot_stroke_volume() {
        let mut pipeline = VtiPipeline::new(unfiltered()).unwrap();
        for v in [0.2; 8].into_iter().chain([0.05; 5]) {
            pipeline.on_sample(v).unwrap();
        }
        let snapshot = pipeline.snapshot(0.01);
        assert!((snapshot.vti_m - 0.0014).abs() < 1e-12);
        assert!((snapshot.stroke_volume_ml - 0.0014 * std::f64::consts::PI * 1e-4 * 1e6).abs() < 1e-9);
        assert!((snapshot.velocity_m_s - 0.05).abs() < 1e-12);
        assert_eq!(snapshot.waveform.len(), 300);
    }
}
