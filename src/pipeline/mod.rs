//! Sample pipeline and its worker thread.
//!
//! Samples flow Downsampler → Smoothing Filter → (Rolling Waveform, Cycle
//! Detector) → Integrator. [`VtiPipeline`] holds all of that state and is
//! owned by a single [`PipelineWorker`] running on a dedicated thread. Every
//! other actor talks to it through crossbeam channels held by a
//! [`PipelineBridge`].

pub mod bridge;
pub mod executor;
pub mod processor;
pub mod radius;

pub use bridge::{PipelineBridge, PipelineCommand, SinkMessage};
pub use executor::{spawn_pipeline, PipelineHandle, PipelineWorker};
pub use processor::{CycleOutcome, PipelineEvent, SampleOutcome, VtiPipeline};
pub use radius::VesselRadius;
