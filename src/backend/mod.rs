//! Transport side of the monitor
//!
//! The sensor link delivers textual velocity frames. This module turns a
//! stream of frames into pipeline commands on the transport thread, so the
//! worker only ever sees decoded samples and resets.
//!
//! # Components
//!
//! - [`VelocitySource`] - Anything that yields raw frames until the link ends
//! - [`LineSource`] - One frame per line from a buffered reader
//! - [`pump`] - Decode frames and forward them to the worker, resetting on disconnect
//! - [`MockSensor`] - Synthetic ejection waveform (feature-gated)
//!
//! # Example
//!
//! ```ignore
//! use vti_monitor::backend::{pump, LineSource};
//! use vti_monitor::pipeline::{spawn_pipeline, VesselRadius};
//! use vti_monitor::config::PipelineConfig;
//!
//! let handle = spawn_pipeline(PipelineConfig::default(), VesselRadius::default(), None)?;
//! let commands = handle.bridge.command_sender();
//!
//! let mut source = LineSource::new(std::io::stdin().lock());
//! pump(&mut source, &commands)?;
//! ```

pub mod frame;
#[cfg(feature = "mock-sensor")]
pub mod mock_sensor;
pub mod source;

pub use frame::{decode_velocity_frame, encode_velocity_frame};
#[cfg(feature = "mock-sensor")]
pub use mock_sensor::MockSensor;
pub use source::{pump, LineSource, PumpStats, VelocitySource};
