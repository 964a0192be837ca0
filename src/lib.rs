//! # VTI Monitor: Doppler velocity-time integral and stroke volume
//!
//! Turns a live stream of scalar blood-flow velocities from a Doppler sensor
//! into per-heartbeat measurements: the velocity-time integral (VTI) of each
//! ejection cycle and the stroke volume derived from it and the vessel radius.
//!
//! ## Architecture
//!
//! - **Backend**: Reads sensor frames on a transport thread and decodes them
//! - **Pipeline**: A single worker thread owns all pipeline state and applies
//!   samples, resets and radius changes strictly in arrival order
//! - **Analysis**: Downsampler, moving-average filter, rolling waveform,
//!   ejection cycle detector, trapezoidal integrator and derived metrics
//! - **Communication**: Crossbeam channels between transport, worker and display
//!
//! ## Configuration
//!
//! Settings live in `monitor.toml` (or any `.json` file) in the platform
//! config directory under `vti-monitor`:
//!
//! - **Linux**: `~/.config/vti-monitor/`
//! - **macOS**: `~/Library/Application Support/vti-monitor/`
//! - **Windows**: `%APPDATA%\vti-monitor\`
//!
//! ## Example
//!
//! ```ignore
//! use vti_monitor::{
//!     backend::{pump, LineSource},
//!     config::MonitorConfig,
//!     pipeline::{spawn_pipeline, SinkMessage, VesselRadius},
//! };
//!
//! let config = MonitorConfig::load_or_default("monitor.toml");
//! let radius = VesselRadius::new(config.vessel_radius_m)?;
//! let handle = spawn_pipeline(config.pipeline, radius, None)?;
//!
//! let commands = handle.bridge.command_sender();
//! std::thread::spawn(move || pump(&mut LineSource::new(std::io::stdin().lock()), &commands));
//!
//! while let Ok(msg) = handle.bridge.msg_rx.recv() {
//!     if let SinkMessage::CycleComplete(report) = msg {
//!         println!("{}", report);
//!     }
//! }
//! ```

pub mod analysis;
pub mod backend;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use analysis::DetectorState;
pub use backend::{decode_velocity_frame, pump, LineSource, VelocitySource};
pub use config::{MonitorConfig, PipelineConfig};
pub use error::{Result, VtiError};
pub use pipeline::{spawn_pipeline, PipelineBridge, SinkMessage, VesselRadius, VtiPipeline};
pub use types::{CollectionStats, CycleReport, PipelineSnapshot};
