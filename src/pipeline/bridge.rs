//! Thread boundary between the transport, the pipeline worker, and the display.
//!
//! Every mutation of pipeline state travels as a [`PipelineCommand`] over a
//! single bounded channel, so deliveries from any number of transport
//! threads are serialized in arrival order before they reach the core.
//! Results come back as [`SinkMessage`]s.

use crate::analysis::DetectorState;
use crate::pipeline::radius::VesselRadius;
use crate::types::{CollectionStats, CycleReport, PipelineSnapshot};
use crossbeam_channel::{bounded, Receiver, Sender};

/// Messages sent from the pipeline worker to the presentation side.
#[derive(Debug, Clone)]
pub enum SinkMessage {
    /// A cycle ended and produced a new VTI.
    CycleComplete(CycleReport),

    /// The detector changed state.
    DetectorTransition(DetectorState),

    /// Response to `RequestSnapshot`, or a periodic snapshot.
    Snapshot(PipelineSnapshot),

    /// A sample was refused without touching pipeline state.
    SampleRejected { value: f64, reason: String },

    /// A radius update was refused; the previous radius stands.
    RadiusRejected { value: f64, reason: String },

    /// Response to `RequestStats`.
    Stats(CollectionStats),

    /// Worker is shutting down.
    Shutdown,
}

/// Commands sent to the pipeline worker.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineCommand {
    /// One decoded velocity sample (m/s).
    Sample(f64),
    /// Transport discontinuity: return the pipeline to its initial state.
    Reset,
    /// Replace the vessel radius (m).
    SetRadius(f64),
    /// Ask for a `Snapshot` message.
    RequestSnapshot,
    /// Ask for a `Stats` message.
    RequestStats,
    /// Stop the worker thread.
    Shutdown,
}

/// Channel capacity for commands (transport/UI → pipeline).
/// 4096 samples ≈ 4s of raw input at 1kHz.
pub const CMD_CHANNEL_CAPACITY: usize = 4096;
/// Channel capacity for messages (pipeline → UI).
pub const MSG_CHANNEL_CAPACITY: usize = 1024;

/// Caller-side handle for communicating with the pipeline worker.
pub struct PipelineBridge {
    pub cmd_tx: Sender<PipelineCommand>,
    pub msg_rx: Receiver<SinkMessage>,
    radius: VesselRadius,
}

impl PipelineBridge {
    /// Create a new bridge: `(bridge, cmd_rx, msg_tx)`.
    ///
    /// The worker owns `cmd_rx` and `msg_tx`. `radius` is the handle shared
    /// with the worker.
    pub fn new(radius: VesselRadius) -> (Self, Receiver<PipelineCommand>, Sender<SinkMessage>) {
        let (cmd_tx, cmd_rx) = bounded(CMD_CHANNEL_CAPACITY);
        let (msg_tx, msg_rx) = bounded(MSG_CHANNEL_CAPACITY);
        (
            Self {
                cmd_tx,
                msg_rx,
                radius,
            },
            cmd_rx,
            msg_tx,
        )
    }

    // --- Drain messages ---

    /// Drain all pending messages.
    pub fn drain(&self) -> Vec<SinkMessage> {
        let mut msgs = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            msgs.push(msg);
        }
        msgs
    }

    /// Try to receive a single message without blocking.
    pub fn try_recv(&self) -> Option<SinkMessage> {
        self.msg_rx.try_recv().ok()
    }

    // --- Commands ---

    pub fn send_command(&self, cmd: PipelineCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    /// Another sender onto the same ordered queue, for transport threads.
    pub fn command_sender(&self) -> Sender<PipelineCommand> {
        self.cmd_tx.clone()
    }

    pub fn send_sample(&self, velocity_m_s: f64) -> bool {
        self.send_command(PipelineCommand::Sample(velocity_m_s))
    }

    pub fn reset(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::Reset);
    }

    pub fn set_radius(&self, radius_m: f64) {
        let _ = self.cmd_tx.send(PipelineCommand::SetRadius(radius_m));
    }

    pub fn request_snapshot(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::RequestSnapshot);
    }

    pub fn request_stats(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::RequestStats);
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::Shutdown);
    }

    /// Current vessel radius (m), read directly from the shared handle.
    pub fn vessel_radius(&self) -> f64 {
        self.radius.get()
    }
}
