//! Pipeline worker: the single consumer of the command queue.
//!
//! The worker runs on a dedicated thread. Each iteration:
//! 1. Wait (briefly) for the next command.
//! 2. Apply it to the [`VtiPipeline`], the only place pipeline state changes.
//! 3. Publish any resulting cycle reports or transitions.
//!
//! It exits on `Shutdown`, when the running flag is cleared, or when every
//! command sender has been dropped.

use crate::analysis::DetectorState;
use crate::config::PipelineConfig;
use crate::error::{Result, VtiError};
use crate::pipeline::bridge::{PipelineBridge, PipelineCommand, SinkMessage};
use crate::pipeline::processor::{CycleOutcome, SampleOutcome, VtiPipeline};
use crate::pipeline::radius::VesselRadius;
use crate::types::{CollectionStats, CycleReport};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// How long to block on the queue before re-checking the running flag
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Owns the pipeline and applies commands in arrival order.
pub struct PipelineWorker {
    pipeline: VtiPipeline,
    radius: VesselRadius,
    cmd_rx: Receiver<PipelineCommand>,
    msg_tx: Sender<SinkMessage>,
    running: Arc<AtomicBool>,
    stats: CollectionStats,
    /// Publish a snapshot every N kept samples (None = only on request)
    snapshot_every: Option<u64>,
}

impl PipelineWorker {
    pub fn new(
        pipeline: VtiPipeline,
        radius: VesselRadius,
        cmd_rx: Receiver<PipelineCommand>,
        msg_tx: Sender<SinkMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            pipeline,
            radius,
            cmd_rx,
            msg_tx,
            running,
            stats: CollectionStats::default(),
            snapshot_every: None,
        }
    }

    /// Publish a snapshot after every `n` kept samples
    pub fn with_snapshot_every(mut self, n: u64) -> Self {
        self.snapshot_every = (n > 0).then_some(n);
        self
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!(
            "Pipeline worker started (K={}, W={}, T={} m/s, C={}, PRF={} Hz)",
            self.pipeline.config().downsample_factor,
            self.pipeline.config().filter_window,
            self.pipeline.config().ejection_threshold,
            self.pipeline.config().confirmation_count,
            self.pipeline.config().pulse_repetition_frequency_hz,
        );
        tracing::debug!(
            "Detector input: {}, downsampling: {}, cycle bounds: {}",
            self.pipeline.config().detector_input.display_name(),
            self.pipeline.config().downsample_mode.display_name(),
            self.pipeline.config().cycle_bounds.display_name(),
        );

        while self.running.load(Ordering::SeqCst) {
            match self.cmd_rx.recv_timeout(POLL_INTERVAL) {
                Ok(cmd) => self.handle_command(cmd),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("All command senders dropped");
                    self.running.store(false, Ordering::SeqCst);
                }
            }
        }

        self.publish(SinkMessage::Shutdown);
        tracing::info!(
            "Pipeline worker stopped ({} samples, {} cycles)",
            self.stats.samples_received,
            self.stats.cycles_completed
        );
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: PipelineCommand) {
        match cmd {
            PipelineCommand::Sample(value) => self.handle_sample(value),
            PipelineCommand::Reset => {
                let was_ejecting = self.pipeline.detector_state() == DetectorState::Ejecting;
                self.pipeline.on_reset();
                if was_ejecting {
                    self.publish(SinkMessage::DetectorTransition(DetectorState::Idle));
                }
                self.stats.resets += 1;
                tracing::info!("Pipeline reset by transport");
            }
            PipelineCommand::SetRadius(radius_m) => {
                if let Err(e) = self.radius.set(radius_m) {
                    tracing::warn!("Radius update refused: {}", e);
                    self.publish(SinkMessage::RadiusRejected {
                        value: radius_m,
                        reason: e.to_string(),
                    });
                }
            }
            PipelineCommand::RequestSnapshot => self.publish_snapshot(),
            PipelineCommand::RequestStats => {
                self.publish(SinkMessage::Stats(self.stats.clone()));
            }
            PipelineCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn handle_sample(&mut self, value: f64) {
        let outcome = match self.pipeline.on_sample(value) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.stats.samples_rejected += 1;
                self.publish(SinkMessage::SampleRejected {
                    value,
                    reason: e.to_string(),
                });
                return;
            }
        };
        self.stats.samples_received += 1;

        let SampleOutcome::Processed { cycle, .. } = outcome else {
            return;
        };
        self.stats.samples_kept += 1;

        match cycle {
            Some(CycleOutcome::Started) => {
                self.publish(SinkMessage::DetectorTransition(DetectorState::Ejecting));
            }
            Some(CycleOutcome::Completed {
                vti_m,
                sample_count,
            }) => {
                self.stats.cycles_completed += 1;
                let radius_m = self.radius.get();
                let report = CycleReport {
                    vti_m,
                    stroke_volume_ml: self.pipeline.stroke_volume_ml(radius_m),
                    sample_count,
                    completed_at: chrono::Utc::now(),
                };
                tracing::info!("Cycle complete: {}", report);
                self.publish(SinkMessage::DetectorTransition(DetectorState::Idle));
                self.publish(SinkMessage::CycleComplete(report));
            }
            Some(CycleOutcome::Degenerate { .. }) => {
                self.stats.degenerate_cycles += 1;
                self.publish(SinkMessage::DetectorTransition(DetectorState::Idle));
            }
            None => {}
        }

        if let Some(n) = self.snapshot_every {
            if self.stats.samples_kept % n == 0 {
                self.publish_snapshot();
            }
        }
    }

    fn publish_snapshot(&mut self) {
        let snapshot = self.pipeline.snapshot(self.radius.get());
        self.publish(SinkMessage::Snapshot(snapshot));
    }

    /// Send without blocking; a full queue drops the message rather than
    /// stalling the sample stream.
    fn publish(&mut self, msg: SinkMessage) {
        match self.msg_tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.stats.dropped_messages += 1;
                if self.stats.dropped_messages == 1 || self.stats.dropped_messages % 1000 == 0 {
                    tracing::warn!(
                        "Message queue full, {} messages dropped",
                        self.stats.dropped_messages
                    );
                }
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Statistics so far
    pub fn stats(&self) -> &CollectionStats {
        &self.stats
    }
}

/// A worker running on its own thread
pub struct PipelineHandle {
    pub bridge: PipelineBridge,
    pub running: Arc<AtomicBool>,
    pub thread: JoinHandle<()>,
}

impl PipelineHandle {
    /// Ask the worker to stop and wait for it
    pub fn shutdown(self) -> Result<()> {
        self.bridge.shutdown();
        self.thread
            .join()
            .map_err(|_| VtiError::Channel("Pipeline worker panicked".to_string()))
    }
}

/// Build a pipeline and spawn its worker thread.
pub fn spawn_pipeline(
    config: PipelineConfig,
    radius: VesselRadius,
    snapshot_every: Option<u64>,
) -> Result<PipelineHandle> {
    let pipeline = VtiPipeline::new(config)?;
    let (bridge, cmd_rx, msg_tx) = PipelineBridge::new(radius.clone());
    let running = Arc::new(AtomicBool::new(true));

    let mut worker = PipelineWorker::new(pipeline, radius, cmd_rx, msg_tx, running.clone());
    if let Some(n) = snapshot_every {
        worker = worker.with_snapshot_every(n);
    }

    let thread = std::thread::Builder::new()
        .name("vti-pipeline".to_string())
        .spawn(move || worker.run())?;

    Ok(PipelineHandle {
        bridge,
        running,
        thread,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::bridge::MSG_CHANNEL_CAPACITY;

    fn worker_with(config: PipelineConfig) -> (PipelineWorker, PipelineBridge) {
        let radius = VesselRadius::default();
        let (bridge, cmd_rx, msg_tx) = PipelineBridge::new(radius.clone());
        let pipeline = VtiPipeline::new(config).unwrap();
        let worker = PipelineWorker::new(
            pipeline,
            radius,
            cmd_rx,
            msg_tx,
            Arc::new(AtomicBool::new(true)),
        );
        (worker, bridge)
    }

    #[test]
    fn test_worker_processes_queue_then_stops() {
        let config = PipelineConfig::new()
            .with_downsample_factor(1)
            .with_filter_window(1);
        let (mut worker, bridge) = worker_with(config);

        for v in [0.2; 8].into_iter().chain([0.05; 5]) {
            bridge.send_sample(v);
        }
        bridge.shutdown();
        worker.run();

        let msgs = bridge.drain();
        let report = msgs
            .iter()
            .find_map(|m| match m {
                SinkMessage::CycleComplete(r) => Some(r.clone()),
                _ => None,
            })
            .expect("cycle report");
        assert!((report.vti_m - 0.0014).abs() < 1e-12);
        assert_eq!(report.sample_count, 8);
        assert!(matches!(msgs.last(), Some(SinkMessage::Shutdown)));
        assert_eq!(worker.stats().cycles_completed, 1);
        assert_eq!(worker.stats().samples_received, 13);
    }

    #[test]
    fn test_rejected_sample_reported() {
        let (mut worker, bridge) = worker_with(PipelineConfig::default());
        bridge.send_sample(f64::NAN);
        bridge.shutdown();
        worker.run();

        let msgs = bridge.drain();
        assert!(msgs
            .iter()
            .any(|m| matches!(m, SinkMessage::SampleRejected { .. })));
        assert_eq!(worker.stats().samples_rejected, 1);
        assert_eq!(worker.stats().samples_received, 0);
    }

    #[test]
    fn test_bad_radius_reported_and_ignored() {
        let (mut worker, bridge) = worker_with(PipelineConfig::default());
        bridge.set_radius(-3.0);
        bridge.set_radius(0.012);
        bridge.shutdown();
        worker.run();

        assert_eq!(bridge.vessel_radius(), 0.012);
        assert!(bridge
            .drain()
            .iter()
            .any(|m| matches!(m, SinkMessage::RadiusRejected { value, .. } if *value == -3.0)));
    }

    #[test]
    fn test_worker_stops_when_senders_dropped() {
        let (mut worker, bridge) = worker_with(PipelineConfig::default());
        let msg_rx = bridge.msg_rx.clone();
        drop(bridge);
        worker.run();
        assert!(matches!(msg_rx.try_recv(), Ok(SinkMessage::Shutdown)));
    }

    #[test]
    fn test_periodic_snapshots() {
        let config = PipelineConfig::new().with_downsample_factor(1);
        let (worker, bridge) = worker_with(config);
        let mut worker = worker.with_snapshot_every(2);
        for _ in 0..6 {
            bridge.send_sample(0.1);
        }
        bridge.shutdown();
        worker.run();

        let snapshots = bridge
            .drain()
            .into_iter()
            .filter(|m| matches!(m, SinkMessage::Snapshot(_)))
            .count();
        assert_eq!(snapshots, 3);
    }

    #[test]
    fn test_full_message_queue_does_not_block_exit() {
        let config = PipelineConfig::new().with_downsample_factor(1);
        let (worker, bridge) = worker_with(config);
        let mut worker = worker.with_snapshot_every(1);
        for _ in 0..1500 {
            bridge.send_sample(0.1);
        }
        bridge.shutdown();
        // Nothing drains the queue while the worker runs
        worker.run();

        assert_eq!(bridge.drain().len(), MSG_CHANNEL_CAPACITY);
        // 1500 snapshots plus the final Shutdown, minus what fitted
        assert_eq!(
            worker.stats().dropped_messages,
            (1500 + 1 - MSG_CHANNEL_CAPACITY) as u64
        );
    }

    #[test]
    fn test_reset_mid_ejection_publishes_idle() {
        let config = PipelineConfig::new()
            .with_downsample_factor(1)
            .with_filter_window(1);
        let (mut worker, bridge) = worker_with(config);
        for _ in 0..7 {
            bridge.send_sample(0.3);
        }
        bridge.reset();
        // Already idle: no second transition
        bridge.reset();
        bridge.shutdown();
        worker.run();

        let transitions: Vec<_> = bridge
            .drain()
            .into_iter()
            .filter_map(|m| match m {
                SinkMessage::DetectorTransition(state) => Some(state),
                _ => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec![DetectorState::Ejecting, DetectorState::Idle]
        );
        assert_eq!(worker.stats().resets, 2);
    }
}
