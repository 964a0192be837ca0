//! Ejection-cycle detector
//!
//! A two-state hysteresis machine over a velocity stream. A transition is
//! committed only after `confirmation_count` consecutive qualifying samples:
//!
//! ```text
//!            C samples >= T
//!   Idle  ───────────────────►  Ejecting
//!         ◄───────────────────
//!            C samples <  T   (cycle emitted)
//! ```
//!
//! While `Ejecting`, every sample is appended to the cycle buffer. The buffer
//! is non-empty exactly when the state is `Ejecting`; it is taken whole when a
//! cycle ends and dropped on reset.

use crate::config::CycleBounds;
use serde::{Deserialize, Serialize};

/// Detector state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DetectorState {
    /// Waiting for a confirmed rise above threshold
    #[default]
    Idle,
    /// Inside an ejection cycle, accumulating samples
    Ejecting,
}

impl std::fmt::Display for DetectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorState::Idle => write!(f, "idle"),
            DetectorState::Ejecting => write!(f, "ejecting"),
        }
    }
}

/// The samples of one finished cycle, ready for integration
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedCycle {
    pub samples: Vec<f64>,
}

/// Transition produced by a single update
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorEvent {
    /// `Idle` → `Ejecting`
    CycleStarted,
    /// `Ejecting` → `Idle`, carrying the cycle to integrate
    CycleEnded(CompletedCycle),
}

/// Hysteresis cycle detector
#[derive(Debug, Clone)]
pub struct CycleDetector {
    threshold: f64,
    confirmation_count: usize,
    bounds: CycleBounds,
    state: DetectorState,
    start_confirmations: usize,
    end_confirmations: usize,
    /// Samples of the current start confirmation run, used as the head of
    /// the cycle under [`CycleBounds::Threshold`]
    start_run: Vec<f64>,
    cycle: Vec<f64>,
}

impl CycleDetector {
    /// Create a detector in the `Idle` state. A confirmation count of 0 is
    /// treated as 1.
    pub fn new(threshold: f64, confirmation_count: usize, bounds: CycleBounds) -> Self {
        let confirmation_count = confirmation_count.max(1);
        Self {
            threshold,
            confirmation_count,
            bounds,
            state: DetectorState::Idle,
            start_confirmations: 0,
            end_confirmations: 0,
            start_run: Vec::with_capacity(confirmation_count),
            cycle: Vec::new(),
        }
    }

    /// Feed one velocity sample
    pub fn update(&mut self, velocity: f64) -> Option<DetectorEvent> {
        match self.state {
            DetectorState::Idle => self.update_idle(velocity),
            DetectorState::Ejecting => self.update_ejecting(velocity),
        }
    }

    fn update_idle(&mut self, velocity: f64) -> Option<DetectorEvent> {
        if velocity >= self.threshold {
            self.start_confirmations += 1;
            self.start_run.push(velocity);
        } else {
            self.start_confirmations = 0;
            self.start_run.clear();
        }

        if self.start_confirmations < self.confirmation_count {
            return None;
        }

        self.cycle.clear();
        match self.bounds {
            CycleBounds::Threshold => self.cycle.append(&mut self.start_run),
            CycleBounds::Hysteresis => {
                self.start_run.clear();
                self.cycle.push(velocity);
            }
        }
        self.start_confirmations = 0;
        self.state = DetectorState::Ejecting;
        tracing::debug!(velocity, "Ejection started");
        Some(DetectorEvent::CycleStarted)
    }

    fn update_ejecting(&mut self, velocity: f64) -> Option<DetectorEvent> {
        self.cycle.push(velocity);
        if velocity < self.threshold {
            self.end_confirmations += 1;
        } else {
            self.end_confirmations = 0;
        }

        if self.end_confirmations < self.confirmation_count {
            return None;
        }

        let mut samples = std::mem::take(&mut self.cycle);
        if self.bounds == CycleBounds::Threshold {
            // The end confirmation run is the last C samples, all below threshold
            samples.truncate(samples.len().saturating_sub(self.confirmation_count));
        }
        self.end_confirmations = 0;
        self.state = DetectorState::Idle;
        tracing::debug!(samples = samples.len(), "Ejection ended");
        Some(DetectorEvent::CycleEnded(CompletedCycle { samples }))
    }

    /// Return to `Idle`, discarding any partial cycle without emitting it
    pub fn reset(&mut self) {
        self.state = DetectorState::Idle;
        self.start_confirmations = 0;
        self.end_confirmations = 0;
        self.start_run.clear();
        self.cycle.clear();
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn start_confirmations(&self) -> usize {
        self.start_confirmations
    }

    pub fn end_confirmations(&self) -> usize {
        self.end_confirmations
    }

    /// Samples accumulated in the current cycle
    pub fn cycle_buffer(&self) -> &[f64] {
        &self.cycle
    }
}
