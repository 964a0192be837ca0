//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use std::time::Duration;
use vti_monitor::pipeline::{PipelineBridge, SinkMessage};

/// How long integration tests wait on the worker before giving up
pub fn test_timeout() -> Duration {
    Duration::from_secs(2)
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Collect messages until `Shutdown` arrives or the timeout passes
pub fn collect_until_shutdown(bridge: &PipelineBridge) -> Vec<SinkMessage> {
    let mut msgs = Vec::new();
    while let Ok(msg) = bridge.msg_rx.recv_timeout(test_timeout()) {
        let done = matches!(msg, SinkMessage::Shutdown);
        msgs.push(msg);
        if done {
            break;
        }
    }
    msgs
}

/// Wait for the next message matching `pred`
pub fn wait_for<F>(bridge: &PipelineBridge, mut pred: F) -> Option<SinkMessage>
where
    F: FnMut(&SinkMessage) -> bool,
{
    while let Ok(msg) = bridge.msg_rx.recv_timeout(test_timeout()) {
        if pred(&msg) {
            return Some(msg);
        }
    }
    None
}
