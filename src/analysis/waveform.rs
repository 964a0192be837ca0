//! Rolling display waveform
//!
//! A fixed-length FIFO of the most recent smoothed velocities for the
//! presentation side. It is always exactly `capacity` long: zero-filled at
//! creation and on reset, and every push drops the oldest point. Nothing in
//! detection or integration reads it.

use std::collections::VecDeque;

/// Fixed-capacity rolling buffer of velocities (m/s)
#[derive(Debug, Clone)]
pub struct RollingWaveform {
    points: VecDeque<f64>,
}

impl RollingWaveform {
    /// Create a zero-filled waveform (capacity minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            points: std::iter::repeat(0.0).take(capacity.max(1)).collect(),
        }
    }

    /// Drop the oldest point and append `value`
    pub fn push(&mut self, value: f64) {
        self.points.pop_front();
        self.points.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest-to-newest iterator
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().copied()
    }

    /// Most recent point
    pub fn latest(&self) -> f64 {
        self.points.back().copied().unwrap_or(0.0)
    }

    /// Owned oldest-to-newest copy for handing across threads
    pub fn snapshot(&self) -> Vec<f64> {
        self.points.iter().copied().collect()
    }

    /// Zero every point
    pub fn reset(&mut self) {
        self.points.iter_mut().for_each(|p| *p = 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefilled_with_zero() {
        let wf = RollingWaveform::new(300);
        assert_eq!(wf.len(), 300);
        assert!(wf.iter().all(|v| v == 0.0));
    }

    #[test]
    fn test_push_drops_oldest() {
        let mut wf = RollingWaveform::new(3);
        wf.push(1.0);
        wf.push(2.0);
        assert_eq!(wf.snapshot(), vec![0.0, 1.0, 2.0]);
        wf.push(3.0);
        wf.push(4.0);
        assert_eq!(wf.snapshot(), vec![2.0, 3.0, 4.0]);
        assert_eq!(wf.latest(), 4.0);
        assert_eq!(wf.len(), 3);
    }

    #[test]
    fn test_capacity_one() {
        let mut wf = RollingWaveform::new(1);
        wf.push(0.5);
        wf.push(0.7);
        assert_eq!(wf.snapshot(), vec![0.7]);
    }

    #[test]
    fn test_reset_keeps_length() {
        let mut wf = RollingWaveform::new(4);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            wf.push(v);
        }
        wf.reset();
        assert_eq!(wf.snapshot(), vec![0.0; 4]);
    }
}
