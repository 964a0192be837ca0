//! Moving-average smoothing filter
//!
//! Holds the last `window` input values in a circular buffer pre-filled with
//! zero, so the output ramps up from zero over the first `window` samples
//! rather than averaging a partial window.

/// Fixed-window moving average with an O(1) update.
///
/// A running sum is kept alongside the buffer. Because adding and removing
/// floats accumulates rounding error, the sum is rebuilt from the buffer
/// once per full rotation.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    buffer: Vec<f64>,
    index: usize,
    sum: f64,
}

impl SmoothingFilter {
    /// Create a filter averaging over `window` samples (minimum 1)
    pub fn new(window: usize) -> Self {
        Self {
            buffer: vec![0.0; window.max(1)],
            index: 0,
            sum: 0.0,
        }
    }

    /// Evict the oldest value, insert `value`, and return the new mean
    pub fn update(&mut self, value: f64) -> f64 {
        let evicted = std::mem::replace(&mut self.buffer[self.index], value);
        self.sum += value - evicted;
        self.index = (self.index + 1) % self.buffer.len();

        if self.index == 0 {
            self.sum = self.buffer.iter().sum();
        }

        self.mean()
    }

    /// Current mean of the window
    pub fn mean(&self) -> f64 {
        self.sum / self.buffer.len() as f64
    }

    /// Refill the window with zeros
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
        self.sum = 0.0;
    }
}
