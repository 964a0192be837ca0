//! Integer-factor downsampling by arrival index.

/// Keeps one sample out of every `factor`, counting arrivals from 1.
///
/// A sample is kept iff its 1-based arrival index is a multiple of the
/// factor, so with a factor of 3 the kept samples are the 3rd, 6th, 9th...
#[derive(Debug, Clone)]
pub struct Downsampler {
    factor: usize,
    arrivals: u64,
}

impl Downsampler {
    /// Create a downsampler. A factor of 0 is treated as 1 (keep everything).
    pub fn new(factor: usize) -> Self {
        Self {
            factor: factor.max(1),
            arrivals: 0,
        }
    }

    /// Register one arrival and report whether it is kept
    pub fn accept(&mut self) -> bool {
        self.arrivals += 1;
        self.arrivals % self.factor as u64 == 0
    }

    /// Number of arrivals seen since creation or the last reset
    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn factor(&self) -> usize {
        self.factor
    }

    pub fn reset(&mut self) {
        self.arrivals = 0;
    }
}
