//! Test data builders for velocity streams

/// Builder for a sequence of raw velocity samples
#[derive(Debug, Clone, Default)]
pub struct SampleStream {
    samples: Vec<f64>,
}

impl SampleStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `count` copies of `value`
    pub fn hold(mut self, value: f64, count: usize) -> Self {
        self.samples.extend(std::iter::repeat(value).take(count));
        self
    }

    /// Append one ejection: `above` samples at `peak`, then `below` at `rest`
    pub fn beat(self, peak: f64, above: usize, rest: f64, below: usize) -> Self {
        self.hold(peak, above).hold(rest, below)
    }

    /// Repeat each sample `factor` times, so that a downsampler with the
    /// same factor reproduces the original sequence
    pub fn stretched(self, factor: usize) -> Self {
        Self {
            samples: self
                .samples
                .into_iter()
                .flat_map(|v| std::iter::repeat(v).take(factor))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn build(self) -> Vec<f64> {
        self.samples
    }
}

/// Text frames, one per line, as the sensor link delivers them
pub fn as_frames(samples: &[f64]) -> String {
    samples.iter().map(|v| format!("{}\n", v)).collect()
}
