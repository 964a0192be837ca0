//! Synthetic Doppler sensor for running without hardware
//!
//! Generates an aortic-outflow-like velocity trace: a half-sine ejection
//! during systole and a flat diastolic baseline, repeated at the configured
//! heart rate. Frames are produced in the same textual format as the real
//! sensor, so they go through the same decoding path.
//!
//! For a noiseless trace the expected VTI per beat is
//! `2 · peak · systole / π`: about 19 cm with the defaults.
//!
//! # Enabling
//!
//! ```bash
//! cargo run --features mock-sensor -- --mock
//! ```

use crate::backend::frame::encode_velocity_frame;
use crate::backend::source::VelocitySource;
use crate::config::DEFAULT_PRF_HZ;
use crate::error::Result;
use std::f64::consts::PI;
use std::time::Duration;

/// Synthetic velocity source
#[derive(Debug, Clone)]
pub struct MockSensor {
    prf_hz: f64,
    heart_rate_bpm: f64,
    /// Peak ejection velocity (m/s)
    peak_velocity: f64,
    /// Systole duration (s)
    systole_secs: f64,
    /// Diastolic velocity (m/s)
    baseline: f64,
    /// Uniform noise amplitude (m/s), 0 = none
    noise_amplitude: f64,
    /// Stop after this many samples
    limit: Option<u64>,
    /// Sleep one sample interval per frame
    realtime: bool,
    index: u64,
    seed: u64,
}

impl Default for MockSensor {
    fn default() -> Self {
        Self {
            prf_hz: DEFAULT_PRF_HZ,
            heart_rate_bpm: 60.0,
            peak_velocity: 1.0,
            systole_secs: 0.3,
            baseline: 0.0,
            noise_amplitude: 0.0,
            limit: None,
            realtime: false,
            index: 0,
            seed: 0x2545_F491_4F6C_DD1D,
        }
    }
}

impl MockSensor {
    pub fn new(prf_hz: f64) -> Self {
        Self {
            prf_hz,
            ..Default::default()
        }
    }

    pub fn with_heart_rate(mut self, bpm: f64) -> Self {
        self.heart_rate_bpm = bpm;
        self
    }

    pub fn with_peak_velocity(mut self, peak_m_s: f64) -> Self {
        self.peak_velocity = peak_m_s;
        self
    }

    pub fn with_systole(mut self, secs: f64) -> Self {
        self.systole_secs = secs;
        self
    }

    pub fn with_baseline(mut self, baseline_m_s: f64) -> Self {
        self.baseline = baseline_m_s;
        self
    }

    /// Add uniform noise in `[-amplitude, amplitude]`
    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise_amplitude = amplitude;
        self
    }

    /// End the stream after `samples` frames
    pub fn with_limit(mut self, samples: u64) -> Self {
        self.limit = Some(samples);
        self
    }

    /// Pace frames at the PRF instead of producing them as fast as possible
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Beat period in seconds
    pub fn beat_period(&self) -> f64 {
        60.0 / self.heart_rate_bpm
    }

    /// Noiseless velocity at sample `index`
    pub fn velocity_at(&self, index: u64) -> f64 {
        let t = (index as f64 / self.prf_hz) % self.beat_period();
        if t < self.systole_secs {
            self.baseline + self.peak_velocity * (PI * t / self.systole_secs).sin()
        } else {
            self.baseline
        }
    }

    /// Next velocity, with noise applied
    pub fn next_velocity(&mut self) -> f64 {
        let value = self.velocity_at(self.index);
        self.index += 1;
        if self.noise_amplitude > 0.0 {
            value + (self.next_random() - 0.5) * 2.0 * self.noise_amplitude
        } else {
            value
        }
    }

    /// Samples produced so far
    pub fn samples_generated(&self) -> u64 {
        self.index
    }

    /// xorshift64, uniform in [0, 1]
    fn next_random(&mut self) -> f64 {
        let mut s = self.seed;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.seed = s;
        (s as f64) / (u64::MAX as f64)
    }
}

impl VelocitySource for MockSensor {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>> {
        if self.limit.is_some_and(|limit| self.index >= limit) {
            return Ok(None);
        }
        if self.realtime {
            std::thread::sleep(Duration::from_secs_f64(1.0 / self.prf_hz));
        }
        Ok(Some(encode_velocity_frame(self.next_velocity())))
    }
}
