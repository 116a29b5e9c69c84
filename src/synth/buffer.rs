//! Sample buffer produced by the waveform generator
//!
//! A buffer is built once per note and only read afterwards. The samples
//! live behind an `Arc` so a note thread and its caller can share one
//! buffer without copying it.

use std::sync::Arc;

/// Mono f32 samples at a fixed sample rate
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap generated samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// The samples, oldest first
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback time of one full write, in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }
}
