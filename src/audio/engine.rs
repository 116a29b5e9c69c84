//! Audio engine - blocking cpal output streams
//!
//! cpal pulls samples from a callback on its own thread. To give callers
//! a blocking `write`, samples go through a lock-free SPSC ring buffer:
//! `write` pushes and sleeps while the ring is full, the callback pops and
//! outputs silence when it is empty.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};

use super::device::output_device;
use super::{AudioOutput, OutputStream, StreamParams};
use crate::error::{Result, SoundError};

/// Ring buffer length in seconds of audio
const RING_SECONDS: f32 = 0.25;

/// Sleep between retries while the ring is full (write) or empty (read)
pub(super) const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Time allowed for the device to consume what is left in the ring on close,
/// on top of the ring's own length
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Device-side buffer still playing after the ring is empty
const DRAIN_TAIL: Duration = Duration::from_millis(50);

/// Latches the first error reported by a cpal error callback
#[derive(Clone, Default)]
pub(super) struct FailureLatch {
    message: Arc<Mutex<Option<String>>>,
}

impl FailureLatch {
    pub(super) fn set(&self, err: impl std::fmt::Display) {
        log::error!("Audio stream error: {}", err);
        if let Ok(mut message) = self.message.lock() {
            message.get_or_insert_with(|| err.to_string());
        }
    }

    pub(super) fn check(&self) -> Result<()> {
        let message = self.message.lock().ok().and_then(|m| m.clone());
        match message {
            Some(msg) => Err(SoundError::DeviceError(msg)),
            None => Ok(()),
        }
    }
}

/// Ring capacity in samples for a stream
pub(super) fn ring_capacity(params: StreamParams, seconds: f32) -> usize {
    let frames = (params.sample_rate as f32 * seconds) as usize;
    (frames * params.channels as usize).max(1024)
}

/// Fill a device buffer from the ring, padding with silence
fn fill_output<T: Sample + FromSample<f32>>(data: &mut [T], consumer: &mut HeapCons<f32>) {
    for sample in data.iter_mut() {
        *sample = match consumer.try_pop() {
            Some(value) => T::from_sample(value),
            None => T::EQUILIBRIUM,
        };
    }
}

fn build_output<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut consumer: HeapCons<f32>,
    failure: FailureLatch,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| fill_output(data, &mut consumer),
            move |err| failure.set(err),
            None,
        )
        .map_err(SoundError::device)
}

/// Output through cpal's default host
///
/// Opens the named output device, or the system default when no name is set.
#[derive(Clone, Debug, Default)]
pub struct CpalOutput {
    device_name: Option<String>,
}

impl CpalOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }
}

impl AudioOutput for CpalOutput {
    type Stream = CpalOutputStream;

    fn open_output(&self, params: StreamParams) -> Result<Self::Stream> {
        let device = output_device(self.device_name.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        log::info!("Using output device: {}", device_name);

        // The device's native sample format; rate and channels are ours
        let sample_format = device
            .default_output_config()
            .map_err(SoundError::device)?
            .sample_format();
        log::debug!("Sample format: {:?}", sample_format);

        let config = cpal::StreamConfig {
            channels: params.channels,
            sample_rate: cpal::SampleRate(params.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let ring = HeapRb::<f32>::new(ring_capacity(params, RING_SECONDS));
        let (producer, consumer) = ring.split();
        let failure = FailureLatch::default();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_output::<f32>(&device, &config, consumer, failure.clone()),
            cpal::SampleFormat::I16 => build_output::<i16>(&device, &config, consumer, failure.clone()),
            cpal::SampleFormat::U16 => build_output::<u16>(&device, &config, consumer, failure.clone()),
            cpal::SampleFormat::I32 => build_output::<i32>(&device, &config, consumer, failure.clone()),
            format => Err(SoundError::device(format!(
                "Unsupported sample format: {:?}",
                format
            ))),
        }?;

        stream.play().map_err(SoundError::device)?;

        Ok(CpalOutputStream {
            stream: Some(stream),
            producer,
            failure,
            params,
        })
    }
}

/// A playing cpal output stream fed through a ring buffer
pub struct CpalOutputStream {
    /// Kept alive while the stream should keep playing
    stream: Option<cpal::Stream>,
    /// Write end of the ring the callback drains
    producer: HeapProd<f32>,
    /// First error from the cpal error callback
    failure: FailureLatch,
    /// Layout the stream was opened with, for logging
    params: StreamParams,
}

impl CpalOutputStream {
    /// Wait until the callback has consumed everything in the ring
    fn drain(&self) -> Result<()> {
        let deadline = Instant::now() + Duration::from_secs_f32(RING_SECONDS) + DRAIN_GRACE;
        while self.producer.occupied_len() > 0 {
            self.failure.check()?;
            if Instant::now() >= deadline {
                log::warn!(
                    "Output did not drain, dropping {} samples",
                    self.producer.occupied_len()
                );
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }
        thread::sleep(DRAIN_TAIL);
        Ok(())
    }
}

impl OutputStream for CpalOutputStream {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        if self.stream.is_none() {
            return Err(SoundError::device("output stream is closed"));
        }

        let mut pending = samples;
        while !pending.is_empty() {
            self.failure.check()?;
            let pushed = self.producer.push_slice(pending);
            pending = &pending[pushed..];
            if pushed == 0 {
                thread::sleep(POLL_INTERVAL);
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };

        let drained = self.drain();
        let paused = stream.pause().map_err(SoundError::device);
        drop(stream);
        log::debug!(
            "Closed output stream ({} Hz, {} ch)",
            self.params.sample_rate,
            self.params.channels
        );

        drained.and(paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_output_pads_with_silence() {
        let (mut producer, mut consumer) = HeapRb::<f32>::new(8).split();
        producer.push_slice(&[0.5, -0.5]);

        let mut data = [1.0f32; 4];
        fill_output(&mut data, &mut consumer);
        assert_eq!(data, [0.5, -0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_fill_output_converts_format() {
        let (mut producer, mut consumer) = HeapRb::<f32>::new(8).split();
        producer.push_slice(&[1.0, 0.0]);

        let mut data = [7i16; 3];
        fill_output(&mut data, &mut consumer);
        assert_eq!(data, [i16::MAX, 0, 0]);
    }

    #[test]
    fn test_ring_capacity() {
        assert_eq!(ring_capacity(StreamParams::mono(44_100), 0.25), 11_025);
        let stereo = StreamParams {
            sample_rate: 44_100,
            channels: 2,
        };
        assert_eq!(ring_capacity(stereo, 0.25), 22_050);
        assert_eq!(ring_capacity(StreamParams::mono(100), 0.25), 1024);
    }

    #[test]
    fn test_failure_latch_keeps_first_error() {
        let latch = FailureLatch::default();
        assert!(latch.check().is_ok());
        latch.set("device unplugged");
        latch.set("second");
        match latch.check() {
            Err(SoundError::DeviceError(msg)) => assert_eq!(msg, "device unplugged"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
