//! Input capture using cpal
//!
//! The input callback converts whatever the device delivers to int16 and
//! pushes it into a ring buffer. `read` pops from the other end and blocks
//! until a full chunk is available.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};

use super::device::input_device;
use super::engine::{ring_capacity, FailureLatch, POLL_INTERVAL};
use super::{AudioInput, InputStream, StreamParams};
use crate::error::{Result, SoundError};

/// Ring buffer length in seconds of audio
const RING_SECONDS: f32 = 2.0;

/// Push device samples into the ring as int16, counting what does not fit
fn push_input<T>(data: &[T], producer: &mut HeapProd<i16>, overruns: &AtomicUsize)
where
    T: Sample,
    i16: FromSample<T>,
{
    let mut dropped = 0;
    for &sample in data {
        if producer.try_push(i16::from_sample(sample)).is_err() {
            dropped += 1;
        }
    }
    if dropped > 0 {
        overruns.fetch_add(dropped, Ordering::Relaxed);
    }
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut producer: HeapProd<i16>,
    overruns: Arc<AtomicUsize>,
    failure: FailureLatch,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                push_input(data, &mut producer, &overruns)
            },
            move |err| failure.set(err),
            None,
        )
        .map_err(SoundError::device)
}

/// Input through cpal's default host
#[derive(Clone, Copy, Debug, Default)]
pub struct CpalInput;

impl AudioInput for CpalInput {
    type Stream = CpalInputStream;

    fn open_input(&self, params: StreamParams, device: Option<usize>) -> Result<Self::Stream> {
        let device = input_device(device)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        log::info!("Using input device: {}", device_name);

        let sample_format = device
            .default_input_config()
            .map_err(SoundError::device)?
            .sample_format();

        let config = cpal::StreamConfig {
            channels: params.channels,
            sample_rate: cpal::SampleRate(params.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        log::info!(
            "Input stream config: {} Hz, {} channels, {:?}",
            params.sample_rate,
            params.channels,
            sample_format
        );

        let ring = HeapRb::<i16>::new(ring_capacity(params, RING_SECONDS));
        let (producer, consumer) = ring.split();
        let overruns = Arc::new(AtomicUsize::new(0));
        let failure = FailureLatch::default();

        let stream = match sample_format {
            cpal::SampleFormat::I16 => {
                build_input::<i16>(&device, &config, producer, Arc::clone(&overruns), failure.clone())
            }
            cpal::SampleFormat::F32 => {
                build_input::<f32>(&device, &config, producer, Arc::clone(&overruns), failure.clone())
            }
            cpal::SampleFormat::U16 => {
                build_input::<u16>(&device, &config, producer, Arc::clone(&overruns), failure.clone())
            }
            cpal::SampleFormat::I32 => {
                build_input::<i32>(&device, &config, producer, Arc::clone(&overruns), failure.clone())
            }
            format => Err(SoundError::device(format!(
                "Unsupported sample format: {:?}",
                format
            ))),
        }?;

        stream.play().map_err(SoundError::device)?;

        Ok(CpalInputStream {
            stream: Some(stream),
            consumer,
            overruns,
            failure,
            channels: params.channels as usize,
        })
    }
}

/// A running cpal input stream drained through a ring buffer
pub struct CpalInputStream {
    stream: Option<cpal::Stream>,
    consumer: HeapCons<i16>,
    overruns: Arc<AtomicUsize>,
    failure: FailureLatch,
    channels: usize,
}

impl InputStream for CpalInputStream {
    fn read(&mut self, frames: usize) -> Result<Vec<i16>> {
        if self.stream.is_none() {
            return Err(SoundError::device("input stream is closed"));
        }

        let wanted = frames * self.channels;
        let mut chunk = vec![0i16; wanted];
        let mut filled = 0;
        while filled < wanted {
            self.failure.check()?;
            let popped = self.consumer.pop_slice(&mut chunk[filled..]);
            filled += popped;
            if popped == 0 {
                thread::sleep(POLL_INTERVAL);
            }
        }
        Ok(chunk)
    }

    fn close(&mut self) -> Result<()> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };

        let paused = stream.pause().map_err(SoundError::device);
        drop(stream);

        let overruns = self.overruns.load(Ordering::Relaxed);
        if overruns > 0 {
            log::warn!("Input overran, {} samples were dropped", overruns);
        }
        paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_input_converts_to_i16() {
        let (mut producer, mut consumer) = HeapRb::<i16>::new(8).split();
        let overruns = AtomicUsize::new(0);

        push_input(&[0.0f32, -1.0], &mut producer, &overruns);

        let mut out = [0i16; 2];
        assert_eq!(consumer.pop_slice(&mut out), 2);
        assert_eq!(out, [0, i16::MIN]);
        assert_eq!(overruns.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_push_input_counts_overruns() {
        let (mut producer, _consumer) = HeapRb::<i16>::new(4).split();
        let overruns = AtomicUsize::new(0);

        push_input(&[1i16, 2, 3, 4, 5, 6], &mut producer, &overruns);
        assert_eq!(overruns.load(Ordering::Relaxed), 2);
    }
}
