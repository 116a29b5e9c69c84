//! Audio module - device streams, recording and file I/O
//!
//! This module provides:
//! - Blocking stream traits the players and recorder are written against
//! - cpal-backed output and input streams
//! - Input device enumeration and selection
//! - Recording on a producer thread
//! - WAV read/write and file playback

mod capture;
mod device;
mod engine;
mod file_player;
mod recorder;
mod wav;

#[cfg(test)]
pub mod testing;

use crate::error::Result;

// Re-export public types
pub use capture::CpalInput;
pub use device::{list_input_devices, list_output_devices, select_device, DeviceSelection};
pub use engine::CpalOutput;
pub use file_player::play_file;
pub use recorder::{RecordParams, Recorder};
pub use wav::RecordedClip;

/// Frames per read when recording, frames per chunk when playing a file
pub const SAMPLES_PER_FRAME: usize = crate::synth::SAMPLE_RATE as usize / 20;

/// Rate and channel layout of a stream
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StreamParams {
    pub sample_rate: u32,
    pub channels: u16,
}

impl StreamParams {
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
        }
    }
}

/// An open output stream accepting interleaved f32 samples
pub trait OutputStream {
    /// Write samples, blocking until the device has accepted all of them
    fn write(&mut self, samples: &[f32]) -> Result<()>;

    /// Let pending samples play out, then stop and release the device
    fn close(&mut self) -> Result<()>;
}

/// Something that can open output streams
///
/// Shared between note threads, so it must be `Send + Sync`. The streams it
/// opens are used on the thread that opened them.
pub trait AudioOutput: Send + Sync {
    type Stream: OutputStream;

    fn open_output(&self, params: StreamParams) -> Result<Self::Stream>;
}

/// An open input stream delivering interleaved int16 samples
pub trait InputStream {
    /// Read exactly `frames` frames (`frames * channels` samples), blocking until available
    fn read(&mut self, frames: usize) -> Result<Vec<i16>>;

    /// Stop capturing and release the device
    fn close(&mut self) -> Result<()>;
}

/// Something that can open input streams
pub trait AudioInput: Send + Sync {
    type Stream: InputStream;

    /// Open an input stream on the device at `device` (index into
    /// [`list_input_devices`]), or the default input device
    fn open_input(&self, params: StreamParams, device: Option<usize>) -> Result<Self::Stream>;
}
