//! Recording on a dedicated producer thread
//!
//! The thread opens the input stream, then reads fixed-size chunks and
//! appends them to an accumulator until its stop signal is set. Stopping
//! joins the thread, which hands back the accumulator as a [`RecordedClip`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::wav::RecordedClip;
use super::{AudioInput, InputStream, StreamParams, SAMPLES_PER_FRAME};
use crate::error::{Result, SoundError};
use crate::synth::{StopSignal, SAMPLE_RATE};

/// Recording configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordParams {
    /// 1 (mono) or 2 (stereo)
    pub channels: u16,
    pub sample_rate: u32,
    pub frames_per_read: usize,
    /// Input device index, or the default device
    pub device: Option<usize>,
}

impl RecordParams {
    pub fn new(channels: u16) -> Self {
        Self {
            channels,
            ..Self::default()
        }
    }

    pub fn with_device(mut self, device: Option<usize>) -> Self {
        self.device = device;
        self
    }
}

impl Default for RecordParams {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            frames_per_read: SAMPLES_PER_FRAME,
            device: None,
        }
    }
}

/// Starts recordings on an audio input
pub struct Recorder<I: AudioInput + 'static> {
    input: Arc<I>,
}

impl<I: AudioInput + 'static> Recorder<I> {
    pub fn new(input: Arc<I>) -> Self {
        Self { input }
    }

    /// Start recording on a new thread
    ///
    /// # Errors
    /// `InvalidParameter` for a channel count other than 1 or 2 or a zero
    /// chunk size. Device errors surface from [`RecordingHandle::stop`].
    pub fn start(&self, params: RecordParams) -> Result<RecordingHandle> {
        if !(1..=2).contains(&params.channels) {
            return Err(SoundError::invalid(format!(
                "channel count must be 1 or 2, got {}",
                params.channels
            )));
        }
        if params.frames_per_read == 0 {
            return Err(SoundError::invalid("frames per read must be positive"));
        }

        let input = Arc::clone(&self.input);
        let stop = StopSignal::new();
        let thread_stop = stop.clone();

        let thread = thread::Builder::new()
            .name("recorder".to_string())
            .spawn(move || record_until_stopped(input.as_ref(), params, &thread_stop))?;

        log::info!(
            "Recording started ({} ch, {} Hz)",
            params.channels,
            params.sample_rate
        );
        Ok(RecordingHandle { stop, thread })
    }
}

fn record_until_stopped<I: AudioInput>(
    input: &I,
    params: RecordParams,
    stop: &StopSignal,
) -> Result<RecordedClip> {
    let stream_params = StreamParams {
        sample_rate: params.sample_rate,
        channels: params.channels,
    };
    let mut stream = input.open_input(stream_params, params.device)?;

    let mut accumulator = Vec::new();
    let mut outcome = Ok(());
    while !stop.is_stopped() {
        match stream.read(params.frames_per_read) {
            Ok(chunk) => accumulator.extend_from_slice(&chunk),
            Err(e) => {
                log::error!("Recording read failed: {}", e);
                outcome = Err(e);
                break;
            }
        }
    }

    // Close even when a read failed; the read error wins
    let closed = stream.close();
    outcome.and(closed)?;

    Ok(RecordedClip::new(
        params.channels,
        params.sample_rate,
        accumulator,
    ))
}

/// A recording in progress
pub struct RecordingHandle {
    stop: StopSignal,
    thread: JoinHandle<Result<RecordedClip>>,
}

impl RecordingHandle {
    /// Whether the recording thread has already ended (for example on a device error)
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Stop recording and collect what was captured
    pub fn stop(self) -> Result<RecordedClip> {
        self.stop.stop();
        let clip = self
            .thread
            .join()
            .unwrap_or_else(|_| Err(SoundError::device("recorder thread panicked")))?;
        log::info!("Recording stopped after {:.2}s", clip.duration_seconds());
        Ok(clip)
    }
}
