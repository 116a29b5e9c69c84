//! Stream player - writes a sample buffer to an output stream
//!
//! Timed playback writes the buffer once. Continuous playback writes it
//! over and over, checking a [`StopSignal`] after each write, so stopping
//! takes at most one more buffer write.
//!
//! Every call opens its own stream through a [`PlaybackSession`], which
//! closes the stream exactly once on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::buffer::SampleBuffer;
use crate::audio::{AudioOutput, OutputStream, StreamParams};
use crate::error::{Result, SoundError};

/// How a buffer is played
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlaybackMode {
    /// One write, then stop
    Timed,
    /// Repeat until the stop signal is set
    Continuous,
}

/// Cross-thread stop flag polled by continuous playback
///
/// `stop` stores with `Release` and `is_stopped` loads with `Acquire`, so a
/// stop is visible to the polling thread by the end of its current write.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// An open output stream that is closed exactly once
///
/// Call [`finish`](Self::finish) to close and see the close result. If the
/// session is dropped first (early return, panic), the stream is closed in
/// `Drop` and a close failure is logged.
pub struct PlaybackSession<S: OutputStream> {
    stream: Option<S>,
}

impl<S: OutputStream> PlaybackSession<S> {
    /// Open a stream on `output`
    pub fn open<O>(output: &O, params: StreamParams) -> Result<Self>
    where
        O: AudioOutput<Stream = S>,
    {
        let stream = output.open_output(params)?;
        log::debug!(
            "Opened output stream ({} Hz, {} ch)",
            params.sample_rate,
            params.channels
        );
        Ok(Self {
            stream: Some(stream),
        })
    }

    pub fn write(&mut self, samples: &[f32]) -> Result<()> {
        match self.stream.as_mut() {
            Some(stream) => stream.write(samples),
            None => Err(SoundError::device("stream already closed")),
        }
    }

    /// Close the stream and report the close result
    pub fn finish(mut self) -> Result<()> {
        match self.stream.take() {
            Some(mut stream) => stream.close(),
            None => Ok(()),
        }
    }
}

impl<S: OutputStream> Drop for PlaybackSession<S> {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close() {
                log::error!("Failed to close output stream: {}", e);
            }
        }
    }
}

/// Plays sample buffers on an audio output
pub struct StreamPlayer<'a, O: AudioOutput> {
    output: &'a O,
}

impl<'a, O: AudioOutput> StreamPlayer<'a, O> {
    pub fn new(output: &'a O) -> Self {
        Self { output }
    }

    /// Play `buffer` on a fresh mono stream at the buffer's sample rate
    ///
    /// Returns the number of buffer writes performed.
    ///
    /// # Errors
    /// `DeviceError` if the stream cannot be opened, a write fails, or the
    /// stream fails to close after a successful run. The stream is closed in
    /// every case; a write error takes precedence over a close error.
    pub fn play(
        &self,
        buffer: &SampleBuffer,
        mode: PlaybackMode,
        stop: &StopSignal,
    ) -> Result<usize> {
        if buffer.is_empty() {
            return Err(SoundError::invalid("cannot play an empty buffer"));
        }
        let mut session = PlaybackSession::open(self.output, StreamParams::mono(buffer.sample_rate()))?;

        let written = Self::write_loop(&mut session, buffer, mode, stop);

        match written {
            Ok(writes) => {
                session.finish()?;
                log::debug!("Playback finished after {} writes", writes);
                Ok(writes)
            }
            Err(e) => {
                log::error!("Playback write failed: {}", e);
                // Drop closes the stream; the write error is the one reported
                drop(session);
                Err(e)
            }
        }
    }

    fn write_loop(
        session: &mut PlaybackSession<O::Stream>,
        buffer: &SampleBuffer,
        mode: PlaybackMode,
        stop: &StopSignal,
    ) -> Result<usize> {
        let mut writes = 0;
        loop {
            session.write(buffer.samples())?;
            writes += 1;

            if mode == PlaybackMode::Timed || stop.is_stopped() {
                return Ok(writes);
            }
        }
    }
}
