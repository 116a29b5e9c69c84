//! Synthesizer - overlapping notes on dedicated threads
//!
//! Each continuous note runs a [`StreamPlayer`] on its own thread with its
//! own output stream. All notes of one synthesizer share a single
//! [`StopSignal`], so `stop_all` silences every note together.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::player::{PlaybackMode, StopSignal, StreamPlayer};
use super::waveform::WaveSpec;
use crate::audio::AudioOutput;
use crate::error::{Result, SoundError};

/// Plays timed notes in place and continuous notes on background threads
pub struct Synthesizer<O: AudioOutput + 'static> {
    output: Arc<O>,
    stop: StopSignal,
    voices: Vec<JoinHandle<Result<usize>>>,
}

impl<O: AudioOutput + 'static> Synthesizer<O> {
    pub fn new(output: Arc<O>) -> Self {
        Self {
            output,
            stop: StopSignal::new(),
            voices: Vec::new(),
        }
    }

    /// Play one note to completion on the calling thread
    pub fn play_timed(&self, spec: &WaveSpec) -> Result<()> {
        let buffer = spec.generate()?;
        log::info!(
            "Playing {} {:.1} Hz for {:.2}s ({} samples, peak {:.2})",
            spec.shape,
            spec.frequency,
            buffer.duration_seconds(),
            buffer.len(),
            buffer.peak()
        );
        StreamPlayer::new(self.output.as_ref()).play(&buffer, PlaybackMode::Timed, &self.stop)?;
        Ok(())
    }

    /// Start a continuous note on a new thread
    ///
    /// The buffer is generated before the thread starts, so parameter errors
    /// are reported here rather than from `stop_all`.
    pub fn start_note(&mut self, spec: &WaveSpec) -> Result<()> {
        if self.stop.is_stopped() {
            return Err(SoundError::invalid("synthesizer has already been stopped"));
        }

        let buffer = spec.generate()?;
        let output = Arc::clone(&self.output);
        let stop = self.stop.clone();
        let name = format!("note-{}-{}hz", spec.shape, spec.frequency);

        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || {
                StreamPlayer::new(output.as_ref()).play(&buffer, PlaybackMode::Continuous, &stop)
            })?;

        log::info!(
            "Started {} note at {:.1} Hz ({} voices)",
            spec.shape,
            spec.frequency,
            self.voices.len() + 1
        );
        self.voices.push(handle);
        Ok(())
    }

    /// Number of notes started and not yet joined
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Stop every continuous note and wait for their threads
    ///
    /// Returns the first error any note reported.
    pub fn stop_all(&mut self) -> Result<()> {
        self.stop.stop();

        let mut first_error = None;
        for handle in self.voices.drain(..) {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(SoundError::device("note thread panicked")));
            if let Err(e) = outcome {
                log::warn!("Note ended with error: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<O: AudioOutput + 'static> Drop for Synthesizer<O> {
    fn drop(&mut self) {
        if !self.voices.is_empty() {
            let _ = self.stop_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::MockOutput;
    use crate::synth::WaveShape;
    use std::time::Duration;

    fn slow_output() -> Arc<MockOutput> {
        Arc::new(MockOutput {
            write_delay: Some(Duration::from_millis(1)),
            ..MockOutput::new()
        })
    }

    #[test]
    fn test_notes_overlap_until_stopped() {
        let output = slow_output();
        let mut synth = Synthesizer::new(Arc::clone(&output));

        let a = WaveSpec::new(WaveShape::Sine, 0.4, 440.0, 0.001).unwrap();
        let b = WaveSpec::new(WaveShape::Square, 0.2, 220.0, 0.001).unwrap();
        synth.start_note(&a).unwrap();
        synth.start_note(&b).unwrap();
        assert_eq!(synth.voice_count(), 2);

        std::thread::sleep(Duration::from_millis(10));
        synth.stop_all().unwrap();

        assert_eq!(synth.voice_count(), 0);
        let log = output.log.lock().unwrap();
        assert_eq!(log.opened.len(), 2);
        assert_eq!(log.closed, 2);
        assert!(log.transfers.len() >= 2);
    }

    #[test]
    fn test_timed_note_plays_once() {
        let output = Arc::new(MockOutput::new());
        let synth = Synthesizer::new(Arc::clone(&output));

        let spec = WaveSpec::new(WaveShape::Triangle, 0.3, 100.0, 0.01).unwrap();
        synth.play_timed(&spec).unwrap();

        assert_eq!(output.writes(), 1);
        assert_eq!(output.closes(), 1);
    }

    #[test]
    fn test_note_error_reported_by_stop_all() {
        let output = Arc::new(MockOutput {
            fail_on_write: Some(2),
            ..MockOutput::new()
        });
        let mut synth = Synthesizer::new(Arc::clone(&output));

        let spec = WaveSpec::new(WaveShape::Sine, 0.4, 440.0, 0.001).unwrap();
        synth.start_note(&spec).unwrap();
        std::thread::sleep(Duration::from_millis(10));

        assert!(matches!(synth.stop_all(), Err(SoundError::DeviceError(_))));
        assert_eq!(output.closes(), 1);
    }

    #[test]
    fn test_no_notes_after_stop() {
        let mut synth = Synthesizer::new(slow_output());
        synth.stop_all().unwrap();

        let spec = WaveSpec::new(WaveShape::Sine, 0.4, 440.0, 0.001).unwrap();
        assert!(synth.start_note(&spec).is_err());
    }

    #[test]
    fn test_drop_joins_notes() {
        let output = slow_output();
        {
            let mut synth = Synthesizer::new(Arc::clone(&output));
            let spec = WaveSpec::new(WaveShape::Sine, 0.4, 440.0, 0.001).unwrap();
            synth.start_note(&spec).unwrap();
        }
        assert_eq!(output.closes(), 1);
    }
}
