//! WAV file playback
//!
//! Streams a clip to the output a chunk of [`SAMPLES_PER_FRAME`] frames at
//! a time, at the clip's own rate and channel count.

use std::path::Path;

use cpal::Sample;

use super::wav::RecordedClip;
use super::{AudioOutput, StreamParams, SAMPLES_PER_FRAME};
use crate::error::{Result, SoundError};
use crate::synth::PlaybackSession;

/// Play a WAV file on `output`
pub fn play_file<O: AudioOutput>(output: &O, path: impl AsRef<Path>) -> Result<()> {
    let clip = RecordedClip::load(path)?;
    play_clip(output, &clip).map(|_| ())
}

/// Play a clip, returning the number of chunks written
pub fn play_clip<O: AudioOutput>(output: &O, clip: &RecordedClip) -> Result<usize> {
    if clip.channels == 0 {
        return Err(SoundError::invalid("clip has no channels"));
    }

    let params = StreamParams {
        sample_rate: clip.sample_rate,
        channels: clip.channels,
    };
    let mut session = PlaybackSession::open(output, params)?;

    let chunk_len = SAMPLES_PER_FRAME * clip.channels as usize;
    let mut scratch = Vec::with_capacity(chunk_len);
    let mut chunks = 0;

    for chunk in clip.samples.chunks(chunk_len) {
        scratch.clear();
        scratch.extend(chunk.iter().map(|&s| f32::from_sample(s)));
        // On error the session closes the stream as it drops
        session.write(&scratch)?;
        chunks += 1;
    }

    session.finish()?;
    log::info!(
        "Played {} chunks ({:.2}s)",
        chunks,
        clip.duration_seconds()
    );
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::MockOutput;

    #[test]
    fn test_plays_in_frame_chunks() {
        let output = MockOutput::new();
        // 2.5 chunks of stereo audio
        let frames = SAMPLES_PER_FRAME * 5 / 2;
        let clip = RecordedClip::new(2, 22_050, vec![i16::MIN; frames * 2]);

        let chunks = play_clip(&output, &clip).unwrap();

        assert_eq!(chunks, 3);
        let log = output.log.lock().unwrap();
        assert_eq!(
            log.opened,
            vec![StreamParams {
                sample_rate: 22_050,
                channels: 2
            }]
        );
        assert_eq!(
            log.transfers,
            vec![SAMPLES_PER_FRAME * 2, SAMPLES_PER_FRAME * 2, SAMPLES_PER_FRAME]
        );
        assert!(log.written.iter().all(|&s| s == -1.0));
        assert_eq!(log.closed, 1);
    }

    #[test]
    fn test_empty_clip_opens_and_closes() {
        let output = MockOutput::new();
        let clip = RecordedClip::new(1, 44_100, Vec::new());
        assert_eq!(play_clip(&output, &clip).unwrap(), 0);
        assert_eq!(output.closes(), 1);
    }

    #[test]
    fn test_write_failure_still_closes() {
        let output = MockOutput {
            fail_on_write: Some(2),
            ..MockOutput::new()
        };
        let clip = RecordedClip::new(1, 44_100, vec![0; SAMPLES_PER_FRAME * 3]);

        assert!(play_clip(&output, &clip).is_err());
        assert_eq!(output.writes(), 1);
        assert_eq!(output.closes(), 1);
    }
}
