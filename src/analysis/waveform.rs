//! Waveform view - amplitude against time

use super::plot::{Plot, Series};
use crate::audio::RecordedClip;
use crate::error::{Result, SoundError};

/// Series name for a channel
pub(super) fn channel_name(channels: u16, index: usize) -> String {
    match (channels, index) {
        (1, _) => "signal".to_string(),
        (2, 0) => "left".to_string(),
        (2, 1) => "right".to_string(),
        (_, i) => format!("channel {}", i + 1),
    }
}

/// Build the waveform plot of a clip
///
/// With `shorten = Some(n)` only the first `frames / n` frames are shown,
/// which zooms in on the start of the recording so individual periods are
/// visible. Times stay true to the recording.
///
/// # Errors
/// `InvalidParameter` if `shorten` is zero.
pub fn waveform_plot(clip: &RecordedClip, shorten: Option<usize>) -> Result<Plot> {
    let factor = match shorten {
        Some(0) => return Err(SoundError::invalid("shortening factor must be at least 1")),
        Some(n) => n,
        None => 1,
    };

    let shown = clip.frames() / factor;
    let rate = clip.sample_rate as f64;

    let mut plot = Plot::new("Audio Waveform", "Time", "Amplitude");
    for index in 0..clip.channels as usize {
        let points = clip
            .channel(index)
            .into_iter()
            .take(shown)
            .enumerate()
            .map(|(i, sample)| [i as f64 / rate, sample as f64])
            .collect();
        plot.add_series(Series::new(channel_name(clip.channels, index), points));
    }

    log::debug!(
        "Waveform plot: {} channels, {} of {} frames",
        clip.channels,
        shown,
        clip.frames()
    );
    Ok(plot)
}
