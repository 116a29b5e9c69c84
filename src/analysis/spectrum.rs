//! Frequency spectrum view - FFT magnitude against log frequency

use realfft::RealFftPlanner;

use super::plot::{AxisScale, Plot, Series};
use super::waveform::channel_name;
use crate::audio::{RecordedClip, SAMPLES_PER_FRAME};
use crate::error::{Result, SoundError};

/// Divisor applied to raw FFT magnitudes so int16 material lands in a readable range
pub const MAGNITUDE_SCALE: f64 = 128.0 * SAMPLES_PER_FRAME as f64;

/// Magnitude spectrum of int16 samples
///
/// Returns `(frequency, |X_k| / MAGNITUDE_SCALE)` for bins `1..=n/2`. The
/// DC bin is skipped since a log axis cannot show it.
pub fn magnitude_spectrum(samples: &[i16], sample_rate: u32) -> Result<Vec<[f64; 2]>> {
    let n = samples.len();
    if n < 2 {
        return Err(SoundError::invalid(format!(
            "need at least 2 samples for a spectrum, got {}",
            n
        )));
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut input: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut input, &mut spectrum)
        .map_err(|e| SoundError::invalid(format!("FFT failed: {}", e)))?;

    let bin_hz = sample_rate as f64 / n as f64;
    Ok(spectrum
        .iter()
        .enumerate()
        .skip(1)
        .take(n / 2)
        .map(|(k, c)| [k as f64 * bin_hz, c.norm() / MAGNITUDE_SCALE])
        .collect())
}

/// Build the spectrum plot of a clip, one series per channel
///
/// # Errors
/// `InvalidParameter` if the clip is too short to transform.
pub fn spectrum_plot(clip: &RecordedClip) -> Result<Plot> {
    let nyquist = clip.sample_rate as f64 / 2.0;
    let mut plot = Plot::new("Frequency spectrum", "Frequency (Hz)", "Amplitude")
        .with_x_scale(AxisScale::Log)
        .with_x_range(1.0, nyquist);

    for index in 0..clip.channels as usize {
        let points = magnitude_spectrum(&clip.channel(index), clip.sample_rate)?;
        plot.add_series(Series::new(channel_name(clip.channels, index), points));
    }

    if plot.series.is_empty() {
        return Err(SoundError::invalid("clip has no channels"));
    }
    Ok(plot)
}

/// Frequency of the strongest bin in the first channel
pub fn dominant_frequency(clip: &RecordedClip) -> Result<f64> {
    let spectrum = magnitude_spectrum(&clip.channel(0), clip.sample_rate)?;
    spectrum
        .iter()
        .max_by(|a, b| a[1].total_cmp(&b[1]))
        .map(|p| p[0])
        .ok_or_else(|| SoundError::invalid("empty spectrum"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{generate, WaveShape, SAMPLE_RATE};

    fn to_clip(shape: WaveShape, frequency: f32) -> RecordedClip {
        // 0.25s requested -> one second of samples, so bins are 1 Hz wide
        let buffer = generate(shape, 0.5, frequency, 0.25).unwrap();
        let samples = buffer
            .samples()
            .iter()
            .map(|&s| (s * i16::MAX as f32) as i16)
            .collect();
        RecordedClip::new(1, SAMPLE_RATE, samples)
    }

    #[test]
    fn test_sine_peaks_at_its_frequency() {
        let clip = to_clip(WaveShape::Sine, 441.0);
        assert_eq!(dominant_frequency(&clip).unwrap(), 441.0);
    }

    #[test]
    fn test_square_peaks_at_fundamental() {
        let clip = to_clip(WaveShape::Square, 200.0);
        assert_eq!(dominant_frequency(&clip).unwrap(), 200.0);

        // Odd harmonics carry energy, even ones almost none
        let spectrum = magnitude_spectrum(&clip.samples, clip.sample_rate).unwrap();
        let at = |hz: usize| spectrum[hz - 1][1];
        assert!(at(600) > 10.0 * at(400));
    }

    #[test]
    fn test_spectrum_bins() {
        let samples = vec![0i16; 100];
        let spectrum = magnitude_spectrum(&samples, 1000).unwrap();
        assert_eq!(spectrum.len(), 50);
        assert_eq!(spectrum[0][0], 10.0);
        assert_eq!(spectrum[49][0], 500.0);
        assert!(spectrum.iter().all(|p| p[1] == 0.0));
    }

    #[test]
    fn test_spectrum_plot_layout() {
        let mut samples = Vec::new();
        for i in 0..64 {
            samples.push(i as i16);
            samples.push(-(i as i16));
        }
        let clip = RecordedClip::new(2, 8_000, samples);

        let plot = spectrum_plot(&clip).unwrap();
        assert_eq!(plot.x_scale, AxisScale::Log);
        assert_eq!(plot.x_range, Some((1.0, 4_000.0)));
        assert_eq!(plot.series.len(), 2);
        assert_eq!(plot.series[1].name, "right");
    }

    #[test]
    fn test_empty_clip_rejected() {
        let clip = RecordedClip::new(1, 44_100, Vec::new());
        assert!(matches!(
            spectrum_plot(&clip),
            Err(SoundError::InvalidParameter(_))
        ));
    }
}
