//! Waveform generator
//!
//! Turns a [`WaveSpec`] into a finite [`SampleBuffer`]. Each shape is a unit
//! generator `fn(phase) -> f32` looked up by the shape's discriminant, so
//! adding a shape means adding one table entry.
//!
//! ## Formulas
//!
//! With `t = index / sample_rate` and `phase = 2π · t · frequency`:
//!
//! - Sine: `a · sin(phase)`
//! - Square: `a · sign(sin(phase))`, with `sign(0) = 0`
//! - Triangle: `a · (2/π) · asin(cos(phase))`

use std::f64::consts::{FRAC_2_PI, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::buffer::SampleBuffer;
use crate::error::{Result, SoundError};

/// Fixed sample rate of every generated buffer (Hz)
pub const SAMPLE_RATE: u32 = 44_100;

/// Generated buffers hold four times the requested duration.
pub const BUFFER_DURATION_FACTOR: f64 = 4.0;

/// Longest buffer `generate` will allocate, in samples. Also the most
/// samples a WAV data chunk can index.
pub const MAX_BUFFER_SAMPLES: usize = u32::MAX as usize;

/// Waveform shapes
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum WaveShape {
    /// Pure tone
    Sine = 0,
    /// Hard ±amplitude step wave
    Square = 1,
    /// Linear ramps between ±amplitude
    Triangle = 2,
}

/// Unit generator: phase in radians -> sample in [-1, 1]
type Generator = fn(f64) -> f32;

/// Indexed by `WaveShape as usize`
static GENERATORS: [Generator; 3] = [unit_sine, unit_square, unit_triangle];

fn unit_sine(phase: f64) -> f32 {
    phase.sin() as f32
}

fn unit_square(phase: f64) -> f32 {
    sign(unit_sine(phase))
}

fn unit_triangle(phase: f64) -> f32 {
    (FRAC_2_PI * phase.cos().asin()) as f32
}

/// Sign with an exact zero, unlike `f32::signum` which maps `0.0` to `1.0`
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl WaveShape {
    /// Get all waveform types
    pub fn all() -> &'static [WaveShape] {
        &[WaveShape::Sine, WaveShape::Square, WaveShape::Triangle]
    }

    /// Get the name of this waveform
    pub fn name(&self) -> &'static str {
        match self {
            WaveShape::Sine => "sine",
            WaveShape::Square => "square",
            WaveShape::Triangle => "triangle",
        }
    }

    fn generator(self) -> Generator {
        GENERATORS[self as usize]
    }
}

impl fmt::Display for WaveShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveShape {
    type Err = SoundError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        WaveShape::all()
            .iter()
            .copied()
            .find(|shape| shape.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SoundError::invalid(format!("unknown wave shape '{}'", wanted)))
    }
}

/// Parameters of one note
///
/// Amplitude is not range-checked; values outside [0, 1] clip on most devices.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WaveSpec {
    pub shape: WaveShape,
    /// Peak level, 1.0 is full scale
    pub amplitude: f32,
    /// Hz
    pub frequency: f32,
    /// Requested note length in seconds; the buffer is longer, see [`BUFFER_DURATION_FACTOR`]
    pub duration: f32,
}

impl WaveSpec {
    /// Create a validated spec
    pub fn new(shape: WaveShape, amplitude: f32, frequency: f32, duration: f32) -> Result<Self> {
        validate(frequency, duration)?;
        Ok(Self {
            shape,
            amplitude,
            frequency,
            duration,
        })
    }

    /// Generate the sample buffer for this spec
    pub fn generate(&self) -> Result<SampleBuffer> {
        generate(self.shape, self.amplitude, self.frequency, self.duration)
    }
}

fn validate(frequency: f32, duration: f32) -> Result<()> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(SoundError::invalid(format!(
            "frequency must be positive, got {}",
            frequency
        )));
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(SoundError::invalid(format!(
            "duration must be positive, got {}",
            duration
        )));
    }
    if exact_buffer_len(duration) > MAX_BUFFER_SAMPLES as f64 {
        return Err(SoundError::invalid(format!(
            "duration {}s needs more than {} samples",
            duration, MAX_BUFFER_SAMPLES
        )));
    }
    Ok(())
}

fn exact_buffer_len(duration: f32) -> f64 {
    (SAMPLE_RATE as f64 * duration as f64 * BUFFER_DURATION_FACTOR).round()
}

/// Number of samples in a generated buffer of the given duration
fn buffer_len(duration: f32) -> usize {
    exact_buffer_len(duration) as usize
}

/// Generate a waveform buffer at [`SAMPLE_RATE`]
///
/// # Errors
/// `InvalidParameter` if `frequency` or `duration` is not a positive finite
/// number, or if the buffer would exceed [`MAX_BUFFER_SAMPLES`].
pub fn generate(
    shape: WaveShape,
    amplitude: f32,
    frequency: f32,
    duration: f32,
) -> Result<SampleBuffer> {
    validate(frequency, duration)?;

    let rate = SAMPLE_RATE as f64;
    let step = TAU * frequency as f64 / rate;
    let unit = shape.generator();

    let samples: Vec<f32> = (0..buffer_len(duration))
        .map(|i| amplitude * unit(step * i as f64))
        .collect();

    log::debug!(
        "Generated {} {} Hz ({} samples)",
        shape,
        frequency,
        samples.len()
    );

    Ok(SampleBuffer::new(samples, SAMPLE_RATE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_length() {
        let buffer = generate(WaveShape::Sine, 0.5, 440.0, 1.0).unwrap();
        assert_eq!(buffer.len(), 176_400);

        let buffer = generate(WaveShape::Triangle, 0.5, 440.0, 0.25).unwrap();
        assert_eq!(buffer.len(), 44_100);

        // 44100 * 0.01 * 4 = 1764
        assert_eq!(buffer_len(0.01), 1764);
    }

    #[test]
    fn test_sine_quarter_period() {
        let buffer = generate(WaveShape::Sine, 0.5, 440.0, 1.0).unwrap();
        assert_eq!(buffer.samples()[0], 0.0);

        let quarter = (SAMPLE_RATE / (4 * 440)) as usize;
        assert!((buffer.samples()[quarter] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_sine_within_amplitude() {
        for &amp in &[0.0f32, 0.25, 1.0] {
            let buffer = generate(WaveShape::Sine, amp, 313.0, 0.1).unwrap();
            assert!(buffer.samples().iter().all(|s| s.abs() <= amp));
        }
    }

    #[test]
    fn test_square_starts_at_zero() {
        let buffer = generate(WaveShape::Square, 0.3, 100.0, 1.0).unwrap();
        assert_eq!(buffer.samples()[0], 0.0);
        assert_eq!(buffer.samples()[1], 0.3);
    }

    #[test]
    fn test_square_levels_and_zero_crossings() {
        let amp = 0.7;
        let square = generate(WaveShape::Square, amp, 250.0, 0.1).unwrap();
        let sine = generate(WaveShape::Sine, amp, 250.0, 0.1).unwrap();

        for (&sq, &s) in square.samples().iter().zip(sine.samples()) {
            assert!(sq == amp || sq == -amp || sq == 0.0);
            assert_eq!(sq == 0.0, s == 0.0);
            if s != 0.0 {
                assert_eq!(sq.is_sign_positive(), s.is_sign_positive());
            }
        }
    }

    #[test]
    fn test_triangle_peak_matches_amplitude() {
        let buffer = generate(WaveShape::Triangle, 0.8, 100.0, 0.05).unwrap();
        // cos(0) = 1, asin(1) = π/2, scaled by 2/π
        assert!((buffer.samples()[0] - 0.8).abs() < 1e-6);
        assert!(buffer.samples().iter().all(|s| s.abs() <= 0.8 + 1e-6));

        // Half a period later the wave sits at its trough (441 samples at 100 Hz)
        assert!((buffer.samples()[220] + 0.8).abs() < 0.01);
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        assert!(matches!(
            generate(WaveShape::Sine, 0.5, 0.0, 1.0),
            Err(SoundError::InvalidParameter(_))
        ));
        assert!(matches!(
            generate(WaveShape::Sine, 0.5, 440.0, -1.0),
            Err(SoundError::InvalidParameter(_))
        ));
        assert!(WaveSpec::new(WaveShape::Square, 0.5, f32::NAN, 1.0).is_err());
    }

    #[test]
    fn test_rejects_oversized_duration() {
        for &duration in &[f32::MAX, 1e30, 30_000.0] {
            assert!(matches!(
                generate(WaveShape::Sine, 0.5, 440.0, duration),
                Err(SoundError::InvalidParameter(_))
            ));
            assert!(WaveSpec::new(WaveShape::Sine, 0.5, 440.0, duration).is_err());
        }

        // Largest duration that still fits, checked without allocating
        let fits = MAX_BUFFER_SAMPLES as f64 / (SAMPLE_RATE as f64 * BUFFER_DURATION_FACTOR);
        assert!(validate(440.0, (fits * 0.99) as f32).is_ok());
        assert!(validate(440.0, 0.01).is_ok());
    }

    #[test]
    fn test_parse_shape() {
        assert_eq!("Sine".parse::<WaveShape>().unwrap(), WaveShape::Sine);
        assert_eq!(" TRIANGLE ".parse::<WaveShape>().unwrap(), WaveShape::Triangle);
        assert!("sawtooth".parse::<WaveShape>().is_err());
    }
}
