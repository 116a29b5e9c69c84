//! WAV file I/O using hound
//!
//! Recordings are stored as 16-bit PCM. Files in other formats are
//! converted to int16 on load so analysis always sees the same sample type.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{Result, SoundError};

/// Interleaved int16 audio with its layout
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedClip {
    /// 1 (mono) or 2 (stereo)
    pub channels: u16,
    /// Hz
    pub sample_rate: u32,
    /// Frames in order, channels interleaved within each frame
    pub samples: Vec<i16>,
}

impl RecordedClip {
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            channels,
            sample_rate,
            samples,
        }
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel, de-interleaved
    pub fn channel(&self, index: usize) -> Vec<i16> {
        self.samples
            .iter()
            .skip(index)
            .step_by(self.channels.max(1) as usize)
            .copied()
            .collect()
    }

    fn spec(&self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    /// Encode as 16-bit PCM WAV
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        if self.channels == 0 || self.samples.len() % self.channels as usize != 0 {
            return Err(SoundError::invalid(format!(
                "{} samples do not form whole {}-channel frames",
                self.samples.len(),
                self.channels
            )));
        }

        let mut wav_writer = WavWriter::new(writer, self.spec())?;
        let mut samples = wav_writer.get_i16_writer(self.samples.len() as u32);
        for &sample in &self.samples {
            samples.write_sample(sample);
        }
        samples.flush()?;
        wav_writer.finalize()?;
        Ok(())
    }

    /// Save to a WAV file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))?;
        log::info!(
            "Saved {} ({} ch, {} Hz, {:.2}s)",
            path.display(),
            self.channels,
            self.sample_rate,
            self.duration_seconds()
        );
        Ok(())
    }

    /// Decode WAV data, converting the samples to int16
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let reader = WavReader::new(reader)?;
        let spec = reader.spec();

        if spec.channels == 0 {
            return Err(SoundError::invalid("WAV file has no channels"));
        }

        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader
                .into_samples::<i16>()
                .collect::<std::result::Result<_, _>>()?,
            (SampleFormat::Int, bits) if bits <= 32 => {
                // Rescale to 16 bits by shifting, preserving full scale
                let shift = bits as i32 - 16;
                reader
                    .into_samples::<i32>()
                    .map(|s| {
                        s.map(|v| {
                            if shift >= 0 {
                                (v >> shift) as i16
                            } else {
                                (v << -shift) as i16
                            }
                        })
                    })
                    .collect::<std::result::Result<_, _>>()?
            }
            (SampleFormat::Float, _) => reader
                .into_samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<std::result::Result<_, _>>()?,
            (_, bits) => {
                return Err(SoundError::invalid(format!(
                    "unsupported WAV sample width: {} bits",
                    bits
                )))
            }
        };

        Ok(Self::new(spec.channels, spec.sample_rate, samples))
    }

    /// Load a WAV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let clip = Self::read_from(BufReader::new(file))?;
        log::info!(
            "Loaded {} ({} ch, {} Hz, {:.2}s)",
            path.display(),
            clip.channels,
            clip.sample_rate,
            clip.duration_seconds()
        );
        Ok(clip)
    }
}
