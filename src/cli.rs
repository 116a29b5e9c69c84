//! Command-line interface for sss-rs
//!
//! Handles argument parsing and logging configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use crate::synth::{PlaybackMode, WaveShape};

/// sss-rs - Simple sound synthesis, recording and analysis
#[derive(Parser, Debug)]
#[command(name = "sss-rs")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase logging verbosity
    /// -v = info, -vv = debug, -vvv = trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a single note for a fixed duration
    Tone {
        #[arg(value_parser = parse_shape)]
        shape: Option<WaveShape>,
        amplitude: Option<f32>,
        /// Frequency in Hz
        frequency: Option<f32>,
        /// Duration in seconds
        duration: Option<f32>,
    },

    /// Loop a note until Enter is pressed
    Drone {
        #[arg(value_parser = parse_shape)]
        shape: Option<WaveShape>,
        amplitude: Option<f32>,
        /// Frequency in Hz
        frequency: Option<f32>,
    },

    /// Record from an input device to a WAV file
    Record {
        /// Output file, placed in the recordings directory unless a path is given
        file: String,

        /// 1 = mono, 2 = stereo
        #[arg(short, long)]
        channels: Option<u16>,

        /// Input device name; prompts when omitted
        #[arg(short, long)]
        device: Option<String>,

        /// Play notes while recording
        #[arg(short, long, value_enum)]
        synth: Option<SynthMode>,
    },

    /// Play a WAV file
    Play { file: PathBuf },

    /// Show the waveform of a WAV file
    Waveform {
        file: PathBuf,

        /// Show only the first 1/N of the recording
        #[arg(short, long)]
        shorten: Option<usize>,
    },

    /// Show the frequency spectrum of a WAV file
    Spectrum { file: PathBuf },

    /// List audio devices
    Devices,

    /// Print the current settings as JSON
    Config {
        /// Write the current settings to the settings file
        #[arg(long)]
        save: bool,
    },
}

/// Note entry mode while recording
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SynthMode {
    Timed,
    Continuous,
}

impl From<SynthMode> for PlaybackMode {
    fn from(mode: SynthMode) -> Self {
        match mode {
            SynthMode::Timed => PlaybackMode::Timed,
            SynthMode::Continuous => PlaybackMode::Continuous,
        }
    }
}

fn parse_shape(s: &str) -> Result<WaveShape, String> {
    s.parse().map_err(|e: crate::error::SoundError| e.to_string())
}

impl Args {
    /// Get the log level filter based on verbosity flags
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }
}

/// Initialize the logging system based on CLI arguments
pub fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    // Base level for all modules - keep at warn to suppress noisy deps
    builder.filter_level(LevelFilter::Warn);

    builder.filter_module("sss_rs", args.log_level());

    // Audio backend internals only at -vvv
    if args.verbose >= 3 {
        builder.filter_module("cpal", args.log_level());
    }

    // RUST_LOG, when set, takes precedence
    builder.parse_default_env();

    builder.format_timestamp_millis().init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_log_level() {
        assert_eq!(parse(&["sss-rs", "devices"]).log_level(), LevelFilter::Warn);
        assert_eq!(parse(&["sss-rs", "-vv", "devices"]).log_level(), LevelFilter::Debug);
        assert_eq!(parse(&["sss-rs", "devices", "-vvvv"]).log_level(), LevelFilter::Trace);
        assert_eq!(parse(&["sss-rs", "-v", "-q", "devices"]).log_level(), LevelFilter::Error);
    }

    #[test]
    fn test_tone_arguments() {
        let args = parse(&["sss-rs", "tone", "Triangle", "0.4", "330", "1.5"]);
        match args.command {
            Command::Tone {
                shape,
                amplitude,
                frequency,
                duration,
            } => {
                assert_eq!(shape, Some(WaveShape::Triangle));
                assert_eq!(amplitude, Some(0.4));
                assert_eq!(frequency, Some(330.0));
                assert_eq!(duration, Some(1.5));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_shape_rejected() {
        assert!(Args::try_parse_from(["sss-rs", "tone", "sawtooth"]).is_err());
    }

    #[test]
    fn test_record_options() {
        let args = parse(&["sss-rs", "record", "take.wav", "-c", "2", "--synth", "continuous"]);
        match args.command {
            Command::Record {
                file,
                channels,
                device,
                synth,
            } => {
                assert_eq!(file, "take.wav");
                assert_eq!(channels, Some(2));
                assert_eq!(device, None);
                assert_eq!(synth, Some(SynthMode::Continuous));
                assert_eq!(PlaybackMode::from(SynthMode::Continuous), PlaybackMode::Continuous);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
