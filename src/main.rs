//! sss-rs - Simple Sound Synthesis
//!
//! Generates sine, square and triangle tones on the default output device,
//! records from an input device to WAV (optionally while playing notes),
//! plays WAV files back and shows their waveform or frequency spectrum.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

mod analysis;
mod audio;
mod cli;
mod error;
mod render;
mod session;
mod settings;
mod synth;

use audio::{CpalInput, CpalOutput, DeviceSelection, RecordParams, RecordedClip, Recorder};
use cli::{Args, Command};
use settings::AppSettings;
use synth::{PlaybackMode, Synthesizer, WaveShape, WaveSpec};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    cli::init_logging(&args);

    log::info!("Starting sss-rs");
    let settings = AppSettings::load();

    match args.command {
        Command::Tone {
            shape,
            amplitude,
            frequency,
            duration,
        } => {
            let spec = note_spec(&settings, shape, amplitude, frequency, duration)?;
            let synth = Synthesizer::new(Arc::new(output_for(&settings)));
            synth.play_timed(&spec).context("Failed to play tone")?;
        }

        Command::Drone {
            shape,
            amplitude,
            frequency,
        } => {
            let spec = note_spec(
                &settings,
                shape,
                amplitude,
                frequency,
                Some(session::CONTINUOUS_NOTE_SECONDS),
            )?;
            let mut synth = Synthesizer::new(Arc::new(output_for(&settings)));
            synth.start_note(&spec).context("Failed to start note")?;

            wait_for_enter("Press Enter to stop")?;
            synth.stop_all().context("Note ended with an error")?;
        }

        Command::Record {
            file,
            channels,
            device,
            synth,
        } => {
            let path = settings.recording_path(&file);
            let channels = channels.unwrap_or(settings.record_channels);
            let device = device.or_else(|| settings.input_device.clone());
            record(&settings, &path, channels, device.as_deref(), synth.map(Into::into))?;
        }

        Command::Play { file } => {
            audio::play_file(&output_for(&settings), &file)
                .with_context(|| format!("Failed to play {}", file.display()))?;
        }

        Command::Waveform { file, shorten } => {
            let clip = load_clip(&file)?;
            let plot = analysis::waveform_plot(&clip, shorten)?;
            render::show_plot(plot)?;
        }

        Command::Spectrum { file } => {
            let clip = load_clip(&file)?;
            let plot = analysis::spectrum_plot(&clip)?;
            let peak = analysis::dominant_frequency(&clip)?;
            log::info!("Dominant frequency: {:.1} Hz", peak);
            render::show_plot(plot)?;
        }

        Command::Devices => {
            println!("Input devices:");
            for name in audio::list_input_devices()? {
                println!("  {}", name);
            }
            println!("Output devices:");
            for name in audio::list_output_devices()? {
                println!("  {}", name);
            }
        }

        Command::Config { save } => {
            println!("{}", settings.to_json()?);
            if save {
                settings.save().context("Failed to save settings")?;
                println!("Saved to {}", settings::settings_path().display());
            }
        }
    }

    Ok(())
}

/// Fill omitted note parameters from the settings
fn note_spec(
    settings: &AppSettings,
    shape: Option<WaveShape>,
    amplitude: Option<f32>,
    frequency: Option<f32>,
    duration: Option<f32>,
) -> anyhow::Result<WaveSpec> {
    Ok(WaveSpec::new(
        shape.unwrap_or(settings.shape),
        amplitude.unwrap_or(settings.amplitude),
        frequency.unwrap_or(settings.frequency),
        duration.unwrap_or(settings.duration),
    )?)
}

fn output_for(settings: &AppSettings) -> CpalOutput {
    match &settings.output_device {
        Some(name) => CpalOutput::new().with_device(name.as_str()),
        None => CpalOutput::new(),
    }
}

fn load_clip(path: &Path) -> anyhow::Result<RecordedClip> {
    RecordedClip::load(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn wait_for_enter(message: &str) -> anyhow::Result<()> {
    print!("{} ", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

/// Pick the input device index, by name or by prompting
fn choose_input_device(settings: &AppSettings, name: Option<&str>) -> anyhow::Result<usize> {
    let names = audio::list_input_devices()?;
    if names.is_empty() {
        bail!("No input devices available");
    }

    if let Some(name) = name {
        return names
            .iter()
            .position(|n| n == name)
            .with_context(|| format!("No input device named '{}'", name));
    }

    let attempts = settings.device_attempts;
    let selection = audio::select_device(&names, io::stdin().lock(), io::stdout(), attempts)?;
    if matches!(selection, DeviceSelection::NotFound { .. }) {
        log::warn!("No input device chosen");
    }
    Ok(selection.into_result()?)
}

fn record(
    settings: &AppSettings,
    path: &Path,
    channels: u16,
    device: Option<&str>,
    synth_mode: Option<PlaybackMode>,
) -> anyhow::Result<()> {
    let device = choose_input_device(settings, device)?;
    let recorder = Recorder::new(Arc::new(CpalInput));
    let handle = recorder
        .start(RecordParams::new(channels).with_device(Some(device)))
        .context("Failed to start recording")?;
    println!("Recording...");

    // The recording is saved even if note playback fails
    let played = match synth_mode {
        Some(mode) => play_session(settings, mode),
        None => wait_for_enter("Press Enter to stop recording"),
    };

    if handle.is_finished() {
        log::warn!("Recording ended before it was stopped");
    }
    let clip = handle.stop().context("Recording failed")?;
    println!("done");

    clip.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!(
        "Saved {:.2}s ({} channels) to {}",
        clip.duration_seconds(),
        clip.channels,
        path.display()
    );
    played
}

fn play_session(settings: &AppSettings, mode: PlaybackMode) -> anyhow::Result<()> {
    let mut synth = Synthesizer::new(Arc::new(output_for(settings)));
    let stdin = io::stdin().lock();
    let stdout = io::stdout();

    let notes = match mode {
        PlaybackMode::Timed => session::run_timed(&synth, stdin, stdout)?,
        PlaybackMode::Continuous => session::run_continuous(
            &mut synth,
            stdin,
            stdout,
            session::CONTINUOUS_NOTE_SECONDS,
        )?,
    };
    log::info!("Session played {} notes", notes);
    Ok(())
}
