//! Interactive note entry
//!
//! Reads one note per line in the form `<shape> <amplitude> <frequency> [<duration>]`.
//! The first line that is not a valid note ends the session.

use std::io::{BufRead, Write};

use crate::audio::AudioOutput;
use crate::error::{Result, SoundError};
use crate::synth::{PlaybackMode, Synthesizer, WaveSpec};

/// Loop length for continuous notes, in seconds before the buffer factor
pub const CONTINUOUS_NOTE_SECONDS: f32 = 1.0;

/// Parse one note line
///
/// Timed notes need a duration. Continuous notes ignore any given duration
/// and loop a buffer of `loop_seconds`.
pub fn parse_note(line: &str, mode: PlaybackMode, loop_seconds: f32) -> Result<WaveSpec> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (shape, amplitude, frequency) = match fields.as_slice() {
        [shape, amplitude, frequency, ..] => (shape, amplitude, frequency),
        _ => {
            return Err(SoundError::invalid(format!(
                "expected '<shape> <amplitude> <frequency>', got '{}'",
                line.trim()
            )))
        }
    };

    let duration = match mode {
        PlaybackMode::Timed => {
            let field = fields
                .get(3)
                .ok_or_else(|| SoundError::invalid("timed notes need a duration"))?;
            parse_number(field, "duration")?
        }
        PlaybackMode::Continuous => loop_seconds,
    };

    WaveSpec::new(
        shape.parse()?,
        parse_number(amplitude, "amplitude")?,
        parse_number(frequency, "frequency")?,
        duration,
    )
}

fn parse_number(field: &str, what: &str) -> Result<f32> {
    field
        .parse()
        .map_err(|_| SoundError::invalid(format!("{} '{}' is not a number", what, field)))
}

fn prompt<W: Write>(out: &mut W, mode: PlaybackMode) -> Result<()> {
    match mode {
        PlaybackMode::Timed => writeln!(
            out,
            "\nEnter <sine|square|triangle> <amplitude 0-1> <frequency Hz> <duration s>\n\
             Anything else stops."
        )?,
        PlaybackMode::Continuous => writeln!(
            out,
            "\nEnter <sine|square|triangle> <amplitude 0-1> <frequency Hz> to add a note\n\
             Anything else stops all notes."
        )?,
    }
    out.flush()?;
    Ok(())
}

/// Read the next note, or None once input ends or a line is not a note
fn next_note<R: BufRead>(
    input: &mut R,
    mode: PlaybackMode,
    loop_seconds: f32,
) -> Result<Option<WaveSpec>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    match parse_note(&line, mode, loop_seconds) {
        Ok(spec) => Ok(Some(spec)),
        Err(e) => {
            log::info!("Ending session: {}", e);
            Ok(None)
        }
    }
}

/// Play each entered note to completion; returns the number of notes played
pub fn run_timed<O, R, W>(synth: &Synthesizer<O>, mut input: R, mut out: W) -> Result<usize>
where
    O: AudioOutput + 'static,
    R: BufRead,
    W: Write,
{
    let mut played = 0;
    loop {
        prompt(&mut out, PlaybackMode::Timed)?;
        let Some(spec) = next_note(&mut input, PlaybackMode::Timed, CONTINUOUS_NOTE_SECONDS)? else {
            break;
        };
        synth.play_timed(&spec)?;
        played += 1;
    }
    Ok(played)
}

/// Start a continuous note per entered line; all notes stop when the session ends
///
/// Returns the number of notes started.
pub fn run_continuous<O, R, W>(
    synth: &mut Synthesizer<O>,
    mut input: R,
    mut out: W,
    loop_seconds: f32,
) -> Result<usize>
where
    O: AudioOutput + 'static,
    R: BufRead,
    W: Write,
{
    let mut started = 0;
    let outcome = loop {
        if let Err(e) = prompt(&mut out, PlaybackMode::Continuous) {
            break Err(e);
        }
        match next_note(&mut input, PlaybackMode::Continuous, loop_seconds) {
            Ok(Some(spec)) => match synth.start_note(&spec) {
                Ok(()) => {
                    started += 1;
                    log::debug!("{} notes playing", synth.voice_count());
                }
                Err(e) => break Err(e),
            },
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    let stopped = synth.stop_all();
    outcome?;
    stopped?;
    Ok(started)
}
