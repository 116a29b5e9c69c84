//! Synthesis module - waveform generation and streaming playback
//!
//! This module provides:
//! - `generate` and `WaveSpec` for building sample buffers
//! - `StreamPlayer` for timed or continuous playback
//! - `Synthesizer` for overlapping continuous notes

mod buffer;
mod player;
mod voices;
mod waveform;

// Re-export public types
pub use player::{PlaybackMode, PlaybackSession, StopSignal};
pub use voices::Synthesizer;
pub use waveform::{generate, WaveShape, WaveSpec, SAMPLE_RATE};
