//! Error type shared by the synthesis, audio and analysis modules

use thiserror::Error;

/// Errors that can occur while generating, playing, recording or analysing sound
#[derive(Error, Debug)]
pub enum SoundError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Audio device error: {0}")]
    DeviceError(String),

    #[error("No matching input device after {attempts} attempts")]
    DeviceNotFound { attempts: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Failed to open plot window: {0}")]
    Display(String),
}

impl SoundError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub(crate) fn device(msg: impl std::fmt::Display) -> Self {
        Self::DeviceError(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SoundError>;
