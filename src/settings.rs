use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::synth::WaveShape;

/// Returns the path to the settings file: `~/.config/sss-rs/settings.json`
pub fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sss-rs");
    path.push("settings.json");
    path
}

/// Persisted defaults for the command line.
///
/// Fields use `#[serde(default)]` so that adding new settings
/// won't break existing config files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    // Notes
    pub shape: WaveShape,
    pub amplitude: f32,
    pub frequency: f32,
    pub duration: f32,
    /// Output device name, or the default device
    pub output_device: Option<String>,

    // Recording
    pub record_channels: u16,
    /// Input device picked without prompting
    pub input_device: Option<String>,
    /// Invalid answers allowed at the device prompt
    pub device_attempts: usize,
    pub recordings_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            shape: WaveShape::Sine,
            amplitude: 0.5,
            frequency: 440.0,
            duration: 1.0,
            output_device: None,
            record_channels: 1,
            input_device: None,
            device_attempts: 3,
            recordings_dir: dirs::audio_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl AppSettings {
    /// Load settings from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let path = settings_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings ({}), using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings file found ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk as pretty JSON.
    pub fn save(&self) -> Result<()> {
        let path = settings_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.to_json()?)?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Where a recording named `file` is written; absolute or explicitly
    /// relative paths are kept as given
    pub fn recording_path(&self, file: &str) -> PathBuf {
        let path = PathBuf::from(file);
        if path.is_absolute() || path.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
            path
        } else {
            self.recordings_dir.join(path)
        }
    }
}
