//! Audio device enumeration and selection

use std::io::{BufRead, Write};

use cpal::traits::{DeviceTrait, HostTrait};

use crate::error::{Result, SoundError};

/// Outcome of the interactive device prompt
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeviceSelection {
    /// Index into the offered device names
    Found(usize),
    /// No valid answer; `attempts` counts the answers actually read
    NotFound { attempts: usize },
}

impl DeviceSelection {
    /// Convert to a result, reporting how many attempts were made
    pub fn into_result(self) -> Result<usize> {
        match self {
            DeviceSelection::Found(index) => Ok(index),
            DeviceSelection::NotFound { attempts } => Err(SoundError::DeviceNotFound { attempts }),
        }
    }
}

fn device_names(devices: impl Iterator<Item = cpal::Device>) -> Vec<String> {
    devices
        .map(|device| device.name().unwrap_or_else(|_| "Unknown".to_string()))
        .collect()
}

/// Get the names of available input devices
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| SoundError::device(format!("Failed to enumerate input devices: {}", e)))?;
    Ok(device_names(devices))
}

/// Get the names of available output devices
pub fn list_output_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| SoundError::device(format!("Failed to enumerate output devices: {}", e)))?;
    Ok(device_names(devices))
}

/// Get an input device by index into [`list_input_devices`], or the default
pub(super) fn input_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match index {
        Some(index) => {
            let mut devices = host
                .input_devices()
                .map_err(|e| SoundError::device(format!("Failed to enumerate input devices: {}", e)))?;
            devices.nth(index).ok_or_else(|| {
                SoundError::invalid(format!("input device index {} is out of range", index))
            })
        }
        None => host
            .default_input_device()
            .ok_or_else(|| SoundError::device("No default input device found")),
    }
}

/// Get an output device by name, or the default if name is None
pub(super) fn output_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match name {
        Some(device_name) => {
            let devices = host
                .output_devices()
                .map_err(|e| SoundError::device(format!("Failed to enumerate devices: {}", e)))?;

            for device in devices {
                if let Ok(n) = device.name() {
                    if n == device_name {
                        return Ok(device);
                    }
                }
            }
            Err(SoundError::device(format!(
                "Output device '{}' not found",
                device_name
            )))
        }
        None => host
            .default_output_device()
            .ok_or_else(|| SoundError::device("No output device found")),
    }
}

/// Prompt for one of `names` until a listed name is entered
///
/// Gives up after `max_attempts` answers that match no device, or when
/// input ends.
pub fn select_device<R: BufRead, W: Write>(
    names: &[String],
    mut input: R,
    mut out: W,
    max_attempts: usize,
) -> Result<DeviceSelection> {
    writeln!(out, "\nAvailable input devices are:")?;
    for name in names {
        writeln!(out, "{}", name)?;
    }

    let mut answered = 0;
    for attempt in 1..=max_attempts {
        write!(out, "Which device do you want to use? ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            log::warn!("Input ended before a device was chosen");
            break;
        }
        answered = attempt;

        let answer = line.trim();
        if let Some(index) = names.iter().position(|name| name == answer) {
            log::info!("Selected input device {}: {}", index, answer);
            return Ok(DeviceSelection::Found(index));
        }

        writeln!(out, "\nFaulty input! ({}/{})", attempt, max_attempts)?;
    }

    Ok(DeviceSelection::NotFound { attempts: answered })
}
