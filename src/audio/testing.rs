//! In-memory audio devices for tests
//!
//! `MockOutput` records every stream it opens, every write and every close.
//! `MockInput` hands out a counting int16 ramp. Neither touches hardware.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{AudioInput, AudioOutput, InputStream, OutputStream, StreamParams};
use crate::error::{Result, SoundError};

/// Called after each successful write with the running write count
pub type Hook = Arc<dyn Fn(usize) + Send + Sync>;

#[derive(Default, Debug)]
pub struct DeviceLog {
    pub opened: Vec<StreamParams>,
    /// Length of each write (output) or read (input), in samples
    pub transfers: Vec<usize>,
    /// Every sample written, in order (output only)
    pub written: Vec<f32>,
    pub closed: usize,
}

#[derive(Clone, Default)]
pub struct MockOutput {
    pub log: Arc<Mutex<DeviceLog>>,
    /// Fail the nth write (1-based)
    pub fail_on_write: Option<usize>,
    pub fail_open: bool,
    pub write_delay: Option<Duration>,
    pub on_write: Option<Hook>,
}

impl MockOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.log.lock().unwrap().transfers.len()
    }

    pub fn closes(&self) -> usize {
        self.log.lock().unwrap().closed
    }
}

pub struct MockOutputStream {
    device: MockOutput,
    writes: usize,
}

impl OutputStream for MockOutputStream {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        self.writes += 1;
        if self.device.fail_on_write == Some(self.writes) {
            return Err(SoundError::device("mock write failure"));
        }
        if let Some(delay) = self.device.write_delay {
            thread::sleep(delay);
        }
        {
            let mut log = self.device.log.lock().unwrap();
            log.transfers.push(samples.len());
            log.written.extend_from_slice(samples);
        }
        if let Some(hook) = &self.device.on_write {
            hook(self.writes);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.device.log.lock().unwrap().closed += 1;
        Ok(())
    }
}

impl AudioOutput for MockOutput {
    type Stream = MockOutputStream;

    fn open_output(&self, params: StreamParams) -> Result<Self::Stream> {
        if self.fail_open {
            return Err(SoundError::device("mock open failure"));
        }
        self.log.lock().unwrap().opened.push(params);
        Ok(MockOutputStream {
            device: self.clone(),
            writes: 0,
        })
    }
}

#[derive(Clone, Default)]
pub struct MockInput {
    pub log: Arc<Mutex<DeviceLog>>,
    /// Fail the nth read (1-based)
    pub fail_on_read: Option<usize>,
    pub read_delay: Option<Duration>,
}

impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct MockInputStream {
    device: MockInput,
    params: StreamParams,
    reads: usize,
    next: i16,
}

impl InputStream for MockInputStream {
    fn read(&mut self, frames: usize) -> Result<Vec<i16>> {
        self.reads += 1;
        if self.device.fail_on_read == Some(self.reads) {
            return Err(SoundError::device("mock read failure"));
        }
        if let Some(delay) = self.device.read_delay {
            thread::sleep(delay);
        }
        let count = frames * self.params.channels as usize;
        let chunk: Vec<i16> = (0..count)
            .map(|_| {
                let value = self.next;
                self.next = self.next.wrapping_add(1);
                value
            })
            .collect();
        self.device.log.lock().unwrap().transfers.push(chunk.len());
        Ok(chunk)
    }

    fn close(&mut self) -> Result<()> {
        self.device.log.lock().unwrap().closed += 1;
        Ok(())
    }
}

impl AudioInput for MockInput {
    type Stream = MockInputStream;

    fn open_input(&self, params: StreamParams, _device: Option<usize>) -> Result<Self::Stream> {
        self.log.lock().unwrap().opened.push(params);
        Ok(MockInputStream {
            device: self.clone(),
            params,
            reads: 0,
            next: 0,
        })
    }
}
