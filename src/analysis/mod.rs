//! Analysis module - waveform and spectrum views of recorded audio
//!
//! Views are built as [`Plot`] data; drawing lives in `render`.

mod plot;
mod spectrum;
mod waveform;

pub use plot::{AxisScale, Bounds, Plot, Series};
pub use spectrum::{dominant_frequency, spectrum_plot};
pub use waveform::waveform_plot;
