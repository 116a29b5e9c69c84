//! Render module - draws analysis plots in a native window
//!
//! - `PlotView`: egui painter widget for a [`Plot`](crate::analysis::Plot)
//! - [`show_plot`]: blocking window around the widget

mod app;
mod plot_view;

pub use app::show_plot;
