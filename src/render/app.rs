//! Native window hosting a single plot

use eframe::egui;

use super::plot_view::PlotView;
use crate::analysis::Plot;
use crate::error::{Result, SoundError};

struct PlotApp {
    plot: Plot,
    view: PlotView,
}

impl PlotApp {
    fn new(plot: Plot) -> Self {
        Self {
            plot,
            view: PlotView::new(),
        }
    }
}

impl eframe::App for PlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("title").show(ctx, |ui| {
            ui.heading(&self.plot.title);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.view.show(ui, &self.plot);
        });
    }
}

/// Open a window showing `plot` and block until it is closed
pub fn show_plot(plot: Plot) -> Result<()> {
    log::info!(
        "Showing '{}' ({} series, {} points)",
        plot.title,
        plot.series.len(),
        plot.point_count()
    );

    let title = plot.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(PlotApp::new(plot)))),
    )
    .map_err(|e| SoundError::Display(e.to_string()))
}
