//! Line plot widget
//!
//! Draws a [`Plot`] with egui's painter: background, grid, tick labels,
//! one coloured line per series and a legend.
//!
//! ## Coordinate System
//!
//! The data range comes from [`Plot::bounds`]. X values go through the
//! plot's [`AxisScale`] first, so a log axis spaces decades evenly.
//! Screen Y increases downward, so Y is flipped.

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};

use crate::analysis::{AxisScale, Bounds, Plot};

/// Series colours, cycled
const PALETTE: [Color32; 4] = [
    Color32::from_rgb(100, 150, 255),
    Color32::from_rgb(255, 176, 0),
    Color32::from_rgb(100, 255, 100),
    Color32::from_rgb(255, 100, 100),
];

/// Slack for ticks that land on the axis ends after rounding
const EDGE_TOLERANCE: f64 = 1e-9;

/// Display settings for the plot
#[derive(Clone)]
pub struct PlotSettings {
    pub background: Color32,
    pub grid: Color32,
    pub text: Color32,
    pub line_width: f32,
    /// Space reserved around the data area for labels, in pixels
    pub margin: f32,
    /// Linear grid divisions per axis
    pub divisions: usize,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(20, 20, 24),
            grid: Color32::from_rgba_unmultiplied(120, 120, 140, 60),
            text: Color32::from_rgb(200, 200, 210),
            line_width: 1.2,
            margin: 56.0,
            divisions: 8,
        }
    }
}

/// Maps data coordinates into a screen rectangle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    scale: AxisScale,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Viewport {
    /// None if the bounds cannot be shown on the axis (e.g. a log axis ending at 0)
    pub fn new(bounds: Bounds, scale: AxisScale) -> Option<Self> {
        let x_min = scale.transform(bounds.x_min)?;
        let x_max = scale.transform(bounds.x_max)?;
        if x_max <= x_min {
            return None;
        }
        Some(Self {
            scale,
            x_min,
            x_max,
            y_min: bounds.y_min,
            y_max: bounds.y_max,
        })
    }

    /// Screen position of a data point, or None if it is off the x axis
    pub fn to_screen(&self, x: f64, y: f64, rect: Rect) -> Option<Pos2> {
        let tx = self.scale.transform(x)?;
        let norm_x = (tx - self.x_min) / (self.x_max - self.x_min);
        if !(-EDGE_TOLERANCE..=1.0 + EDGE_TOLERANCE).contains(&norm_x) {
            return None;
        }
        let norm_y = (y - self.y_min) / (self.y_max - self.y_min);

        Some(Pos2::new(
            rect.left() + norm_x as f32 * rect.width(),
            rect.bottom() - norm_y as f32 * rect.height(), // Flip Y
        ))
    }

    /// Data x values at which to draw vertical grid lines
    fn x_ticks(&self, divisions: usize) -> Vec<f64> {
        match self.scale {
            AxisScale::Linear => linear_ticks(self.x_min, self.x_max, divisions),
            AxisScale::Log => {
                let first = self.x_min.ceil() as i32;
                let last = self.x_max.floor() as i32;
                (first..=last).map(|decade| self.scale.inverse(decade as f64)).collect()
            }
        }
    }

    fn y_ticks(&self, divisions: usize) -> Vec<f64> {
        linear_ticks(self.y_min, self.y_max, divisions)
    }
}

fn linear_ticks(min: f64, max: f64, divisions: usize) -> Vec<f64> {
    let divisions = divisions.max(1);
    (0..=divisions)
        .map(|i| min + (max - min) * i as f64 / divisions as f64)
        .collect()
}

/// Short tick label
fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 10_000.0 {
        format!("{:.0}k", value / 1000.0)
    } else if magnitude >= 100.0 || magnitude == 0.0 {
        format!("{:.0}", value)
    } else if magnitude >= 1.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.3}", value)
    }
}

/// Keep the first, lowest, highest and last point of every pixel column
///
/// A waveform has far more samples than the window has pixels; this keeps
/// the drawn envelope intact while bounding the number of line segments.
pub fn reduce_columns(points: &[Pos2]) -> Vec<Pos2> {
    let mut out = Vec::with_capacity(points.len().min(4096));
    let mut i = 0;

    while i < points.len() {
        let column = points[i].x.floor();
        let start = i;
        let (mut lo, mut hi) = (i, i);
        while i < points.len() && points[i].x.floor() == column {
            // Screen Y is flipped: larger y is lower on screen
            if points[i].y > points[lo].y {
                lo = i;
            }
            if points[i].y < points[hi].y {
                hi = i;
            }
            i += 1;
        }
        let end = i - 1;

        let mut picks = [start, lo, hi, end];
        picks.sort_unstable();
        let mut last = None;
        for pick in picks {
            if last != Some(pick) {
                out.push(points[pick]);
                last = Some(pick);
            }
        }
    }

    out
}

/// Line plot widget
#[derive(Default)]
pub struct PlotView {
    pub settings: PlotSettings,
}

impl PlotView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the plot into the available space
    pub fn show(&self, ui: &mut egui::Ui, plot: &Plot) -> egui::Response {
        let size = ui.available_size().max(Vec2::new(200.0, 150.0));
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let outer = response.rect;

        painter.rect_filled(outer, 4.0, self.settings.background);

        let margin = self.settings.margin;
        let data_rect = Rect::from_min_max(
            Pos2::new(outer.left() + margin, outer.top() + margin * 0.5),
            Pos2::new(outer.right() - margin * 0.5, outer.bottom() - margin),
        );

        self.draw_labels(&painter, outer, data_rect, plot);

        let Some(viewport) = plot.bounds().and_then(|b| Viewport::new(b, plot.x_scale)) else {
            painter.text(
                data_rect.center(),
                Align2::CENTER_CENTER,
                "No data",
                FontId::proportional(14.0),
                self.settings.text,
            );
            return response;
        };

        self.draw_grid(&painter, data_rect, &viewport);
        self.draw_series(&painter, data_rect, &viewport, plot);
        self.draw_legend(&painter, data_rect, plot);

        response
    }

    fn draw_labels(&self, painter: &egui::Painter, outer: Rect, data_rect: Rect, plot: &Plot) {
        let font = FontId::proportional(13.0);
        painter.text(
            Pos2::new(data_rect.center().x, outer.bottom() - 6.0),
            Align2::CENTER_BOTTOM,
            &plot.x_label,
            font.clone(),
            self.settings.text,
        );
        painter.text(
            Pos2::new(outer.left() + 6.0, outer.top() + 6.0),
            Align2::LEFT_TOP,
            &plot.y_label,
            font,
            self.settings.text,
        );
    }

    /// Draw grid lines with tick labels
    fn draw_grid(&self, painter: &egui::Painter, rect: Rect, viewport: &Viewport) {
        let stroke = Stroke::new(0.5, self.settings.grid);
        let font = FontId::monospace(10.0);

        for x in viewport.x_ticks(self.settings.divisions) {
            if let Some(pos) = viewport.to_screen(x, viewport.y_min, rect) {
                painter.line_segment([Pos2::new(pos.x, rect.top()), Pos2::new(pos.x, rect.bottom())], stroke);
                painter.text(
                    Pos2::new(pos.x, rect.bottom() + 4.0),
                    Align2::CENTER_TOP,
                    format_tick(x),
                    font.clone(),
                    self.settings.text,
                );
            }
        }

        for y in viewport.y_ticks(self.settings.divisions) {
            let norm = (y - viewport.y_min) / (viewport.y_max - viewport.y_min);
            let py = rect.bottom() - norm as f32 * rect.height();
            painter.line_segment([Pos2::new(rect.left(), py), Pos2::new(rect.right(), py)], stroke);
            painter.text(
                Pos2::new(rect.left() - 4.0, py),
                Align2::RIGHT_CENTER,
                format_tick(y),
                font.clone(),
                self.settings.text,
            );
        }
    }

    fn draw_series(&self, painter: &egui::Painter, rect: Rect, viewport: &Viewport, plot: &Plot) {
        for (index, series) in plot.series.iter().enumerate() {
            let color = PALETTE[index % PALETTE.len()];

            let points: Vec<Pos2> = series
                .points
                .iter()
                .filter_map(|p| viewport.to_screen(p[0], p[1], rect))
                .collect();
            let points = reduce_columns(&points);

            if points.len() >= 2 {
                painter.add(egui::Shape::line(
                    points,
                    Stroke::new(self.settings.line_width, color),
                ));
            }
        }
    }

    fn draw_legend(&self, painter: &egui::Painter, rect: Rect, plot: &Plot) {
        if plot.series.len() < 2 {
            return;
        }
        let font = FontId::proportional(12.0);
        for (index, series) in plot.series.iter().enumerate() {
            let color = PALETTE[index % PALETTE.len()];
            let y = rect.top() + 8.0 + index as f32 * 16.0;
            let x = rect.right() - 90.0;
            painter.line_segment([Pos2::new(x, y), Pos2::new(x + 16.0, y)], Stroke::new(2.0, color));
            painter.text(
                Pos2::new(x + 22.0, y),
                Align2::LEFT_CENTER,
                &series.name,
                font.clone(),
                self.settings.text,
            );
        }
    }
}
