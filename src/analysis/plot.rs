//! Plot description shared by the analysis views and the renderer
//!
//! A [`Plot`] is plain data: titles, axis scaling and named point series.
//! Building one never touches the GUI, so the views can be tested directly.

/// How the x axis maps values to screen positions
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AxisScale {
    Linear,
    /// Base-10 logarithmic; non-positive values are not drawn
    Log,
}

impl AxisScale {
    /// Map a data value into axis space, or None if it cannot be shown
    pub fn transform(&self, value: f64) -> Option<f64> {
        match self {
            AxisScale::Linear => Some(value),
            AxisScale::Log => (value > 0.0).then(|| value.log10()),
        }
    }

    /// Inverse of [`transform`](Self::transform)
    pub fn inverse(&self, value: f64) -> f64 {
        match self {
            AxisScale::Linear => value,
            AxisScale::Log => 10f64.powf(value),
        }
    }
}

/// One named line on a plot
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub name: String,
    /// (x, y) pairs in ascending x order
    pub points: Vec<[f64; 2]>,
}

impl Series {
    pub fn new(name: impl Into<String>, points: Vec<[f64; 2]>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

/// Data range covered by a plot
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// A 2D line plot
#[derive(Clone, Debug, PartialEq)]
pub struct Plot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_scale: AxisScale,
    /// Fixed x range; derived from the data when None
    pub x_range: Option<(f64, f64)>,
    pub series: Vec<Series>,
}

impl Plot {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            x_scale: AxisScale::Linear,
            x_range: None,
            series: Vec::new(),
        }
    }

    pub fn with_x_scale(mut self, scale: AxisScale) -> Self {
        self.x_scale = scale;
        self
    }

    pub fn with_x_range(mut self, min: f64, max: f64) -> Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn add_series(&mut self, series: Series) -> &mut Self {
        self.series.push(series);
        self
    }

    /// Total number of points across all series
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    /// Data range of everything drawable, or None for an empty plot
    ///
    /// Points outside a fixed x range, or not representable on a log axis,
    /// do not contribute to the y range.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;

        let visible = self
            .series
            .iter()
            .flat_map(|s| s.points.iter())
            .filter(|p| self.x_scale.transform(p[0]).is_some())
            .filter(|p| match self.x_range {
                Some((min, max)) => p[0] >= min && p[0] <= max,
                None => true,
            });

        for &[x, y] in visible {
            let b = bounds.get_or_insert(Bounds {
                x_min: x,
                x_max: x,
                y_min: y,
                y_max: y,
            });
            b.x_min = b.x_min.min(x);
            b.x_max = b.x_max.max(x);
            b.y_min = b.y_min.min(y);
            b.y_max = b.y_max.max(y);
        }

        let mut bounds = bounds?;
        if let Some((min, max)) = self.x_range {
            bounds.x_min = min;
            bounds.x_max = max;
        }
        // Flat data still gets a drawable height
        if bounds.y_max - bounds.y_min < f64::EPSILON {
            bounds.y_min -= 1.0;
            bounds.y_max += 1.0;
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_transform() {
        assert!((AxisScale::Log.transform(100.0).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(AxisScale::Log.transform(0.0), None);
        assert!((AxisScale::Log.inverse(3.0) - 1000.0).abs() < 1e-9);
        assert_eq!(AxisScale::Linear.transform(-4.0), Some(-4.0));
    }

    #[test]
    fn test_bounds_respect_fixed_range() {
        let mut plot = Plot::new("t", "x", "y").with_x_range(1.0, 10.0);
        plot.add_series(Series::new("a", vec![[0.5, 100.0], [2.0, 3.0], [5.0, -1.0]]));

        let b = plot.bounds().unwrap();
        assert_eq!((b.x_min, b.x_max), (1.0, 10.0));
        // The point at x = 0.5 is outside the range and ignored
        assert_eq!((b.y_min, b.y_max), (-1.0, 3.0));
    }

    #[test]
    fn test_bounds_of_flat_and_empty_plots() {
        let mut plot = Plot::new("t", "x", "y");
        assert!(plot.bounds().is_none());

        plot.add_series(Series::new("flat", vec![[0.0, 0.0], [1.0, 0.0]]));
        let b = plot.bounds().unwrap();
        assert_eq!((b.y_min, b.y_max), (-1.0, 1.0));
    }
}
