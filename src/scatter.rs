//! Scatterplot of corresponding pixel values.
//!
//! Map 2 values go on the X axis and map 1 values on the Y axis, each
//! already multiplied by its scale factor. The image is written with the
//! `plotters` bitmap backend; nothing is displayed.

use std::ops::Range;
use std::path::Path;

use ndarray::Array2;
use plotters::prelude::*;
use tracing::{debug, info, warn};

use crate::config::PlotStyle;
use crate::errors::{CompareError, Result};

#[derive(Debug, Clone)]
pub struct ScatterPlot {
    x: Vec<f64>,
    y: Vec<f64>,
    x_label: String,
    y_label: String,
}

fn plot_err<E: std::fmt::Display>(e: E) -> CompareError {
    CompareError::Plot(e.to_string())
}

/// Range of the finite values, padded by 5% so edge points stay visible.
fn axis_range<'a>(values: impl Iterator<Item = &'a f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 0.5)..(max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

impl ScatterPlot {
    /// Pairs `x[i]` with `y[i]`. Both sequences must have the same length.
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Result<Self> {
        if x.len() != y.len() {
            return Err(CompareError::ShapeMismatch {
                left: (y.len(), 1),
                right: (x.len(), 1),
            });
        }
        Ok(ScatterPlot {
            x,
            y,
            x_label: x_label.into(),
            y_label: y_label.into(),
        })
    }

    /// Flattens two scaled, shape-matched arrays (`x` from map 2, `y` from map 1).
    pub fn from_arrays(
        x: &Array2<f64>,
        y: &Array2<f64>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Result<Self> {
        if x.dim() != y.dim() {
            return Err(CompareError::ShapeMismatch {
                left: y.dim(),
                right: x.dim(),
            });
        }
        Self::new(
            x.iter().copied().collect(),
            y.iter().copied().collect(),
            x_label,
            y_label,
        )
    }

    /// Number of points, including pairs with non-finite values.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    /// Pairs that can be placed on the chart.
    pub fn finite_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(x, y)| (*x, *y))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    }

    /// Renders the plot as a PNG at `path`.
    ///
    /// When no font is available to draw the axis labels the chart is still
    /// written, without the mesh and labels.
    pub fn render(&self, path: &Path, style: &PlotStyle) -> Result<()> {
        let x_range = axis_range(self.x.iter());
        let y_range = axis_range(self.y.iter());

        let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(plot_err)?;

        if let Err(e) = chart
            .configure_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .draw()
        {
            warn!(error = %e, "Unable to draw scatter plot axes and labels");
        }

        let marker = BLUE.mix(0.5).filled();
        let size = style.point_size;
        chart
            .draw_series(
                self.finite_points()
                    .map(|(x, y)| Circle::new((x, y), size, marker)),
            )
            .map_err(plot_err)?;
        root.present().map_err(plot_err)?;

        let skipped = self.len() - self.finite_points().count();
        if skipped > 0 {
            debug!(skipped, "Skipped non-finite scatter points");
        }
        info!(path = %path.display(), points = self.len(), "Wrote scatter plot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RasterFixture;
    use ndarray::arr2;

    #[test]
    fn test_from_arrays_point_count() {
        let x = Array2::from_shape_fn((4, 5), |(r, c)| (r * 5 + c) as f64);
        let y = &x * 2.0;
        let plot = ScatterPlot::from_arrays(&x, &y, "b.tif", "a.tif").unwrap();
        assert_eq!(plot.len(), 20);
        let points: Vec<_> = plot.finite_points().collect();
        assert_eq!(points[7], (7.0, 14.0));
        assert_eq!(plot.x_label(), "b.tif");
        assert_eq!(plot.y_label(), "a.tif");
    }

    #[test]
    fn test_from_arrays_shape_mismatch() {
        let x = Array2::<f64>::zeros((2, 2));
        let y = Array2::<f64>::zeros((1, 4));
        assert!(matches!(
            ScatterPlot::from_arrays(&x, &y, "x", "y"),
            Err(CompareError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_axis_range() {
        let r = axis_range([1.0, f64::NAN, 3.0].iter());
        assert!(r.start < 1.0 && r.end > 3.0);
        assert_eq!(axis_range([2.0, 2.0].iter()), 1.5..2.5);
        assert_eq!(axis_range([f64::NAN].iter()), 0.0..1.0);
    }

    #[test]
    fn test_render_png() {
        let fixture = RasterFixture::new();
        let path = fixture.path("a_vs_b_scatter.png");
        let plot = ScatterPlot::from_arrays(
            &arr2(&[[1.0, 2.0], [3.0, f64::NAN]]),
            &arr2(&[[1.5, 2.5], [2.0, 4.0]]),
            "b.tif",
            "a.tif",
        )
        .unwrap();
        plot.render(&path, &PlotStyle::default()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
