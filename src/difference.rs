//! Pixel-wise difference of two shape-matched bands.

use std::path::{Path, PathBuf};

use gdal::{GeoTransform, Metadata};
use ndarray::Array2;
use tracing::info;

use crate::errors::{CompareError, Result};
use crate::raster::{write_array, Band, RasterLayout};

/// `band1 * scale1 - band2 * scale2`, element-wise, in `f64`.
pub fn compute_difference(band1: &Band, scale1: f64, band2: &Band, scale2: f64) -> Result<Array2<f64>> {
    if band1.shape() != band2.shape() {
        return Err(CompareError::ShapeMismatch {
            left: band1.shape(),
            right: band2.shape(),
        });
    }
    Ok(band1.scaled(scale1) - band2.scaled(scale2))
}

/// Summary of a difference array, ignoring NaN pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferenceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Pixels that contributed to the statistics.
    pub valid: usize,
}

impl DifferenceStats {
    pub fn of(values: &Array2<f64>) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut valid = 0usize;
        for &v in values.iter().filter(|v| !v.is_nan()) {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            valid += 1;
        }
        (valid > 0).then(|| DifferenceStats {
            min,
            max,
            mean: sum / valid as f64,
            valid,
        })
    }
}

/// A difference array with the georeferencing it is written with.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub difference: Array2<f64>,
    pub geo_transform: GeoTransform,
    pub projection: String,
    pub path: PathBuf,
}

impl ComparisonResult {
    pub fn stats(&self) -> Option<DifferenceStats> {
        DifferenceStats::of(&self.difference)
    }

    /// Writes the difference as a `Float64` raster with `driver`, storing
    /// `description` as the dataset's `DESCRIPTION` metadata item.
    pub fn write(&self, driver: &str, description: &str) -> Result<&Path> {
        let mut dataset = write_array(
            &self.path,
            &self.difference,
            RasterLayout {
                driver,
                geo_transform: &self.geo_transform,
                projection: &self.projection,
            },
        )?;
        dataset.set_metadata_item("DESCRIPTION", description, "")?;
        drop(dataset);

        let (rows, cols) = self.difference.dim();
        info!(path = %self.path.display(), rows, cols, "Wrote difference map");
        Ok(&self.path)
    }
}
