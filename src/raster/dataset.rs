use std::path::{Path, PathBuf};

use gdal::{Dataset, GeoTransform};
use geo_types::Rect;
use ndarray::Array2;
use tracing::debug;

use crate::errors::{CompareError, Result};
use crate::geo_transform::{self, PixelWindow};
use crate::raster::Band;

/// An opened raster dataset.
///
/// Handles are read-only and meant to be short lived: open, inspect or read,
/// then drop.
pub struct RasterHandle {
    path: PathBuf,
    dataset: Dataset,
}

impl RasterHandle {
    /// Opens `path` read-only.
    ///
    /// A path that does not exist yields [`CompareError::MissingInput`]
    /// rather than GDAL's less specific open failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CompareError::MissingInput(path.to_path_buf()));
        }
        let dataset = Dataset::open(path)?;
        debug!(path = %path.display(), "Opened raster");
        Ok(RasterHandle {
            path: path.to_path_buf(),
            dataset,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Projection as WKT, empty when the dataset has none.
    pub fn projection(&self) -> String {
        self.dataset.projection()
    }

    pub fn geo_transform(&self) -> Result<GeoTransform> {
        Ok(self.dataset.geo_transform()?)
    }

    pub fn band_count(&self) -> usize {
        self.dataset.raster_count()
    }

    /// Raster size as `(cols, rows)`.
    pub fn size(&self) -> (usize, usize) {
        self.dataset.raster_size()
    }

    pub fn extent(&self) -> Result<Rect<f64>> {
        Ok(geo_transform::extent(&self.geo_transform()?, self.size()))
    }

    fn check_band(&self, index: usize) -> Result<()> {
        let count = self.band_count();
        if index == 0 || index > count {
            return Err(CompareError::BandOutOfRange {
                path: self.path.clone(),
                band: index,
                count,
            });
        }
        Ok(())
    }

    /// Shape of band `index` as `(rows, cols)`, without reading pixels.
    pub fn band_shape(&self, index: usize) -> Result<(usize, usize)> {
        self.check_band(index)?;
        let (cols, rows) = self.dataset.rasterband(index)?.size();
        Ok((rows, cols))
    }

    /// Reads the whole of band `index` (1-based).
    pub fn read_band(&self, index: usize) -> Result<Band> {
        let (cols, rows) = {
            self.check_band(index)?;
            self.dataset.rasterband(index)?.size()
        };
        self.read_window(
            index,
            PixelWindow {
                offset: (0, 0),
                size: (cols, rows),
            },
        )
    }

    /// Reads a window of band `index` (1-based) at native resolution.
    pub fn read_window(&self, index: usize, window: PixelWindow) -> Result<Band> {
        self.check_band(index)?;
        let band = self.dataset.rasterband(index)?;
        let (cols, rows) = window.size;
        let mut data = vec![0f64; cols * rows];
        band.read_into_slice(
            (window.offset.0 as isize, window.offset.1 as isize),
            (cols, rows),
            (cols, rows),
            &mut data,
            None,
        )?;
        let values = Array2::from_shape_vec((rows, cols), data)?;
        Ok(Band::new(band.band_type(), band.no_data_value(), values))
    }
}

impl std::fmt::Debug for RasterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterHandle")
            .field("path", &self.path)
            .field("size", &self.size())
            .field("bands", &self.band_count())
            .finish()
    }
}
