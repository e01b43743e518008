use std::path::Path;

use gdal::raster::{Buffer, GdalType};
use gdal::{Dataset, DriverManager, GeoTransform, Metadata};
use ndarray::Array2;
use tracing::debug;

use crate::errors::{CompareError, Result};

/// Georeferencing and format of a raster about to be written.
#[derive(Debug, Clone, Copy)]
pub struct RasterLayout<'a> {
    /// GDAL driver short name, e.g. `GTiff` or `ENVI`.
    pub driver: &'a str,
    pub geo_transform: &'a GeoTransform,
    /// WKT; left unset on the output when empty.
    pub projection: &'a str,
}

/// File extension (without the dot) that `driver` declares for its files,
/// if any.
pub fn driver_extension(driver: &str) -> Result<Option<String>> {
    let driver = DriverManager::get_driver_by_name(driver)?;
    Ok(driver
        .metadata_item("DMD_EXTENSION", "")
        .filter(|ext| !ext.is_empty()))
}

/// Writes `values` as band 1 of a new raster at `path`.
///
/// The band type follows `T`. The returned dataset is still open so callers
/// can attach metadata before it is dropped and flushed.
pub fn write_array<T, P>(path: P, values: &Array2<T>, layout: RasterLayout<'_>) -> Result<Dataset>
where
    T: GdalType + Copy,
    P: AsRef<Path>,
{
    write_bands(path, std::slice::from_ref(values), layout)
}

/// Writes `bands[i]` as band `i + 1` of a new raster at `path`.
///
/// Every band must have the shape of the first one.
pub fn write_bands<T, P>(path: P, bands: &[Array2<T>], layout: RasterLayout<'_>) -> Result<Dataset>
where
    T: GdalType + Copy,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let (rows, cols) = bands.first().map(|b| b.dim()).unwrap_or((0, 0));
    if let Some(other) = bands.iter().find(|b| b.dim() != (rows, cols)) {
        return Err(CompareError::ShapeMismatch {
            left: (rows, cols),
            right: other.dim(),
        });
    }
    let driver = DriverManager::get_driver_by_name(layout.driver)?;
    let mut dataset = driver.create_with_band_type::<T, _>(path, cols, rows, bands.len())?;
    dataset.set_geo_transform(layout.geo_transform)?;
    if !layout.projection.is_empty() {
        dataset.set_projection(layout.projection)?;
    }

    for (i, values) in bands.iter().enumerate() {
        let mut band = dataset.rasterband(i + 1)?;
        let mut buffer = Buffer::new((cols, rows), values.iter().copied().collect());
        band.write((0, 0), (cols, rows), &mut buffer)?;
    }
    dataset.flush_cache()?;

    debug!(
        path = %path.display(),
        driver = layout.driver,
        rows,
        cols,
        bands = bands.len(),
        "Wrote raster"
    );
    Ok(dataset)
}
