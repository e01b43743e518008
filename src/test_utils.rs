use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::raster::{write_array, write_bands, RasterLayout};

/// WGS 84 geographic WKT stamped on every generated fixture.
pub const TEST_WKT: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;

/// Upper-left corner used by most fixtures.
pub const GRID_ORIGIN: (f64, f64) = (10.0, 50.0);

/// Pixel size used by [`RasterFixture::grid`].
pub const PIXEL_SIZE: f64 = 0.01;

/// A temporary directory holding generated GeoTIFF fixtures.
///
/// The directory and everything in it is removed on `drop`.
pub struct RasterFixture {
    temp_dir: tempfile::TempDir,
}

impl RasterFixture {
    pub fn new() -> Self {
        RasterFixture {
            temp_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path to a (possibly not yet existing) file named `name` in the fixture dir.
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes a single band `Int32` GeoTIFF of `shape` `(rows, cols)` with
    /// [`PIXEL_SIZE`] pixels and its upper-left corner at `origin`.
    pub fn grid<F>(&self, name: &str, shape: (usize, usize), origin: (f64, f64), value: F) -> PathBuf
    where
        F: Fn(usize, usize) -> i32,
    {
        let gt = [origin.0, PIXEL_SIZE, 0.0, origin.1, 0.0, -PIXEL_SIZE];
        self.raster(name, &gt, &Array2::from_shape_fn(shape, |(r, c)| value(r, c)))
    }

    /// Like [`RasterFixture::grid`], with `count` bands; `value` receives the
    /// 1-based band index first.
    pub fn grid_bands<F>(
        &self,
        name: &str,
        shape: (usize, usize),
        origin: (f64, f64),
        count: usize,
        value: F,
    ) -> PathBuf
    where
        F: Fn(usize, usize, usize) -> i32,
    {
        let path = self.path(name);
        let bands: Vec<_> = (1..=count)
            .map(|b| Array2::from_shape_fn(shape, |(r, c)| value(b, r, c)))
            .collect();
        write_bands(
            &path,
            &bands,
            RasterLayout {
                driver: "GTiff",
                geo_transform: &[origin.0, PIXEL_SIZE, 0.0, origin.1, 0.0, -PIXEL_SIZE],
                projection: TEST_WKT,
            },
        )
        .unwrap();
        path
    }

    /// Writes `values` as a single band GeoTIFF with the given geotransform.
    pub fn raster<T>(&self, name: &str, gt: &gdal::GeoTransform, values: &Array2<T>) -> PathBuf
    where
        T: gdal::raster::GdalType + Copy,
    {
        let path = self.path(name);
        write_array(
            &path,
            values,
            RasterLayout {
                driver: "GTiff",
                geo_transform: gt,
                projection: TEST_WKT,
            },
        )
        .unwrap();
        path
    }
}

/// Assert numerical difference between two expressions is less than
/// 64-bit machine epsilon or a specified epsilon.
#[macro_export]
macro_rules! assert_near {
    ($left:expr, $right:expr) => {
        $crate::assert_near!($left, $right, epsilon = f64::EPSILON)
    };
    ($left:expr, $right:expr, epsilon = $ep:expr) => {
        assert!(
            ($left - $right).abs() < $ep,
            "|{} - {}| = {} is greater than epsilon {:.4e}",
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
}
