//! Raster access on top of the `gdal` bindings.
//!
//! [`RasterHandle`] wraps an opened, read-only [`gdal::Dataset`] together
//! with its path, [`Band`] holds one band's pixels as an `f64` array and
//! [`write_array`]/[`write_bands`] create new rasters from arrays.

mod band;
mod dataset;
mod writer;

pub use band::Band;
pub use dataset::RasterHandle;
pub use writer::{driver_extension, write_array, write_bands, RasterLayout};
