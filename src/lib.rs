//! # compare-maps
//!
//! Compare two georeferenced raster maps: clip them to a common extent,
//! write the pixel-wise difference as a new raster and plot corresponding
//! pixel values against each other.
//!
//! The pipeline is:
//!
//! 1. [`negotiate::ExtentNegotiator`] clips the non-boundary map to the
//!    boundary map through a [`clip::RasterClipper`], checks the resulting
//!    band shapes and performs at most one corrective reclip.
//! 2. [`difference::compute_difference`] computes
//!    `band1 * scale1 - band2 * scale2` in `f64`, which is written with the
//!    first map's geotransform and projection plus a `_meta.txt` sidecar
//!    ([`metadata::Provenance`]).
//! 3. [`scatter::ScatterPlot`] renders map 2 values (X) against map 1
//!    values (Y) to a PNG.
//!
//! [`compare::run`] wires these together from a [`config::CompareConfig`].
//!
//! ## Example
//!
//! ```rust, no_run
//! use compare_maps::config::{BoundaryMap, ClipperKind, CompareConfig, MapInput};
//!
//! # fn main() -> compare_maps::errors::Result<()> {
//! let config = CompareConfig::new(
//!     MapInput::new("model.tif"),
//!     MapInput::new("reference.tif"),
//!     "comparison",
//! )
//! .with_boundary(BoundaryMap::Map1)
//! .with_clipper(ClipperKind::Window);
//!
//! let report = compare_maps::compare::run(&config)?;
//! println!("difference written to {}", report.difference.display());
//! # Ok(())
//! # }
//! ```

pub mod clip;
pub mod compare;
pub mod config;
pub mod cpl;
pub mod difference;
pub mod errors;
pub mod geo_transform;
pub mod metadata;
pub mod negotiate;
pub mod raster;
pub mod scatter;

#[cfg(test)]
mod test_utils;

pub use compare::{run, ComparisonReport};
pub use config::{BoundaryMap, CompareConfig, MapInput};
pub use errors::{CompareError, Result};
