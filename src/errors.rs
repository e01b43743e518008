use std::path::PathBuf;

use gdal::errors::GdalError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompareError>;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Map path does not exist: '{}'", .0.display())]
    MissingInput(PathBuf),
    #[error("boundarymap argument can only be 1 or 2, got '{0}'")]
    InvalidBoundaryMap(String),
    #[error("Band {band} is out of range for '{}' ({count} band(s) available)", .path.display())]
    BandOutOfRange {
        path: PathBuf,
        band: usize,
        count: usize,
    },
    #[error(transparent)]
    Gdal(#[from] GdalError),
    #[error(transparent)]
    Array(#[from] ndarray::ShapeError),
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to run clip program '{program}': {source}")]
    ClipSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Clip program '{program}' failed with {status}: {stderr}")]
    ClipFailed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("Clip reported success but produced no output at '{}'", .0.display())]
    ClipOutputMissing(PathBuf),
    #[error("'{}' does not overlap the extent of '{}'", .source_path.display(), .mask_path.display())]
    NoOverlap {
        source_path: PathBuf,
        mask_path: PathBuf,
    },
    #[error("'{}' has a rotated geotransform, only north-up rasters can be clipped", .0.display())]
    RotatedGeoTransform(PathBuf),
    #[error("Maps are not in the same projection. Please reproject before comparing.\n  map1: {map1}\n  map2: {map2}")]
    ProjectionMismatch { map1: String, map2: String },
    #[error("Band shapes still differ after reclipping: {left:?} (rows, cols) vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("Scatter plot rendering failed: {0}")]
    Plot(String),
    #[error("Invalid GDAL config option '{0}', expected KEY=VALUE")]
    InvalidConfigOption(String),
}

impl CompareError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompareError::Io {
            path: path.into(),
            source,
        }
    }
}
