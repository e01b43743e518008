//! Run configuration for a map comparison.
//!
//! Everything the pipeline needs is collected into a [`CompareConfig`] and
//! passed explicitly to [`crate::compare::run`]. The binary builds it from the
//! command line; library users build it directly:
//!
//! ```
//! use compare_maps::config::{BoundaryMap, CompareConfig, MapInput};
//!
//! let config = CompareConfig::new(
//!     MapInput::new("model.tif"),
//!     MapInput::new("reference.tif").with_scale(0.1),
//!     "out",
//! )
//! .with_boundary(BoundaryMap::Map2);
//! assert_eq!(config.map2.scale, 0.1);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::errors::{CompareError, Result};

/// Error returned when a textual option value cannot be parsed.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseOptionError(String);

/// One of the two rasters being compared.
#[derive(Debug, Clone, PartialEq)]
pub struct MapInput {
    pub path: PathBuf,
    /// 1-based band index.
    pub band: usize,
    /// Every pixel is multiplied by this factor before differencing.
    pub scale: f64,
}

impl MapInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MapInput {
            path: path.into(),
            band: 1,
            scale: 1.0,
        }
    }

    pub fn with_band(mut self, band: usize) -> Self {
        self.band = band;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Which raster defines the reference extent the other one is clipped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMap {
    #[default]
    Map1,
    Map2,
}

impl TryFrom<i64> for BoundaryMap {
    type Error = CompareError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(BoundaryMap::Map1),
            2 => Ok(BoundaryMap::Map2),
            other => Err(CompareError::InvalidBoundaryMap(other.to_string())),
        }
    }
}

impl FromStr for BoundaryMap {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map_err(|_| CompareError::InvalidBoundaryMap(s.to_string()))
            .and_then(BoundaryMap::try_from)
            .map_err(|e| ParseOptionError(e.to_string()))
    }
}

impl fmt::Display for BoundaryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryMap::Map1 => f.write_str("1"),
            BoundaryMap::Map2 => f.write_str("2"),
        }
    }
}

/// What to do when the two inputs report different projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionPolicy {
    Off,
    #[default]
    Warn,
    Strict,
}

impl FromStr for ProjectionPolicy {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(ProjectionPolicy::Off),
            "warn" => Ok(ProjectionPolicy::Warn),
            "strict" => Ok(ProjectionPolicy::Strict),
            other => Err(ParseOptionError(format!(
                "unknown projection check '{other}', expected off, warn or strict"
            ))),
        }
    }
}

/// The clip implementation used by the extent negotiator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipperKind {
    /// Run an external `intersectMask`-compatible program.
    Command { program: String },
    /// Read the overlapping window in process.
    Window,
}

impl Default for ClipperKind {
    fn default() -> Self {
        ClipperKind::Command {
            program: DEFAULT_CLIP_PROGRAM.to_string(),
        }
    }
}

pub const DEFAULT_CLIP_PROGRAM: &str = "intersectMask";
pub const DEFAULT_DRIVER: &str = "GTiff";

/// Pixel size and marker radius of the scatter image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub point_size: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        PlotStyle {
            width: 800,
            height: 600,
            point_size: 2,
        }
    }
}

/// Parses `WIDTHxHEIGHT`, e.g. `1024x768`.
pub fn parse_plot_size(s: &str) -> std::result::Result<(u32, u32), ParseOptionError> {
    let err = || ParseOptionError(format!("invalid plot size '{s}', expected WIDTHxHEIGHT"));
    let (w, h) = s.split_once(['x', 'X']).ok_or_else(err)?;
    let width = w.trim().parse::<u32>().map_err(|_| err())?;
    let height = h.trim().parse::<u32>().map_err(|_| err())?;
    if width == 0 || height == 0 {
        return Err(err());
    }
    Ok((width, height))
}

/// Splits a `KEY=VALUE` GDAL config option.
pub fn parse_config_option(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(CompareError::InvalidConfigOption(s.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub map1: MapInput,
    pub map2: MapInput,
    pub output_dir: PathBuf,
    pub boundary: BoundaryMap,
    pub clipper: ClipperKind,
    /// GDAL driver short name for the difference raster.
    pub driver: String,
    pub projection_policy: ProjectionPolicy,
    pub plot: PlotStyle,
    /// GDAL config options applied before any dataset is opened.
    pub gdal_options: Vec<(String, String)>,
    /// Free-form notes copied into the metadata sidecar.
    pub notes: Option<String>,
    /// Invocation recorded in the metadata sidecar.
    pub command_line: Vec<String>,
}

impl CompareConfig {
    pub fn new(map1: MapInput, map2: MapInput, output_dir: impl Into<PathBuf>) -> Self {
        CompareConfig {
            map1,
            map2,
            output_dir: output_dir.into(),
            boundary: BoundaryMap::default(),
            clipper: ClipperKind::default(),
            driver: DEFAULT_DRIVER.to_string(),
            projection_policy: ProjectionPolicy::default(),
            plot: PlotStyle::default(),
            gdal_options: Vec::new(),
            notes: None,
            command_line: Vec::new(),
        }
    }

    pub fn with_boundary(mut self, boundary: BoundaryMap) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_clipper(mut self, clipper: ClipperKind) -> Self {
        self.clipper = clipper;
        self
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    pub fn with_projection_policy(mut self, policy: ProjectionPolicy) -> Self {
        self.projection_policy = policy;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_command_line<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_line = args.into_iter().map(Into::into).collect();
        self
    }

    /// Pushes every configured option into GDAL's process-wide config.
    pub fn apply_gdal_options(&self) -> Result<()> {
        for (key, value) in &self.gdal_options {
            debug!(%key, %value, "Setting GDAL config option");
            gdal::config::set_config_option(key, value)?;
        }
        Ok(())
    }
}
