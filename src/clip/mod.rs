//! Clipping a source raster to the extent of a mask raster.
//!
//! The extent negotiator only talks to the [`RasterClipper`] trait. Two
//! implementations exist: [`CommandClipper`] runs an external
//! `intersectMask`-compatible program, [`WindowClipper`] reads the
//! overlapping window through GDAL in process.

mod command;
mod window;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use command::CommandClipper;
pub use window::WindowClipper;

use crate::config::ClipperKind;
use crate::errors::{CompareError, Result};

/// Everything needed to clip `source` to the extent of `mask`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRequest {
    pub source: PathBuf,
    pub mask: PathBuf,
    pub source_band: usize,
    pub mask_band: usize,
    pub output_dir: PathBuf,
}

impl ClipRequest {
    /// `<output dir>/<source base>_clippedto_<mask base><source ext>`
    pub fn output_path(&self) -> PathBuf {
        let mut name = file_stem(&self.source);
        name.push("_clippedto_");
        name.push(file_stem(&self.mask));
        if let Some(ext) = self.source.extension() {
            name.push(".");
            name.push(ext);
        }
        self.output_dir.join(name)
    }
}

/// File name without directory and extension.
pub(crate) fn file_stem(path: &Path) -> OsString {
    path.file_stem().map(OsString::from).unwrap_or_default()
}

/// Result of a successful clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipOutcome {
    pub output: PathBuf,
    /// Anything the clipper printed, kept for the logs.
    pub log: String,
}

pub trait RasterClipper {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Writes the clipped raster to [`ClipRequest::output_path`].
    ///
    /// Implementations must fail rather than return when no output raster
    /// was produced.
    fn clip(&self, request: &ClipRequest) -> Result<ClipOutcome>;
}

impl<C: RasterClipper + ?Sized> RasterClipper for &C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn clip(&self, request: &ClipRequest) -> Result<ClipOutcome> {
        (**self).clip(request)
    }
}

impl<C: RasterClipper + ?Sized> RasterClipper for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn clip(&self, request: &ClipRequest) -> Result<ClipOutcome> {
        (**self).clip(request)
    }
}

impl ClipperKind {
    pub fn build(&self) -> Box<dyn RasterClipper> {
        match self {
            ClipperKind::Command { program } => Box::new(CommandClipper::new(program)),
            ClipperKind::Window => Box::new(WindowClipper),
        }
    }
}

/// Removes a previous output so a failing clipper cannot leave a stale file
/// that looks like a fresh result.
pub(crate) fn remove_stale_output(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed stale clip output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CompareError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let request = ClipRequest {
            source: PathBuf::from("/data/model/runoff.tif"),
            mask: PathBuf::from("/data/ref/observed.img"),
            source_band: 1,
            mask_band: 2,
            output_dir: PathBuf::from("/tmp/out"),
        };
        assert_eq!(
            request.output_path(),
            PathBuf::from("/tmp/out/runoff_clippedto_observed.tif")
        );
    }

    #[test]
    fn test_output_path_without_extension() {
        let request = ClipRequest {
            source: PathBuf::from("a"),
            mask: PathBuf::from("b.tif"),
            source_band: 1,
            mask_band: 1,
            output_dir: PathBuf::from("out"),
        };
        assert_eq!(request.output_path(), PathBuf::from("out/a_clippedto_b"));
    }

    #[test]
    fn test_kind_build() {
        let kind = ClipperKind::Command {
            program: "intersectMask".to_string(),
        };
        assert_eq!(kind.build().name(), "intersectMask");
        assert_eq!(ClipperKind::Window.build().name(), "window");
    }
}
