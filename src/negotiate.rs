//! Extent negotiation: make two rasters shape-identical before arithmetic.
//!
//! 1. The map that is not the boundary map is clipped to the boundary map.
//! 2. Both bands are reopened and their shapes compared.
//! 3. If they still differ, the map with more pixels is clipped to the other
//!    one. This corrective pass runs once; a remaining mismatch is reported
//!    as [`CompareError::ShapeMismatch`].
//!
//! Inputs that already share shape and geotransform are passed through
//! without any clip.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::clip::{ClipRequest, RasterClipper};
use crate::config::{BoundaryMap, MapInput};
use crate::errors::{CompareError, Result};
use crate::raster::RasterHandle;

/// Which of the two maps a clip replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSlot {
    Map1,
    Map2,
}

/// A clip performed during negotiation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipStep {
    pub request: ClipRequest,
    pub replaced: MapSlot,
    pub output: PathBuf,
}

/// Two raster paths whose selected bands have identical shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiatedPair {
    pub map1: PathBuf,
    pub map2: PathBuf,
    /// `(rows, cols)` shared by both bands.
    pub shape: (usize, usize),
    /// Projection of the original first map.
    pub projection: String,
    pub clips: Vec<ClipStep>,
}

pub struct ExtentNegotiator<'a, C: ?Sized> {
    clipper: &'a C,
    output_dir: &'a Path,
}

struct Probe {
    shape: (usize, usize),
    geo_transform: gdal::GeoTransform,
}

fn probe(path: &Path, band: usize) -> Result<Probe> {
    let handle = RasterHandle::open(path)?;
    Ok(Probe {
        shape: handle.band_shape(band)?,
        geo_transform: handle.geo_transform()?,
    })
}

fn pixel_count(shape: (usize, usize)) -> usize {
    shape.0 * shape.1
}

impl<'a, C: RasterClipper + ?Sized> ExtentNegotiator<'a, C> {
    pub fn new(clipper: &'a C, output_dir: &'a Path) -> Self {
        ExtentNegotiator {
            clipper,
            output_dir,
        }
    }

    fn clip(
        &self,
        source: (&Path, usize),
        mask: (&Path, usize),
        replaced: MapSlot,
    ) -> Result<ClipStep> {
        let request = ClipRequest {
            source: source.0.to_path_buf(),
            mask: mask.0.to_path_buf(),
            source_band: source.1,
            mask_band: mask.1,
            output_dir: self.output_dir.to_path_buf(),
        };
        let outcome = self.clipper.clip(&request)?;
        if !outcome.log.is_empty() {
            debug!(clipper = self.clipper.name(), log = %outcome.log.trim_end());
        }
        Ok(ClipStep {
            request,
            replaced,
            output: outcome.output,
        })
    }

    /// Negotiates a common extent for `map1` and `map2`.
    ///
    /// Fails with [`CompareError::MissingInput`] before any clip when either
    /// path does not exist.
    pub fn negotiate(
        &self,
        map1: &MapInput,
        map2: &MapInput,
        boundary: BoundaryMap,
    ) -> Result<NegotiatedPair> {
        for input in [map1, map2] {
            if !input.path.exists() {
                return Err(CompareError::MissingInput(input.path.clone()));
            }
        }

        let projection = RasterHandle::open(&map1.path)?.projection();
        let first = probe(&map1.path, map1.band)?;
        let second = probe(&map2.path, map2.band)?;

        let mut path1 = map1.path.clone();
        let mut path2 = map2.path.clone();
        let mut clips = Vec::new();

        if first.shape == second.shape && first.geo_transform == second.geo_transform {
            info!(shape = ?first.shape, "Maps already share extent and resolution, no clip needed");
            return Ok(NegotiatedPair {
                map1: path1,
                map2: path2,
                shape: first.shape,
                projection,
                clips,
            });
        }

        let step = match boundary {
            BoundaryMap::Map1 => self.clip((&path2, map2.band), (&path1, map1.band), MapSlot::Map2)?,
            BoundaryMap::Map2 => self.clip((&path1, map1.band), (&path2, map2.band), MapSlot::Map1)?,
        };
        match step.replaced {
            MapSlot::Map1 => path1 = step.output.clone(),
            MapSlot::Map2 => path2 = step.output.clone(),
        }
        clips.push(step);

        let mut shape1 = probe(&path1, map1.band)?.shape;
        let mut shape2 = probe(&path2, map2.band)?.shape;

        if shape1 != shape2 {
            warn!(
                map1 = ?shape1,
                map2 = ?shape2,
                "Shapes differ after clipping, reclipping the larger map"
            );
            let step = if pixel_count(shape1) > pixel_count(shape2) {
                self.clip((&path1, map1.band), (&path2, map2.band), MapSlot::Map1)?
            } else {
                self.clip((&path2, map2.band), (&path1, map1.band), MapSlot::Map2)?
            };
            match step.replaced {
                MapSlot::Map1 => path1 = step.output.clone(),
                MapSlot::Map2 => path2 = step.output.clone(),
            }
            clips.push(step);

            shape1 = probe(&path1, map1.band)?.shape;
            shape2 = probe(&path2, map2.band)?.shape;
            if shape1 != shape2 {
                return Err(CompareError::ShapeMismatch {
                    left: shape1,
                    right: shape2,
                });
            }
        }

        info!(shape = ?shape1, clips = clips.len(), "Maps clipped to matching extent");
        Ok(NegotiatedPair {
            map1: path1,
            map2: path2,
            shape: shape1,
            projection,
            clips,
        })
    }
}
