//! The comparison pipeline: negotiate extents, difference, plot.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::clip::{file_stem, RasterClipper};
use crate::config::{CompareConfig, ProjectionPolicy};
use crate::difference::{compute_difference, ComparisonResult, DifferenceStats};
use crate::errors::{CompareError, Result};
use crate::metadata::Provenance;
use crate::negotiate::ExtentNegotiator;
use crate::raster::{driver_extension, RasterHandle};
use crate::scatter::ScatterPlot;

/// Everything a run wrote, plus a summary of the difference.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    /// Rasters actually compared, after any clipping.
    pub map1: PathBuf,
    pub map2: PathBuf,
    pub clipped: Vec<PathBuf>,
    pub difference: PathBuf,
    pub metadata: PathBuf,
    pub scatter: PathBuf,
    /// `(rows, cols)`
    pub shape: (usize, usize),
    pub scatter_points: usize,
    pub stats: Option<DifferenceStats>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn stem(path: &Path) -> String {
    file_stem(path).to_string_lossy().into_owned()
}

/// `<map1 stem>_minus_<map2 stem>.<ext>`
///
/// `ext` is the output driver's extension; map 1's extension is used when
/// the driver declares none.
pub fn difference_file_name(map1: &Path, map2: &Path, ext: Option<&str>) -> String {
    let ext = ext
        .map(|e| format!(".{e}"))
        .or_else(|| map1.extension().map(|e| format!(".{}", e.to_string_lossy())))
        .unwrap_or_default();
    format!("{}_minus_{}{}", stem(map1), stem(map2), ext)
}

/// `<map1 stem>_vs_<map2 stem>_scatter.png`
pub fn scatter_file_name(map1: &Path, map2: &Path) -> String {
    format!("{}_vs_{}_scatter.png", stem(map1), stem(map2))
}

fn check_projections(map1: &Path, map2: &Path, policy: ProjectionPolicy) -> Result<()> {
    if policy == ProjectionPolicy::Off {
        return Ok(());
    }
    let p1 = RasterHandle::open(map1)?.projection();
    let p2 = RasterHandle::open(map2)?.projection();
    if p1 == p2 {
        return Ok(());
    }
    match policy {
        ProjectionPolicy::Strict => Err(CompareError::ProjectionMismatch { map1: p1, map2: p2 }),
        _ => {
            warn!(
                map1 = %map1.display(),
                map2 = %map2.display(),
                "Maps are not in the same projection, results may be meaningless"
            );
            Ok(())
        }
    }
}

fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| CompareError::io(dir, e))?;
    info!(path = %dir.display(), "New directory created");
    Ok(())
}

/// Runs a comparison with the clipper selected in `config`.
pub fn run(config: &CompareConfig) -> Result<ComparisonReport> {
    let clipper = config.clipper.build();
    run_with_clipper(config, &clipper)
}

/// Runs a comparison with an explicit clipper.
pub fn run_with_clipper<C: RasterClipper + ?Sized>(
    config: &CompareConfig,
    clipper: &C,
) -> Result<ComparisonReport> {
    for input in [&config.map1, &config.map2] {
        if !input.path.exists() {
            return Err(CompareError::MissingInput(input.path.clone()));
        }
    }
    config.apply_gdal_options()?;
    check_projections(&config.map1.path, &config.map2.path, config.projection_policy)?;
    ensure_output_dir(&config.output_dir)?;

    info!(
        map1 = %config.map1.path.display(),
        map2 = %config.map2.path.display(),
        boundary = %config.boundary,
        clipper = clipper.name(),
        "Comparing maps"
    );
    let pair = ExtentNegotiator::new(clipper, &config.output_dir).negotiate(
        &config.map1,
        &config.map2,
        config.boundary,
    )?;

    let map1 = RasterHandle::open(&pair.map1)?;
    let map2 = RasterHandle::open(&pair.map2)?;
    let band1 = map1.read_band(config.map1.band)?;
    let band2 = map2.read_band(config.map2.band)?;
    debug!(
        map1 = ?band1.data_type(),
        map2 = ?band2.data_type(),
        "Read bands"
    );

    let extension = driver_extension(&config.driver)?;
    let difference = compute_difference(&band1, config.map1.scale, &band2, config.map2.scale)?;
    let result = ComparisonResult {
        difference,
        geo_transform: map1.geo_transform()?,
        projection: pair.projection.clone(),
        path: config
            .output_dir
            .join(difference_file_name(&pair.map1, &pair.map2, extension.as_deref())),
    };
    let description = format!(
        "Difference map of {} and {}.",
        stem(&pair.map1),
        stem(&pair.map2)
    );
    result.write(&config.driver, &description)?;

    let provenance = Provenance {
        command_line: config.command_line.clone(),
        description,
        inputs: vec![config.map1.path.clone(), config.map2.path.clone()],
        notes: config.notes.clone(),
    };
    let metadata = provenance.write_sidecar(&result.path)?;

    let plot = ScatterPlot::from_arrays(
        &band2.scaled(config.map2.scale),
        &band1.scaled(config.map1.scale),
        file_name(&pair.map2),
        file_name(&pair.map1),
    )?;
    let scatter = config
        .output_dir
        .join(scatter_file_name(&pair.map1, &pair.map2));
    plot.render(&scatter, &config.plot)?;

    Ok(ComparisonReport {
        clipped: pair.clips.iter().map(|c| c.output.clone()).collect(),
        map1: pair.map1,
        map2: pair.map2,
        shape: band1.shape(),
        scatter_points: plot.len(),
        stats: result.stats(),
        difference: result.path,
        metadata,
        scatter,
    })
}
