use tracing::{debug, info};

use super::{remove_stale_output, ClipOutcome, ClipRequest, RasterClipper};
use crate::errors::{CompareError, Result};
use crate::geo_transform::{self, is_north_up};
use crate::raster::{write_bands, RasterHandle, RasterLayout};

/// In-process clipper.
///
/// Reads the window of the source that covers the intersection of both
/// extents and writes it at the source resolution, with a shifted
/// geotransform, the source projection and the source driver. Every source
/// band is copied so band indices stay valid on the output. Only north-up
/// rasters are supported, and the output bands are `Float64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowClipper;

impl RasterClipper for WindowClipper {
    fn name(&self) -> &str {
        "window"
    }

    fn clip(&self, request: &ClipRequest) -> Result<ClipOutcome> {
        let output = request.output_path();
        remove_stale_output(&output)?;

        let source = RasterHandle::open(&request.source)?;
        let mask = RasterHandle::open(&request.mask)?;
        source.band_shape(request.source_band)?;
        mask.band_shape(request.mask_band)?;

        let source_gt = source.geo_transform()?;
        let mask_gt = mask.geo_transform()?;
        for (handle, gt) in [(&source, &source_gt), (&mask, &mask_gt)] {
            if !is_north_up(gt) {
                return Err(CompareError::RotatedGeoTransform(handle.path().to_path_buf()));
            }
        }

        let no_overlap = || CompareError::NoOverlap {
            source_path: request.source.clone(),
            mask_path: request.mask.clone(),
        };
        let area = geo_transform::intersection(&source.extent()?, &mask.extent()?)
            .ok_or_else(no_overlap)?;
        let window = geo_transform::window_for(&source_gt, source.size(), &area)?
            .ok_or_else(no_overlap)?;
        debug!(?window, "Source window covering mask extent");

        let mut values = Vec::with_capacity(source.band_count());
        let mut no_data = Vec::with_capacity(source.band_count());
        for index in 1..=source.band_count() {
            let band = source.read_window(index, window)?;
            no_data.push(band.no_data_value());
            values.push(band.into_values());
        }
        let driver = source.dataset().driver().short_name();
        let projection = source.projection();
        let out_gt = window.geo_transform(&source_gt);
        let dataset = write_bands(
            &output,
            &values,
            RasterLayout {
                driver: &driver,
                geo_transform: &out_gt,
                projection: &projection,
            },
        )?;
        for (i, no_data) in no_data.into_iter().enumerate() {
            if no_data.is_some() {
                dataset.rasterband(i + 1)?.set_no_data_value(no_data)?;
            }
        }
        drop(dataset);

        let (cols, rows) = window.size;
        info!(
            source = %request.source.display(),
            mask = %request.mask.display(),
            output = %output.display(),
            rows,
            cols,
            "Clipped to match extent"
        );
        Ok(ClipOutcome {
            output,
            log: format!(
                "window offset {:?} size {:?} from {}",
                window.offset,
                window.size,
                request.source.display()
            ),
        })
    }
}
