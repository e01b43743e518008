//! Extent arithmetic on GDAL [`GeoTransform`]s.
//!
//! A `GeoTransform`'s components have the following meanings:
//!
//!   * `GeoTransform[0]`: x-coordinate of the upper-left corner of the upper-left pixel.
//!   * `GeoTransform[1]`: W-E pixel resolution (pixel width).
//!   * `GeoTransform[2]`: row rotation (typically zero).
//!   * `GeoTransform[3]`: y-coordinate of the upper-left corner of the upper-left pixel.
//!   * `GeoTransform[4]`: column rotation (typically zero).
//!   * `GeoTransform[5]`: N-S pixel resolution (pixel height), negative value for a North-up image.
//!
//! Extents are represented as [`geo_types::Rect`], which keeps its corners
//! normalised regardless of the sign of the pixel height.

use gdal::{GeoTransform, GeoTransformEx};
use geo_types::{coord, Rect};

use crate::errors::Result;

/// Tolerance, in pixels, under which a fractional pixel position is snapped
/// to the nearest pixel edge.
const PIXEL_EPSILON: f64 = 1e-6;

/// Returns `true` when the transform has no rotation terms.
pub fn is_north_up(transform: &GeoTransform) -> bool {
    transform[2] == 0.0 && transform[4] == 0.0
}

/// Georeferenced bounding box of a raster of `size` `(cols, rows)`.
pub fn extent(transform: &GeoTransform, size: (usize, usize)) -> Rect<f64> {
    let (cols, rows) = (size.0 as f64, size.1 as f64);
    let corners = [
        transform.apply(0.0, 0.0),
        transform.apply(cols, 0.0),
        transform.apply(0.0, rows),
        transform.apply(cols, rows),
    ];
    let (mut min_x, mut min_y) = corners[0];
    let (mut max_x, mut max_y) = corners[0];
    for (x, y) in &corners[1..] {
        min_x = min_x.min(*x);
        min_y = min_y.min(*y);
        max_x = max_x.max(*x);
        max_y = max_y.max(*y);
    }
    Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y })
}

/// Intersection of two extents, `None` when they do not share any area.
pub fn intersection(a: &Rect<f64>, b: &Rect<f64>) -> Option<Rect<f64>> {
    let min_x = a.min().x.max(b.min().x);
    let min_y = a.min().y.max(b.min().y);
    let max_x = a.max().x.min(b.max().x);
    let max_y = a.max().y.min(b.max().y);
    if min_x >= max_x || min_y >= max_y {
        return None;
    }
    Some(Rect::new(
        coord! { x: min_x, y: min_y },
        coord! { x: max_x, y: max_y },
    ))
}

/// A pixel window inside a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    /// `(col, row)` of the upper-left pixel.
    pub offset: (usize, usize),
    /// `(cols, rows)`.
    pub size: (usize, usize),
}

impl PixelWindow {
    /// Geotransform of a raster holding only this window.
    pub fn geo_transform(&self, parent: &GeoTransform) -> GeoTransform {
        let (x, y) = parent.apply(self.offset.0 as f64, self.offset.1 as f64);
        [x, parent[1], parent[2], y, parent[4], parent[5]]
    }
}

fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < PIXEL_EPSILON {
        rounded
    } else {
        value
    }
}

/// Pixel window of a raster (`transform`, `size` as `(cols, rows)`) that
/// covers `area`, clamped to the raster bounds.
///
/// Partially covered edge pixels are included. Returns `None` when the
/// window would be empty.
pub fn window_for(
    transform: &GeoTransform,
    size: (usize, usize),
    area: &Rect<f64>,
) -> Result<Option<PixelWindow>> {
    let inverse = transform.invert()?;
    let (p0, l0) = inverse.apply(area.min().x, area.max().y);
    let (p1, l1) = inverse.apply(area.max().x, area.min().y);

    let col_start = snap(p0.min(p1)).floor().max(0.0);
    let col_end = snap(p0.max(p1)).ceil().min(size.0 as f64);
    let row_start = snap(l0.min(l1)).floor().max(0.0);
    let row_end = snap(l0.max(l1)).ceil().min(size.1 as f64);

    if col_end <= col_start || row_end <= row_start {
        return Ok(None);
    }
    Ok(Some(PixelWindow {
        offset: (col_start as usize, row_start as usize),
        size: ((col_end - col_start) as usize, (row_end - row_start) as usize),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_near;

    const GT: GeoTransform = [100.0, 10.0, 0.0, 500.0, 0.0, -10.0];

    #[test]
    fn test_extent_north_up() {
        let rect = extent(&GT, (20, 10));
        assert_near!(rect.min().x, 100.0);
        assert_near!(rect.max().x, 300.0);
        assert_near!(rect.min().y, 400.0);
        assert_near!(rect.max().y, 500.0);
    }

    #[test]
    fn test_intersection() {
        let a = extent(&GT, (20, 10));
        let b = extent(&[200.0, 10.0, 0.0, 450.0, 0.0, -10.0], (20, 10));
        let i = intersection(&a, &b).unwrap();
        assert_near!(i.min().x, 200.0);
        assert_near!(i.max().x, 300.0);
        assert_near!(i.min().y, 400.0);
        assert_near!(i.max().y, 450.0);

        let far = extent(&[1000.0, 10.0, 0.0, 500.0, 0.0, -10.0], (5, 5));
        assert!(intersection(&a, &far).is_none());
    }

    #[test]
    fn test_window_aligned() {
        let area = extent(&[150.0, 10.0, 0.0, 480.0, 0.0, -10.0], (5, 3));
        let window = window_for(&GT, (20, 10), &area).unwrap().unwrap();
        assert_eq!(window.offset, (5, 2));
        assert_eq!(window.size, (5, 3));

        let gt = window.geo_transform(&GT);
        assert_eq!(gt, [150.0, 10.0, 0.0, 480.0, 0.0, -10.0]);
    }

    #[test]
    fn test_window_partial_pixels_are_included() {
        let area = extent(&[155.0, 10.0, 0.0, 475.0, 0.0, -10.0], (2, 2));
        let window = window_for(&GT, (20, 10), &area).unwrap().unwrap();
        assert_eq!(window.offset, (5, 2));
        assert_eq!(window.size, (3, 3));
    }

    #[test]
    fn test_window_is_clamped() {
        let area = extent(&[50.0, 10.0, 0.0, 550.0, 0.0, -10.0], (100, 100));
        let window = window_for(&GT, (20, 10), &area).unwrap().unwrap();
        assert_eq!(window.offset, (0, 0));
        assert_eq!(window.size, (20, 10));
    }

    #[test]
    fn test_north_up() {
        assert!(is_north_up(&GT));
        assert!(!is_north_up(&[0.0, 1.0, 0.2, 0.0, 0.0, -1.0]));
    }
}
