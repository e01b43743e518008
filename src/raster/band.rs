use gdal::raster::GdalDataType;
use ndarray::Array2;

/// A single band's pixels, widened to `f64`.
///
/// The on-disk data type is kept for reporting. Scale factors are floats, so
/// all arithmetic happens in `f64` whatever the source type was.
#[derive(Debug, Clone)]
pub struct Band {
    data_type: GdalDataType,
    no_data: Option<f64>,
    values: Array2<f64>,
}

impl Band {
    pub fn new(data_type: GdalDataType, no_data: Option<f64>, values: Array2<f64>) -> Self {
        Band {
            data_type,
            no_data,
            values,
        }
    }

    pub fn data_type(&self) -> GdalDataType {
        self.data_type
    }

    pub fn no_data_value(&self) -> Option<f64> {
        self.no_data
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn pixel_count(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Every pixel multiplied by `scale`.
    pub fn scaled(&self, scale: f64) -> Array2<f64> {
        &self.values * scale
    }
}
