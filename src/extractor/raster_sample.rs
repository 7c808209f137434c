//! In-memory raster window

use crate::coordinate::GeoTransform;

use super::region::Region;

/// Cells of one band under a window, row-major
///
/// Values are scaled with the raster's GDAL scale/offset, except cells
/// holding the raw no-data marker which keep it unchanged.
#[derive(Debug, Clone)]
pub struct RasterSample {
    /// Width of the window (columns)
    pub width: u32,
    /// Height of the window (rows)
    pub height: u32,
    /// Cell values in row-major order
    pub data: Vec<f64>,
    /// Declared no-data value of the source raster
    pub nodata: Option<f64>,
    /// Georeferencing of the window's top-left cell
    pub transform: GeoTransform,
    /// Where the window sits in the source raster
    pub region: Region,
}

impl RasterSample {
    /// Creates a zero-filled sample covering `region`
    pub fn new(region: Region, transform: GeoTransform, nodata: Option<f64>) -> Self {
        RasterSample {
            width: region.width,
            height: region.height,
            data: vec![0.0; region.area()],
            nodata,
            transform,
            region,
        }
    }

    /// Get a specific value from the window
    ///
    /// # Returns
    /// The value at the position, or None if out of bounds
    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.data.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn set(&mut self, x: u32, y: u32, value: f64) {
        if x < self.width && y < self.height {
            let idx = y as usize * self.width as usize + x as usize;
            self.data[idx] = value;
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether a value is the no-data marker (NaN markers match NaN cells)
    pub fn is_nodata(&self, value: f64) -> bool {
        match self.nodata {
            Some(marker) if marker.is_nan() => value.is_nan(),
            Some(marker) => value == marker,
            None => false,
        }
    }
}
