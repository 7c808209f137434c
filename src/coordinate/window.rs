//! Square sampling window around a point
//!
//! Windows use GDAL's `projWin` ordering: upper-left x, upper-left y,
//! lower-right x, lower-right y.

use std::fmt;

use super::point::Point;
use super::transform::GeoTransform;
use crate::extractor::Region;

/// A map-space window in `projWin` order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingWindow {
    pub ulx: f64,
    pub uly: f64,
    pub lrx: f64,
    pub lry: f64,
}

impl SamplingWindow {
    /// Creates a window from explicit `projWin` bounds
    pub fn new(ulx: f64, uly: f64, lrx: f64, lry: f64) -> Self {
        SamplingWindow { ulx, uly, lrx, lry }
    }

    /// Square window of half-width `radius` centred on `center`
    pub fn around(center: &Point, radius: f64) -> Self {
        SamplingWindow::new(
            center.x - radius,
            center.y + radius,
            center.x + radius,
            center.y - radius,
        )
    }

    /// The window as a `[ulx, uly, lrx, lry]` array
    pub fn proj_win(&self) -> [f64; 4] {
        [self.ulx, self.uly, self.lrx, self.lry]
    }

    pub fn width(&self) -> f64 {
        self.lrx - self.ulx
    }

    pub fn height(&self) -> f64 {
        self.uly - self.lry
    }

    /// Converts the window to a source pixel window the way
    /// `gdal_translate -projwin` does with nearest sampling
    ///
    /// Offsets round down with a small tolerance, sizes round to nearest.
    /// The result is clipped to a raster of `raster_width` x `raster_height`
    /// cells; `None` means nothing of the window lies on the raster.
    ///
    /// # Arguments
    /// * `transform` - North-up geotransform of the raster
    /// * `raster_width` - Raster width in cells
    /// * `raster_height` - Raster height in cells
    pub fn to_pixel_region(
        &self,
        transform: &GeoTransform,
        raster_width: u64,
        raster_height: u64,
    ) -> Option<Region> {
        let gt = transform.coefficients();

        let x_off = ((self.ulx - gt[0]) / gt[1] + 0.001).floor();
        let y_off = ((self.uly - gt[3]) / gt[5] + 0.001).floor();
        let x_size = ((self.lrx - self.ulx) / gt[1] + 0.5).floor();
        let y_size = ((self.lry - self.uly) / gt[5] + 0.5).floor();

        if !(x_off.is_finite() && y_off.is_finite() && x_size.is_finite() && y_size.is_finite()) {
            return None;
        }

        let x_start = x_off.max(0.0);
        let y_start = y_off.max(0.0);
        let x_end = (x_off + x_size).min(raster_width as f64);
        let y_end = (y_off + y_size).min(raster_height as f64);

        if x_end <= x_start || y_end <= y_start {
            return None;
        }

        Some(Region::new(
            x_start as u32,
            y_start as u32,
            (x_end - x_start) as u32,
            (y_end - y_start) as u32,
        ))
    }
}

impl fmt::Display for SamplingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.ulx, self.uly, self.lrx, self.lry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid() -> GeoTransform {
        GeoTransform::new([0.0, 1.0, 0.0, 10.0, 0.0, -1.0])
    }

    #[test]
    fn window_is_in_proj_win_order() {
        let window = SamplingWindow::around(&Point::new(5.0, 7.0), 2.0);
        assert_eq!(window.proj_win(), [3.0, 9.0, 7.0, 5.0]);
        assert_eq!(window.width(), 4.0);
        assert_eq!(window.height(), 4.0);
    }

    #[test]
    fn interior_window_maps_to_full_pixel_region() {
        let window = SamplingWindow::around(&Point::new(5.0, 5.0), 1.0);
        let region = window.to_pixel_region(&unit_grid(), 10, 10).unwrap();
        assert_eq!((region.x, region.y, region.width, region.height), (4, 4, 2, 2));
    }

    #[test]
    fn offsets_tolerate_float_noise_below_cell_edge() {
        // 3.9995 floors to 3 without the tolerance
        let window = SamplingWindow::new(3.9995, 6.0005, 5.9995, 4.0005);
        let region = window.to_pixel_region(&unit_grid(), 10, 10).unwrap();
        assert_eq!((region.x, region.y), (4, 4));
        assert_eq!((region.width, region.height), (2, 2));
    }

    #[test]
    fn partially_outside_window_is_clipped() {
        let window = SamplingWindow::around(&Point::new(0.5, 9.5), 1.5);
        let region = window.to_pixel_region(&unit_grid(), 10, 10).unwrap();
        assert_eq!((region.x, region.y, region.width, region.height), (0, 0, 2, 2));
    }

    #[test]
    fn disjoint_window_has_no_region() {
        let window = SamplingWindow::around(&Point::new(50.0, 50.0), 1.0);
        assert!(window.to_pixel_region(&unit_grid(), 10, 10).is_none());
    }

    #[test]
    fn tiny_window_rounds_to_zero_cells() {
        let window = SamplingWindow::around(&Point::new(5.0, 5.0), 0.2);
        assert!(window.to_pixel_region(&unit_grid(), 10, 10).is_none());
    }
}
