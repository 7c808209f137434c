//! Affine transform between pixel and map space

use crate::tiff::errors::{TiffError, TiffResult};

use super::point::Point;

/// GDAL-ordered geotransform
///
/// `x_map = gt[0] + col * gt[1] + row * gt[2]`,
/// `y_map = gt[3] + col * gt[4] + row * gt[5]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    coefficients: [f64; 6],
}

impl GeoTransform {
    pub fn new(coefficients: [f64; 6]) -> Self {
        GeoTransform { coefficients }
    }

    /// Builds the transform from ModelPixelScale and the first ModelTiepoint
    ///
    /// # Arguments
    /// * `scale` - At least (scale_x, scale_y)
    /// * `tiepoint` - At least (i, j, k, x, y, z)
    pub fn from_scale_and_tiepoint(scale: &[f64], tiepoint: &[f64]) -> TiffResult<Self> {
        if scale.len() < 2 || tiepoint.len() < 6 {
            return Err(TiffError::GenericError(format!(
                "Malformed georeferencing: {} scale values, {} tiepoint values",
                scale.len(), tiepoint.len()
            )));
        }

        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);

        Ok(GeoTransform::new([x - i * sx, sx, 0.0, y + j * sy, 0.0, -sy]))
    }

    /// Builds the transform from a 4x4 ModelTransformation matrix
    pub fn from_model_transformation(matrix: &[f64]) -> TiffResult<Self> {
        if matrix.len() < 16 {
            return Err(TiffError::GenericError(format!(
                "ModelTransformation needs 16 values, found {}", matrix.len()
            )));
        }

        Ok(GeoTransform::new([matrix[3], matrix[0], matrix[1], matrix[7], matrix[4], matrix[5]]))
    }

    /// Shifts the origin by half a cell, used for PixelIsPoint rasters
    pub fn shifted_half_pixel(&self) -> Self {
        let gt = self.coefficients;
        GeoTransform::new([
            gt[0] - 0.5 * gt[1] - 0.5 * gt[2],
            gt[1],
            gt[2],
            gt[3] - 0.5 * gt[4] - 0.5 * gt[5],
            gt[4],
            gt[5],
        ])
    }

    pub fn coefficients(&self) -> [f64; 6] {
        self.coefficients
    }

    /// Whether the raster is north-up (no rotation or shear terms)
    pub fn is_north_up(&self) -> bool {
        self.coefficients[2] == 0.0 && self.coefficients[4] == 0.0
    }

    /// Whether cell sizes are usable for window arithmetic
    pub fn is_valid(&self) -> bool {
        let gt = self.coefficients;
        gt.iter().all(|c| c.is_finite()) && gt[1] != 0.0 && gt[5] != 0.0
    }

    /// Map coordinates of a pixel corner
    pub fn pixel_to_world(&self, col: f64, row: f64) -> Point {
        let gt = self.coefficients;
        Point::new(
            gt[0] + col * gt[1] + row * gt[2],
            gt[3] + col * gt[4] + row * gt[5],
        )
    }

    /// Transform of a sub-window whose top-left cell is (`col`, `row`)
    pub fn for_subwindow(&self, col: u32, row: u32) -> Self {
        let origin = self.pixel_to_world(col as f64, row as f64);
        let gt = self.coefficients;
        GeoTransform::new([origin.x, gt[1], gt[2], origin.y, gt[4], gt[5]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiepoint_at_origin_gives_north_up_transform() {
        let gt = GeoTransform::from_scale_and_tiepoint(
            &[2.0, 3.0, 0.0],
            &[0.0, 0.0, 0.0, 1000.0, 5000.0, 0.0],
        ).unwrap();
        assert_eq!(gt.coefficients(), [1000.0, 2.0, 0.0, 5000.0, 0.0, -3.0]);
        assert!(gt.is_north_up());
    }

    #[test]
    fn tiepoint_off_origin_is_moved_back_to_corner() {
        let gt = GeoTransform::from_scale_and_tiepoint(
            &[1.0, 1.0],
            &[10.0, 20.0, 0.0, 110.0, 480.0, 0.0],
        ).unwrap();
        assert_eq!(gt.coefficients()[0], 100.0);
        assert_eq!(gt.coefficients()[3], 500.0);
    }

    #[test]
    fn model_transformation_maps_to_gdal_order() {
        let matrix = [
            2.0, 0.0, 0.0, 100.0,
            0.0, -2.0, 0.0, 200.0,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        let gt = GeoTransform::from_model_transformation(&matrix).unwrap();
        assert_eq!(gt.coefficients(), [100.0, 2.0, 0.0, 200.0, 0.0, -2.0]);
    }

    #[test]
    fn subwindow_origin_follows_cell_size() {
        let gt = GeoTransform::new([100.0, 2.0, 0.0, 200.0, 0.0, -2.0]);
        assert_eq!(gt.for_subwindow(3, 4).coefficients(), [106.0, 2.0, 0.0, 192.0, 0.0, -2.0]);
    }

    #[test]
    fn pixel_is_point_shift() {
        let gt = GeoTransform::new([100.0, 2.0, 0.0, 200.0, 0.0, -2.0]).shifted_half_pixel();
        assert_eq!(gt.coefficients(), [99.0, 2.0, 0.0, 201.0, 0.0, -2.0]);
    }
}
