//! GeoTIFF tag strategies
//!
//! Writes the model tags and GeoKey directory that georeference a raster.

use crate::coordinate::GeoTransform;
use crate::tiff::builder::TiffBuilder;
use crate::tiff::constants::{geo_keys, model_type, raster_type, tags};
use crate::tiff::errors::TiffResult;
use log::debug;

/// Adds GeoTIFF-specific tags to an IFD
pub struct GeoTagsBuilder;

impl GeoTagsBuilder {
    /// Add the georeferencing of a pixel-corner based transform
    ///
    /// North-up transforms are written as ModelPixelScale + ModelTiepoint
    /// unless `force_matrix` is set; anything else needs a ModelTransformation.
    /// For PixelIsPoint rasters the tiepoint is moved to the cell centre.
    pub fn add_georeferencing(
        builder: &mut TiffBuilder,
        ifd_index: usize,
        transform: &GeoTransform,
        pixel_is_point: bool,
        force_matrix: bool,
    ) -> TiffResult<()> {
        let gt = transform.coefficients();
        let origin = if pixel_is_point {
            transform.pixel_to_world(0.5, 0.5)
        } else {
            transform.pixel_to_world(0.0, 0.0)
        };

        if transform.is_north_up() && !force_matrix {
            debug!("Adding pixel scale and tiepoint, origin ({}, {})", origin.x, origin.y);
            builder.add_doubles(ifd_index, tags::MODEL_PIXEL_SCALE_TAG, &[gt[1], -gt[5], 0.0])?;
            builder.add_doubles(ifd_index, tags::MODEL_TIEPOINT_TAG, &[0.0, 0.0, 0.0, origin.x, origin.y, 0.0])?;
        } else {
            debug!("Adding model transformation: {:?}", gt);
            let matrix = [
                gt[1], gt[2], 0.0, origin.x,
                gt[4], gt[5], 0.0, origin.y,
                0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ];
            builder.add_doubles(ifd_index, tags::MODEL_TRANSFORMATION_TAG, &matrix)?;
        }

        Ok(())
    }

    /// Add the GeoKey directory
    ///
    /// EPSG codes in the 4000 range are treated as geographic CRSs, everything
    /// else as projected.
    pub fn add_geo_key_directory(
        builder: &mut TiffBuilder,
        ifd_index: usize,
        epsg: Option<u16>,
        pixel_is_point: bool,
    ) -> TiffResult<()> {
        let mut keys: Vec<[u16; 4]> = Vec::new();

        if let Some(code) = epsg {
            let geographic = (4000..5000).contains(&code);
            let model = if geographic { model_type::GEOGRAPHIC } else { model_type::PROJECTED };
            keys.push([geo_keys::MODEL_TYPE, 0, 1, model]);
            keys.push([geo_keys::RASTER_TYPE, 0, 1, Self::raster_type(pixel_is_point)]);
            let crs_key = if geographic { geo_keys::GEOGRAPHIC_TYPE } else { geo_keys::PROJECTED_CS_TYPE };
            keys.push([crs_key, 0, 1, code]);
        } else {
            keys.push([geo_keys::RASTER_TYPE, 0, 1, Self::raster_type(pixel_is_point)]);
        }

        debug!("Adding GeoKey directory with {} keys", keys.len());

        let mut directory = vec![1, 1, 0, keys.len() as u16];
        for key in &keys {
            directory.extend_from_slice(key);
        }

        builder.add_shorts(ifd_index, tags::GEO_KEY_DIRECTORY_TAG, &directory)
    }

    fn raster_type(pixel_is_point: bool) -> u16 {
        if pixel_is_point { raster_type::PIXEL_IS_POINT } else { raster_type::PIXEL_IS_AREA }
    }
}
