//! Basic TIFF tag strategies
//!
//! Image structure tags: dimensions, sample layout, compression and the
//! strip or tile geometry.

use crate::tiff::builder::TiffBuilder;
use crate::tiff::constants::{photometric, planar_config, predictor, tags};
use crate::tiff::errors::TiffResult;
use crate::tiff::sample_type::SampleType;
use log::debug;

/// Adds basic TIFF tags to an IFD
pub struct BasicTagsBuilder;

impl BasicTagsBuilder {
    /// Add the tags describing the raster's cells
    ///
    /// # Arguments
    /// * `samples_per_pixel` - Number of bands
    /// * `planar` - PlanarConfiguration, only written for multi-band rasters
    pub fn add_image_structure(
        builder: &mut TiffBuilder,
        ifd_index: usize,
        width: u32,
        height: u32,
        sample_type: SampleType,
        samples_per_pixel: u16,
        planar: u16,
    ) -> TiffResult<()> {
        debug!("Adding image structure: {}x{}, {} x {}", width, height, samples_per_pixel, sample_type);

        builder.add_long(ifd_index, tags::IMAGE_WIDTH, width)?;
        builder.add_long(ifd_index, tags::IMAGE_LENGTH, height)?;

        let spp = samples_per_pixel as usize;
        builder.add_shorts(ifd_index, tags::BITS_PER_SAMPLE, &vec![sample_type.bits_per_sample(); spp])?;
        builder.add_shorts(ifd_index, tags::SAMPLE_FORMAT, &vec![sample_type.sample_format(); spp])?;
        builder.add_short(ifd_index, tags::PHOTOMETRIC_INTERPRETATION, photometric::BLACK_IS_ZERO)?;
        builder.add_short(ifd_index, tags::SAMPLES_PER_PIXEL, samples_per_pixel)?;

        if samples_per_pixel > 1 {
            builder.add_short(ifd_index, tags::PLANAR_CONFIGURATION, planar)?;
        } else {
            builder.add_short(ifd_index, tags::PLANAR_CONFIGURATION, planar_config::CHUNKY)?;
        }

        Ok(())
    }

    /// Add the Compression tag, and the Predictor tag when one is used
    pub fn add_compression(
        builder: &mut TiffBuilder,
        ifd_index: usize,
        compression_code: u16,
        predictor_code: u16,
    ) -> TiffResult<()> {
        builder.add_short(ifd_index, tags::COMPRESSION, compression_code)?;
        if predictor_code != predictor::NONE {
            builder.add_short(ifd_index, tags::PREDICTOR, predictor_code)?;
        }
        Ok(())
    }

    /// Add RowsPerStrip for a stripped raster
    pub fn add_strip_layout(builder: &mut TiffBuilder, ifd_index: usize, rows_per_strip: u32) -> TiffResult<()> {
        builder.add_long(ifd_index, tags::ROWS_PER_STRIP, rows_per_strip)
    }

    /// Add TileWidth and TileLength for a tiled raster
    pub fn add_tile_layout(
        builder: &mut TiffBuilder,
        ifd_index: usize,
        tile_width: u32,
        tile_height: u32,
    ) -> TiffResult<()> {
        builder.add_long(ifd_index, tags::TILE_WIDTH, tile_width)?;
        builder.add_long(ifd_index, tags::TILE_LENGTH, tile_height)
    }
}
