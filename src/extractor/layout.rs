//! Raster layout
//!
//! Everything needed to locate and decode the cells of one band, read once
//! from the main IFD when a raster is opened.

use log::{debug, info, warn};
use std::fmt;

use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, planar_config, predictor, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geo_key_parser::{GeoInfo, GeoKeyParser};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::sample_type::SampleType;
use crate::utils::tag_utils;

use super::region::Region;

/// How the raster data is cut into blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLayout {
    Strips { rows_per_strip: u32 },
    Tiles { tile_width: u32, tile_height: u32 },
}

/// Decoding parameters of one band of a raster
#[derive(Debug, Clone)]
pub struct RasterLayout {
    pub width: u32,
    pub height: u32,
    pub sample_type: SampleType,
    pub samples_per_pixel: u32,
    pub planar_config: u16,
    pub compression: u64,
    pub predictor: u16,
    pub blocks: BlockLayout,
    pub block_offsets: Vec<u64>,
    pub block_byte_counts: Vec<u64>,
    pub byte_order: ByteOrder,
    /// Selected band, 1-based
    pub band: u32,
    pub nodata: Option<f64>,
    pub scale: f64,
    pub offset: f64,
    pub geo: GeoInfo,
}

impl RasterLayout {
    /// Reads the layout of `band` from a raster IFD
    ///
    /// # Arguments
    /// * `tiff_reader` - Reader that parsed the header of `reader`
    /// * `reader` - Stream over the same file
    /// * `ifd` - Main raster IFD
    /// * `band` - 1-based band number
    pub fn from_ifd(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        band: u32,
    ) -> TiffResult<Self> {
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        let samples_per_pixel = ifd.get_samples_per_pixel() as u32;

        if band == 0 || band > samples_per_pixel {
            return Err(TiffError::BandOutOfRange { band, count: samples_per_pixel });
        }

        let band_index = (band - 1) as usize;
        let per_band = |values: Vec<u64>, default: u64| {
            values.get(band_index).or_else(|| values.first()).copied().unwrap_or(default)
        };

        let bits = if ifd.has_tag(tags::BITS_PER_SAMPLE) {
            per_band(tiff_reader.read_tag_values(reader, ifd, tags::BITS_PER_SAMPLE)?, 1)
        } else {
            1
        };
        let format = if ifd.has_tag(tags::SAMPLE_FORMAT) {
            per_band(tiff_reader.read_tag_values(reader, ifd, tags::SAMPLE_FORMAT)?, 1)
        } else {
            sample_format::UNSIGNED as u64
        };
        let sample_type = SampleType::from_tags(bits as u16, format as u16)?;

        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(compression::NONE as u64);
        let predictor = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64) as u16;
        let planar_config = ifd.get_tag_value(tags::PLANAR_CONFIGURATION)
            .unwrap_or(planar_config::CHUNKY as u64) as u16;

        let (blocks, offsets_tag, counts_tag) = if ifd.is_tiled() {
            let tile_width = ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(256) as u32;
            let tile_height = ifd.get_tag_value(tags::TILE_LENGTH).unwrap_or(256) as u32;
            (BlockLayout::Tiles { tile_width, tile_height }, tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)
        } else {
            // A missing RowsPerStrip means a single strip
            let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
                .unwrap_or(height)
                .clamp(1, height.max(1)) as u32;
            (BlockLayout::Strips { rows_per_strip }, tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };

        let block_offsets = tiff_reader.read_tag_values(reader, ifd, offsets_tag)?;
        let block_byte_counts = tiff_reader.read_tag_values(reader, ifd, counts_tag)?;

        let geo = GeoKeyParser::extract_geo_info(tiff_reader, reader, ifd)?;
        let nodata = match GeoKeyParser::read_nodata(tiff_reader, reader, ifd)? {
            Some(marker) => {
                let cast = sample_type.cast_nodata(marker);
                if cast.is_none() {
                    warn!("Ignoring no-data value {} that {} cells cannot hold", marker, sample_type);
                }
                cast
            }
            None => None,
        };
        let (scale, offset) = GeoKeyParser::read_band_scaling(tiff_reader, reader, ifd, band)?;

        let layout = RasterLayout {
            width: width as u32,
            height: height as u32,
            sample_type,
            samples_per_pixel,
            planar_config,
            compression,
            predictor,
            blocks,
            block_offsets,
            block_byte_counts,
            byte_order: tiff_reader.handler()?.byte_order(),
            band,
            nodata,
            scale,
            offset,
            geo,
        };

        layout.validate()?;
        info!("Raster layout: {}", layout);
        Ok(layout)
    }

    fn validate(&self) -> TiffResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TiffError::MissingDimensions);
        }

        if let BlockLayout::Tiles { tile_width, tile_height } = self.blocks {
            if tile_width == 0 || tile_height == 0 {
                return Err(TiffError::GenericError(format!(
                    "Invalid tile size {}x{}", tile_width, tile_height
                )));
            }
        }

        let expected = self.block_count();
        if self.block_offsets.len() < expected || self.block_byte_counts.len() < expected {
            return Err(TiffError::GenericError(format!(
                "Expected {} blocks, found {} offsets and {} byte counts",
                expected, self.block_offsets.len(), self.block_byte_counts.len()
            )));
        }

        debug!("Compression: {}", tag_utils::get_compression_name(self.compression));
        Ok(())
    }

    pub fn is_planar(&self) -> bool {
        self.planar_config == planar_config::PLANAR && self.samples_per_pixel > 1
    }

    /// Interleaved samples per pixel inside one block
    pub fn block_stride(&self) -> usize {
        if self.is_planar() { 1 } else { self.samples_per_pixel as usize }
    }

    /// Position of the selected band inside an interleaved pixel
    pub fn sample_index(&self) -> usize {
        if self.is_planar() { 0 } else { (self.band - 1) as usize }
    }

    /// Blocks across and down one plane
    pub fn blocks_per_plane(&self) -> (u32, u32) {
        match self.blocks {
            BlockLayout::Strips { rows_per_strip } => (1, self.height.div_ceil(rows_per_strip)),
            BlockLayout::Tiles { tile_width, tile_height } => {
                (self.width.div_ceil(tile_width), self.height.div_ceil(tile_height))
            }
        }
    }

    /// Total blocks the offsets table must hold
    pub fn block_count(&self) -> usize {
        let (across, down) = self.blocks_per_plane();
        let planes = if self.is_planar() { self.samples_per_pixel as usize } else { 1 };
        across as usize * down as usize * planes
    }

    /// Index into the offsets table of block (`col`, `row`) of the selected band
    pub fn block_index(&self, col: u32, row: u32) -> usize {
        let (across, down) = self.blocks_per_plane();
        let plane = if self.is_planar() { (self.band - 1) as usize } else { 0 };
        plane * (across as usize * down as usize) + row as usize * across as usize + col as usize
    }

    /// Pixel extent of block (`col`, `row`), clipped to the raster for strips
    pub fn block_region(&self, col: u32, row: u32) -> Region {
        match self.blocks {
            BlockLayout::Strips { rows_per_strip } => {
                let y = row * rows_per_strip;
                Region::new(0, y, self.width, rows_per_strip.min(self.height - y))
            }
            // Tiles always hold full tile dimensions, padded at the edges
            BlockLayout::Tiles { tile_width, tile_height } => {
                Region::new(col * tile_width, row * tile_height, tile_width, tile_height)
            }
        }
    }

    /// Applies GDAL scale and offset to a raw cell value
    pub fn unscale(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }
}

impl fmt::Display for RasterLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {} band {}/{}, {:?}, compression {}, predictor {}",
               self.width, self.height, self.sample_type, self.band, self.samples_per_pixel,
               self.blocks, tag_utils::get_compression_name(self.compression), self.predictor)
    }
}
