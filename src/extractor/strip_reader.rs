//! Strip-based raster data extraction
//!
//! Stripped TIFFs organize cells in horizontal bands spanning the full
//! raster width, so a window needs every strip that overlaps its rows.

use log::debug;
use std::time::Instant;

use crate::compression::CompressionFactory;
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::errors::TiffResult;
use crate::utils::tiff_extraction_utils;

use super::layout::{BlockLayout, RasterLayout};
use super::raster_sample::RasterSample;

/// Reads a window out of a stripped raster
pub struct StripReader<'a, R: SeekableReader> {
    /// Stream over the raster file
    reader: R,
    layout: &'a RasterLayout,
    handler: &'a dyn ByteOrderHandler,
}

impl<'a, R: SeekableReader> StripReader<'a, R> {
    pub fn new(reader: R, layout: &'a RasterLayout, handler: &'a dyn ByteOrderHandler) -> Self {
        StripReader { reader, layout, handler }
    }

    fn rows_per_strip(&self) -> u32 {
        match self.layout.blocks {
            BlockLayout::Strips { rows_per_strip } => rows_per_strip,
            // a tile layout never reaches this reader; one strip covers it all
            BlockLayout::Tiles { .. } => self.layout.height,
        }
    }

    /// Fills `sample` with the strips overlapping its region
    ///
    /// # Arguments
    /// * `sample` - Destination window, its region already clipped to the raster
    /// * `deadline` - Checked before each strip is read
    pub fn extract(&mut self, sample: &mut RasterSample, deadline: Option<Instant>) -> TiffResult<()> {
        let rows_per_strip = self.rows_per_strip();
        let codec = CompressionFactory::create_handler(self.layout.compression)?;

        let region = sample.region;
        let start_strip = region.y / rows_per_strip;
        let end_strip = region.end_y().div_ceil(rows_per_strip);

        debug!("Reading strips {} to {} for rows {}..{}",
               start_strip, end_strip - 1, region.y, region.end_y());

        for strip in start_strip..end_strip {
            tiff_extraction_utils::check_deadline(deadline)?;

            let block = self.layout.block_region(0, strip);
            let index = self.layout.block_index(0, strip);
            let data = tiff_extraction_utils::read_block(&mut self.reader, self.layout, index, &block, codec.as_ref())?;

            tiff_extraction_utils::copy_block_cells(data.as_deref(), &block, self.layout, self.handler, sample);
        }

        Ok(())
    }
}
