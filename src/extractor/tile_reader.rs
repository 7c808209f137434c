//! Tile-based raster data extraction
//!
//! Tiled TIFFs organize cells in rectangular tiles of equal size, so only
//! the tiles under the window are read.

use log::debug;
use std::time::Instant;

use crate::compression::CompressionFactory;
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::errors::TiffResult;
use crate::utils::tiff_extraction_utils;

use super::layout::{BlockLayout, RasterLayout};
use super::raster_sample::RasterSample;

/// Reads a window out of a tiled raster
pub struct TileReader<'a, R: SeekableReader> {
    /// Stream over the raster file
    reader: R,
    layout: &'a RasterLayout,
    handler: &'a dyn ByteOrderHandler,
}

impl<'a, R: SeekableReader> TileReader<'a, R> {
    pub fn new(reader: R, layout: &'a RasterLayout, handler: &'a dyn ByteOrderHandler) -> Self {
        TileReader { reader, layout, handler }
    }

    /// Tile width and height in pixels
    fn get_tile_dimensions(&self) -> (u32, u32) {
        match self.layout.blocks {
            BlockLayout::Tiles { tile_width, tile_height } => (tile_width, tile_height),
            BlockLayout::Strips { rows_per_strip } => (self.layout.width, rows_per_strip),
        }
    }

    /// Fills `sample` with the tiles overlapping its region
    ///
    /// # Arguments
    /// * `sample` - Destination window, its region already clipped to the raster
    /// * `deadline` - Checked before each tile is read
    pub fn extract(&mut self, sample: &mut RasterSample, deadline: Option<Instant>) -> TiffResult<()> {
        let (tile_width, tile_height) = self.get_tile_dimensions();
        let codec = CompressionFactory::create_handler(self.layout.compression)?;

        let region = sample.region;
        let start_col = region.x / tile_width;
        let end_col = region.end_x().div_ceil(tile_width);
        let start_row = region.y / tile_height;
        let end_row = region.end_y().div_ceil(tile_height);

        debug!("Reading tiles {}..{} x {}..{}", start_col, end_col, start_row, end_row);

        for row in start_row..end_row {
            for col in start_col..end_col {
                tiff_extraction_utils::check_deadline(deadline)?;

                let block = self.layout.block_region(col, row);
                let index = self.layout.block_index(col, row);
                let data = tiff_extraction_utils::read_block(&mut self.reader, self.layout, index, &block, codec.as_ref())?;

                tiff_extraction_utils::copy_block_cells(data.as_deref(), &block, self.layout, self.handler, sample);
            }
        }

        Ok(())
    }
}
