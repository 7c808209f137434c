//! Block extraction helpers shared by the strip and tile readers
//!
//! A block is read, validated against the file size, decompressed, has its
//! predictor reversed, and then the cells of the selected band that fall
//! inside the requested window are copied into the sample.

use log::{debug, trace};
use std::io::{Read, Seek, SeekFrom};
use std::time::Instant;

use crate::compression::predictor::{self, BlockGeometry};
use crate::compression::CompressionHandler;
use crate::extractor::{RasterLayout, RasterSample, Region};
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::validation;

/// Fails with `Timeout` once `deadline` has passed
pub fn check_deadline(deadline: Option<Instant>) -> TiffResult<()> {
    match deadline {
        Some(limit) if Instant::now() >= limit => Err(TiffError::Timeout),
        _ => Ok(()),
    }
}

/// Reads and decodes one block
///
/// # Arguments
/// * `reader` - Stream over the raster file
/// * `layout` - Layout of the raster
/// * `index` - Index into the block offsets table
/// * `block` - Pixel extent of the block
/// * `codec` - Handler for the raster's compression
///
/// # Returns
/// The decoded block bytes, or `None` for a sparse (unwritten) block
pub fn read_block(
    reader: &mut dyn SeekableReader,
    layout: &RasterLayout,
    index: usize,
    block: &Region,
    codec: &dyn CompressionHandler,
) -> TiffResult<Option<Vec<u8>>> {
    let offset = layout.block_offsets[index];
    let byte_count = layout.block_byte_counts[index];

    if offset == 0 || byte_count == 0 {
        debug!("Block {} is sparse", index);
        return Ok(None);
    }

    let file_size = validation::get_file_size(reader)?;
    validation::validate_block(offset, byte_count, file_size)?;

    trace!("Reading block {} at offset {} with {} bytes", index, offset, byte_count);
    reader.seek(SeekFrom::Start(offset))?;
    let mut encoded = vec![0u8; byte_count as usize];
    reader.read_exact(&mut encoded)?;

    let geometry = BlockGeometry {
        width: block.width as usize,
        stride: layout.block_stride(),
        sample_size: layout.sample_type.size(),
    };
    let expected_len = geometry.row_bytes() * block.height as usize;

    let mut decoded = codec.decompress(&encoded, expected_len)?;
    if decoded.len() < expected_len {
        return Err(TiffError::Decompression(format!(
            "Block {} decoded to {} bytes, expected {}", index, decoded.len(), expected_len
        )));
    }
    decoded.truncate(expected_len);

    predictor::undo_predictor(&mut decoded, layout.predictor, &geometry, layout.byte_order)?;

    Ok(Some(decoded))
}

/// Copies the cells of a decoded block that fall inside the window
///
/// # Arguments
/// * `data` - Decoded block, `None` for sparse blocks
/// * `block` - Pixel extent of the block
/// * `layout` - Layout of the raster
/// * `handler` - Byte order of the raster
/// * `sample` - Destination window
pub fn copy_block_cells(
    data: Option<&[u8]>,
    block: &Region,
    layout: &RasterLayout,
    handler: &dyn ByteOrderHandler,
    sample: &mut RasterSample,
) {
    let window = sample.region;
    let overlap = match window.intersect(block) {
        Some(overlap) => overlap,
        None => return,
    };

    let size = layout.sample_type.size();
    let stride = layout.block_stride();
    let sample_index = layout.sample_index();

    for y in overlap.y..overlap.end_y() {
        for x in overlap.x..overlap.end_x() {
            let value = match data {
                Some(bytes) => {
                    let cell = ((y - block.y) as usize * block.width as usize + (x - block.x) as usize)
                        * stride + sample_index;
                    let raw = layout.sample_type.decode(&bytes[cell * size..], handler);
                    if sample.is_nodata(raw) { raw } else { layout.unscale(raw) }
                }
                // GDAL reads sparse blocks as no-data, or zero without a marker
                None => layout.nodata.unwrap_or(0.0),
            };

            sample.set(x - window.x, y - window.y, value);
        }
    }
}
