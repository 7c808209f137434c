//! IFD chain utilities

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;

/// Reads an IFD offset word: the first one after the header, or the "next IFD"
/// link after an IFD's entries. Zero means the chain ends.
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    if is_big_tiff {
        byte_order_handler.read_u64(reader).map_err(TiffError::IoError)
    } else {
        byte_order_handler.read_u32(reader)
            .map(|v| v as u64)
            .map_err(TiffError::IoError)
    }
}

/// Size in bytes of an IFD's count word and entries, excluding the next-IFD link
pub fn calculate_entries_size(entry_count: u64, is_big_tiff: bool) -> u64 {
    if is_big_tiff {
        8 + 20 * entry_count
    } else {
        2 + 12 * entry_count
    }
}

/// Full on-disk size of an IFD including the next-IFD link
pub fn calculate_ifd_size(ifd: &IFD, is_big_tiff: bool) -> u64 {
    let link_size = if is_big_tiff { 8 } else { 4 };
    calculate_entries_size(ifd.entries.len() as u64, is_big_tiff) + link_size
}
