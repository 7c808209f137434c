//! Compression handler trait definition

use crate::tiff::errors::TiffResult;

/// Strategy trait for a TIFF block codec
pub trait CompressionHandler: Send + Sync {
    /// Decode one strip or tile
    ///
    /// # Arguments
    /// * `data` - The encoded block as stored in the file
    /// * `expected_len` - Decoded size implied by the block geometry, used as a capacity hint
    fn decompress(&self, data: &[u8], expected_len: usize) -> TiffResult<Vec<u8>>;

    /// Encode one strip or tile
    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Human readable codec name
    fn name(&self) -> &'static str;

    /// Value written to the Compression tag
    fn code(&self) -> u16;
}
