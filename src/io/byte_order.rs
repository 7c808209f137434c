//! Byte order handling for GeoTIFF files
//!
//! Header and tag values are read through a `ByteOrderHandler` strategy
//! chosen from the "II"/"MM" marker. Raster cells are decoded from already
//! decompressed blocks, so the handler also exposes slice decoders.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};

/// Byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the first two bytes of the header
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let marker = reader.read_u16::<LittleEndian>()?;
        match marker {
            0x4949 => Ok(ByteOrder::LittleEndian),
            0x4D4D => Ok(ByteOrder::BigEndian),
            _ => Err(TiffError::InvalidByteOrder(marker)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// The two-byte header marker for this byte order
    pub fn marker(&self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => *b"II",
            ByteOrder::BigEndian => *b"MM",
        }
    }

    /// Creates the handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Byte order strategy
///
/// The `read_*` methods pull values from a stream; the `decode_*` methods
/// interpret a slice that is at least as long as the value; the `encode_*`
/// methods append a value to a buffer.
pub trait ByteOrderHandler: Send + Sync {
    fn byte_order(&self) -> ByteOrder;

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;
    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64>;

    fn decode_u16(&self, bytes: &[u8]) -> u16;
    fn decode_u32(&self, bytes: &[u8]) -> u32;
    fn decode_u64(&self, bytes: &[u8]) -> u64;
    fn decode_f32(&self, bytes: &[u8]) -> f32;
    fn decode_f64(&self, bytes: &[u8]) -> f64;

    fn encode_u16(&self, buffer: &mut Vec<u8>, value: u16);
    fn encode_u32(&self, buffer: &mut Vec<u8>, value: u32);
    fn encode_u64(&self, buffer: &mut Vec<u8>, value: u64);
    fn encode_f32(&self, buffer: &mut Vec<u8>, value: f32);
    fn encode_f64(&self, buffer: &mut Vec<u8>, value: f64);
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::LittleEndian
    }

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<LittleEndian>()
    }

    fn decode_u16(&self, bytes: &[u8]) -> u16 {
        LittleEndian::read_u16(bytes)
    }

    fn decode_u32(&self, bytes: &[u8]) -> u32 {
        LittleEndian::read_u32(bytes)
    }

    fn decode_u64(&self, bytes: &[u8]) -> u64 {
        LittleEndian::read_u64(bytes)
    }

    fn decode_f32(&self, bytes: &[u8]) -> f32 {
        LittleEndian::read_f32(bytes)
    }

    fn decode_f64(&self, bytes: &[u8]) -> f64 {
        LittleEndian::read_f64(bytes)
    }

    fn encode_u16(&self, buffer: &mut Vec<u8>, value: u16) {
        let mut bytes = [0u8; 2];
        LittleEndian::write_u16(&mut bytes, value);
        buffer.extend_from_slice(&bytes);
    }

    fn encode_u32(&self, buffer: &mut Vec<u8>, value: u32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        buffer.extend_from_slice(&bytes);
    }

    fn encode_u64(&self, buffer: &mut Vec<u8>, value: u64) {
        let mut bytes = [0u8; 8];
        LittleEndian::write_u64(&mut bytes, value);
        buffer.extend_from_slice(&bytes);
    }

    fn encode_f32(&self, buffer: &mut Vec<u8>, value: f32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_f32(&mut bytes, value);
        buffer.extend_from_slice(&bytes);
    }

    fn encode_f64(&self, buffer: &mut Vec<u8>, value: f64) {
        let mut bytes = [0u8; 8];
        LittleEndian::write_f64(&mut bytes, value);
        buffer.extend_from_slice(&bytes);
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::BigEndian
    }

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<BigEndian>()
    }

    fn decode_u16(&self, bytes: &[u8]) -> u16 {
        BigEndian::read_u16(bytes)
    }

    fn decode_u32(&self, bytes: &[u8]) -> u32 {
        BigEndian::read_u32(bytes)
    }

    fn decode_u64(&self, bytes: &[u8]) -> u64 {
        BigEndian::read_u64(bytes)
    }

    fn decode_f32(&self, bytes: &[u8]) -> f32 {
        BigEndian::read_f32(bytes)
    }

    fn decode_f64(&self, bytes: &[u8]) -> f64 {
        BigEndian::read_f64(bytes)
    }

    fn encode_u16(&self, buffer: &mut Vec<u8>, value: u16) {
        let mut bytes = [0u8; 2];
        BigEndian::write_u16(&mut bytes, value);
        buffer.extend_from_slice(&bytes);
    }

    fn encode_u32(&self, buffer: &mut Vec<u8>, value: u32) {
        let mut bytes = [0u8; 4];
        BigEndian::write_u32(&mut bytes, value);
        buffer.extend_from_slice(&bytes);
    }

    fn encode_u64(&self, buffer: &mut Vec<u8>, value: u64) {
        let mut bytes = [0u8; 8];
        BigEndian::write_u64(&mut bytes, value);
        buffer.extend_from_slice(&bytes);
    }

    fn encode_f32(&self, buffer: &mut Vec<u8>, value: f32) {
        let mut bytes = [0u8; 4];
        BigEndian::write_f32(&mut bytes, value);
        buffer.extend_from_slice(&bytes);
    }

    fn encode_f64(&self, buffer: &mut Vec<u8>, value: f64) {
        let mut bytes = [0u8; 8];
        BigEndian::write_f64(&mut bytes, value);
        buffer.extend_from_slice(&bytes);
    }
}
