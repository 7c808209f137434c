use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::io::byte_order::ByteOrder;
use crate::tiff::builder::TiffBuilder;
use crate::tiff::builders::writer::WriterBuilder;

/// Classic TIFF, little-endian, one IFD of 800x600 with a GDAL_NODATA tag
/// stored out of line
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    buffer.write_u16::<LittleEndian>(3).unwrap();      // Entry count

    buffer.write_u16::<LittleEndian>(256).unwrap();    // ImageWidth
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(800).unwrap();

    buffer.write_u16::<LittleEndian>(257).unwrap();    // ImageLength
    buffer.write_u16::<LittleEndian>(3).unwrap();      // SHORT
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u16::<LittleEndian>(600).unwrap();
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Padding of the value field

    buffer.write_u16::<LittleEndian>(42113).unwrap();  // GDAL_NODATA
    buffer.write_u16::<LittleEndian>(2).unwrap();      // ASCII
    buffer.write_u32::<LittleEndian>(7).unwrap();
    buffer.write_u32::<LittleEndian>(50).unwrap();     // Offset of the string

    buffer.write_u32::<LittleEndian>(0).unwrap();      // Next IFD

    buffer.extend_from_slice(b"-9999\0\0");

    Cursor::new(buffer)
}

/// BigTIFF, big-endian, one IFD of 1024x768
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_u16::<BigEndian>(0x4D4D).unwrap(); // MM
    buffer.write_u16::<BigEndian>(43).unwrap();
    buffer.write_u16::<BigEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<BigEndian>(0).unwrap();
    buffer.write_u64::<BigEndian>(16).unwrap();     // IFD offset

    buffer.write_u64::<BigEndian>(2).unwrap();      // Entry count

    buffer.write_u16::<BigEndian>(256).unwrap();    // ImageWidth
    buffer.write_u16::<BigEndian>(4).unwrap();      // LONG
    buffer.write_u64::<BigEndian>(1).unwrap();
    buffer.write_u32::<BigEndian>(1024).unwrap();
    buffer.write_u32::<BigEndian>(0).unwrap();

    buffer.write_u16::<BigEndian>(257).unwrap();    // ImageLength
    buffer.write_u16::<BigEndian>(3).unwrap();      // SHORT
    buffer.write_u64::<BigEndian>(1).unwrap();
    buffer.write_u16::<BigEndian>(768).unwrap();
    buffer.write_u16::<BigEndian>(0).unwrap();
    buffer.write_u32::<BigEndian>(0).unwrap();

    buffer.write_u64::<BigEndian>(0).unwrap();      // Next IFD

    Cursor::new(buffer)
}

/// Serialises a builder into memory
pub fn write_to_buffer(builder: &TiffBuilder) -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();
    WriterBuilder::write_to(builder, &mut buffer).unwrap();
    Cursor::new(buffer)
}

pub fn new_builder(byte_order: ByteOrder, big_tiff: bool) -> TiffBuilder {
    TiffBuilder::new(byte_order, big_tiff)
}
