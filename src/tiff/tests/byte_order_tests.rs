//! Tests for the byte order handlers

use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler, BigEndianHandler, LittleEndianHandler};

#[test]
fn detects_both_markers() {
    let mut cursor = Cursor::new(b"II*\0".to_vec());
    assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::LittleEndian);

    let mut cursor = Cursor::new(b"MM\0*".to_vec());
    assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::BigEndian);
}

#[test]
fn rejects_unknown_marker() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    let mut cursor = Cursor::new(buffer);

    assert!(ByteOrder::detect(&mut cursor).is_err());
}

#[test]
fn markers_match_detection() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let mut cursor = Cursor::new(order.marker().to_vec());
        assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), order);
    }
}

#[test]
fn big_endian_handler_reads_words() {
    let mut buffer = Vec::new();
    buffer.write_u16::<BigEndian>(0x1234).unwrap();
    buffer.write_u32::<BigEndian>(0x12345678).unwrap();
    buffer.write_f64::<BigEndian>(-12.5).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = BigEndianHandler;
    assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    assert_eq!(handler.read_f64(&mut cursor).unwrap(), -12.5);
}

#[test]
fn encoded_values_decode_in_the_same_order() {
    let handlers: [Box<dyn ByteOrderHandler>; 2] = [Box::new(LittleEndianHandler), Box::new(BigEndianHandler)];

    for handler in &handlers {
        let mut buffer = Vec::new();
        handler.encode_u32(&mut buffer, 0xDEADBEEF);
        handler.encode_f32(&mut buffer, 3.25);
        assert_eq!(handler.decode_u32(&buffer[..4]), 0xDEADBEEF);
        assert_eq!(handler.decode_f32(&buffer[4..]), 3.25);
    }
}

#[test]
fn byte_orders_differ_on_the_wire() {
    let mut little = Vec::new();
    let mut big = Vec::new();
    LittleEndianHandler.encode_u16(&mut little, 0x0102);
    BigEndianHandler.encode_u16(&mut big, 0x0102);

    assert_eq!(little, vec![0x02, 0x01]);
    assert_eq!(big, vec![0x01, 0x02]);
}
