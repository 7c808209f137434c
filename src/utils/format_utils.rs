//! TIFF header utilities
//!
//! Byte order and TIFF/BigTIFF flavour detection for the first bytes of a file.

use log::debug;
use crate::io::seekable::SeekableReader;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::constants::header;
use crate::tiff::validation;

/// Detects the byte order and returns the matching handler
pub fn detect_byte_order(reader: &mut dyn SeekableReader) -> TiffResult<Box<dyn ByteOrderHandler>> {
    let byte_order = ByteOrder::detect(reader)?;
    debug!("Detected byte order: {}", byte_order.name());

    Ok(byte_order.create_handler())
}

/// Reads the version word and tells TIFF from BigTIFF
///
/// # Returns
/// A tuple with (is_big_tiff, version_number)
pub fn detect_tiff_format(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<(bool, u16)> {
    let version = byte_order_handler.read_u16(reader)?;
    debug!("TIFF version: {}", version);

    let is_big_tiff = match version {
        header::BIG_TIFF_VERSION => {
            validation::validate_bigtiff_header(reader, byte_order_handler)?;
            true
        },
        header::TIFF_VERSION => false,
        _ => return Err(TiffError::UnsupportedVersion(version)),
    };

    Ok((is_big_tiff, version))
}

/// Formats a number the way numpy's `%.2f` does, including non-finite values
pub fn format_fixed2(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format_fixed2(2.5), "2.50");
        assert_eq!(format_fixed2(-0.004), "-0.00");
        assert_eq!(format_fixed2(123.456), "123.46");
    }

    #[test]
    fn formats_non_finite_values_lowercase() {
        assert_eq!(format_fixed2(f64::NAN), "nan");
        assert_eq!(format_fixed2(f64::INFINITY), "inf");
        assert_eq!(format_fixed2(f64::NEG_INFINITY), "-inf");
    }
}
