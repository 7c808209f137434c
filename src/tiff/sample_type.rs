//! Cell value types
//!
//! Maps the BitsPerSample / SampleFormat pair of a raster to a concrete
//! numeric type and converts cells between their on-disk bytes and `f64`.

use std::fmt;

use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::sample_format;
use crate::tiff::errors::{TiffError, TiffResult};

/// Numeric type of one raster cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Resolves the type from BitsPerSample and SampleFormat tag values
    pub fn from_tags(bits_per_sample: u16, format: u16) -> TiffResult<Self> {
        match (format, bits_per_sample) {
            (sample_format::UNSIGNED, 8) => Ok(SampleType::U8),
            (sample_format::SIGNED, 8) => Ok(SampleType::I8),
            (sample_format::UNSIGNED, 16) => Ok(SampleType::U16),
            (sample_format::SIGNED, 16) => Ok(SampleType::I16),
            (sample_format::UNSIGNED, 32) => Ok(SampleType::U32),
            (sample_format::SIGNED, 32) => Ok(SampleType::I32),
            (sample_format::IEEEFP, 32) => Ok(SampleType::F32),
            (sample_format::IEEEFP, 64) => Ok(SampleType::F64),
            _ => Err(TiffError::UnsupportedSampleFormat { bits: bits_per_sample, format }),
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        (self.size() * 8) as u16
    }

    /// SampleFormat tag value
    pub fn sample_format(&self) -> u16 {
        match self {
            SampleType::U8 | SampleType::U16 | SampleType::U32 => sample_format::UNSIGNED,
            SampleType::I8 | SampleType::I16 | SampleType::I32 => sample_format::SIGNED,
            SampleType::F32 | SampleType::F64 => sample_format::IEEEFP,
        }
    }

    /// Size of one cell in bytes
    pub fn size(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    /// Smallest and largest value of an integer type, `None` for floats
    pub fn integer_range(&self) -> Option<(f64, f64)> {
        match self {
            SampleType::U8 => Some((u8::MIN as f64, u8::MAX as f64)),
            SampleType::I8 => Some((i8::MIN as f64, i8::MAX as f64)),
            SampleType::U16 => Some((u16::MIN as f64, u16::MAX as f64)),
            SampleType::I16 => Some((i16::MIN as f64, i16::MAX as f64)),
            SampleType::U32 => Some((u32::MIN as f64, u32::MAX as f64)),
            SampleType::I32 => Some((i32::MIN as f64, i32::MAX as f64)),
            SampleType::F32 | SampleType::F64 => None,
        }
    }

    /// The no-data marker as cells of this type hold it
    ///
    /// Float32 markers are rounded to single precision and integer markers to
    /// the nearest integer. `None` when no cell can hold the marker.
    pub fn cast_nodata(&self, nodata: f64) -> Option<f64> {
        match self {
            SampleType::F64 => Some(nodata),
            SampleType::F32 => Some(nodata as f32 as f64),
            _ => {
                let (min, max) = self.integer_range()?;
                let rounded = nodata.round();
                (rounded >= min && rounded <= max).then_some(rounded)
            }
        }
    }

    /// Decodes one cell; `bytes` must hold at least `size()` bytes
    pub fn decode(&self, bytes: &[u8], handler: &dyn ByteOrderHandler) -> f64 {
        match self {
            SampleType::U8 => bytes[0] as f64,
            SampleType::I8 => bytes[0] as i8 as f64,
            SampleType::U16 => handler.decode_u16(bytes) as f64,
            SampleType::I16 => handler.decode_u16(bytes) as i16 as f64,
            SampleType::U32 => handler.decode_u32(bytes) as f64,
            SampleType::I32 => handler.decode_u32(bytes) as i32 as f64,
            SampleType::F32 => handler.decode_f32(bytes) as f64,
            SampleType::F64 => handler.decode_f64(bytes),
        }
    }

    /// Appends one cell to `buffer`
    ///
    /// Integer types round to nearest and saturate at the type's range.
    pub fn encode(&self, value: f64, buffer: &mut Vec<u8>, handler: &dyn ByteOrderHandler) {
        let rounded = value.round();
        match self {
            SampleType::U8 => buffer.push(rounded as u8),
            SampleType::I8 => buffer.push(rounded as i8 as u8),
            SampleType::U16 => handler.encode_u16(buffer, rounded as u16),
            SampleType::I16 => handler.encode_u16(buffer, rounded as i16 as u16),
            SampleType::U32 => handler.encode_u32(buffer, rounded as u32),
            SampleType::I32 => handler.encode_u32(buffer, rounded as i32 as u32),
            SampleType::F32 => handler.encode_f32(buffer, value as f32),
            SampleType::F64 => handler.encode_f64(buffer, value),
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleType::U8 => "Byte",
            SampleType::I8 => "Int8",
            SampleType::U16 => "UInt16",
            SampleType::I16 => "Int16",
            SampleType::U32 => "UInt32",
            SampleType::I32 => "Int32",
            SampleType::F32 => "Float32",
            SampleType::F64 => "Float64",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::byte_order::{BigEndianHandler, LittleEndianHandler};

    #[test]
    fn resolves_tag_pairs() {
        assert_eq!(SampleType::from_tags(32, sample_format::IEEEFP).unwrap(), SampleType::F32);
        assert_eq!(SampleType::from_tags(16, sample_format::SIGNED).unwrap(), SampleType::I16);
        assert!(matches!(
            SampleType::from_tags(12, sample_format::UNSIGNED),
            Err(TiffError::UnsupportedSampleFormat { bits: 12, format: 1 })
        ));
    }

    #[test]
    fn signed_cells_keep_their_sign() {
        let mut buffer = Vec::new();
        SampleType::I16.encode(-1234.0, &mut buffer, &BigEndianHandler);
        assert_eq!(buffer, vec![0xFB, 0x2E]);
        assert_eq!(SampleType::I16.decode(&buffer, &BigEndianHandler), -1234.0);
    }

    #[test]
    fn nodata_is_cast_to_cell_precision() {
        let marker = SampleType::F32.cast_nodata(-9999.9).unwrap();
        assert_eq!(marker, -9999.9f32 as f64);
        assert_ne!(marker, -9999.9);
        assert_eq!(SampleType::F64.cast_nodata(-9999.9), Some(-9999.9));
        assert!(SampleType::F32.cast_nodata(f64::NAN).unwrap().is_nan());
        assert_eq!(SampleType::I16.cast_nodata(-9999.4), Some(-9999.0));
        assert_eq!(SampleType::U8.cast_nodata(-1.0), None);
        assert_eq!(SampleType::U16.cast_nodata(f64::NAN), None);
    }

    #[test]
    fn integer_encoding_saturates() {
        let mut buffer = Vec::new();
        SampleType::U8.encode(300.0, &mut buffer, &LittleEndianHandler);
        SampleType::U8.encode(-5.0, &mut buffer, &LittleEndianHandler);
        assert_eq!(buffer, vec![255, 0]);
    }
}
