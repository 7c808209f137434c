//! TIFF predictors
//!
//! Predictors are reversible filters applied to a block before compression.
//! Horizontal differencing (2) stores each sample as the difference to the
//! previous sample of the same channel. The floating point predictor (3)
//! splits each row into byte planes, most significant first, and then
//! differences the bytes.

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::predictor;
use crate::tiff::errors::{TiffError, TiffResult};

/// Shape of one decoded block, as predictors see it
#[derive(Debug, Clone, Copy)]
pub struct BlockGeometry {
    /// Pixels per block row
    pub width: usize,
    /// Interleaved samples per pixel (1 for planar blocks)
    pub stride: usize,
    /// Bytes per sample
    pub sample_size: usize,
}

impl BlockGeometry {
    pub fn row_bytes(&self) -> usize {
        self.width * self.stride * self.sample_size
    }
}

/// Reverses a predictor in place on a decompressed block
pub fn undo_predictor(
    data: &mut [u8],
    code: u16,
    geometry: &BlockGeometry,
    byte_order: ByteOrder,
) -> TiffResult<()> {
    match code {
        predictor::NONE => Ok(()),
        predictor::HORIZONTAL_DIFFERENCING => {
            for row in rows_mut(data, geometry) {
                undo_horizontal_row(row, geometry, byte_order)?;
            }
            Ok(())
        }
        predictor::FLOATING_POINT => {
            for row in rows_mut(data, geometry) {
                undo_floating_point_row(row, geometry, byte_order);
            }
            Ok(())
        }
        other => Err(TiffError::GenericError(format!("Unsupported predictor: {}", other))),
    }
}

/// Applies a predictor in place before compression
pub fn apply_predictor(
    data: &mut [u8],
    code: u16,
    geometry: &BlockGeometry,
    byte_order: ByteOrder,
) -> TiffResult<()> {
    match code {
        predictor::NONE => Ok(()),
        predictor::HORIZONTAL_DIFFERENCING => {
            for row in rows_mut(data, geometry) {
                apply_horizontal_row(row, geometry, byte_order)?;
            }
            Ok(())
        }
        predictor::FLOATING_POINT => {
            for row in rows_mut(data, geometry) {
                apply_floating_point_row(row, geometry, byte_order);
            }
            Ok(())
        }
        other => Err(TiffError::GenericError(format!("Unsupported predictor: {}", other))),
    }
}

fn rows_mut<'a>(data: &'a mut [u8], geometry: &BlockGeometry) -> std::slice::ChunksExactMut<'a, u8> {
    // A zero-width block yields no rows
    data.chunks_exact_mut(geometry.row_bytes().max(1))
}

fn read_word(bytes: &[u8], byte_order: ByteOrder) -> u64 {
    let mut value = 0u64;
    match byte_order {
        ByteOrder::BigEndian => {
            for &b in bytes {
                value = (value << 8) | b as u64;
            }
        }
        ByteOrder::LittleEndian => {
            for &b in bytes.iter().rev() {
                value = (value << 8) | b as u64;
            }
        }
    }
    value
}

fn write_word(bytes: &mut [u8], value: u64, byte_order: ByteOrder) {
    let len = bytes.len();
    for i in 0..len {
        let shift = 8 * match byte_order {
            ByteOrder::BigEndian => len - 1 - i,
            ByteOrder::LittleEndian => i,
        };
        bytes[i] = (value >> shift) as u8;
    }
}

fn word_mask(sample_size: usize) -> u64 {
    if sample_size >= 8 { u64::MAX } else { (1u64 << (8 * sample_size)) - 1 }
}

fn check_sample_size(sample_size: usize) -> TiffResult<()> {
    match sample_size {
        1 | 2 | 4 | 8 => Ok(()),
        other => Err(TiffError::GenericError(format!(
            "Horizontal predictor cannot handle {}-byte samples", other
        ))),
    }
}

fn undo_horizontal_row(row: &mut [u8], geometry: &BlockGeometry, byte_order: ByteOrder) -> TiffResult<()> {
    check_sample_size(geometry.sample_size)?;
    let size = geometry.sample_size;
    let mask = word_mask(size);
    let samples = row.len() / size;

    for i in geometry.stride..samples {
        let previous = read_word(&row[(i - geometry.stride) * size..][..size], byte_order);
        let current = read_word(&row[i * size..][..size], byte_order);
        write_word(&mut row[i * size..][..size], current.wrapping_add(previous) & mask, byte_order);
    }

    Ok(())
}

fn apply_horizontal_row(row: &mut [u8], geometry: &BlockGeometry, byte_order: ByteOrder) -> TiffResult<()> {
    check_sample_size(geometry.sample_size)?;
    let size = geometry.sample_size;
    let mask = word_mask(size);
    let samples = row.len() / size;

    for i in (geometry.stride..samples).rev() {
        let previous = read_word(&row[(i - geometry.stride) * size..][..size], byte_order);
        let current = read_word(&row[i * size..][..size], byte_order);
        write_word(&mut row[i * size..][..size], current.wrapping_sub(previous) & mask, byte_order);
    }

    Ok(())
}

/// Byte index inside a sample for byte plane `plane` (0 is most significant)
fn plane_byte(plane: usize, sample_size: usize, byte_order: ByteOrder) -> usize {
    match byte_order {
        ByteOrder::BigEndian => plane,
        ByteOrder::LittleEndian => sample_size - 1 - plane,
    }
}

fn undo_floating_point_row(row: &mut [u8], geometry: &BlockGeometry, byte_order: ByteOrder) {
    let stride = geometry.stride;
    for i in stride..row.len() {
        row[i] = row[i].wrapping_add(row[i - stride]);
    }

    let size = geometry.sample_size;
    let words = row.len() / size;
    let planes = row.to_vec();
    for word in 0..words {
        for plane in 0..size {
            row[word * size + plane_byte(plane, size, byte_order)] = planes[plane * words + word];
        }
    }
}

fn apply_floating_point_row(row: &mut [u8], geometry: &BlockGeometry, byte_order: ByteOrder) {
    let size = geometry.sample_size;
    let words = row.len() / size;
    let samples = row.to_vec();
    for word in 0..words {
        for plane in 0..size {
            row[plane * words + word] = samples[word * size + plane_byte(plane, size, byte_order)];
        }
    }

    let stride = geometry.stride;
    for i in (stride..row.len()).rev() {
        row[i] = row[i].wrapping_sub(row[i - stride]);
    }
}
