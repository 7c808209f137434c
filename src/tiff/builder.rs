//! TIFF file construction
//!
//! `TiffBuilder` collects IFD entries, out-of-line tag data and encoded
//! blocks, and hands them to the writer. Tag values are encoded in the
//! builder's byte order as they are added.

use std::collections::BTreeMap;
use log::{debug, info};

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::constants::field_types;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::builders::writer::WriterBuilder;

/// Encoded strips or tiles of one IFD
#[derive(Debug, Clone)]
pub struct BlockData {
    /// Tag that receives the block offsets (StripOffsets or TileOffsets)
    pub offsets_tag: u16,
    pub blocks: Vec<Vec<u8>>,
}

/// Builder for creating TIFF files
pub struct TiffBuilder {
    byte_order: ByteOrder,
    handler: Box<dyn ByteOrderHandler>,
    is_big_tiff: bool,
    pub ifds: Vec<IFD>,
    pub(crate) block_data: BTreeMap<usize, BlockData>,
    pub(crate) external_data: BTreeMap<(usize, u16), Vec<u8>>,
}

impl TiffBuilder {
    /// Create a new TIFF builder
    pub fn new(byte_order: ByteOrder, is_big_tiff: bool) -> Self {
        debug!("Creating TiffBuilder ({}, BigTIFF: {})", byte_order.name(), is_big_tiff);
        TiffBuilder {
            byte_order,
            handler: byte_order.create_handler(),
            is_big_tiff,
            ifds: Vec::new(),
            block_data: BTreeMap::new(),
            external_data: BTreeMap::new(),
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn handler(&self) -> &dyn ByteOrderHandler {
        self.handler.as_ref()
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Add an empty IFD and return its index
    pub fn add_ifd(&mut self) -> usize {
        let ifd_index = self.ifds.len();
        self.ifds.push(IFD::new(ifd_index, 0));
        ifd_index
    }

    fn ifd_mut(&mut self, ifd_index: usize) -> TiffResult<&mut IFD> {
        let count = self.ifds.len();
        self.ifds.get_mut(ifd_index).ok_or_else(|| TiffError::GenericError(format!(
            "Invalid IFD index {}, only have {} IFDs", ifd_index, count
        )))
    }

    /// Adds a tag whose values are already encoded in the builder's byte order
    ///
    /// Values that fit the entry's value field are stored inline, the rest
    /// become out-of-line data placed by the writer.
    pub fn add_encoded(
        &mut self,
        ifd_index: usize,
        tag: u16,
        field_type: u16,
        count: u64,
        bytes: Vec<u8>,
    ) -> TiffResult<()> {
        let inline_size = if self.is_big_tiff { 8 } else { 4 };

        let entry = if bytes.len() <= inline_size {
            let mut raw_value = [0u8; 8];
            raw_value[..bytes.len()].copy_from_slice(&bytes);
            IFDEntry::from_raw(tag, field_type, count, raw_value, self.handler.as_ref(), self.is_big_tiff)
        } else {
            self.external_data.insert((ifd_index, tag), bytes);
            IFDEntry::new(tag, field_type, count, 0)
        };

        self.ifd_mut(ifd_index)?.add_entry(entry);
        Ok(())
    }

    pub fn add_short(&mut self, ifd_index: usize, tag: u16, value: u16) -> TiffResult<()> {
        self.add_shorts(ifd_index, tag, &[value])
    }

    pub fn add_shorts(&mut self, ifd_index: usize, tag: u16, values: &[u16]) -> TiffResult<()> {
        let mut bytes = Vec::with_capacity(values.len() * 2);
        for &value in values {
            self.handler.encode_u16(&mut bytes, value);
        }
        self.add_encoded(ifd_index, tag, field_types::SHORT, values.len() as u64, bytes)
    }

    pub fn add_long(&mut self, ifd_index: usize, tag: u16, value: u32) -> TiffResult<()> {
        let mut bytes = Vec::with_capacity(4);
        self.handler.encode_u32(&mut bytes, value);
        self.add_encoded(ifd_index, tag, field_types::LONG, 1, bytes)
    }

    pub fn add_doubles(&mut self, ifd_index: usize, tag: u16, values: &[f64]) -> TiffResult<()> {
        let mut bytes = Vec::with_capacity(values.len() * 8);
        for &value in values {
            self.handler.encode_f64(&mut bytes, value);
        }
        self.add_encoded(ifd_index, tag, field_types::DOUBLE, values.len() as u64, bytes)
    }

    /// Adds a NUL-terminated ASCII tag
    pub fn add_ascii(&mut self, ifd_index: usize, tag: u16, text: &str) -> TiffResult<()> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let count = bytes.len() as u64;
        self.add_encoded(ifd_index, tag, field_types::ASCII, count, bytes)
    }

    /// Sets the encoded blocks of an IFD
    ///
    /// Adds the byte counts tag right away; the offsets tag gets a placeholder
    /// of the right size and is filled in by the writer once the layout is known.
    ///
    /// # Arguments
    /// * `offsets_tag` - StripOffsets or TileOffsets
    /// * `byte_counts_tag` - StripByteCounts or TileByteCounts
    /// * `blocks` - Encoded blocks in offsets-table order
    pub fn set_blocks(
        &mut self,
        ifd_index: usize,
        offsets_tag: u16,
        byte_counts_tag: u16,
        blocks: Vec<Vec<u8>>,
    ) -> TiffResult<()> {
        info!("Setting {} blocks for IFD #{}: {} bytes", blocks.len(), ifd_index,
              blocks.iter().map(Vec::len).sum::<usize>());

        let count = blocks.len() as u64;
        let (field_type, word) = self.offset_field();

        let mut counts = Vec::with_capacity(blocks.len() * word);
        for block in &blocks {
            self.encode_offset(&mut counts, block.len() as u64);
        }
        self.add_encoded(ifd_index, byte_counts_tag, field_type, count, counts)?;
        self.add_encoded(ifd_index, offsets_tag, field_type, count, vec![0u8; blocks.len() * word])?;

        self.block_data.insert(ifd_index, BlockData { offsets_tag, blocks });
        Ok(())
    }

    /// Field type and size used for offsets and byte counts
    pub(crate) fn offset_field(&self) -> (u16, usize) {
        if self.is_big_tiff { (field_types::LONG8, 8) } else { (field_types::LONG, 4) }
    }

    pub(crate) fn encode_offset(&self, buffer: &mut Vec<u8>, value: u64) {
        if self.is_big_tiff {
            self.handler.encode_u64(buffer, value);
        } else {
            self.handler.encode_u32(buffer, value as u32);
        }
    }

    /// Write the TIFF file to disk
    pub fn write(&self, output_path: &str) -> TiffResult<()> {
        WriterBuilder::write(self, output_path)
    }
}
