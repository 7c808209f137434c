//! TIFF writing
//!
//! Lays out a built TIFF (header, IFDs, out-of-line tag data, then blocks)
//! and writes it front to back. Offsets are computed before anything is
//! written so the block offsets table can be filled in.

use crate::tiff::builder::TiffBuilder;
use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::utils::{ifd_utils, write_utils};
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Where every piece of the file goes
struct FileLayout {
    ifd_offsets: Vec<u64>,
    external_offsets: BTreeMap<(usize, u16), u64>,
    block_offsets: BTreeMap<usize, Vec<u64>>,
}

/// Handles writing TIFF files to disk
pub struct WriterBuilder;

impl WriterBuilder {
    /// Write a complete TIFF file to disk
    pub fn write(builder: &TiffBuilder, output_path: &str) -> TiffResult<()> {
        info!("Writing TIFF to {}", output_path);

        let file = File::create(output_path)?;
        let mut writer = BufWriter::new(file);

        Self::write_to(builder, &mut writer)?;

        writer.flush()?;
        Ok(())
    }

    /// Write the file to any byte sink
    pub fn write_to(builder: &TiffBuilder, writer: &mut impl Write) -> TiffResult<()> {
        if builder.ifds.is_empty() {
            return Err(TiffError::GenericError("Cannot write a TIFF without IFDs".to_string()));
        }

        let sorted_ifds = Self::prepare_sorted_ifds(&builder.ifds);
        let layout = Self::calculate_layout(builder, &sorted_ifds);
        let (external_data, inline_patches) = Self::patch_block_offsets(builder, &layout);

        let mut position = 0u64;
        Self::write_header(builder, writer, layout.ifd_offsets[0], &mut position)?;

        for (i, ifd) in sorted_ifds.iter().enumerate() {
            let next_offset = layout.ifd_offsets.get(i + 1).copied().unwrap_or(0);
            Self::pad_to(writer, &mut position, layout.ifd_offsets[i])?;
            Self::write_ifd(builder, writer, ifd, i, next_offset, &layout, &inline_patches, &mut position)?;
        }

        for (key, data) in &external_data {
            Self::pad_to(writer, &mut position, layout.external_offsets[key])?;
            Self::emit(writer, data, &mut position)?;
        }

        for (ifd_index, block_data) in &builder.block_data {
            for (block, &offset) in block_data.blocks.iter().zip(&layout.block_offsets[ifd_index]) {
                Self::pad_to(writer, &mut position, offset)?;
                Self::emit(writer, block, &mut position)?;
            }
        }

        debug!("Wrote {} bytes", position);
        Ok(())
    }

    /// Prepare sorted IFDs with unique tags
    fn prepare_sorted_ifds(ifds: &[IFD]) -> Vec<IFD> {
        ifds.iter().map(|ifd| {
            let mut sorted_ifd = ifd.clone();
            sorted_ifd.entries = write_utils::get_unique_sorted_entries(&ifd.entries);
            sorted_ifd
        }).collect()
    }

    fn calculate_layout(builder: &TiffBuilder, sorted_ifds: &[IFD]) -> FileLayout {
        let is_big_tiff = builder.is_big_tiff();
        let mut current_offset = if is_big_tiff { 16 } else { 8 };

        let mut ifd_offsets = Vec::with_capacity(sorted_ifds.len());
        for ifd in sorted_ifds {
            ifd_offsets.push(current_offset);
            current_offset += ifd_utils::calculate_ifd_size(ifd, is_big_tiff);
        }

        let mut external_offsets = BTreeMap::new();
        for (key, data) in &builder.external_data {
            current_offset = write_utils::align_to_4_bytes(current_offset);
            external_offsets.insert(*key, current_offset);
            current_offset += data.len() as u64;
        }

        let mut block_offsets = BTreeMap::new();
        for (ifd_index, block_data) in &builder.block_data {
            let mut offsets = Vec::with_capacity(block_data.blocks.len());
            for block in &block_data.blocks {
                current_offset = write_utils::align_to_4_bytes(current_offset);
                offsets.push(current_offset);
                current_offset += block.len() as u64;
            }
            block_offsets.insert(*ifd_index, offsets);
        }

        FileLayout { ifd_offsets, external_offsets, block_offsets }
    }

    /// Encodes the final block offsets into their tag
    ///
    /// # Returns
    /// The out-of-line data with offsets tables filled in, and the raw value
    /// fields of offsets tags small enough to stay inline
    fn patch_block_offsets(
        builder: &TiffBuilder,
        layout: &FileLayout,
    ) -> (BTreeMap<(usize, u16), Vec<u8>>, HashMap<(usize, u16), [u8; 8]>) {
        let mut external_data = builder.external_data.clone();
        let mut inline_patches = HashMap::new();

        for (ifd_index, block_data) in &builder.block_data {
            let mut encoded = Vec::new();
            for &offset in &layout.block_offsets[ifd_index] {
                builder.encode_offset(&mut encoded, offset);
            }

            let key = (*ifd_index, block_data.offsets_tag);
            if let Some(slot) = external_data.get_mut(&key) {
                *slot = encoded;
            } else {
                let mut raw_value = [0u8; 8];
                raw_value[..encoded.len()].copy_from_slice(&encoded);
                inline_patches.insert(key, raw_value);
            }
        }

        (external_data, inline_patches)
    }

    fn emit(writer: &mut impl Write, bytes: &[u8], position: &mut u64) -> TiffResult<()> {
        writer.write_all(bytes)?;
        *position += bytes.len() as u64;
        Ok(())
    }

    fn pad_to(writer: &mut impl Write, position: &mut u64, target: u64) -> TiffResult<()> {
        if target < *position {
            return Err(TiffError::GenericError(format!(
                "Layout error: at offset {} but next item starts at {}", position, target
            )));
        }
        let padding = vec![0u8; (target - *position) as usize];
        Self::emit(writer, &padding, position)
    }

    /// Write TIFF header
    ///
    /// Byte order marker, version (42 or 43), BigTIFF offset size words and
    /// the offset of the first IFD.
    fn write_header(
        builder: &TiffBuilder,
        writer: &mut impl Write,
        first_ifd_offset: u64,
        position: &mut u64,
    ) -> TiffResult<()> {
        let handler = builder.handler();
        let mut bytes = builder.byte_order().marker().to_vec();

        if builder.is_big_tiff() {
            handler.encode_u16(&mut bytes, header::BIG_TIFF_VERSION);
            handler.encode_u16(&mut bytes, header::BIGTIFF_OFFSET_SIZE);
            handler.encode_u16(&mut bytes, 0);
            handler.encode_u64(&mut bytes, first_ifd_offset);
        } else {
            handler.encode_u16(&mut bytes, header::TIFF_VERSION);
            handler.encode_u32(&mut bytes, first_ifd_offset as u32);
        }

        Self::emit(writer, &bytes, position)
    }

    /// Write an IFD (Image File Directory)
    #[allow(clippy::too_many_arguments)]
    fn write_ifd(
        builder: &TiffBuilder,
        writer: &mut impl Write,
        ifd: &IFD,
        ifd_index: usize,
        next_offset: u64,
        layout: &FileLayout,
        inline_patches: &HashMap<(usize, u16), [u8; 8]>,
        position: &mut u64,
    ) -> TiffResult<()> {
        let handler = builder.handler();
        let is_big_tiff = builder.is_big_tiff();
        let value_size = if is_big_tiff { 8 } else { 4 };
        let mut bytes = Vec::new();

        if is_big_tiff {
            handler.encode_u64(&mut bytes, ifd.entries.len() as u64);
        } else {
            handler.encode_u16(&mut bytes, ifd.entries.len() as u16);
        }

        for entry in &ifd.entries {
            let key = (ifd_index, entry.tag);

            handler.encode_u16(&mut bytes, entry.tag);
            handler.encode_u16(&mut bytes, entry.field_type);
            if is_big_tiff {
                handler.encode_u64(&mut bytes, entry.count);
            } else {
                handler.encode_u32(&mut bytes, entry.count as u32);
            }

            if let Some(&offset) = layout.external_offsets.get(&key) {
                builder.encode_offset(&mut bytes, offset);
            } else if let Some(raw_value) = inline_patches.get(&key) {
                bytes.extend_from_slice(&raw_value[..value_size]);
            } else {
                bytes.extend_from_slice(&entry.raw_value[..value_size]);
            }
        }

        builder.encode_offset(&mut bytes, next_offset);

        Self::emit(writer, &bytes, position)
    }
}
