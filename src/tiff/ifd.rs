//! Image File Directory (IFD) structures
//!
//! An IFD is the tag directory describing one raster inside a TIFF file.
//! Small tag values live inside the entry itself; the raw bytes of that
//! value field are kept so multi-value inline tags (e.g. two SHORTs) can be
//! decoded later in the file's byte order.

use std::collections::HashMap;
use std::fmt;
use log::trace;

use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::{field_types, tags};
use crate::utils::tag_utils;

/// An Image File Directory in a TIFF file
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD, in file order
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    tag_map: HashMap<u16, IFDEntry>,
}

/// A single tag entry of an IFD
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// The value itself for inline scalars, otherwise the file offset of the values
    pub value_offset: u64,
    /// Raw value field as stored in the file (4 bytes for TIFF, 8 for BigTIFF)
    pub(crate) raw_value: [u8; 8],
}

impl IFDEntry {
    /// Creates an entry whose value field holds `value_offset`
    ///
    /// The raw value field is little-endian; the builder only uses this for
    /// entries whose values live out of line.
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self {
            tag,
            field_type,
            count,
            value_offset,
            raw_value: value_offset.to_le_bytes(),
        }
    }

    /// Creates an entry from the raw value field read from a file
    ///
    /// Inline SHORT and BYTE scalars are decoded from the leading bytes of the
    /// field so big-endian files yield the right value.
    pub fn from_raw(
        tag: u16,
        field_type: u16,
        count: u64,
        raw_value: [u8; 8],
        handler: &dyn ByteOrderHandler,
        is_big_tiff: bool,
    ) -> Self {
        let mut entry = Self { tag, field_type, count, value_offset: 0, raw_value };

        entry.value_offset = if entry.is_value_inline(is_big_tiff) && count == 1 {
            match field_type {
                field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => raw_value[0] as u64,
                field_types::SHORT | field_types::SSHORT => handler.decode_u16(&raw_value) as u64,
                _ if is_big_tiff => handler.decode_u64(&raw_value),
                _ => handler.decode_u32(&raw_value) as u64,
            }
        } else if is_big_tiff {
            handler.decode_u64(&raw_value)
        } else {
            handler.decode_u32(&raw_value) as u64
        };

        entry
    }

    /// Size in bytes of a single value of this entry's field type
    pub fn get_field_type_size(&self) -> usize {
        tag_utils::field_type_size(self.field_type)
    }

    /// Whether the values are stored in the entry instead of at an offset
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let total_size = self.get_field_type_size() as u64 * self.count;
        let inline_size = if is_big_tiff { 8 } else { 4 };
        total_size <= inline_size
    }
}

impl IFD {
    /// Creates an empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry and updates the lookup cache
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry to IFD #{}: tag {} ({})",
               self.number, entry.tag, tag_utils::get_tag_name(entry.tag));

        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Value/offset field of a tag
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Width and height of the raster described by this IFD
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Number of bands (1 if not specified)
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Whether the raster data is organised in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_LENGTH)
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;

        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }

        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;

        for entry in &self.entries {
            writeln!(f, "    {} ({}): {} [{}]",
                     entry.tag,
                     tag_utils::get_tag_name(entry.tag),
                     entry.value_offset,
                     tag_utils::get_field_type_name(entry.field_type))?;
        }

        Ok(())
    }
}
