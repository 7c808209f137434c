//! TIFF file reader implementation
//!
//! This module implements the TIFF/BigTIFF file reader that uses the
//! Strategy pattern to handle different byte orders.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::field_types;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::tag_utils;
use crate::utils::string_utils;

/// Upper bound on the IFD chain length, guards against offset loops
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Current file path
    current_file: Option<String>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            current_file: None,
            is_big_tiff: false,
        }
    }

    /// Opens the current file for reading
    ///
    /// Block readers call this so every extraction owns its own handle.
    pub fn create_reader(&self) -> TiffResult<BufReader<File>> {
        match &self.current_file {
            Some(path) => Ok(BufReader::new(File::open(path)?)),
            None => Err(TiffError::GenericError("No file path specified".to_string())),
        }
    }

    /// Returns the byte order handler, failing if no header was read yet
    pub fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Loads a TIFF file from the given path
    ///
    /// # Arguments
    /// * `filepath` - Path to the TIFF file to load
    ///
    /// # Returns
    /// A TIFF structure with the file's IFD chain
    pub fn load(&mut self, filepath: &str) -> TiffResult<TIFF> {
        info!("Loading TIFF file: {}", filepath);
        self.current_file = Some(filepath.to_string());

        let file = File::open(Path::new(filepath))?;
        let mut reader = BufReader::with_capacity(64 * 1024, file);

        self.read(&mut reader)
    }

    /// Reads a TIFF file from the given reader
    ///
    /// Detects the byte order, tells TIFF from BigTIFF and walks the IFD chain.
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        let handler = format_utils::detect_byte_order(reader)?;
        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, handler.as_ref())?;

        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, is_big_tiff, handler.as_ref())?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        self.byte_order_handler = Some(handler);
        self.is_big_tiff = is_big_tiff;

        let mut tiff = TIFF::new(is_big_tiff);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        if tiff.ifds.is_empty() {
            return Err(TiffError::GenericError("TIFF file contains no readable IFD".to_string()));
        }

        info!("Read {} IFDs from {} file", tiff.ifds.len(), if is_big_tiff { "BigTIFF" } else { "TIFF" });
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A broken link after the first IFD ends the chain with a warning; the
    /// main raster is what matters.
    fn read_ifd_chain(
        &self,
        reader: &mut dyn SeekableReader,
        first_ifd_offset: u64,
        file_size: u64,
    ) -> TiffResult<Vec<IFD>> {
        let handler = self.handler()?;
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            debug!("Reading IFD at offset: {}", ifd_offset);

            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if !ifds.is_empty() => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
                Err(e) => return Err(e),
            };

            // read_ifd leaves the stream right after the last entry
            let next_ifd_offset = match ifd_utils::read_ifd_offset(reader, self.is_big_tiff, handler) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };

            ifds.push(ifd);

            if next_ifd_offset != 0 && validation::validate_ifd_offset(next_ifd_offset, file_size).is_err() {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }

            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads an IFD from the reader
    ///
    /// # Arguments
    /// * `reader` - The seekable reader to use
    /// * `offset` - Offset in the file where the IFD starts
    /// * `number` - The index of this IFD in the file
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        let handler = self.handler()?;
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };
        debug!("IFD #{} entry count: {}", number, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader)?);
        }

        Ok(ifd)
    }

    /// Reads a single IFD entry
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let mut raw_value = [0u8; 8];
        let value_size = if self.is_big_tiff { 8 } else { 4 };
        reader.read_exact(&mut raw_value[..value_size])?;

        Ok(IFDEntry::from_raw(tag, field_type, count, raw_value, handler, self.is_big_tiff))
    }

    /// Reads a tag's integer values as a vector of u64
    ///
    /// # Arguments
    /// * `reader` - The seekable reader to use
    /// * `ifd` - The IFD containing the tag
    /// * `tag` - The tag number to read
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        let handler = self.handler()?;

        if entry.is_value_inline(self.is_big_tiff) {
            return tag_utils::decode_inline_values(entry, handler);
        }

        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let mut values = Vec::with_capacity(entry.count as usize);
        tag_utils::read_tag_value_array(reader, entry, handler, &mut values)?;

        Ok(values)
    }

    /// Reads a tag's values converted to f64
    ///
    /// Used for the GeoTIFF model tags (DOUBLE), but also accepts integer,
    /// FLOAT and RATIONAL encodings.
    pub fn read_f64_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        let handler = self.handler()?;
        let size = entry.get_field_type_size();

        let bytes = if entry.is_value_inline(self.is_big_tiff) {
            entry.raw_value[..size * entry.count as usize].to_vec()
        } else {
            let total = size as u64 * entry.count;
            validation::validate_block(entry.value_offset, total, validation::get_file_size(reader)?)?;
            reader.seek(SeekFrom::Start(entry.value_offset))?;
            let mut buffer = vec![0u8; total as usize];
            reader.read_exact(&mut buffer)?;
            buffer
        };

        bytes.chunks_exact(size)
            .map(|chunk| match entry.field_type {
                field_types::DOUBLE => Ok(handler.decode_f64(chunk)),
                field_types::FLOAT => Ok(handler.decode_f32(chunk) as f64),
                field_types::BYTE | field_types::UNDEFINED => Ok(chunk[0] as f64),
                field_types::SBYTE => Ok(chunk[0] as i8 as f64),
                field_types::SHORT => Ok(handler.decode_u16(chunk) as f64),
                field_types::SSHORT => Ok(handler.decode_u16(chunk) as i16 as f64),
                field_types::LONG => Ok(handler.decode_u32(chunk) as f64),
                field_types::SLONG => Ok(handler.decode_u32(chunk) as i32 as f64),
                field_types::RATIONAL => {
                    let num = handler.decode_u32(&chunk[..4]) as f64;
                    let den = handler.decode_u32(&chunk[4..]) as f64;
                    Ok(num / den)
                }
                field_types::SRATIONAL => {
                    let num = handler.decode_u32(&chunk[..4]) as i32 as f64;
                    let den = handler.decode_u32(&chunk[4..]) as i32 as f64;
                    Ok(num / den)
                }
                other => Err(TiffError::UnsupportedFieldType(other)),
            })
            .collect()
    }

    /// Reads an ASCII tag, trailing NUL characters removed
    pub fn read_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<String> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;

        let mut buffer = if entry.is_value_inline(self.is_big_tiff) {
            entry.raw_value[..entry.count as usize].to_vec()
        } else {
            validation::validate_block(entry.value_offset, entry.count, validation::get_file_size(reader)?)?;
            reader.seek(SeekFrom::Start(entry.value_offset))?;
            let mut buffer = vec![0u8; entry.count as usize];
            reader.read_exact(&mut buffer)?;
            buffer
        };

        string_utils::trim_trailing_nulls(&mut buffer);

        String::from_utf8(buffer)
            .map_err(|e| TiffError::GenericError(format!("Invalid UTF-8 string: {}", e)))
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}
