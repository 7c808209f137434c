//! Seekable reader trait
//!
//! The GeoTIFF reader walks IFD chains and jumps between strip/tile offsets,
//! so every source it reads from must support both reading and seeking.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
