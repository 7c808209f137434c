//! I/O primitives shared by the GeoTIFF reader and writer
//!
//! Byte order strategies and the seekable reader trait live here.

pub mod seekable;
pub mod byte_order;
