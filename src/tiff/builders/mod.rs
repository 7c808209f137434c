//! TIFF builder strategy modules
//!
//! Tag strategies used by the GeoTIFF writer, organized by category, and
//! the writer that lays a built file out on disk.

pub mod basic_tags;
pub mod geo_tags;
pub mod metadata_tags;
pub mod writer;
