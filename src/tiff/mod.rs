//! TIFF file format module
//!
//! Reading TIFF and BigTIFF rasters with their GeoTIFF and GDAL tags, and
//! writing georeferenced rasters back out.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
#[cfg(test)]
mod tests;
pub mod builder;
pub mod builders;
pub mod constants;
pub mod geo_key_parser;
pub mod sample_type;
pub mod geotiff_writer;
pub(crate) mod validation;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use geo_key_parser::{GeoInfo, GeoKeyParser};
pub use builder::TiffBuilder;
pub use sample_type::SampleType;
pub use geotiff_writer::{GeoTiffWriter, WriteOptions};
