//! Error types for GeoTIFF processing

use std::fmt;
use std::io;

/// GeoTIFF-specific error types
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Unsupported combination of bits per sample and sample format
    UnsupportedSampleFormat { bits: u16, format: u16 },
    /// Image dimensions not found
    MissingDimensions,
    /// Requested 1-based band does not exist
    BandOutOfRange { band: u32, count: u32 },
    /// Neither pixel scale + tiepoint nor a model transformation is present
    MissingGeoreference,
    /// Block could not be decompressed
    Decompression(String),
    /// Requested window does not cover a single raster cell
    WindowOutsideRaster(String),
    /// The per-read deadline passed between block reads
    Timeout,
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TiffError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TiffError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            TiffError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            TiffError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            TiffError::UnsupportedSampleFormat { bits, format } => {
                write!(f, "Unsupported sample layout: {} bits with sample format {}", bits, format)
            }
            TiffError::MissingDimensions => write!(f, "Image dimensions not found"),
            TiffError::BandOutOfRange { band, count } => {
                write!(f, "Band {} requested but raster has {} band(s)", band, count)
            }
            TiffError::MissingGeoreference => write!(f, "Raster has no georeferencing tags"),
            TiffError::Decompression(msg) => write!(f, "Decompression failed: {}", msg),
            TiffError::WindowOutsideRaster(window) => write!(f, "Window {} lies outside the raster extent", window),
            TiffError::Timeout => write!(f, "Raster read timed out"),
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TiffError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}

/// Result type for GeoTIFF operations
pub type TiffResult<T> = Result<T, TiffError>;
