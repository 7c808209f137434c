//! Error types for point layer reading

use std::fmt;
use std::io;

/// Errors raised while opening or iterating a point layer
#[derive(Debug)]
pub enum FeatureError {
    /// The layer file could not be read
    IoError(io::Error),
    /// The layer is not valid GeoJSON / delimited text
    Parse(String),
    /// Unknown layer format (by file extension)
    UnsupportedFormat(String),
    /// The layer has no field of that name
    FieldNotFound(String),
    /// The ID field is missing, null or not a number on one feature
    InvalidId { feature: usize, reason: String },
    /// A feature has no usable geometry
    InvalidGeometry { feature: usize, reason: String },
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureError::IoError(err) => write!(f, "IO error: {}", err),
            FeatureError::Parse(msg) => write!(f, "Malformed point layer: {}", msg),
            FeatureError::UnsupportedFormat(ext) => write!(f, "Unsupported point layer format: {}", ext),
            FeatureError::FieldNotFound(name) => write!(f, "Field '{}' not found", name),
            FeatureError::InvalidId { feature, reason } => {
                write!(f, "Feature {}: invalid ID ({})", feature, reason)
            }
            FeatureError::InvalidGeometry { feature, reason } => {
                write!(f, "Feature {}: invalid geometry ({})", feature, reason)
            }
        }
    }
}

impl std::error::Error for FeatureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeatureError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for FeatureError {
    fn from(err: io::Error) -> Self {
        FeatureError::IoError(err)
    }
}

impl From<serde_json::Error> for FeatureError {
    fn from(err: serde_json::Error) -> Self {
        FeatureError::Parse(err.to_string())
    }
}

/// Result type for point layer operations
pub type FeatureResult<T> = Result<T, FeatureError>;
