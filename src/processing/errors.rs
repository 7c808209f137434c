//! Error types for algorithm runs
//!
//! Every failure of a run falls into one of four kinds: bad input, raster or
//! file I/O, a window without usable cells, or a user cancellation.

use std::fmt;
use std::io;

use crate::features::FeatureError;
use crate::tiff::errors::TiffError;

/// User-facing classification of a run failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Io,
    EmptySample,
    Cancelled,
}

/// Errors raised by an algorithm run
#[derive(Debug)]
pub enum ProcessingError {
    /// Bad or missing parameters, unusable point layer
    Input(String),
    /// The point layer could not be read or a feature is malformed
    Features(FeatureError),
    /// The DSM could not be read, or a window fell outside it
    Raster(TiffError),
    /// An output file could not be written
    Write { path: String, source: io::Error },
    /// No cell of a feature's window survived the no-data policy
    EmptySample { feature_id: i64, reason: String },
    /// The user cancelled; the rows computed so far were written
    Cancelled { rows_written: usize },
}

impl ProcessingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessingError::Input(_) | ProcessingError::Features(_) => ErrorKind::Input,
            ProcessingError::Raster(TiffError::BandOutOfRange { .. }) => ErrorKind::Input,
            ProcessingError::Raster(_) | ProcessingError::Write { .. } => ErrorKind::Io,
            ProcessingError::EmptySample { .. } => ErrorKind::EmptySample,
            ProcessingError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// Whether the error means a window held no usable cell
    pub fn is_empty_window(&self) -> bool {
        matches!(self, ProcessingError::EmptySample { .. } | ProcessingError::Raster(TiffError::WindowOutsideRaster(_)))
    }
}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingError::Input(msg) => write!(f, "Invalid input: {}", msg),
            ProcessingError::Features(err) => write!(f, "Point layer error: {}", err),
            ProcessingError::Raster(err) => write!(f, "Raster error: {}", err),
            ProcessingError::Write { path, source } => write!(f, "Cannot write {}: {}", path, source),
            ProcessingError::EmptySample { feature_id, reason } => {
                write!(f, "Empty sample for feature {}: {}", feature_id, reason)
            }
            ProcessingError::Cancelled { rows_written } => {
                write!(f, "Cancelled after {} row(s)", rows_written)
            }
        }
    }
}

impl std::error::Error for ProcessingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessingError::Features(err) => Some(err),
            ProcessingError::Raster(err) => Some(err),
            ProcessingError::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TiffError> for ProcessingError {
    fn from(err: TiffError) -> Self {
        ProcessingError::Raster(err)
    }
}

impl From<FeatureError> for ProcessingError {
    fn from(err: FeatureError) -> Self {
        ProcessingError::Features(err)
    }
}

/// Result type for algorithm runs
pub type ProcessingResult<T> = Result<T, ProcessingError>;
