//! Utility modules for common functionality
//!
//! Logging, progress display and the low-level helpers shared by the TIFF
//! reader and writer.

pub mod logger;
pub mod progress;
pub(crate) mod xml_utils;
pub(crate) mod write_utils;
pub(crate) mod ifd_utils;
pub(crate) mod string_utils;
pub mod format_utils;
pub(crate) mod tag_utils;
pub(crate) mod tiff_extraction_utils;
