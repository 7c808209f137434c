//! Factory for creating compression handlers

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::utils::tag_utils;
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for a Compression tag value
    ///
    /// Schemes other than none, deflate and zstd are rejected with
    /// `UnsupportedCompression`.
    pub fn create_handler(code: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        match u16::try_from(code) {
            Ok(compression::NONE) => Ok(Box::new(UncompressedHandler)),
            Ok(compression::DEFLATE) | Ok(compression::DEFLATE_OLD) => Ok(Box::new(AdobeDeflateHandler)),
            Ok(compression::ZSTD) => Ok(Box::new(ZstdHandler::new())),
            _ => {
                log::error!("Unsupported compression {} ({})", code, tag_utils::get_compression_name(code));
                Err(TiffError::UnsupportedCompression(code))
            }
        }
    }

    /// Get a handler by name, as accepted on the writer side
    pub fn get_handler_by_name(name: &str) -> TiffResult<Box<dyn CompressionHandler>> {
        match name.to_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Box::new(UncompressedHandler)),
            "deflate" | "zip" | "adobe deflate" => Ok(Box::new(AdobeDeflateHandler)),
            "zstd" => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::GenericError(format!("Unknown compression type: {}", name)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_deflate_code_uses_deflate_handler() {
        let handler = CompressionFactory::create_handler(32946).unwrap();
        assert_eq!(handler.code(), compression::DEFLATE);
    }

    #[test]
    fn lzw_is_unsupported() {
        assert!(matches!(
            CompressionFactory::create_handler(5),
            Err(TiffError::UnsupportedCompression(5))
        ));
    }

    #[test]
    fn handlers_by_name() {
        assert_eq!(CompressionFactory::get_handler_by_name("ZSTD").unwrap().code(), compression::ZSTD);
        assert!(CompressionFactory::get_handler_by_name("jpeg").is_err());
    }
}
