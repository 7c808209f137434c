//! Block codecs for TIFF strips and tiles
//!
//! Each supported TIFF compression scheme is a `CompressionHandler`
//! strategy; the factory picks one from the Compression tag.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;
pub mod predictor;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use zstd::ZstdHandler;
