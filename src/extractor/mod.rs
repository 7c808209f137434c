//! Raster window extraction
//!
//! Pulls the cells under a map-space window out of a raster into memory.

mod region;
mod layout;
mod raster_sample;
mod extractor_strategy;
mod tiff_strategy;
mod tile_reader;
mod strip_reader;

pub use region::Region;
pub use layout::{BlockLayout, RasterLayout};
pub use raster_sample::RasterSample;
pub use extractor_strategy::{ExtractorStrategy, ExtractorStrategyFactory, WindowExtractor};
pub use tiff_strategy::TiffExtractorStrategy;
