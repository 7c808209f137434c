pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod coordinate;
pub mod extractor;
pub mod features;
pub mod stats;
pub mod output;
pub mod processing;
pub mod config;
pub mod commands;
pub mod api;

pub use crate::api::UavPreparer;

pub use tiff::{GeoTiffWriter, TiffReader, WriteOptions};
pub use extractor::{RasterSample, Region, WindowExtractor};
pub use coordinate::{GeoTransform, Point, SamplingWindow};
pub use processing::{HeightStatsParameters, ProcessingError, ProcessingResult, RunReport};
