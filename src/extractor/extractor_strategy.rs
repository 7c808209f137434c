//! Raster window extractor strategy definitions
//!
//! Raster formats plug in as `ExtractorStrategy` implementations chosen by a
//! factory from the file extension; `WindowExtractor` is the facade the
//! processing layer talks to.

use log::{debug, error, info};
use std::path::Path;
use std::time::Instant;

use crate::coordinate::SamplingWindow;
use crate::tiff::errors::{TiffError, TiffResult};

use super::raster_sample::RasterSample;
use super::tiff_strategy::TiffExtractorStrategy;

/// Strategy for pulling windows out of a raster format
pub trait ExtractorStrategy {
    /// Extract the cells of the opened band under a map-space window
    ///
    /// # Arguments
    /// * `window` - Window in `projWin` order, in raster CRS units
    /// * `deadline` - Optional cooperative deadline, checked between block reads
    ///
    /// # Returns
    /// The clipped window, or `WindowOutsideRaster` when it covers no cell
    fn extract(&self, window: &SamplingWindow, deadline: Option<Instant>) -> TiffResult<RasterSample>;

    /// One-line description for logs
    fn describe(&self) -> String;
}

fn file_extension(file_path: &str) -> String {
    Path::new(file_path)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .to_lowercase()
}

/// Factory for creating appropriate extractor strategies
pub struct ExtractorStrategyFactory;

impl ExtractorStrategyFactory {
    /// Open `file_path` with the strategy matching its extension
    ///
    /// # Arguments
    /// * `file_path` - Raster to open
    /// * `band` - 1-based band number
    pub fn create_strategy(file_path: &str, band: u32) -> TiffResult<Box<dyn ExtractorStrategy>> {
        let extension = file_extension(file_path);
        debug!("Determining strategy for file extension: {}", extension);

        match extension.as_str() {
            "tif" | "tiff" | "gtiff" => {
                info!("Using GeoTIFF extractor strategy for {}", file_path);
                Ok(Box::new(TiffExtractorStrategy::open(file_path, band)?))
            }
            _ => {
                error!("Unsupported raster format: {}", extension);
                Err(TiffError::GenericError(format!("Unsupported raster format: '{}'", extension)))
            }
        }
    }
}

/// Extracts windows from one raster for the duration of a run
pub struct WindowExtractor {
    strategy: Box<dyn ExtractorStrategy>,
}

impl WindowExtractor {
    /// Opens a raster for repeated window extraction
    pub fn open(file_path: &str, band: u32) -> TiffResult<Self> {
        let strategy = ExtractorStrategyFactory::create_strategy(file_path, band)?;
        info!("Raster ready: {}", strategy.describe());
        Ok(WindowExtractor { strategy })
    }

    /// Extract the cells under `window`
    pub fn extract(&self, window: &SamplingWindow, deadline: Option<Instant>) -> TiffResult<RasterSample> {
        self.strategy.extract(window, deadline)
    }

    pub fn describe(&self) -> String {
        self.strategy.describe()
    }
}
