//! GeoTIFF extractor strategy
//!
//! Parses the raster header once when opened; every extraction then opens
//! its own file handle, reads the strips or tiles under the window and
//! drops the handle on return.

use log::{debug, info};
use std::time::Instant;

use crate::coordinate::SamplingWindow;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::TiffReader;

use super::extractor_strategy::ExtractorStrategy;
use super::layout::{BlockLayout, RasterLayout};
use super::raster_sample::RasterSample;
use super::strip_reader::StripReader;
use super::tile_reader::TileReader;

/// Extractor for stripped or tiled GeoTIFF rasters
pub struct TiffExtractorStrategy {
    path: String,
    reader: TiffReader,
    layout: RasterLayout,
}

impl TiffExtractorStrategy {
    /// Opens a raster and reads the layout of `band`
    ///
    /// # Arguments
    /// * `path` - Path to the GeoTIFF
    /// * `band` - 1-based band number
    pub fn open(path: &str, band: u32) -> TiffResult<Self> {
        let mut reader = TiffReader::new();
        let tiff = reader.load(path)?;
        let ifd = tiff.main_ifd().ok_or(TiffError::MissingDimensions)?;

        let mut stream = reader.create_reader()?;
        let layout = RasterLayout::from_ifd(&reader, &mut stream, ifd, band)?;

        info!("Opened {} band {} of {}", path, band, layout.samples_per_pixel);

        if !layout.geo.transform.is_north_up() {
            return Err(TiffError::GenericError(
                "Rotated geotransforms are not supported for window extraction".to_string()
            ));
        }

        Ok(TiffExtractorStrategy { path: path.to_string(), reader, layout })
    }

    pub fn layout(&self) -> &RasterLayout {
        &self.layout
    }
}

impl ExtractorStrategy for TiffExtractorStrategy {
    fn extract(&self, window: &SamplingWindow, deadline: Option<Instant>) -> TiffResult<RasterSample> {
        let layout = &self.layout;
        let region = window
            .to_pixel_region(&layout.geo.transform, layout.width as u64, layout.height as u64)
            .ok_or_else(|| TiffError::WindowOutsideRaster(window.to_string()))?;

        debug!("Window {} -> pixels x={} y={} {}x{}",
               window, region.x, region.y, region.width, region.height);

        let transform = layout.geo.transform.for_subwindow(region.x, region.y);
        let mut sample = RasterSample::new(region, transform, layout.nodata);

        let stream = self.reader.create_reader()?;
        let handler = self.reader.handler()?;

        if matches!(layout.blocks, BlockLayout::Tiles { .. }) {
            TileReader::new(stream, layout, handler).extract(&mut sample, deadline)?;
        } else {
            StripReader::new(stream, layout, handler).extract(&mut sample, deadline)?;
        }

        Ok(sample)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.path, self.layout)
    }
}
