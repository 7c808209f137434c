//! GDAL metadata tag strategies

use crate::tiff::builder::TiffBuilder;
use crate::tiff::constants::tags;
use crate::tiff::errors::TiffResult;
use crate::utils::xml_utils::{self, MetadataItem};
use log::debug;

/// Adds the GDAL private tags to an IFD
pub struct MetadataTagsBuilder;

impl MetadataTagsBuilder {
    /// Add the GDAL_NODATA marker
    pub fn add_nodata(builder: &mut TiffBuilder, ifd_index: usize, nodata: f64) -> TiffResult<()> {
        let text = if nodata.is_nan() { "nan".to_string() } else { nodata.to_string() };
        debug!("Adding GDAL_NODATA: {}", text);
        builder.add_ascii(ifd_index, tags::GDAL_NODATA, &text)
    }

    /// Add per-band scale and offset as a GDALMetadata document
    ///
    /// # Arguments
    /// * `scaling` - `(scale, offset)` of each band, in band order
    pub fn add_band_scaling(builder: &mut TiffBuilder, ifd_index: usize, scaling: &[(f64, f64)]) -> TiffResult<()> {
        let mut items = Vec::with_capacity(scaling.len() * 2);
        for (sample, &(scale, offset)) in scaling.iter().enumerate() {
            items.push(MetadataItem::band_item("OFFSET", sample as u32, "offset", offset.to_string()));
            items.push(MetadataItem::band_item("SCALE", sample as u32, "scale", scale.to_string()));
        }

        builder.add_ascii(ifd_index, tags::GDAL_METADATA, &xml_utils::build_gdal_metadata(&items))
    }
}
