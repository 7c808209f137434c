//! GeoTIFF georeferencing and GDAL metadata parsing
//!
//! Turns the model tags of a raster IFD into a `GeoTransform`, reads the
//! GeoKey directory for the CRS code and raster type, and pulls the GDAL
//! no-data marker and per-band scale/offset.

use log::{debug, warn};

use crate::coordinate::GeoTransform;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{geo_keys, raster_type, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::utils::xml_utils;

/// Georeferencing of a raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoInfo {
    /// Pixel-corner based affine transform
    pub transform: GeoTransform,
    /// ProjectedCSTypeGeoKey or GeographicTypeGeoKey, if present
    pub epsg: Option<u16>,
    /// Whether the GeoKeys declare RasterPixelIsPoint
    pub pixel_is_point: bool,
}

/// A single GeoKey directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    pub tiff_tag_location: u16,
    pub count: u16,
    pub value_offset: u16,
}

/// Parser for GeoTIFF geographic metadata
pub struct GeoKeyParser;

impl GeoKeyParser {
    /// Parse the GeoKey directory from an IFD
    ///
    /// Returns an empty list when the raster has no GeoKeyDirectoryTag.
    pub fn parse_geo_key_directory(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<Vec<GeoKeyEntry>> {
        if !ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            return Ok(Vec::new());
        }

        let values = tiff_reader.read_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
        if values.len() < 4 {
            return Err(TiffError::GenericError("Invalid GeoKey directory header".to_string()));
        }

        let num_keys = values[3] as usize;
        debug!("GeoKey directory: version={}, revision={}.{}, keys={}",
               values[0], values[1], values[2], num_keys);

        let keys: Vec<GeoKeyEntry> = values[4..]
            .chunks_exact(4)
            .take(num_keys)
            .map(|key| GeoKeyEntry {
                key_id: key[0] as u16,
                tiff_tag_location: key[1] as u16,
                count: key[2] as u16,
                value_offset: key[3] as u16,
            })
            .collect();

        if keys.len() < num_keys {
            warn!("GeoKey directory declares {} keys but holds {}", num_keys, keys.len());
        }

        Ok(keys)
    }

    /// Extract the georeferencing of a raster IFD
    ///
    /// A ModelTransformation matrix wins over pixel scale + tiepoint, as in GDAL.
    ///
    /// # Returns
    /// `TiffError::MissingGeoreference` when neither form is present
    pub fn extract_geo_info(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<GeoInfo> {
        let transform = if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
            let matrix = tiff_reader.read_f64_values(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
            GeoTransform::from_model_transformation(&matrix)?
        } else if ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) && ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
            let scale = tiff_reader.read_f64_values(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
            let tiepoint = tiff_reader.read_f64_values(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;
            GeoTransform::from_scale_and_tiepoint(&scale, &tiepoint)?
        } else {
            return Err(TiffError::MissingGeoreference);
        };

        let keys = Self::parse_geo_key_directory(tiff_reader, reader, ifd)?;
        let key_value = |id: u16| {
            keys.iter()
                .find(|key| key.key_id == id && key.tiff_tag_location == 0)
                .map(|key| key.value_offset)
        };

        let epsg = key_value(geo_keys::PROJECTED_CS_TYPE).or_else(|| key_value(geo_keys::GEOGRAPHIC_TYPE));
        let pixel_is_point = key_value(geo_keys::RASTER_TYPE) == Some(raster_type::PIXEL_IS_POINT);

        // GDAL reports PixelIsPoint rasters with the origin on the cell corner
        let transform = if pixel_is_point { transform.shifted_half_pixel() } else { transform };

        if !transform.is_valid() {
            return Err(TiffError::GenericError(format!(
                "Degenerate geotransform: {:?}", transform.coefficients()
            )));
        }

        debug!("Geotransform: {:?}, EPSG: {:?}", transform.coefficients(), epsg);

        Ok(GeoInfo { transform, epsg, pixel_is_point })
    }

    /// Reads the GDAL_NODATA marker
    ///
    /// An unparsable marker is ignored with a warning, matching GDAL.
    pub fn read_nodata(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<Option<f64>> {
        if !ifd.has_tag(tags::GDAL_NODATA) {
            return Ok(None);
        }

        let text = tiff_reader.read_ascii(reader, ifd, tags::GDAL_NODATA)?;
        match text.trim().parse::<f64>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                warn!("Ignoring unparsable GDAL_NODATA value '{}'", text);
                Ok(None)
            }
        }
    }

    /// Reads the scale and offset of a 1-based band from GDAL_METADATA
    ///
    /// # Returns
    /// `(scale, offset)`, `(1.0, 0.0)` when the raster declares none
    pub fn read_band_scaling(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        band: u32,
    ) -> TiffResult<(f64, f64)> {
        if !ifd.has_tag(tags::GDAL_METADATA) {
            return Ok((1.0, 0.0));
        }

        let xml = tiff_reader.read_ascii(reader, ifd, tags::GDAL_METADATA)?;
        let sample = band.saturating_sub(1);

        let items = match xml_utils::parse_gdal_metadata(&xml) {
            Ok(items) => items,
            Err(e) => {
                warn!("Ignoring malformed GDAL_METADATA: {}", e);
                return Ok((1.0, 0.0));
            }
        };

        let lookup = |role: &str| {
            items.iter()
                .filter(|item| item.sample == Some(sample))
                .find(|item| item.role.as_deref() == Some(role) || item.name.eq_ignore_ascii_case(role))
                .and_then(|item| item.value.trim().parse::<f64>().ok())
        };

        Ok((lookup("scale").unwrap_or(1.0), lookup("offset").unwrap_or(0.0)))
    }
}
