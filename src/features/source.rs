//! Point layer source definitions
//!
//! Layer formats implement `FeatureSource`; the factory picks one from the
//! file extension.

use log::{debug, error, info};
use std::path::Path;

use super::csv::CsvSource;
use super::errors::{FeatureError, FeatureResult};
use super::geojson::GeoJsonSource;
use super::point_feature::PointFeature;

/// Boxed, restartable iteration over a layer's features
pub type FeatureIter<'a> = Box<dyn Iterator<Item = FeatureResult<PointFeature>> + 'a>;

/// A readable point layer
pub trait FeatureSource {
    /// Attribute names, in the order they first appear
    fn field_names(&self) -> Vec<String>;

    /// Whether every non-null value of the field is numeric
    fn field_is_numeric(&self, name: &str) -> bool;

    fn feature_count(&self) -> usize;

    /// Iterates the features from the first one, reading IDs from `id_field`
    ///
    /// Each call starts over. Centroids are computed as features are pulled.
    fn features<'a>(&'a self, id_field: &str) -> FeatureIter<'a>;

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

/// Factory for creating feature sources
pub struct FeatureSourceFactory;

impl FeatureSourceFactory {
    /// Open a point layer with the source matching its extension
    pub fn open(file_path: &str) -> FeatureResult<Box<dyn FeatureSource>> {
        let extension = file_extension(file_path);
        debug!("Determining feature source for extension: {}", extension);

        let source: Box<dyn FeatureSource> = match extension.as_str() {
            "geojson" | "json" => Box::new(GeoJsonSource::open(file_path)?),
            "csv" | "txt" | "tsv" => Box::new(CsvSource::open(file_path)?),
            _ => {
                error!("Unsupported point layer format: {}", extension);
                return Err(FeatureError::UnsupportedFormat(extension));
            }
        };

        info!("Opened point layer: {}", source.describe());
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            FeatureSourceFactory::open("points.shp"),
            Err(FeatureError::UnsupportedFormat(ext)) if ext == "shp"
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            FeatureSourceFactory::open("/nonexistent/points.geojson"),
            Err(FeatureError::IoError(_))
        ));
    }
}
