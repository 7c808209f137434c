//! Point layers
//!
//! Reading vector layers as `(id, centroid)` features for the sampling loop.

mod csv;
mod errors;
mod geojson;
mod geometry;
mod point_feature;
mod source;

pub use self::csv::CsvSource;
pub use self::errors::{FeatureError, FeatureResult};
pub use self::geojson::GeoJsonSource;
pub use self::geometry::{Geometry, Ring};
pub use self::point_feature::{AxisMode, PointFeature};
pub use self::source::{FeatureIter, FeatureSource, FeatureSourceFactory};
