//! Point features as the processing loop sees them

use std::fmt;
use std::str::FromStr;

use crate::coordinate::Point;

use super::errors::{FeatureError, FeatureResult};

/// One input feature: its identifier and centroid in raster CRS units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointFeature {
    pub id: i64,
    pub centroid: Point,
}

impl PointFeature {
    pub fn new(id: i64, centroid: Point) -> Self {
        PointFeature { id, centroid }
    }

    /// The location the window is centred on under `mode`
    pub fn sample_location(&self, mode: AxisMode) -> Point {
        mode.apply(&self.centroid)
    }
}

/// How the sampling location is taken from the centroid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisMode {
    /// `(x, y)`
    #[default]
    Corrected,
    /// `(y, y)`, reproduces outputs of the historical duplicated-axis lookup
    Legacy,
}

impl AxisMode {
    pub fn apply(&self, centroid: &Point) -> Point {
        match self {
            AxisMode::Corrected => *centroid,
            AxisMode::Legacy => Point::new(centroid.y, centroid.y),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AxisMode::Corrected => "corrected",
            AxisMode::Legacy => "legacy",
        }
    }
}

impl FromStr for AxisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "corrected" => Ok(AxisMode::Corrected),
            "legacy" => Ok(AxisMode::Legacy),
            other => Err(format!("Unknown axis mode '{}', expected corrected or legacy", other)),
        }
    }
}

impl fmt::Display for AxisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts a numeric attribute to an integer ID, truncating toward zero
pub(crate) fn id_from_number(feature: usize, value: f64) -> FeatureResult<i64> {
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(FeatureError::InvalidId {
            feature,
            reason: format!("{} is not representable as an integer", value),
        });
    }

    Ok(truncated as i64)
}
