//! Algorithm parameters
//!
//! Parameters travel as a name → text map, the way a processing host passes
//! them, and are parsed into `HeightStatsParameters` by the algorithm.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::features::AxisMode;
use crate::stats::NodataPolicy;

use super::errors::{ProcessingError, ProcessingResult};

pub const INPUT_DSM: &str = "INPUT_DSM";
pub const INPUT_POINT: &str = "INPUT_POINT";
pub const ID_FIELD: &str = "ID_FIELD";
pub const RADIUS: &str = "RADIUS";
pub const OUTPUT_FILE: &str = "OUTPUT_FILE";
pub const BAND: &str = "BAND";
pub const NODATA_POLICY: &str = "NODATA_POLICY";
pub const AXIS_MODE: &str = "AXIS_MODE";
pub const ON_EMPTY: &str = "ON_EMPTY";
pub const FEATURE_TIMEOUT: &str = "FEATURE_TIMEOUT";
pub const KEEP_WINDOWS: &str = "KEEP_WINDOWS";

pub const DEFAULT_RADIUS: f64 = 100.0;

/// Parameter values keyed by parameter name
pub type ParameterValues = BTreeMap<String, String>;

/// Kind of value a parameter takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    RasterLayer,
    PointLayer,
    /// A numeric field of the named layer parameter
    NumericField { parent: &'static str },
    Number,
    Integer,
    Choice(&'static [&'static str]),
    FileDestination,
    Folder,
}

/// Declaration of one algorithm parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParameterKind,
    pub default: Option<String>,
    pub optional: bool,
}

impl ParameterDefinition {
    pub fn required(name: &'static str, description: &'static str, kind: ParameterKind) -> Self {
        ParameterDefinition { name, description, kind, default: None, optional: false }
    }

    pub fn with_default(name: &'static str, description: &'static str, kind: ParameterKind, default: &str) -> Self {
        ParameterDefinition { name, description, kind, default: Some(default.to_string()), optional: true }
    }

    pub fn optional(name: &'static str, description: &'static str, kind: ParameterKind) -> Self {
        ParameterDefinition { name, description, kind, default: None, optional: true }
    }
}

/// What to do with a feature whose window holds no usable cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnEmpty {
    /// Abort the run
    #[default]
    Fail,
    /// Warn and leave the feature out of the table
    Skip,
}

impl OnEmpty {
    pub fn name(&self) -> &'static str {
        match self {
            OnEmpty::Fail => "fail",
            OnEmpty::Skip => "skip",
        }
    }
}

impl FromStr for OnEmpty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(OnEmpty::Fail),
            "skip" => Ok(OnEmpty::Skip),
            other => Err(format!("Unknown empty-window policy '{}', expected fail or skip", other)),
        }
    }
}

impl fmt::Display for OnEmpty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed parameters of the height statistics algorithm
#[derive(Debug, Clone, PartialEq)]
pub struct HeightStatsParameters {
    pub dsm: String,
    pub points: String,
    pub id_field: String,
    /// Half-width of the square window, in raster CRS units
    pub radius: f64,
    pub output: String,
    /// 1-based raster band
    pub band: u32,
    pub nodata_policy: NodataPolicy,
    pub axis_mode: AxisMode,
    pub on_empty: OnEmpty,
    /// Per-feature extraction deadline
    pub feature_timeout: Option<Duration>,
    /// Directory receiving a GeoTIFF of every sampled window
    pub keep_windows: Option<String>,
}

impl HeightStatsParameters {
    /// Parameters with defaults for everything but the required inputs
    pub fn new(dsm: &str, points: &str, id_field: &str, output: &str) -> Self {
        HeightStatsParameters {
            dsm: dsm.to_string(),
            points: points.to_string(),
            id_field: id_field.to_string(),
            radius: DEFAULT_RADIUS,
            output: output.to_string(),
            band: 1,
            nodata_policy: NodataPolicy::default(),
            axis_mode: AxisMode::default(),
            on_empty: OnEmpty::default(),
            feature_timeout: None,
            keep_windows: None,
        }
    }

    /// Parses a parameter map
    pub fn from_values(values: &ParameterValues) -> ProcessingResult<Self> {
        let required = |name: &str| {
            values.get(name)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ProcessingError::Input(format!("Missing required parameter {}", name)))
        };

        let mut params = Self::new(required(INPUT_DSM)?, required(INPUT_POINT)?, required(ID_FIELD)?, required(OUTPUT_FILE)?);

        if let Some(radius) = values.get(RADIUS) {
            params.radius = parse_value(RADIUS, radius)?;
        }
        if let Some(band) = values.get(BAND) {
            params.band = parse_value(BAND, band)?;
        }
        if let Some(policy) = values.get(NODATA_POLICY) {
            params.nodata_policy = parse_value(NODATA_POLICY, policy)?;
        }
        if let Some(mode) = values.get(AXIS_MODE) {
            params.axis_mode = parse_value(AXIS_MODE, mode)?;
        }
        if let Some(on_empty) = values.get(ON_EMPTY) {
            params.on_empty = parse_value(ON_EMPTY, on_empty)?;
        }
        if let Some(timeout) = values.get(FEATURE_TIMEOUT) {
            let secs: f64 = parse_value(FEATURE_TIMEOUT, timeout)?;
            params.feature_timeout = Some(Duration::try_from_secs_f64(secs).map_err(|_| {
                ProcessingError::Input(format!("{} must be a non-negative number of seconds, got {}", FEATURE_TIMEOUT, timeout))
            })?);
        }
        if let Some(dir) = values.get(KEEP_WINDOWS).filter(|dir| !dir.trim().is_empty()) {
            params.keep_windows = Some(dir.clone());
        }

        Ok(params)
    }

    /// The parameter map these parameters parse from
    pub fn to_values(&self) -> ParameterValues {
        let mut values = ParameterValues::new();
        values.insert(INPUT_DSM.to_string(), self.dsm.clone());
        values.insert(INPUT_POINT.to_string(), self.points.clone());
        values.insert(ID_FIELD.to_string(), self.id_field.clone());
        values.insert(RADIUS.to_string(), self.radius.to_string());
        values.insert(OUTPUT_FILE.to_string(), self.output.clone());
        values.insert(BAND.to_string(), self.band.to_string());
        values.insert(NODATA_POLICY.to_string(), self.nodata_policy.to_string());
        values.insert(AXIS_MODE.to_string(), self.axis_mode.to_string());
        values.insert(ON_EMPTY.to_string(), self.on_empty.to_string());
        if let Some(timeout) = self.feature_timeout {
            values.insert(FEATURE_TIMEOUT.to_string(), timeout.as_secs_f64().to_string());
        }
        if let Some(dir) = &self.keep_windows {
            values.insert(KEEP_WINDOWS.to_string(), dir.clone());
        }
        values
    }

    /// Checks the values that can be checked without touching files
    pub fn validate(&self) -> ProcessingResult<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ProcessingError::Input(format!("Radius must be a positive number, got {}", self.radius)));
        }
        if self.band == 0 {
            return Err(ProcessingError::Input("Band numbers start at 1".to_string()));
        }
        if let Some(timeout) = self.feature_timeout {
            if timeout == Duration::ZERO {
                return Err(ProcessingError::Input("Feature timeout must be positive".to_string()));
            }
            if Instant::now().checked_add(timeout).is_none() {
                return Err(ProcessingError::Input(format!("Feature timeout of {}s is too large", timeout.as_secs_f64())));
            }
        }
        Ok(())
    }
}

fn parse_value<T>(name: &str, text: &str) -> ProcessingResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text.trim().parse::<T>()
        .map_err(|e| ProcessingError::Input(format!("Invalid value '{}' for {}: {}", text, name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_values() -> ParameterValues {
        let mut values = ParameterValues::new();
        values.insert(INPUT_DSM.to_string(), "dsm.tif".to_string());
        values.insert(INPUT_POINT.to_string(), "points.geojson".to_string());
        values.insert(ID_FIELD.to_string(), "fid".to_string());
        values.insert(OUTPUT_FILE.to_string(), "out.txt".to_string());
        values
    }

    #[test]
    fn defaults_apply() {
        let params = HeightStatsParameters::from_values(&base_values()).unwrap();
        assert_eq!(params.radius, 100.0);
        assert_eq!(params.band, 1);
        assert_eq!(params.nodata_policy, NodataPolicy::Mask);
        assert_eq!(params.axis_mode, AxisMode::Corrected);
        assert_eq!(params.on_empty, OnEmpty::Fail);
        assert!(params.feature_timeout.is_none());
    }

    #[test]
    fn parses_optional_values() {
        let mut values = base_values();
        values.insert(RADIUS.to_string(), "2.5".to_string());
        values.insert(AXIS_MODE.to_string(), "legacy".to_string());
        values.insert(ON_EMPTY.to_string(), "skip".to_string());
        values.insert(FEATURE_TIMEOUT.to_string(), "1.5".to_string());

        let params = HeightStatsParameters::from_values(&values).unwrap();
        assert_eq!(params.radius, 2.5);
        assert_eq!(params.axis_mode, AxisMode::Legacy);
        assert_eq!(params.on_empty, OnEmpty::Skip);
        assert_eq!(params.feature_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn values_round_trip() {
        let mut params = HeightStatsParameters::new("a.tif", "b.csv", "id", "c.txt");
        params.keep_windows = Some("windows".to_string());
        assert_eq!(HeightStatsParameters::from_values(&params.to_values()).unwrap(), params);
    }

    #[test]
    fn missing_and_invalid_values_are_input_errors() {
        let mut values = base_values();
        values.remove(ID_FIELD);
        assert!(matches!(HeightStatsParameters::from_values(&values), Err(ProcessingError::Input(_))));

        let mut values = base_values();
        values.insert(RADIUS.to_string(), "wide".to_string());
        assert!(matches!(HeightStatsParameters::from_values(&values), Err(ProcessingError::Input(_))));
    }

    #[test]
    fn radius_must_be_positive() {
        let mut params = HeightStatsParameters::new("a.tif", "b.csv", "id", "c.txt");
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            params.radius = radius;
            assert!(params.validate().is_err());
        }
    }

    #[test]
    fn unrepresentable_timeouts_are_input_errors() {
        let mut params = HeightStatsParameters::new("a.tif", "b.csv", "id", "c.txt");
        params.feature_timeout = Some(Duration::from_secs(u64::MAX));
        assert!(matches!(params.validate(), Err(ProcessingError::Input(_))));

        let mut values = base_values();
        values.insert(FEATURE_TIMEOUT.to_string(), "1e19".to_string());
        let parsed = HeightStatsParameters::from_values(&values).unwrap();
        assert!(matches!(parsed.validate(), Err(ProcessingError::Input(_))));

        params.feature_timeout = Some(Duration::from_secs(30));
        assert!(params.validate().is_ok());
    }
}
