//! Run settings
//!
//! Optional settings shared by the command line and the TOML config file.
//! Values left unset fall through to the next layer: defaults, then the
//! config file, then command-line flags.

use std::fmt;
use std::fs;
use std::io;
use std::str::FromStr;
use std::time::Duration;

use log::debug;

use crate::features::AxisMode;
use crate::processing::{HeightStatsParameters, OnEmpty};
use crate::stats::NodataPolicy;

/// Errors raised while loading a config file
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    Io { path: String, source: io::Error },
    /// The file is not valid TOML
    Parse(String),
    /// A key holds a value of the wrong type or out of range
    InvalidValue { key: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "Cannot read config file {}: {}", path, source),
            ConfigError::Parse(msg) => write!(f, "Failed to parse TOML: {}", msg),
            ConfigError::InvalidValue { key, reason } => write!(f, "Invalid value for {}: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Optional run settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSettings {
    pub radius: Option<f64>,
    pub band: Option<u32>,
    pub nodata: Option<NodataPolicy>,
    pub axis: Option<AxisMode>,
    pub on_empty: Option<OnEmpty>,
    pub feature_timeout_secs: Option<f64>,
    pub keep_windows: Option<String>,
    pub log_file: Option<String>,
    pub verbose: Option<bool>,
}

impl RunSettings {
    /// Reads settings from a TOML file
    pub fn load(path: &str) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_string(), source })?;
        debug!("Loaded config file {}", path);
        Self::from_toml(&content)
    }

    /// Parses settings from TOML text
    ///
    /// Recognised keys live in the `[run]` and `[log]` tables; anything else
    /// is ignored.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;

        let mut settings = RunSettings::default();

        if let Some(run) = toml_value.get("run").and_then(|v| v.as_table()) {
            settings.radius = get_float(run, "run.radius", "radius")?;
            settings.band = get_integer(run, "run.band", "band")?
                .map(|band| u32::try_from(band).map_err(|_| invalid("run.band", "must be a positive integer")))
                .transpose()?;
            settings.nodata = get_parsed(run, "run.nodata", "nodata")?;
            settings.axis = get_parsed(run, "run.axis", "axis")?;
            settings.on_empty = get_parsed(run, "run.on_empty", "on_empty")?;
            settings.feature_timeout_secs = get_float(run, "run.feature_timeout_secs", "feature_timeout_secs")?;
            settings.keep_windows = get_string(run, "run.keep_windows", "keep_windows")?;
        }

        if let Some(log) = toml_value.get("log").and_then(|v| v.as_table()) {
            settings.log_file = get_string(log, "log.file", "file")?;
            settings.verbose = match log.get("verbose") {
                None => None,
                Some(value) => Some(value.as_bool().ok_or_else(|| invalid("log.verbose", "expected a boolean"))?),
            };
        }

        Ok(settings)
    }

    /// Layers `overrides` on top of these settings
    pub fn merged_with(self, overrides: RunSettings) -> RunSettings {
        RunSettings {
            radius: overrides.radius.or(self.radius),
            band: overrides.band.or(self.band),
            nodata: overrides.nodata.or(self.nodata),
            axis: overrides.axis.or(self.axis),
            on_empty: overrides.on_empty.or(self.on_empty),
            feature_timeout_secs: overrides.feature_timeout_secs.or(self.feature_timeout_secs),
            keep_windows: overrides.keep_windows.or(self.keep_windows),
            log_file: overrides.log_file.or(self.log_file),
            verbose: overrides.verbose.or(self.verbose),
        }
    }

    /// Copies the set values into algorithm parameters
    pub fn apply_to(&self, params: &mut HeightStatsParameters) -> ConfigResult<()> {
        if let Some(radius) = self.radius {
            params.radius = radius;
        }
        if let Some(band) = self.band {
            params.band = band;
        }
        if let Some(nodata) = self.nodata {
            params.nodata_policy = nodata;
        }
        if let Some(axis) = self.axis {
            params.axis_mode = axis;
        }
        if let Some(on_empty) = self.on_empty {
            params.on_empty = on_empty;
        }
        if let Some(secs) = self.feature_timeout_secs {
            let timeout = Duration::try_from_secs_f64(secs)
                .map_err(|_| invalid("feature_timeout_secs", "must be a non-negative number of seconds"))?;
            params.feature_timeout = Some(timeout);
        }
        if let Some(dir) = &self.keep_windows {
            params.keep_windows = Some(dir.clone());
        }
        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue { key: key.to_string(), reason: reason.to_string() }
}

fn get_float(table: &toml::Table, key: &str, name: &str) -> ConfigResult<Option<f64>> {
    match table.get(name) {
        None => Ok(None),
        Some(toml::Value::Float(value)) => Ok(Some(*value)),
        Some(toml::Value::Integer(value)) => Ok(Some(*value as f64)),
        Some(_) => Err(invalid(key, "expected a number")),
    }
}

fn get_integer(table: &toml::Table, key: &str, name: &str) -> ConfigResult<Option<i64>> {
    match table.get(name) {
        None => Ok(None),
        Some(value) => value.as_integer().map(Some).ok_or_else(|| invalid(key, "expected an integer")),
    }
}

fn get_string(table: &toml::Table, key: &str, name: &str) -> ConfigResult<Option<String>> {
    match table.get(name) {
        None => Ok(None),
        Some(value) => value.as_str().map(|s| Some(s.to_string())).ok_or_else(|| invalid(key, "expected a string")),
    }
}

fn get_parsed<T>(table: &toml::Table, key: &str, name: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match get_string(table, key, name)? {
        None => Ok(None),
        Some(text) => text.parse().map(Some).map_err(|e: T::Err| invalid(key, &e.to_string())),
    }
}
