//! Configuration file support

mod settings;

pub use self::settings::{ConfigError, ConfigResult, RunSettings};
