//! Height statistics run command
//!
//! Builds the algorithm parameters from the command line, layered over an
//! optional config file, and runs the algorithm through the registry.

use clap::ArgMatches;
use log::{debug, info};

use crate::commands::command_traits::Command;
use crate::config::RunSettings;
use crate::features::AxisMode;
use crate::processing::{
    CancellationToken, HeightStatsParameters, OnEmpty, ProcessingError, ProcessingRegistry, ProcessingResult,
    ProgressFeedback, UavPreparerPlugin, ALGORITHM_NAME, PROVIDER_ID,
};
use crate::stats::NodataPolicy;

/// Reads the optional settings flags, without the required inputs
///
/// Config file values come first, flags given on the command line win.
pub fn settings_from_args(args: &ArgMatches) -> ProcessingResult<RunSettings> {
    let file_settings = match args.get_one::<String>("config") {
        Some(path) => RunSettings::load(path).map_err(|e| ProcessingError::Input(e.to_string()))?,
        None => RunSettings::default(),
    };

    let parse_choice = |name: &str| args.get_one::<String>(name).map(String::as_str);

    let cli_settings = RunSettings {
        radius: args.get_one::<f64>("radius").copied(),
        band: args.get_one::<u32>("band").copied(),
        nodata: parse_choice("nodata").map(str::parse::<NodataPolicy>).transpose().map_err(ProcessingError::Input)?,
        axis: parse_choice("axis").map(str::parse::<AxisMode>).transpose().map_err(ProcessingError::Input)?,
        on_empty: parse_choice("on-empty").map(str::parse::<OnEmpty>).transpose().map_err(ProcessingError::Input)?,
        feature_timeout_secs: args.get_one::<f64>("feature-timeout").copied(),
        keep_windows: args.get_one::<String>("keep-windows").cloned(),
        log_file: args.get_one::<String>("log-file").cloned(),
        verbose: if args.get_flag("verbose") { Some(true) } else { None },
    };

    Ok(file_settings.merged_with(cli_settings))
}

/// Command running the height statistics algorithm
pub struct RunCommand {
    params: HeightStatsParameters,
    token: CancellationToken,
}

impl RunCommand {
    /// Create a new run command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `settings` - Merged config file and flag settings
    /// * `token` - Cancellation flag polled once per feature
    pub fn new(args: &ArgMatches, settings: &RunSettings, token: CancellationToken) -> ProcessingResult<Self> {
        let required = |name: &str| {
            args.get_one::<String>(name)
                .map(String::as_str)
                .ok_or_else(|| ProcessingError::Input(format!("Missing required argument --{}", name)))
        };

        let mut params = HeightStatsParameters::new(
            required("dsm")?,
            required("points")?,
            required("id-field")?,
            required("output")?,
        );
        settings.apply_to(&mut params).map_err(|e| ProcessingError::Input(e.to_string()))?;
        debug!("Run parameters: {:?}", params);

        Ok(RunCommand { params, token })
    }

    pub fn parameters(&self) -> &HeightStatsParameters {
        &self.params
    }
}

impl Command for RunCommand {
    fn execute(&self) -> ProcessingResult<()> {
        let mut registry = ProcessingRegistry::new();
        UavPreparerPlugin::register(&mut registry)?;

        let id = format!("{}:{}", PROVIDER_ID, ALGORITHM_NAME);
        let algorithm = registry.algorithm(&id)
            .ok_or_else(|| ProcessingError::Input(format!("Algorithm {} is not registered", id)))?;

        let mut feedback = ProgressFeedback::new(algorithm.display_name(), self.token.clone());
        match algorithm.run(&self.params.to_values(), &mut feedback) {
            Ok(report) => {
                feedback.finish();
                info!("{}", report);
                Ok(())
            }
            Err(e) => {
                feedback.abandon(&e.to_string());
                Err(e)
            }
        }
    }
}
