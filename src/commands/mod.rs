//! CLI command implementations
//!
//! This module contains implementations of the commands supported by the
//! CLI application using the Command pattern.

pub mod cli;
pub mod command_traits;
pub mod list_command;
pub mod run_command;

pub use cli::build_cli;
pub use command_traits::{Command, CommandFactory};
pub use list_command::ListAlgorithmsCommand;
pub use run_command::{settings_from_args, RunCommand};

use clap::ArgMatches;

use crate::config::RunSettings;
use crate::processing::{CancellationToken, ProcessingResult};

/// Factory for creating command instances based on CLI arguments
pub struct UavPrepCommandFactory {
    settings: RunSettings,
    token: CancellationToken,
}

impl UavPrepCommandFactory {
    /// Create a new factory instance
    ///
    /// # Arguments
    /// * `settings` - Merged config file and flag settings
    /// * `token` - Cancellation flag handed to run commands
    pub fn new(settings: RunSettings, token: CancellationToken) -> Self {
        UavPrepCommandFactory { settings, token }
    }
}

impl CommandFactory for UavPrepCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> ProcessingResult<Box<dyn Command>> {
        if args.get_flag("list-algorithms") {
            Ok(Box::new(ListAlgorithmsCommand::new()))
        } else {
            Ok(Box::new(RunCommand::new(args, &self.settings, self.token.clone())?))
        }
    }
}
