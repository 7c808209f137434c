//! Command pattern interfaces
//!
//! Each CLI operation is a `Command`; a `CommandFactory` picks the one the
//! parsed arguments ask for.

use crate::processing::ProcessingResult;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    ///
    /// # Returns
    /// Result indicating success or an error
    fn execute(&self) -> ProcessingResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory {
    /// Create a new Command instance based on CLI arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    ///
    /// # Returns
    /// A command that implements the Command trait, or an error
    fn create_command(&self, args: &clap::ArgMatches) -> ProcessingResult<Box<dyn Command>>;
}
