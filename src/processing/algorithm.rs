//! Processing algorithm interface

use std::fmt;

use super::errors::ProcessingResult;
use super::feedback::Feedback;
use super::parameters::{ParameterDefinition, ParameterValues};

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Path of the written table
    pub output: String,
    pub rows_written: usize,
    /// Features left out under the skip policy
    pub skipped: usize,
    /// Features in the point layer
    pub features: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} features written to {}", self.rows_written, self.features, self.output)?;
        if self.skipped > 0 {
            write!(f, " ({} skipped)", self.skipped)?;
        }
        Ok(())
    }
}

/// An algorithm a provider exposes to the registry
pub trait Algorithm {
    /// Identifier, unique within the provider
    fn name(&self) -> &str;

    /// Name shown to users
    fn display_name(&self) -> &str;

    /// Group the algorithm is listed under
    fn group(&self) -> &str {
        ""
    }

    /// Declared parameters, in presentation order
    fn parameter_definitions(&self) -> Vec<ParameterDefinition>;

    /// Runs the algorithm
    ///
    /// # Arguments
    /// * `values` - Parameter values keyed by parameter name
    /// * `feedback` - Progress sink polled for cancellation
    fn run(&self, values: &ParameterValues, feedback: &mut dyn Feedback) -> ProcessingResult<RunReport>;
}
