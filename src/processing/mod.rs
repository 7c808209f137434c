//! Processing framework
//!
//! Algorithms, their parameters, progress feedback and the registry a host
//! resolves algorithms through.

mod algorithm;
mod errors;
mod feedback;
mod height_stats;
mod parameters;
mod registry;

pub use self::algorithm::{Algorithm, RunReport};
pub use self::errors::{ErrorKind, ProcessingError, ProcessingResult};
pub use self::feedback::{CancellationToken, Feedback, ProgressFeedback, RecordingFeedback};
pub use self::height_stats::{HeightStatsAlgorithm, ALGORITHM_DISPLAY_NAME, ALGORITHM_NAME, SUCCESS_MESSAGE};
pub use self::parameters::{
    HeightStatsParameters, OnEmpty, ParameterDefinition, ParameterKind, ParameterValues, AXIS_MODE, BAND,
    DEFAULT_RADIUS, FEATURE_TIMEOUT, ID_FIELD, INPUT_DSM, INPUT_POINT, KEEP_WINDOWS, NODATA_POLICY, ON_EMPTY,
    OUTPUT_FILE, RADIUS,
};
pub use self::registry::{AlgorithmProvider, ProcessingRegistry, UavPreparerPlugin, UavPreparerProvider, PROVIDER_ID, PROVIDER_NAME};
