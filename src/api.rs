//! Library facade
//!
//! `UavPreparer` bundles a registry with the UAV Preparer provider for
//! callers that do not need the command line.

use log::info;

use crate::extractor::WindowExtractor;
use crate::processing::{
    Feedback, HeightStatsAlgorithm, HeightStatsParameters, ParameterValues, ProcessingError, ProcessingRegistry,
    ProcessingResult, RecordingFeedback, RunReport, UavPreparerPlugin,
};

/// Main interface to the uavprep library
pub struct UavPreparer {
    registry: ProcessingRegistry,
}

impl UavPreparer {
    /// Creates a facade with the UAV Preparer provider registered
    pub fn new() -> ProcessingResult<Self> {
        let mut registry = ProcessingRegistry::new();
        UavPreparerPlugin::register(&mut registry)?;
        Ok(UavPreparer { registry })
    }

    pub fn registry(&self) -> &ProcessingRegistry {
        &self.registry
    }

    /// Runs a registered algorithm by id
    ///
    /// # Arguments
    /// * `algorithm_id` - `provider:algorithm` id, e.g. `uavpreparer:heightstats`
    /// * `values` - Parameter values keyed by parameter name
    /// * `feedback` - Progress sink polled for cancellation
    pub fn run(
        &self,
        algorithm_id: &str,
        values: &ParameterValues,
        feedback: &mut dyn Feedback,
    ) -> ProcessingResult<RunReport> {
        let algorithm = self.registry.algorithm(algorithm_id)
            .ok_or_else(|| ProcessingError::Input(format!("Unknown algorithm '{}'", algorithm_id)))?;
        info!("Running {}", algorithm.display_name());
        algorithm.run(values, feedback)
    }

    /// Computes height statistics with default settings
    ///
    /// # Arguments
    /// * `dsm` - DSM GeoTIFF
    /// * `points` - Point layer
    /// * `id_field` - Numeric id attribute
    /// * `radius` - Window half-width in raster CRS units
    /// * `output` - Table to write
    pub fn height_stats(
        &self,
        dsm: &str,
        points: &str,
        id_field: &str,
        radius: f64,
        output: &str,
    ) -> ProcessingResult<RunReport> {
        let mut params = HeightStatsParameters::new(dsm, points, id_field, output);
        params.radius = radius;
        self.height_stats_with(&params, &mut RecordingFeedback::new())
    }

    /// Computes height statistics with explicit parameters and feedback
    pub fn height_stats_with(
        &self,
        params: &HeightStatsParameters,
        feedback: &mut dyn Feedback,
    ) -> ProcessingResult<RunReport> {
        HeightStatsAlgorithm::new().execute(params, feedback)
    }

    /// One-line description of a raster band
    pub fn describe_raster(&self, path: &str, band: u32) -> ProcessingResult<String> {
        Ok(WindowExtractor::open(path, band)?.describe())
    }
}
