//! Per-point height statistics
//!
//! For each point of a layer, cuts a square window out of a DSM and writes
//! mean / max / min height per feature to a text table.

use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use log::{debug, error, info};

use crate::coordinate::SamplingWindow;
use crate::extractor::{RasterSample, WindowExtractor};
use crate::features::{FeatureSource, FeatureSourceFactory};
use crate::output::{ResultRow, TableWriter};
use crate::stats::aggregate;
use crate::tiff::{GeoTiffWriter, SampleType, WriteOptions};

use super::algorithm::{Algorithm, RunReport};
use super::errors::{ProcessingError, ProcessingResult};
use super::feedback::Feedback;
use super::parameters::{
    HeightStatsParameters, OnEmpty, ParameterDefinition, ParameterKind, ParameterValues, AXIS_MODE, BAND,
    DEFAULT_RADIUS, FEATURE_TIMEOUT, ID_FIELD, INPUT_DSM, INPUT_POINT, KEEP_WINDOWS, NODATA_POLICY, ON_EMPTY,
    OUTPUT_FILE, RADIUS,
};

pub const ALGORITHM_NAME: &str = "heightstats";
pub const ALGORITHM_DISPLAY_NAME: &str = "UAV Preparer for Processing";
pub const SUCCESS_MESSAGE: &str = "UAV Preparer. Operation successful!";

/// The height statistics algorithm
#[derive(Debug, Clone, Copy, Default)]
pub struct HeightStatsAlgorithm;

impl HeightStatsAlgorithm {
    pub fn new() -> Self {
        HeightStatsAlgorithm
    }

    /// Runs the algorithm on typed parameters
    ///
    /// Everything that can be checked up front is checked before the first
    /// window is read. On cancellation the rows computed so far are written.
    pub fn execute(&self, params: &HeightStatsParameters, feedback: &mut dyn Feedback) -> ProcessingResult<RunReport> {
        params.validate()?;
        info!("Height statistics: dsm={}, points={}, id={}, radius={}",
              params.dsm, params.points, params.id_field, params.radius);

        let extractor = WindowExtractor::open(&params.dsm, params.band)?;
        let source = FeatureSourceFactory::open(&params.points)
            .map_err(|e| ProcessingError::Input(format!("Cannot read point layer {}: {}", params.points, e)))?;
        info!("Point layer: {}", source.describe());

        check_id_field(source.as_ref(), &params.id_field)?;

        let total = source.feature_count();
        if total == 0 {
            return Err(ProcessingError::Input(format!("Point layer {} has no features", params.points)));
        }

        let dump = match &params.keep_windows {
            Some(dir) if !Path::new(dir).is_dir() => {
                return Err(ProcessingError::Input(format!("Window directory {} does not exist", dir)));
            }
            Some(dir) => Some(WindowDump::new(dir)),
            None => None,
        };

        let mut rows = Vec::with_capacity(total);
        let mut skipped = 0;
        let mut last_progress = None;

        for (index, feature) in source.features(&params.id_field).enumerate() {
            if feedback.is_canceled() {
                info!("Cancelled after {} of {} features", rows.len(), total);
                write_table(&rows, &params.output)?;
                return Err(ProcessingError::Cancelled { rows_written: rows.len() });
            }

            let percent = (index * 100 / total) as u32;
            if last_progress < Some(percent) {
                feedback.set_progress(percent);
                last_progress = Some(percent);
            }

            let feature = feature?;
            let location = feature.sample_location(params.axis_mode);
            let window = SamplingWindow::around(&location, params.radius);
            debug!("Feature {} (id {}): window {}", index, feature.id, window);

            let result = self.sample_feature(&extractor, &window, params, feature.id)
                .and_then(|sample| {
                    if let Some(dump) = &dump {
                        dump.write(index, feature.id, &sample)?;
                    }
                    aggregate(&sample, params.nodata_policy).map_err(|e| ProcessingError::EmptySample {
                        feature_id: feature.id,
                        reason: e.to_string(),
                    })
                });

            match result {
                Ok(stats) => rows.push(ResultRow::new(feature.id, &stats)),
                Err(e) if e.is_empty_window() && params.on_empty == OnEmpty::Skip => {
                    feedback.push_warning(&format!("Skipping feature {}: {}", feature.id, e));
                    skipped += 1;
                }
                Err(e) => {
                    error!("Feature {} failed: {}", feature.id, e);
                    return Err(e);
                }
            }
        }

        feedback.set_progress(100);
        write_table(&rows, &params.output)?;
        feedback.push_info(SUCCESS_MESSAGE);

        let report = RunReport {
            output: params.output.clone(),
            rows_written: rows.len(),
            skipped,
            features: total,
        };
        info!("{}", report);
        Ok(report)
    }

    fn sample_feature(
        &self,
        extractor: &WindowExtractor,
        window: &SamplingWindow,
        params: &HeightStatsParameters,
        feature_id: i64,
    ) -> ProcessingResult<RasterSample> {
        let deadline = params.feature_timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        let sample = extractor.extract(window, deadline)?;
        debug!("Feature {}: {}x{} cells", feature_id, sample.width, sample.height);
        Ok(sample)
    }
}

impl Algorithm for HeightStatsAlgorithm {
    fn name(&self) -> &str {
        ALGORITHM_NAME
    }

    fn display_name(&self) -> &str {
        ALGORITHM_DISPLAY_NAME
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::required(INPUT_DSM, "Input DSM", ParameterKind::RasterLayer),
            ParameterDefinition::required(INPUT_POINT, "Input point layer", ParameterKind::PointLayer),
            ParameterDefinition::required(ID_FIELD, "ID field", ParameterKind::NumericField { parent: INPUT_POINT }),
            ParameterDefinition::with_default(RADIUS, "Radius", ParameterKind::Number, &DEFAULT_RADIUS.to_string()),
            ParameterDefinition::required(OUTPUT_FILE, "Output file", ParameterKind::FileDestination),
            ParameterDefinition::with_default(BAND, "Raster band", ParameterKind::Integer, "1"),
            ParameterDefinition::with_default(NODATA_POLICY, "No-data handling", ParameterKind::Choice(&["mask", "include"]), "mask"),
            ParameterDefinition::with_default(AXIS_MODE, "Sampling axes", ParameterKind::Choice(&["corrected", "legacy"]), "corrected"),
            ParameterDefinition::with_default(ON_EMPTY, "Empty window handling", ParameterKind::Choice(&["fail", "skip"]), "fail"),
            ParameterDefinition::optional(FEATURE_TIMEOUT, "Per-feature timeout (seconds)", ParameterKind::Number),
            ParameterDefinition::optional(KEEP_WINDOWS, "Directory for sampled windows", ParameterKind::Folder),
        ]
    }

    fn run(&self, values: &ParameterValues, feedback: &mut dyn Feedback) -> ProcessingResult<RunReport> {
        let params = HeightStatsParameters::from_values(values)?;
        self.execute(&params, feedback)
    }
}

fn check_id_field(source: &dyn FeatureSource, id_field: &str) -> ProcessingResult<()> {
    if !source.field_names().iter().any(|name| name == id_field) {
        return Err(ProcessingError::Input(format!(
            "ID field '{}' not found, available fields: {}", id_field, source.field_names().join(", ")
        )));
    }
    if !source.field_is_numeric(id_field) {
        return Err(ProcessingError::Input(format!("ID field '{}' is not numeric", id_field)));
    }
    Ok(())
}

fn write_table(rows: &[ResultRow], path: &str) -> ProcessingResult<()> {
    TableWriter::write(rows, path).map_err(|source| ProcessingError::Write { path: path.to_string(), source })
}

/// Writes every sampled window as a GeoTIFF under a directory
struct WindowDump {
    dir: String,
    /// Distinguishes runs sharing a directory
    run_tag: String,
    writer: GeoTiffWriter,
}

impl WindowDump {
    fn new(dir: &str) -> Self {
        let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
        WindowDump {
            dir: dir.to_string(),
            run_tag: format!("{}_{}", std::process::id(), millis),
            writer: GeoTiffWriter::new(WriteOptions { sample_type: SampleType::F64, ..WriteOptions::default() }),
        }
    }

    fn path_for(&self, index: usize, feature_id: i64) -> String {
        Path::new(&self.dir)
            .join(format!("window_{}_{:06}_{}.tif", self.run_tag, index, feature_id))
            .to_string_lossy()
            .into_owned()
    }

    fn write(&self, index: usize, feature_id: i64, sample: &RasterSample) -> ProcessingResult<()> {
        let path = self.path_for(index, feature_id);
        debug!("Writing window of feature {} to {}", feature_id, path);
        self.writer.write_sample(sample, &path)?;
        Ok(())
    }
}
