//! End-to-end tests of the height statistics run
//!
//! Fixtures are written with the crate's own GeoTIFF writer into temporary
//! directories.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use uavprep::commands::{build_cli, settings_from_args, RunCommand};
use uavprep::features::AxisMode;
use uavprep::processing::{
    CancellationToken, ErrorKind, HeightStatsParameters, OnEmpty, ParameterValues, ProcessingError,
    RecordingFeedback, ID_FIELD, INPUT_DSM, INPUT_POINT, OUTPUT_FILE, RADIUS, SUCCESS_MESSAGE,
};
use uavprep::stats::NodataPolicy;
use uavprep::tiff::constants::predictor;
use uavprep::tiff::{SampleType, TiffError};
use uavprep::{GeoTiffWriter, GeoTransform, SamplingWindow, UavPreparer, WindowExtractor, WriteOptions};

/// 1 unit cells, upper-left corner at (0, size)
fn unit_grid(size: u32) -> GeoTransform {
    GeoTransform::new([0.0, 1.0, 0.0, size as f64, 0.0, -1.0])
}

/// Cell value `row * 10 + col`
fn ramp(size: u32) -> Vec<f64> {
    (0..size * size).map(|i| ((i / size) * 10 + i % size) as f64).collect()
}

fn write_raster(dir: &TempDir, name: &str, size: u32, values: Vec<f64>, options: WriteOptions) -> String {
    let path = dir.path().join(name).to_string_lossy().into_owned();
    GeoTiffWriter::new(options)
        .write_bands(&path, size, size, &[values], &unit_grid(size))
        .unwrap();
    path
}

fn write_points(dir: &TempDir, points: &[(i64, f64, f64)]) -> String {
    let features: Vec<String> = points.iter()
        .map(|(id, x, y)| format!(
            r#"{{"type":"Feature","properties":{{"fid":{},"name":"p{}"}},"geometry":{{"type":"Point","coordinates":[{},{}]}}}}"#,
            id, id, x, y
        ))
        .collect();
    let path = dir.path().join("points.geojson");
    fs::write(&path, format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))).unwrap();
    path.to_string_lossy().into_owned()
}

fn output_path(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

fn run(params: &HeightStatsParameters) -> Result<(String, RecordingFeedback), ProcessingError> {
    let mut feedback = RecordingFeedback::new();
    UavPreparer::new()?.height_stats_with(params, &mut feedback)?;
    Ok((fs::read_to_string(&params.output).unwrap(), feedback))
}

#[test]
fn constant_raster_gives_constant_rows_in_feature_order() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, vec![10.0; 100], WriteOptions::default());
    let points = write_points(&dir, &[(3, 5.0, 5.0), (1, 3.0, 7.0), (2, 7.0, 3.0)]);
    let output = output_path(&dir, "out.txt");

    let mut params = HeightStatsParameters::new(&dsm, &points, "fid", &output);
    params.radius = 2.0;
    let (table, feedback) = run(&params).unwrap();

    assert_eq!(table, "# ID MEAN MAX MIN\n3 10.00 10.00 10.00\n1 10.00 10.00 10.00\n2 10.00 10.00 10.00\n");
    assert_eq!(feedback.messages, vec![SUCCESS_MESSAGE.to_string()]);
}

#[test]
fn two_by_two_window_statistics() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(7, 5.0, 5.0)]);
    let output = output_path(&dir, "out.txt");

    let mut params = HeightStatsParameters::new(&dsm, &points, "fid", &output);
    params.radius = 1.0;
    let (table, _) = run(&params).unwrap();

    // cells 44, 45, 54, 55
    assert_eq!(table, "# ID MEAN MAX MIN\n7 49.50 55.00 44.00\n");
}

#[test]
fn progress_is_monotonic_and_completes() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(1, 2.0, 2.0), (2, 4.0, 4.0), (3, 6.0, 6.0)]);
    let output = output_path(&dir, "out.txt");

    let mut params = HeightStatsParameters::new(&dsm, &points, "fid", &output);
    params.radius = 1.0;
    let (_, feedback) = run(&params).unwrap();

    assert_eq!(feedback.progress, vec![0, 33, 66, 100]);
    assert!(feedback.progress.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn empty_point_layer_is_an_input_error() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[]);
    let output = output_path(&dir, "out.txt");

    let params = HeightStatsParameters::new(&dsm, &points, "fid", &output);
    let err = run(&params).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(!Path::new(&output).exists());
}

#[test]
fn id_field_must_exist_and_be_numeric() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(1, 5.0, 5.0)]);
    let output = output_path(&dir, "out.txt");

    for field in ["missing", "name"] {
        let params = HeightStatsParameters::new(&dsm, &points, field, &output);
        assert_eq!(run(&params).unwrap_err().kind(), ErrorKind::Input);
    }
}

#[test]
fn invalid_radius_fails_before_reading() {
    let params = HeightStatsParameters {
        radius: -1.0,
        ..HeightStatsParameters::new("missing.tif", "missing.geojson", "fid", "out.txt")
    };
    assert!(matches!(run(&params), Err(ProcessingError::Input(_))));
}

#[test]
fn window_outside_raster_aborts_without_output() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(1, 5.0, 5.0), (2, 500.0, 500.0)]);
    let output = output_path(&dir, "out.txt");

    let mut params = HeightStatsParameters::new(&dsm, &points, "fid", &output);
    params.radius = 1.0;
    let err = run(&params).unwrap_err();

    assert!(matches!(err, ProcessingError::Raster(TiffError::WindowOutsideRaster(_))));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!Path::new(&output).exists());
}

#[test]
fn skip_policy_leaves_out_empty_windows() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(1, 500.0, 500.0), (2, 5.0, 5.0)]);
    let output = output_path(&dir, "out.txt");

    let mut params = HeightStatsParameters::new(&dsm, &points, "fid", &output);
    params.radius = 1.0;
    params.on_empty = OnEmpty::Skip;

    let mut feedback = RecordingFeedback::new();
    let report = UavPreparer::new().unwrap().height_stats_with(&params, &mut feedback).unwrap();

    assert_eq!((report.rows_written, report.skipped, report.features), (1, 1, 2));
    assert_eq!(feedback.warnings.len(), 1);
    assert_eq!(fs::read_to_string(&output).unwrap(), "# ID MEAN MAX MIN\n2 49.50 55.00 44.00\n");
}

#[test]
fn repeated_runs_are_identical() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(1, 2.5, 2.5), (2, 6.0, 4.0)]);

    let first = HeightStatsParameters { radius: 1.5, ..HeightStatsParameters::new(&dsm, &points, "fid", &output_path(&dir, "a.txt")) };
    let second = HeightStatsParameters { output: output_path(&dir, "b.txt"), ..first.clone() };

    assert_eq!(run(&first).unwrap().0, run(&second).unwrap().0);
}

#[test]
fn cancellation_writes_rows_computed_so_far() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, vec![1.0; 100], WriteOptions::default());
    let points = write_points(&dir, &[(1, 2.0, 2.0), (2, 3.0, 3.0), (3, 4.0, 4.0), (4, 5.0, 5.0), (5, 6.0, 6.0)]);
    let output = output_path(&dir, "out.txt");

    let mut params = HeightStatsParameters::new(&dsm, &points, "fid", &output);
    params.radius = 1.0;

    let mut feedback = RecordingFeedback::cancel_after(2);
    let err = UavPreparer::new().unwrap().height_stats_with(&params, &mut feedback).unwrap_err();

    assert!(matches!(err, ProcessingError::Cancelled { rows_written: 2 }));
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(fs::read_to_string(&output).unwrap(), "# ID MEAN MAX MIN\n1 1.00 1.00 1.00\n2 1.00 1.00 1.00\n");
}

#[test]
fn cancelling_through_a_token_before_the_run() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, vec![1.0; 100], WriteOptions::default());
    let points = write_points(&dir, &[(1, 5.0, 5.0)]);
    let output = output_path(&dir, "out.txt");

    let token = CancellationToken::new();
    token.cancel();
    let mut feedback = RecordingFeedback::with_token(token);
    let params = HeightStatsParameters::new(&dsm, &points, "fid", &output);
    let err = UavPreparer::new().unwrap().height_stats_with(&params, &mut feedback).unwrap_err();

    assert!(matches!(err, ProcessingError::Cancelled { rows_written: 0 }));
    assert_eq!(fs::read_to_string(&output).unwrap(), "# ID MEAN MAX MIN\n");
}

#[test]
fn storage_layouts_give_the_same_table() {
    let dir = TempDir::new().unwrap();
    let points = write_points(&dir, &[(1, 5.5, 34.5), (2, 16.0, 24.0), (3, 37.0, 3.0)]);

    let layouts = [
        ("strips.tif", WriteOptions::default()),
        ("tiles.tif", WriteOptions { tile_size: Some((16, 16)), ..WriteOptions::default() }),
        ("deflate.tif", WriteOptions {
            compression: "deflate".to_string(),
            predictor: predictor::FLOATING_POINT,
            tile_size: Some((16, 16)),
            ..WriteOptions::default()
        }),
        ("zstd.tif", WriteOptions {
            compression: "zstd".to_string(),
            rows_per_strip: 7,
            big_tiff: true,
            ..WriteOptions::default()
        }),
        ("int16.tif", WriteOptions {
            sample_type: SampleType::I16,
            compression: "deflate".to_string(),
            predictor: predictor::HORIZONTAL_DIFFERENCING,
            byte_order: uavprep::tiff::ByteOrder::BigEndian,
            ..WriteOptions::default()
        }),
    ];

    let tables: Vec<String> = layouts.into_iter()
        .map(|(name, options)| {
            let dsm = write_raster(&dir, name, 40, ramp(40), options);
            let params = HeightStatsParameters {
                radius: 3.0,
                ..HeightStatsParameters::new(&dsm, &points, "fid", &output_path(&dir, &format!("{}.txt", name)))
            };
            run(&params).unwrap().0
        })
        .collect();

    assert!(tables.iter().all(|table| table == &tables[0]), "{:?}", tables);
    assert_eq!(tables[0].lines().count(), 4);
}

#[test]
fn nodata_is_masked_unless_included() {
    let dir = TempDir::new().unwrap();
    let mut values = vec![0.0; 100];
    // window of (5, 5) with radius 1: cells (4,4) (5,4) (4,5) (5,5)
    values[44] = 1.0;
    values[45] = 2.0;
    values[54] = 3.0;
    values[55] = -9999.0;
    let dsm = write_raster(&dir, "dsm.tif", 10, values, WriteOptions { nodata: Some(-9999.0), ..WriteOptions::default() });
    let points = write_points(&dir, &[(1, 5.0, 5.0)]);

    let masked = HeightStatsParameters { radius: 1.0, ..HeightStatsParameters::new(&dsm, &points, "fid", &output_path(&dir, "mask.txt")) };
    assert_eq!(run(&masked).unwrap().0, "# ID MEAN MAX MIN\n1 2.00 3.00 1.00\n");

    let included = HeightStatsParameters {
        nodata_policy: NodataPolicy::Include,
        output: output_path(&dir, "include.txt"),
        ..masked.clone()
    };
    assert_eq!(run(&included).unwrap().0, "# ID MEAN MAX MIN\n1 -2498.25 3.00 -9999.00\n");
}

#[test]
fn all_nodata_window_is_an_empty_sample() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, vec![-1.0; 100], WriteOptions { nodata: Some(-1.0), ..WriteOptions::default() });
    let points = write_points(&dir, &[(4, 5.0, 5.0)]);

    let params = HeightStatsParameters { radius: 1.0, ..HeightStatsParameters::new(&dsm, &points, "fid", &output_path(&dir, "out.txt")) };
    let err = run(&params).unwrap_err();

    assert!(matches!(err, ProcessingError::EmptySample { feature_id: 4, .. }));
    assert_eq!(err.kind(), ErrorKind::EmptySample);
}

#[test]
fn band_scale_and_offset_are_applied() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, vec![5.0; 100], WriteOptions {
        sample_type: SampleType::U16,
        scale_offset: Some((2.0, 1.0)),
        ..WriteOptions::default()
    });
    let points = write_points(&dir, &[(1, 5.0, 5.0)]);

    let params = HeightStatsParameters { radius: 1.0, ..HeightStatsParameters::new(&dsm, &points, "fid", &output_path(&dir, "out.txt")) };
    assert_eq!(run(&params).unwrap().0, "# ID MEAN MAX MIN\n1 11.00 11.00 11.00\n");
}

#[test]
fn legacy_axis_samples_at_y_y() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(1, 2.5, 7.5)]);

    let corrected = HeightStatsParameters { radius: 0.5, ..HeightStatsParameters::new(&dsm, &points, "fid", &output_path(&dir, "c.txt")) };
    assert_eq!(run(&corrected).unwrap().0, "# ID MEAN MAX MIN\n1 22.00 22.00 22.00\n");

    let legacy = HeightStatsParameters {
        axis_mode: AxisMode::Legacy,
        output: output_path(&dir, "l.txt"),
        ..corrected.clone()
    };
    assert_eq!(run(&legacy).unwrap().0, "# ID MEAN MAX MIN\n1 27.00 27.00 27.00\n");
}

#[test]
fn csv_point_layers_are_supported() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = dir.path().join("points.csv");
    fs::write(&points, "id;Easting;Northing\n12;5;5\n13.9;2.5;7.5\n").unwrap();

    let params = HeightStatsParameters {
        radius: 1.0,
        ..HeightStatsParameters::new(&dsm, &points.to_string_lossy(), "id", &output_path(&dir, "out.txt"))
    };
    let (table, _) = run(&params).unwrap();

    let ids: Vec<&str> = table.lines().skip(1).map(|line| line.split(' ').next().unwrap()).collect();
    assert_eq!(ids, vec!["12", "13"]);
}

#[test]
fn kept_windows_are_readable_rasters() {
    let dir = TempDir::new().unwrap();
    let windows = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(1, 5.0, 5.0), (2, 2.0, 2.0)]);

    let params = HeightStatsParameters {
        radius: 1.0,
        keep_windows: Some(windows.path().to_string_lossy().into_owned()),
        ..HeightStatsParameters::new(&dsm, &points, "fid", &output_path(&dir, "out.txt"))
    };
    run(&params).unwrap();

    let mut files: Vec<_> = fs::read_dir(windows.path()).unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    assert_eq!(files.len(), 2);

    let extractor = WindowExtractor::open(&files[0].to_string_lossy(), 1).unwrap();
    let window = uavprep::SamplingWindow::new(4.0, 6.0, 6.0, 4.0);
    let sample = extractor.extract(&window, None).unwrap();
    assert_eq!(sample.data, vec![44.0, 45.0, 54.0, 55.0]);
}

#[test]
fn missing_window_directory_is_an_input_error() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(1, 5.0, 5.0)]);

    let params = HeightStatsParameters {
        keep_windows: Some(output_path(&dir, "nowhere")),
        ..HeightStatsParameters::new(&dsm, &points, "fid", &output_path(&dir, "out.txt"))
    };
    assert_eq!(run(&params).unwrap_err().kind(), ErrorKind::Input);
}

#[test]
fn registry_runs_by_algorithm_id() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(9, 5.0, 5.0)]);
    let output = output_path(&dir, "out.txt");

    let mut values = ParameterValues::new();
    values.insert(INPUT_DSM.to_string(), dsm);
    values.insert(INPUT_POINT.to_string(), points);
    values.insert(ID_FIELD.to_string(), "fid".to_string());
    values.insert(RADIUS.to_string(), "1".to_string());
    values.insert(OUTPUT_FILE.to_string(), output.clone());

    let preparer = UavPreparer::new().unwrap();
    let report = preparer.run("uavpreparer:heightstats", &values, &mut RecordingFeedback::new()).unwrap();

    assert_eq!(report.rows_written, 1);
    assert_eq!(fs::read_to_string(&output).unwrap(), "# ID MEAN MAX MIN\n9 49.50 55.00 44.00\n");
    assert!(preparer.run("uavpreparer:missing", &values, &mut RecordingFeedback::new()).is_err());
}

#[test]
fn command_line_flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("uavprep.toml");
    fs::write(&config, "[run]\nradius = 1\naxis = \"legacy\"\non_empty = \"skip\"\n").unwrap();

    let matches = build_cli().try_get_matches_from([
        "uavprep", "--dsm", "dsm.tif", "--points", "points.geojson", "--id-field", "fid",
        "--output", "out.txt", "--config", &config.to_string_lossy(), "--radius", "2", "--on-empty", "fail",
    ]).unwrap();

    let settings = settings_from_args(&matches).unwrap();
    let command = RunCommand::new(&matches, &settings, CancellationToken::new()).unwrap();
    let params = command.parameters();

    assert_eq!(params.radius, 2.0);
    assert_eq!(params.axis_mode, AxisMode::Legacy);
    assert_eq!(params.on_empty, OnEmpty::Fail);
}

#[test]
fn unreadable_config_file_is_reported() {
    let matches = build_cli().try_get_matches_from([
        "uavprep", "--list-algorithms", "--config", "/nonexistent/uavprep.toml",
    ]).unwrap();
    assert!(settings_from_args(&matches).is_err());
}

#[test]
fn float_nodata_matches_at_cell_precision() {
    let dir = TempDir::new().unwrap();
    let mut values = vec![0.0; 100];
    values[44] = 1.0;
    values[45] = 2.0;
    values[54] = 3.0;
    // -9999.9 has no exact f32 form
    values[55] = -9999.9;
    let dsm = write_raster(&dir, "dsm.tif", 10, values, WriteOptions {
        sample_type: SampleType::F32,
        nodata: Some(-9999.9),
        ..WriteOptions::default()
    });
    let points = write_points(&dir, &[(1, 5.0, 5.0)]);

    let params = HeightStatsParameters { radius: 1.0, ..HeightStatsParameters::new(&dsm, &points, "fid", &output_path(&dir, "out.txt")) };
    assert_eq!(run(&params).unwrap().0, "# ID MEAN MAX MIN\n1 2.00 3.00 1.00\n");
}

#[test]
fn expired_deadline_stops_extraction() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let extractor = WindowExtractor::open(&dsm, 1).unwrap();
    let window = SamplingWindow::new(4.0, 6.0, 6.0, 4.0);

    assert!(extractor.extract(&window, Some(Instant::now() + Duration::from_secs(60))).is_ok());

    let err = extractor.extract(&window, Some(Instant::now())).unwrap_err();
    assert!(matches!(err, TiffError::Timeout));
    assert_eq!(ProcessingError::from(err).kind(), ErrorKind::Io);
}

#[test]
fn feature_timeout_aborts_without_output() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions::default());
    let points = write_points(&dir, &[(1, 5.0, 5.0)]);
    let output = output_path(&dir, "out.txt");

    let params = HeightStatsParameters {
        radius: 1.0,
        feature_timeout: Some(Duration::from_nanos(1)),
        ..HeightStatsParameters::new(&dsm, &points, "fid", &output)
    };
    let err = run(&params).unwrap_err();

    assert!(matches!(err, ProcessingError::Raster(TiffError::Timeout)));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!Path::new(&output).exists());
}

#[test]
fn raster_description_names_size_and_band() {
    let dir = TempDir::new().unwrap();
    let dsm = write_raster(&dir, "dsm.tif", 10, ramp(10), WriteOptions { tile_size: Some((16, 16)), ..WriteOptions::default() });

    let description = UavPreparer::new().unwrap().describe_raster(&dsm, 1).unwrap();
    assert!(description.starts_with(&dsm), "{}", description);
    assert!(description.contains("10x10"), "{}", description);
    assert!(description.contains("band 1/1"), "{}", description);

    let err = UavPreparer::new().unwrap().describe_raster(&dsm, 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
}
