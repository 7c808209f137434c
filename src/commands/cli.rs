//! Command line definition

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};

/// Builds the `uavprep` argument parser
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("uavprep")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Per-point height statistics from a DSM")
        .arg(
            Arg::new("dsm")
                .long("dsm")
                .help("Input DSM GeoTIFF")
                .value_name("FILE")
                .required_unless_present("list-algorithms"),
        )
        .arg(
            Arg::new("points")
                .long("points")
                .help("Point layer (GeoJSON or CSV)")
                .value_name("FILE")
                .required_unless_present("list-algorithms"),
        )
        .arg(
            Arg::new("id-field")
                .long("id-field")
                .help("Numeric attribute holding the feature id")
                .value_name("FIELD")
                .required_unless_present("list-algorithms"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output table")
                .value_name("FILE")
                .required_unless_present("list-algorithms"),
        )
        .arg(
            Arg::new("radius")
                .short('r')
                .long("radius")
                .help("Half-width of the sampling window in raster CRS units [default: 100]")
                .value_name("UNITS")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("band")
                .long("band")
                .help("1-based raster band [default: 1]")
                .value_name("N")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("nodata")
                .long("nodata")
                .help("No-data handling [default: mask]")
                .value_parser(["mask", "include"]),
        )
        .arg(
            Arg::new("axis")
                .long("axis")
                .help("Sampling axes; legacy samples at (y, y) [default: corrected]")
                .value_parser(["corrected", "legacy"]),
        )
        .arg(
            Arg::new("on-empty")
                .long("on-empty")
                .help("What to do with windows without usable cells [default: fail]")
                .value_parser(["fail", "skip"]),
        )
        .arg(
            Arg::new("feature-timeout")
                .long("feature-timeout")
                .help("Per-feature extraction timeout in seconds")
                .value_name("SECS")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("keep-windows")
                .long("keep-windows")
                .help("Write every sampled window as a GeoTIFF into this directory")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML settings file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Also write log messages to this file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-algorithms")
                .long("list-algorithms")
                .help("List registered algorithms and exit")
                .action(ArgAction::SetTrue),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_run() {
        let matches = build_cli().try_get_matches_from([
            "uavprep", "--dsm", "dsm.tif", "--points", "p.geojson", "--id-field", "fid",
            "--output", "out.txt", "--radius", "2.5", "--axis", "legacy",
        ]).unwrap();

        assert_eq!(matches.get_one::<f64>("radius"), Some(&2.5));
        assert_eq!(matches.get_one::<String>("axis").map(String::as_str), Some("legacy"));
    }

    #[test]
    fn listing_needs_no_inputs() {
        assert!(build_cli().try_get_matches_from(["uavprep", "--list-algorithms"]).is_ok());
        assert!(build_cli().try_get_matches_from(["uavprep", "--dsm", "dsm.tif"]).is_err());
    }

    #[test]
    fn rejects_unknown_choices() {
        let result = build_cli().try_get_matches_from([
            "uavprep", "--dsm", "d.tif", "--points", "p.csv", "--id-field", "id", "--output", "o.txt",
            "--nodata", "sometimes",
        ]);
        assert!(result.is_err());
    }
}
