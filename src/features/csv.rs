//! Delimited text point layers
//!
//! A header row names the columns; point coordinates come from an x/y
//! column pair. The delimiter (comma, semicolon or tab) is sniffed from the
//! header. Fields may be double-quoted.

use log::debug;
use std::fs;

use crate::coordinate::Point;

use super::errors::{FeatureError, FeatureResult};
use super::point_feature::{id_from_number, PointFeature};
use super::source::{FeatureIter, FeatureSource};

const X_ALIASES: [&str; 4] = ["x", "lon", "longitude", "easting"];
const Y_ALIASES: [&str; 4] = ["y", "lat", "latitude", "northing"];

/// A delimited text layer held in memory
#[derive(Debug)]
pub struct CsvSource {
    path: String,
    header: Vec<String>,
    records: Vec<Vec<String>>,
    x_column: usize,
    y_column: usize,
    delimiter: char,
}

impl CsvSource {
    pub fn open(path: &str) -> FeatureResult<Self> {
        let text = fs::read_to_string(path)?;
        let mut source = Self::from_text(&text)?;
        source.path = path.to_string();
        Ok(source)
    }

    pub fn from_text(text: &str) -> FeatureResult<Self> {
        let mut lines = text.lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty());

        let header_line = lines.next().ok_or_else(|| FeatureError::Parse("empty file".to_string()))?;
        let header_line = header_line.trim_start_matches('\u{feff}');
        let delimiter = sniff_delimiter(header_line);

        let header: Vec<String> = split_record(header_line, delimiter)
            .into_iter()
            .map(|name| name.trim().to_string())
            .collect();

        let find_column = |aliases: &[&str]| {
            header.iter().position(|name| aliases.iter().any(|alias| name.eq_ignore_ascii_case(alias)))
        };
        let (x_column, y_column) = match (find_column(&X_ALIASES), find_column(&Y_ALIASES)) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(FeatureError::Parse(format!(
                    "no coordinate columns in header {:?}, expected x/y, lon/lat or easting/northing", header
                )));
            }
        };

        let records: Vec<Vec<String>> = lines.map(|line| split_record(line, delimiter)).collect();

        debug!("Parsed {} delimited records, delimiter {:?}, coordinates in columns {} and {}",
               records.len(), delimiter, x_column, y_column);

        Ok(CsvSource { path: String::new(), header, records, x_column, y_column, delimiter })
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|field| field == name)
    }

    fn value<'r>(record: &'r [String], column: usize) -> &'r str {
        record.get(column).map(|value| value.trim()).unwrap_or("")
    }

    fn to_feature(&self, index: usize, record: &[String], id_column: Option<usize>, id_field: &str) -> FeatureResult<PointFeature> {
        let raw_id = id_column.map(|column| Self::value(record, column)).unwrap_or("");
        if raw_id.is_empty() {
            return Err(FeatureError::InvalidId { feature: index, reason: format!("'{}' is missing", id_field) });
        }

        let id = match raw_id.parse::<i64>() {
            Ok(id) => id,
            Err(_) => match raw_id.parse::<f64>() {
                Ok(value) => id_from_number(index, value)?,
                Err(_) => {
                    return Err(FeatureError::InvalidId {
                        feature: index,
                        reason: format!("'{}' is not a number", raw_id),
                    });
                }
            },
        };

        let coordinate = |column: usize| {
            let text = Self::value(record, column);
            text.parse::<f64>().map_err(|_| FeatureError::InvalidGeometry {
                feature: index,
                reason: format!("invalid coordinate '{}' in column '{}'", text, self.header[column]),
            })
        };

        Ok(PointFeature::new(id, Point::new(coordinate(self.x_column)?, coordinate(self.y_column)?)))
    }
}

impl FeatureSource for CsvSource {
    fn field_names(&self) -> Vec<String> {
        self.header.clone()
    }

    fn field_is_numeric(&self, name: &str) -> bool {
        match self.column(name) {
            Some(column) => self.records.iter()
                .map(|record| Self::value(record, column))
                .filter(|value| !value.is_empty())
                .all(|value| value.parse::<f64>().is_ok()),
            None => false,
        }
    }

    fn feature_count(&self) -> usize {
        self.records.len()
    }

    fn features<'a>(&'a self, id_field: &str) -> FeatureIter<'a> {
        let id_column = self.column(id_field);
        let id_field = id_field.to_string();
        Box::new(self.records.iter().enumerate()
            .map(move |(index, record)| self.to_feature(index, record, id_column, &id_field)))
    }

    fn describe(&self) -> String {
        format!("delimited text {} ({} features)", self.path, self.records.len())
    }
}

/// Picks the most frequent candidate delimiter outside quotes
fn sniff_delimiter(header: &str) -> char {
    let mut best = (',', 0);
    for candidate in [',', ';', '\t'] {
        let count = split_record(header, candidate).len();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Splits one record, honouring double quotes and `""` escapes
fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);

    fields
}
