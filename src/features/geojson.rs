//! GeoJSON point layers
//!
//! Reads a FeatureCollection with `serde_json`. Any geometry type is
//! accepted; features are reduced to their centroid on iteration.

use log::{debug, warn};
use serde_json::{Map, Value};
use std::fs;

use crate::coordinate::Point;

use super::errors::{FeatureError, FeatureResult};
use super::geometry::{Geometry, Ring};
use super::point_feature::{id_from_number, PointFeature};
use super::source::{FeatureIter, FeatureSource};

/// One parsed feature, geometry still in JSON form
#[derive(Debug, Clone)]
struct RawFeature {
    properties: Map<String, Value>,
    geometry: Value,
}

/// A GeoJSON FeatureCollection held in memory
#[derive(Debug)]
pub struct GeoJsonSource {
    path: String,
    features: Vec<RawFeature>,
    field_names: Vec<String>,
}

impl GeoJsonSource {
    pub fn open(path: &str) -> FeatureResult<Self> {
        let text = fs::read_to_string(path)?;
        let mut source = Self::from_json(&text)?;
        source.path = path.to_string();
        Ok(source)
    }

    /// Parses a FeatureCollection document
    pub fn from_json(text: &str) -> FeatureResult<Self> {
        let document: Value = serde_json::from_str(text)?;

        if document.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(FeatureError::Parse("expected a FeatureCollection".to_string()));
        }

        let raw_features = document.get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| FeatureError::Parse("FeatureCollection without a features array".to_string()))?;

        let mut features = Vec::with_capacity(raw_features.len());
        let mut field_names: Vec<String> = Vec::new();

        for (index, feature) in raw_features.iter().enumerate() {
            let properties = match feature.get("properties") {
                Some(Value::Object(map)) => map.clone(),
                Some(Value::Null) | None => Map::new(),
                Some(_) => return Err(FeatureError::Parse(format!("feature {} has invalid properties", index))),
            };

            for key in properties.keys() {
                if !field_names.contains(key) {
                    field_names.push(key.clone());
                }
            }

            features.push(RawFeature {
                properties,
                geometry: feature.get("geometry").cloned().unwrap_or(Value::Null),
            });
        }

        debug!("Parsed {} GeoJSON features with fields {:?}", features.len(), field_names);

        Ok(GeoJsonSource { path: String::new(), features, field_names })
    }

    fn to_feature(index: usize, raw: &RawFeature, id_field: &str) -> FeatureResult<PointFeature> {
        let id = match raw.properties.get(id_field) {
            Some(Value::Number(number)) => match number.as_i64() {
                Some(id) => id,
                None => id_from_number(index, number.as_f64().unwrap_or(f64::NAN))?,
            },
            Some(Value::Null) | None => {
                return Err(FeatureError::InvalidId { feature: index, reason: format!("'{}' is missing", id_field) });
            }
            Some(other) => {
                return Err(FeatureError::InvalidId { feature: index, reason: format!("'{}' is not a number", other) });
            }
        };

        let geometry = parse_geometry(&raw.geometry)
            .map_err(|reason| FeatureError::InvalidGeometry { feature: index, reason })?;
        let centroid = geometry.centroid()
            .ok_or_else(|| FeatureError::InvalidGeometry {
                feature: index,
                reason: format!("empty {}", geometry.type_name()),
            })?;

        Ok(PointFeature::new(id, centroid))
    }
}

impl FeatureSource for GeoJsonSource {
    fn field_names(&self) -> Vec<String> {
        self.field_names.clone()
    }

    fn field_is_numeric(&self, name: &str) -> bool {
        if !self.field_names.iter().any(|field| field == name) {
            return false;
        }

        self.features.iter()
            .filter_map(|feature| feature.properties.get(name))
            .all(|value| value.is_null() || value.is_number())
    }

    fn feature_count(&self) -> usize {
        self.features.len()
    }

    fn features<'a>(&'a self, id_field: &str) -> FeatureIter<'a> {
        let id_field = id_field.to_string();
        Box::new(self.features.iter().enumerate()
            .map(move |(index, raw)| Self::to_feature(index, raw, &id_field)))
    }

    fn describe(&self) -> String {
        format!("GeoJSON {} ({} features)", self.path, self.features.len())
    }
}

fn parse_position(value: &Value) -> Result<Point, String> {
    let coords = value.as_array().ok_or("position is not an array")?;
    match (coords.first().and_then(Value::as_f64), coords.get(1).and_then(Value::as_f64)) {
        (Some(x), Some(y)) => Ok(Point::new(x, y)),
        _ => Err(format!("invalid position {}", value)),
    }
}

fn parse_positions(value: &Value) -> Result<Ring, String> {
    value.as_array()
        .ok_or_else(|| "expected an array of positions".to_string())?
        .iter()
        .map(parse_position)
        .collect()
}

fn parse_rings(value: &Value) -> Result<Vec<Ring>, String> {
    value.as_array()
        .ok_or_else(|| "expected an array of rings".to_string())?
        .iter()
        .map(parse_positions)
        .collect()
}

/// Converts a GeoJSON geometry object
fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    if value.is_null() {
        return Err("missing geometry".to_string());
    }

    let kind = value.get("type").and_then(Value::as_str).ok_or("geometry without type")?;
    if kind == "GeometryCollection" {
        return Err("GeometryCollection is not supported".to_string());
    }

    let coordinates = value.get("coordinates").ok_or("geometry without coordinates")?;

    match kind {
        "Point" => parse_position(coordinates).map(Geometry::Point),
        "MultiPoint" => parse_positions(coordinates).map(Geometry::MultiPoint),
        "LineString" => parse_positions(coordinates).map(Geometry::LineString),
        "MultiLineString" => parse_rings(coordinates).map(Geometry::MultiLineString),
        "Polygon" => parse_rings(coordinates).map(Geometry::Polygon),
        "MultiPolygon" => coordinates.as_array()
            .ok_or_else(|| "expected an array of polygons".to_string())?
            .iter()
            .map(parse_rings)
            .collect::<Result<Vec<_>, _>>()
            .map(Geometry::MultiPolygon),
        other => {
            warn!("Unknown geometry type {}", other);
            Err(format!("unknown geometry type {}", other))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYER: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"fid": 3, "name": "a"},
             "geometry": {"type": "Point", "coordinates": [10.0, 20.0]}},
            {"type": "Feature", "properties": {"fid": 4.7, "name": "b"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[4,0],[4,4],[0,4],[0,0]]]}},
            {"type": "Feature", "properties": {"fid": null, "name": "c"},
             "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}}
        ]
    }"#;

    #[test]
    fn reads_fields_and_numeric_types() {
        let source = GeoJsonSource::from_json(LAYER).unwrap();
        assert_eq!(source.field_names(), vec!["fid".to_string(), "name".to_string()]);
        assert!(source.field_is_numeric("fid"));
        assert!(!source.field_is_numeric("name"));
        assert!(!source.field_is_numeric("missing"));
        assert_eq!(source.feature_count(), 3);
    }

    #[test]
    fn iterates_ids_and_centroids() {
        let source = GeoJsonSource::from_json(LAYER).unwrap();
        let features: Vec<_> = source.features("fid").collect();

        assert_eq!(features[0].as_ref().unwrap(), &PointFeature::new(3, Point::new(10.0, 20.0)));
        assert_eq!(features[1].as_ref().unwrap(), &PointFeature::new(4, Point::new(2.0, 2.0)));
        assert!(matches!(features[2], Err(FeatureError::InvalidId { feature: 2, .. })));
    }

    #[test]
    fn iteration_restarts() {
        let source = GeoJsonSource::from_json(LAYER).unwrap();
        let first = source.features("fid").next().unwrap().unwrap();
        let again = source.features("fid").next().unwrap().unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn missing_geometry_is_an_error() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"fid": 1}, "geometry": null}]}"#;
        let source = GeoJsonSource::from_json(text).unwrap();

        assert!(matches!(
            source.features("fid").next(),
            Some(Err(FeatureError::InvalidGeometry { feature: 0, .. }))
        ));
    }

    #[test]
    fn rejects_non_collections() {
        assert!(GeoJsonSource::from_json(r#"{"type": "Point", "coordinates": [0, 0]}"#).is_err());
        assert!(GeoJsonSource::from_json("not json").is_err());
    }
}
