//! Reads survey points from a WFS GeoJSON (`application/json`) response.

use std::io::Read;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ProfileError, Result};
use crate::model::{Coord, SurveyPoint};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    #[serde(other)]
    Unsupported,
}

/// Parses every feature into a validated [`SurveyPoint`]. `depth_field` names
/// the property holding the voxel depths; every other numeric array property
/// becomes a value field. Array properties may also be JSON-encoded strings,
/// as some WFS servers return them.
pub fn parse_feature_collection<R: Read>(reader: R, depth_field: &str) -> Result<Vec<SurveyPoint>> {
    let collection: FeatureCollection = serde_json::from_reader(reader)?;

    let points = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| parse_feature(index, feature, depth_field))
        .collect::<Result<Vec<_>>>()?;

    debug!("Parsed {} survey points", points.len());
    Ok(points)
}

fn parse_feature(index: usize, feature: Feature, depth_field: &str) -> Result<SurveyPoint> {
    let id = match feature.id {
        Some(Value::String(id)) => id,
        Some(Value::Number(id)) => id.to_string(),
        _ => format!("feature.{index}"),
    };

    let location = match feature.geometry {
        Some(Geometry::Point { coordinates }) => coord(&id, &coordinates)?,
        Some(Geometry::MultiPoint { coordinates }) => {
            let first = coordinates.first().ok_or_else(|| {
                ProfileError::InvalidGeoJson(format!("feature `{id}` has an empty MultiPoint"))
            })?;
            coord(&id, first)?
        }
        Some(Geometry::Unsupported) => {
            return Err(ProfileError::InvalidGeoJson(format!(
                "feature `{id}` is not a Point or MultiPoint"
            )))
        }
        None => {
            return Err(ProfileError::InvalidGeoJson(format!(
                "feature `{id}` has no geometry"
            )))
        }
    };

    let properties = feature.properties.unwrap_or_default();

    let depths = match properties.get(depth_field) {
        Some(value) => numeric_array(&id, depth_field, value)?.ok_or_else(|| {
            ProfileError::malformed(&id, format!("depth field `{depth_field}` is not an array"))
        })?,
        None => {
            return Err(ProfileError::MissingField {
                id,
                field: depth_field.to_string(),
            })
        }
    };

    let mut point = SurveyPoint::new(id.clone(), location, depths)?;
    for (name, value) in &properties {
        if name == depth_field {
            continue;
        }
        if let Some(values) = numeric_array(&id, name, value)? {
            point = point.with_field(name.clone(), values)?;
        }
    }
    Ok(point)
}

fn coord(id: &str, coordinates: &[f64]) -> Result<Coord> {
    match coordinates {
        [x, y, ..] => Ok(Coord::new(*x, *y)),
        _ => Err(ProfileError::InvalidGeoJson(format!(
            "feature `{id}` has a position with fewer than two coordinates"
        ))),
    }
}

/// `Ok(None)` for properties that are not arrays. `null` entries become NaN,
/// which classifies as no data.
fn numeric_array(id: &str, name: &str, value: &Value) -> Result<Option<Vec<f64>>> {
    let items = match value {
        Value::Array(items) => items,
        Value::String(text) if text.trim_start().starts_with('[') => {
            return match serde_json::from_str::<Value>(text) {
                Ok(decoded @ Value::Array(_)) => numeric_array(id, name, &decoded),
                _ => Ok(None),
            };
        }
        _ => return Ok(None),
    };

    items
        .iter()
        .map(|item| match item {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| ProfileError::malformed(id, format!("field `{name}` holds {n}"))),
            Value::Null => Ok(f64::NAN),
            other => Err(ProfileError::malformed(
                id,
                format!("field `{name}` holds a non-numeric value {other}"),
            )),
        })
        .collect::<Result<Vec<f64>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "profielen_v2.17",
                "geometry": {"type": "Point", "coordinates": [45012.5, 398987.5]},
                "properties": {
                    "z": [-2.25, -1.75, -1.25],
                    "chloride_midden": [1500, 1500, 300],
                    "suit_extraction": "[0.5, 0.75, 1]",
                    "naam": "cel 17"
                }
            },
            {
                "type": "Feature",
                "geometry": {"type": "MultiPoint", "coordinates": [[45062.5, 398987.5], [0, 0]]},
                "properties": {
                    "z": "[-0.75]",
                    "chloride_midden": [null]
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_response() {
        let points = parse_feature_collection(RESPONSE.as_bytes(), "z").unwrap();
        assert_eq!(points.len(), 2);

        let first = &points[0];
        assert_eq!(first.id(), "profielen_v2.17");
        assert_eq!(first.location(), Coord::new(45012.5, 398987.5));
        assert_eq!(first.depths(), &[-2.25, -1.75, -1.25]);
        assert_eq!(first.field("chloride_midden").unwrap(), &[1500.0, 1500.0, 300.0]);
        assert_eq!(first.field("suit_extraction").unwrap(), &[0.5, 0.75, 1.0]);
        assert_eq!(first.field_names().count(), 2);

        let second = &points[1];
        assert_eq!(second.id(), "feature.1");
        assert_eq!(second.location(), Coord::new(45062.5, 398987.5));
        assert!(second.field("chloride_midden").unwrap()[0].is_nan());
    }

    #[test]
    fn test_numeric_id() {
        let json = r#"{"features": [{"id": 7, "geometry": {"type": "Point", "coordinates": [1, 2]},
            "properties": {"z": [-1]}}]}"#;
        let points = parse_feature_collection(json.as_bytes(), "z").unwrap();
        assert_eq!(points[0].id(), "7");
    }

    #[test]
    fn test_missing_depth_field() {
        let json = r#"{"features": [{"id": "a", "geometry": {"type": "Point", "coordinates": [1, 2]},
            "properties": {"chloride_midden": [150]}}]}"#;
        let err = parse_feature_collection(json.as_bytes(), "z").unwrap_err();
        assert!(matches!(err, ProfileError::MissingField { .. }));
    }

    #[test]
    fn test_length_mismatch_fails_fast() {
        let json = r#"{"features": [{"id": "a", "geometry": {"type": "Point", "coordinates": [1, 2]},
            "properties": {"z": [-1, -0.5], "chloride_midden": [150]}}]}"#;
        let err = parse_feature_collection(json.as_bytes(), "z").unwrap_err();
        assert!(matches!(err, ProfileError::MalformedSample { .. }));
    }

    #[test]
    fn test_rejects_non_point_geometry() {
        let json = r#"{"features": [{"id": "a",
            "geometry": {"type": "LineString", "coordinates": [[1, 2], [3, 4]]},
            "properties": {"z": [-1]}}]}"#;
        let err = parse_feature_collection(json.as_bytes(), "z").unwrap_err();
        assert!(matches!(err, ProfileError::InvalidGeoJson(_)));
    }

    #[test]
    fn test_rejects_non_numeric_values() {
        let json = r#"{"features": [{"id": "a", "geometry": {"type": "Point", "coordinates": [1, 2]},
            "properties": {"z": [-1], "chloride_midden": ["hoog"]}}]}"#;
        let err = parse_feature_collection(json.as_bytes(), "z").unwrap_err();
        assert!(matches!(err, ProfileError::MalformedSample { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_feature_collection("{".as_bytes(), "z").unwrap_err();
        assert!(matches!(err, ProfileError::Json(_)));
    }
}
