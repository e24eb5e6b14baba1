//! GeoJSON format reader and writer

use std::fs;
use std::path::Path;

use crate::error::{GeoframeError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{FormatReader, FormatValidation, FormatWriter};
use crate::models::{ColumnType, Crs, Feature, FeatureCollection, Geometry, Schema, Tabular, Value};

/// GeoJSON format reader
pub struct GeoJsonReader;

impl FormatReader for GeoJsonReader {
    fn read(&self, path: &Path) -> Result<FeatureCollection> {
        let content = fs::read_to_string(path)?;

        let geojson: geojson::GeoJson = content.parse().map_err(|e| GeoframeError::FormatError {
            format: "GeoJSON".to_string(),
            message: format!("Failed to parse GeoJSON: {}", e),
        })?;

        self.convert(&geojson)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json", "geojson"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }

    fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let json_validation = FormatValidator::validate_geojson_document(path);
        Ok(FormatValidator::merge(vec![validation, json_validation]))
    }
}

impl GeoJsonReader {
    fn convert(&self, geojson: &geojson::GeoJson) -> Result<FeatureCollection> {
        match geojson {
            geojson::GeoJson::FeatureCollection(fc) => {
                let crs = fc
                    .foreign_members
                    .as_ref()
                    .and_then(|fm| fm.get("crs"))
                    .and_then(extract_crs);
                build_collection(crs, &fc.features)
            }
            geojson::GeoJson::Feature(feature) => {
                let crs = feature
                    .foreign_members
                    .as_ref()
                    .and_then(|fm| fm.get("crs"))
                    .and_then(extract_crs);
                build_collection(crs, std::slice::from_ref(feature))
            }
            geojson::GeoJson::Geometry(geometry) => {
                let feature = Feature::new(from_geojson_value(&geometry.value)?, vec![]);
                FeatureCollection::new(None, Schema::default(), vec![feature])
            }
        }
    }
}

/// Typed columns are inferred from the union of property names, in first-seen order
fn build_collection(crs: Option<Crs>, features: &[geojson::Feature]) -> Result<FeatureCollection> {
    let mut names: Vec<String> = Vec::new();
    for feature in features {
        for key in feature.properties.iter().flat_map(|p| p.keys()) {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let rows: Vec<Vec<Value>> = features
        .iter()
        .map(|feature| {
            names
                .iter()
                .map(|name| {
                    feature
                        .properties
                        .as_ref()
                        .and_then(|p| p.get(name))
                        .map(Value::from_json)
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    let schema = Schema::infer(&names, &rows)?;
    let text_columns: Vec<bool> =
        schema.columns().iter().map(|c| c.dtype == ColumnType::Text).collect();

    let features = features
        .iter()
        .zip(rows)
        .map(|(feature, row)| {
            let geometry =
                feature.geometry.as_ref().map(|g| from_geojson_value(&g.value)).transpose()?;
            // a column widened to text keeps its non-text values as their text form
            let attributes = row
                .into_iter()
                .zip(&text_columns)
                .map(|(v, &is_text)| match v {
                    Value::Null | Value::Text(_) => v,
                    other if is_text => Value::Text(other.to_string()),
                    other => other,
                })
                .collect();
            Ok(Feature { geometry, attributes })
        })
        .collect::<Result<Vec<_>>>()?;

    if crs.is_none() {
        tracing::debug!("GeoJSON input has no crs member; collection is untagged");
    }

    FeatureCollection::new(crs, schema, features)
}

/// Extract the CRS from a legacy `crs` member
fn extract_crs(crs: &serde_json::Value) -> Option<Crs> {
    crs.get("properties")
        .and_then(|props| props.get("name"))
        .and_then(|name| name.as_str())
        .and_then(Crs::parse)
}

fn position(coords: &[f64]) -> Result<[f64; 2]> {
    match coords {
        [x, y, ..] => Ok([*x, *y]),
        _ => Err(GeoframeError::FormatError {
            format: "GeoJSON".to_string(),
            message: format!("Position needs at least 2 coordinates, found {}", coords.len()),
        }),
    }
}

fn positions(coords: &[Vec<f64>]) -> Result<Vec<[f64; 2]>> {
    coords.iter().map(|c| position(c)).collect()
}

fn rings(coords: &[Vec<Vec<f64>>]) -> Result<Vec<Vec<[f64; 2]>>> {
    coords.iter().map(|r| positions(r)).collect()
}

/// Convert a GeoJSON geometry value, dropping Z values
pub fn from_geojson_value(value: &geojson::Value) -> Result<Geometry> {
    Ok(match value {
        geojson::Value::Point(c) => Geometry::Point { coordinates: position(c)? },
        geojson::Value::MultiPoint(c) => Geometry::MultiPoint { coordinates: positions(c)? },
        geojson::Value::LineString(c) => Geometry::LineString { coordinates: positions(c)? },
        geojson::Value::MultiLineString(c) => Geometry::MultiLineString { coordinates: rings(c)? },
        geojson::Value::Polygon(c) => Geometry::Polygon { coordinates: rings(c)? },
        geojson::Value::MultiPolygon(c) => Geometry::MultiPolygon {
            coordinates: c.iter().map(|p| rings(p)).collect::<Result<_>>()?,
        },
        geojson::Value::GeometryCollection(geometries) => Geometry::GeometryCollection {
            geometries: geometries
                .iter()
                .map(|g| from_geojson_value(&g.value))
                .collect::<Result<_>>()?,
        },
    })
}

/// Convert to a GeoJSON geometry value
pub fn to_geojson_value(geometry: &Geometry) -> geojson::Value {
    let pos = |c: &[f64; 2]| c.to_vec();
    let line = |l: &Vec<[f64; 2]>| l.iter().map(pos).collect::<Vec<_>>();
    let poly = |p: &Vec<Vec<[f64; 2]>>| p.iter().map(line).collect::<Vec<_>>();

    match geometry {
        Geometry::Point { coordinates } => geojson::Value::Point(pos(coordinates)),
        Geometry::MultiPoint { coordinates } => geojson::Value::MultiPoint(line(coordinates)),
        Geometry::LineString { coordinates } => geojson::Value::LineString(line(coordinates)),
        Geometry::MultiLineString { coordinates } => {
            geojson::Value::MultiLineString(poly(coordinates))
        }
        Geometry::Polygon { coordinates } => geojson::Value::Polygon(poly(coordinates)),
        Geometry::MultiPolygon { coordinates } => {
            geojson::Value::MultiPolygon(coordinates.iter().map(poly).collect())
        }
        Geometry::GeometryCollection { geometries } => geojson::Value::GeometryCollection(
            geometries.iter().map(|g| geojson::Geometry::new(to_geojson_value(g))).collect(),
        ),
    }
}

/// GeoJSON writer. The CRS is written as a legacy `crs` member so the file
/// reads back with the same tag.
pub struct GeoJsonWriter {
    pub pretty: bool,
}

impl Default for GeoJsonWriter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl GeoJsonWriter {
    /// Build the GeoJSON document without writing it
    pub fn to_geojson(&self, collection: &FeatureCollection) -> geojson::FeatureCollection {
        let names = collection.schema().names();

        let features = collection
            .features()
            .iter()
            .map(|feature| {
                let properties: serde_json::Map<String, serde_json::Value> = names
                    .iter()
                    .zip(&feature.attributes)
                    .map(|(name, value)| (name.to_string(), value.to_json()))
                    .collect();
                geojson::Feature {
                    bbox: None,
                    geometry: feature
                        .geometry
                        .as_ref()
                        .map(|g| geojson::Geometry::new(to_geojson_value(g))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        let foreign_members = collection.crs().map(|crs| {
            let mut members = serde_json::Map::new();
            members.insert(
                "crs".to_string(),
                serde_json::json!({
                    "type": "name",
                    "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", crs.epsg) }
                }),
            );
            members
        });

        geojson::FeatureCollection { bbox: None, features, foreign_members }
    }
}

impl FormatWriter for GeoJsonWriter {
    fn write(&self, collection: &FeatureCollection, path: &Path) -> Result<()> {
        let document = self.to_geojson(collection);
        let content = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        }
        .map_err(|e| GeoframeError::Serialization(format!("Failed to serialize GeoJSON: {}", e)))?;

        fs::write(path, content)?;
        tracing::debug!("Wrote {} features to {}", collection.features().len(), path.display());
        Ok(())
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }
}
