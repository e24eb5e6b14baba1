//! Shapefile format reader implementation
//!
//! Shapefiles consist of multiple component files (.shp, .shx, .dbf, .prj).
//! The first three are required. Without a .prj the collection is untagged.

use shapefile::dbase::FieldValue as DbaseFieldValue;
use shapefile::{PolygonRing, Shape};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GeoframeError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{FormatReader, FormatValidation};
use crate::models::{Crs, Feature, FeatureCollection, Geometry, Schema, Value};

/// Shapefile format reader
pub struct ShapefileReader;

impl FormatReader for ShapefileReader {
    fn read(&self, path: &Path) -> Result<FeatureCollection> {
        self.verify_components(path)?;

        let crs = self.extract_crs(path)?;
        let names = self.field_names(path)?;

        let mut reader = shapefile::Reader::from_path(path).map_err(|e| format_error(format!(
            "Failed to open Shapefile: {}",
            e
        )))?;

        let mut geometries = Vec::new();
        let mut rows = Vec::new();
        for result in reader.iter_shapes_and_records() {
            let (shape, record) =
                result.map_err(|e| format_error(format!("Failed to read feature: {}", e)))?;

            geometries.push(convert_shape(&shape)?);
            rows.push(
                names
                    .iter()
                    .map(|name| record.get(name).map(convert_dbase_value).unwrap_or(Value::Null))
                    .collect::<Vec<_>>(),
            );
        }

        let schema = Schema::infer(&names, &rows)?;
        let features = geometries
            .into_iter()
            .zip(rows)
            .map(|(geometry, attributes)| Feature { geometry, attributes })
            .collect();

        FeatureCollection::new(crs, schema, features)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["shp"]
    }

    fn format_name(&self) -> &str {
        "Shapefile"
    }

    fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let mut validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let base = match shapefile_base(path) {
            Ok(b) => b,
            Err(e) => {
                validation.errors.push(format!("Invalid Shapefile path: {}", e));
                return Ok(validation);
            }
        };

        let component_validation =
            FormatValidator::validate_component_files(&base, &["shp", "shx", "dbf"], &["prj"]);

        Ok(FormatValidator::merge(vec![validation, component_validation]))
    }
}

impl ShapefileReader {
    /// Verify that all required Shapefile component files exist
    fn verify_components(&self, path: &Path) -> Result<()> {
        let base = shapefile_base(path)?;
        let missing: Vec<String> = ["shp", "shx", "dbf"]
            .iter()
            .filter(|ext| !base.with_extension(ext).exists())
            .map(|ext| format!(".{}", ext))
            .collect();

        if !missing.is_empty() {
            return Err(format_error(format!(
                "Missing required component files: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    /// CRS from the .prj file, or None when it is absent or carries no EPSG code
    fn extract_crs(&self, path: &Path) -> Result<Option<Crs>> {
        let prj_path = shapefile_base(path)?.with_extension("prj");
        if !prj_path.exists() {
            tracing::warn!("{} has no .prj file; collection is untagged", path.display());
            return Ok(None);
        }

        let prj_content = fs::read_to_string(&prj_path)
            .map_err(|e| format_error(format!("Failed to read .prj file: {}", e)))?;

        let crs = parse_epsg_from_wkt(&prj_content).map(Crs::from_epsg);
        if crs.is_none() {
            tracing::warn!(
                "{} has no EPSG authority code; collection is untagged",
                prj_path.display()
            );
        }
        Ok(crs)
    }

    /// Field names in .dbf header order
    fn field_names(&self, path: &Path) -> Result<Vec<String>> {
        let dbf_path = shapefile_base(path)?.with_extension("dbf");
        let reader = shapefile::dbase::Reader::from_path(&dbf_path)
            .map_err(|e| format_error(format!("Failed to open .dbf file: {}", e)))?;

        Ok(reader
            .fields()
            .iter()
            .map(|field| field.name().to_string())
            .filter(|name| name != "DeletionFlag")
            .collect())
    }
}

fn format_error(message: String) -> GeoframeError {
    GeoframeError::FormatError { format: "Shapefile".to_string(), message }
}

/// Get the base path for a Shapefile (without extension)
fn shapefile_base(path: &Path) -> Result<PathBuf> {
    let is_shp = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("shp"))
        .unwrap_or(false);

    if !is_shp {
        return Err(GeoframeError::InvalidPath {
            path: path.to_path_buf(),
            reason: "Not a Shapefile (.shp)".to_string(),
        });
    }

    Ok(path.with_extension(""))
}

/// Parse the EPSG code from a .prj WKT string.
///
/// The last `AUTHORITY["EPSG", ...]` belongs to the outermost CRS; earlier
/// ones name its datum, spheroid and units.
fn parse_epsg_from_wkt(wkt: &str) -> Option<u32> {
    let compact: String = wkt.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(start) = compact.rfind("AUTHORITY[\"EPSG\",\"") {
        let code_start = start + "AUTHORITY[\"EPSG\",\"".len();
        if let Some(end) = compact[code_start..].find('"') {
            if let Ok(code) = compact[code_start..code_start + end].parse::<u32>() {
                return Some(code);
            }
        }
    }

    // Bare "EPSG:n" as written by some tools
    if let Some(start) = compact.find("EPSG:") {
        let code: String =
            compact[start + 5..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(code) = code.parse::<u32>() {
            return Some(code);
        }
    }

    None
}

fn lines<P>(parts: &[Vec<P>], xy: impl Fn(&P) -> [f64; 2]) -> Vec<Vec<[f64; 2]>> {
    parts.iter().map(|part| part.iter().map(&xy).collect()).collect()
}

fn line_geometry(mut parts: Vec<Vec<[f64; 2]>>) -> Geometry {
    if parts.len() == 1 {
        Geometry::LineString { coordinates: parts.remove(0) }
    } else {
        Geometry::MultiLineString { coordinates: parts }
    }
}

/// Group rings into polygons: each outer ring starts a polygon and the inner
/// rings that follow are its holes
fn polygon_geometry<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> [f64; 2]) -> Geometry {
    let mut polygons: Vec<Vec<Vec<[f64; 2]>>> = Vec::new();
    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => polygons.push(vec![points.iter().map(&xy).collect()]),
            PolygonRing::Inner(points) => {
                let coords = points.iter().map(&xy).collect();
                match polygons.last_mut() {
                    Some(polygon) => polygon.push(coords),
                    None => polygons.push(vec![coords]),
                }
            }
        }
    }

    if polygons.len() == 1 {
        Geometry::Polygon { coordinates: polygons.remove(0) }
    } else {
        Geometry::MultiPolygon { coordinates: polygons }
    }
}

/// Convert a shape, dropping Z and M values. Null shapes have no geometry.
fn convert_shape(shape: &Shape) -> Result<Option<Geometry>> {
    Ok(Some(match shape {
        Shape::NullShape => return Ok(None),
        Shape::Point(p) => Geometry::point(p.x, p.y),
        Shape::PointM(p) => Geometry::point(p.x, p.y),
        Shape::PointZ(p) => Geometry::point(p.x, p.y),
        Shape::Polyline(l) => line_geometry(lines(l.parts(), |p| [p.x, p.y])),
        Shape::PolylineM(l) => line_geometry(lines(l.parts(), |p| [p.x, p.y])),
        Shape::PolylineZ(l) => line_geometry(lines(l.parts(), |p| [p.x, p.y])),
        Shape::Polygon(poly) => polygon_geometry(poly.rings(), |p| [p.x, p.y]),
        Shape::PolygonM(poly) => polygon_geometry(poly.rings(), |p| [p.x, p.y]),
        Shape::PolygonZ(poly) => polygon_geometry(poly.rings(), |p| [p.x, p.y]),
        Shape::Multipoint(mp) => {
            Geometry::MultiPoint { coordinates: mp.points().iter().map(|p| [p.x, p.y]).collect() }
        }
        Shape::MultipointM(mp) => {
            Geometry::MultiPoint { coordinates: mp.points().iter().map(|p| [p.x, p.y]).collect() }
        }
        Shape::MultipointZ(mp) => {
            Geometry::MultiPoint { coordinates: mp.points().iter().map(|p| [p.x, p.y]).collect() }
        }
        Shape::Multipatch(_) => {
            return Err(format_error("Multipatch geometry type is not supported".to_string()))
        }
    }))
}

/// Convert dBase field value. Numeric fields holding whole numbers become ints.
fn convert_dbase_value(value: &DbaseFieldValue) -> Value {
    match value {
        DbaseFieldValue::Character(Some(s)) => Value::Text(s.trim_end().to_string()),
        DbaseFieldValue::Numeric(Some(n)) => numeric(*n),
        DbaseFieldValue::Logical(Some(b)) => Value::Bool(*b),
        DbaseFieldValue::Date(Some(date)) => {
            Value::Text(format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()))
        }
        DbaseFieldValue::Float(Some(f)) => Value::Float(*f as f64),
        DbaseFieldValue::Integer(i) => Value::Int(*i as i64),
        DbaseFieldValue::Currency(c) => Value::Float(*c),
        DbaseFieldValue::Double(d) => Value::Float(*d),
        DbaseFieldValue::DateTime(dt) => Value::Text(format!(
            "{:04}-{:02}-{:02}",
            dt.date().year(),
            dt.date().month(),
            dt.date().day()
        )),
        DbaseFieldValue::Memo(s) => Value::Text(s.clone()),
        _ => Value::Null,
    }
}

fn numeric(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Int(n as i64)
    } else {
        Value::Float(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert_eq!(ShapefileReader.supported_extensions(), &["shp"]);
        assert_eq!(ShapefileReader.format_name(), "Shapefile");
    }

    #[test]
    fn test_validation_missing_file() {
        let validation = ShapefileReader.validate(Path::new("/nonexistent/test.shp")).unwrap();
        assert!(!validation.is_valid());
    }

    #[test]
    fn test_read_reports_missing_components() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracts.shp");
        fs::write(&path, b"").unwrap();

        let err = ShapefileReader.read(&path).unwrap_err();
        assert!(err.to_string().contains(".shx"));
        assert!(err.to_string().contains(".dbf"));
    }

    #[test]
    fn test_parse_epsg_from_wkt() {
        let geographic = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],AUTHORITY["EPSG","4326"]]"#;
        assert_eq!(parse_epsg_from_wkt(geographic), Some(4326));

        assert_eq!(parse_epsg_from_wkt("EPSG:3857"), Some(3857));
        assert_eq!(parse_epsg_from_wkt(r#"PROJCS["unnamed"]"#), None);
    }

    #[test]
    fn test_ring_grouping() {
        let pts = |coords: &[[f64; 2]]| -> Vec<shapefile::Point> {
            coords.iter().map(|[x, y]| shapefile::Point::new(*x, *y)).collect()
        };
        let outer = [[0.0, 0.0], [0.0, 4.0], [4.0, 4.0], [4.0, 0.0], [0.0, 0.0]];
        let hole = [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 2.0], [1.0, 1.0]];
        let xy = |p: &shapefile::Point| [p.x, p.y];

        let rings = vec![PolygonRing::Outer(pts(&outer)), PolygonRing::Inner(pts(&hole))];
        let geometry = polygon_geometry(&rings, xy);
        assert_eq!(geometry, Geometry::Polygon { coordinates: vec![outer.to_vec(), hole.to_vec()] });

        let two = vec![PolygonRing::Outer(pts(&outer)), PolygonRing::Outer(pts(&outer))];
        assert!(matches!(polygon_geometry(&two, xy), Geometry::MultiPolygon { .. }));
    }

    #[test]
    fn test_numeric_dbase_values() {
        assert_eq!(numeric(3.0), Value::Int(3));
        assert_eq!(numeric(2.5), Value::Float(2.5));
        assert_eq!(convert_dbase_value(&DbaseFieldValue::Character(None)), Value::Null);
    }
}
