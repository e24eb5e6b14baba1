//! Cheap pre-read checks shared by the format readers

use crate::error::{GeoframeError, Result};
use crate::formats::FormatValidation;
use std::collections::HashSet;
use std::path::Path;

const GEOJSON_TYPES: &[&str] = &[
    "FeatureCollection",
    "Feature",
    "Point",
    "LineString",
    "Polygon",
    "MultiPoint",
    "MultiLineString",
    "MultiPolygon",
    "GeometryCollection",
];

pub struct FormatValidator;

impl FormatValidator {
    /// The path must name a readable regular file
    pub fn validate_file_exists(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {
                validation.errors.push(format!("Expected a file, found a directory: {}", path.display()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                validation.errors.push(format!("File not found: {}", path.display()));
            }
            Err(e) => validation.errors.push(format!("Cannot access {}: {}", path.display(), e)),
        }

        validation
    }

    /// Sidecar files next to `base`. Missing required ones are errors,
    /// missing optional ones are warnings.
    pub fn validate_component_files(
        base: &Path,
        required: &[&str],
        optional: &[&str],
    ) -> FormatValidation {
        let mut validation = FormatValidation::default();

        for path in required.iter().map(|ext| base.with_extension(ext)) {
            if !path.exists() {
                validation.errors.push(format!("Missing required file: {}", path.display()));
            }
        }

        for path in optional.iter().map(|ext| base.with_extension(ext)) {
            if !path.exists() {
                validation.warnings.push(format!(
                    "{} not found; collection will have no CRS",
                    path.display()
                ));
            }
        }

        validation
    }

    /// The document must be JSON with a GeoJSON `type`. A collection without
    /// a `crs` member is readable but untagged.
    pub fn validate_geojson_document(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        let document = match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<serde_json::Value>(&content).map_err(|e| e.to_string())
            }) {
            Ok(document) => document,
            Err(e) => {
                validation.errors.push(format!("Invalid JSON: {}", e));
                return validation;
            }
        };

        match document.get("type").and_then(|t| t.as_str()) {
            Some(kind) if GEOJSON_TYPES.contains(&kind) => {}
            Some(kind) => validation.errors.push(format!("Unknown GeoJSON type '{}'", kind)),
            None => validation.errors.push("Missing GeoJSON 'type' member".to_string()),
        }

        if validation.is_valid() && document.get("crs").is_none() {
            validation.warnings.push("No 'crs' member; collection will have no CRS".to_string());
        }

        validation
    }

    /// The header row must be present with unique, non-empty names
    pub fn validate_csv_header(path: &Path, delimiter: u8) -> FormatValidation {
        let mut validation = FormatValidation::default();

        let mut reader = match ::csv::ReaderBuilder::new().delimiter(delimiter).from_path(path) {
            Ok(reader) => reader,
            Err(e) => {
                validation.errors.push(format!("Cannot open CSV: {}", e));
                return validation;
            }
        };

        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(e) => {
                validation.errors.push(format!("Cannot read CSV header: {}", e));
                return validation;
            }
        };

        let mut seen = HashSet::new();
        for (idx, name) in headers.iter().map(str::trim).enumerate() {
            if name.is_empty() {
                validation.errors.push(format!("Column {} has an empty name", idx + 1));
            } else if !seen.insert(name) {
                validation.errors.push(format!("Duplicate column name '{}'", name));
            }
        }

        validation
    }

    pub fn merge(validations: Vec<FormatValidation>) -> FormatValidation {
        validations.into_iter().fold(FormatValidation::default(), |mut merged, v| {
            merged.errors.extend(v.errors);
            merged.warnings.extend(v.warnings);
            merged
        })
    }

    /// Fail with every collected error joined into one message
    pub fn ensure_valid(validation: &FormatValidation, format_name: &str) -> Result<()> {
        if validation.is_valid() {
            return Ok(());
        }
        Err(GeoframeError::FormatError {
            format: format_name.to_string(),
            message: validation.errors.join("; "),
        })
    }
}
