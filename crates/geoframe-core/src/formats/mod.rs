//! Format abstraction layer for vector and tabular inputs
//!
//! Each format implements the `FormatReader` trait, and the `FormatRegistry`
//! manages format detection and dispatching to the appropriate reader.
//! Readers report the CRS found in the file's own metadata and leave the
//! collection untagged when there is none.

use std::path::Path;

use crate::error::{GeoframeError, Result};
use crate::models::{FeatureCollection, ValidityMode};
use crate::validation::apply_validity;

pub mod csv;
pub mod geojson;
pub mod shapefile;
pub mod validation;

pub use self::csv::CsvReader;
pub use self::geojson::{GeoJsonReader, GeoJsonWriter};
pub use self::shapefile::ShapefileReader;

/// Format reader trait that all format implementations must implement
pub trait FormatReader: Send + Sync {
    /// Read a feature collection from the given path
    fn read(&self, path: &Path) -> Result<FeatureCollection>;

    /// Get supported file extensions (e.g., ["shp", "geojson"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name (e.g., "Shapefile", "GeoJSON")
    fn format_name(&self) -> &str;

    /// Validate file structure without a full read
    fn validate(&self, _path: &Path) -> Result<FormatValidation> {
        Ok(FormatValidation::default())
    }
}

/// Writes a feature collection to a file
pub trait FormatWriter: Send + Sync {
    fn write(&self, collection: &FeatureCollection, path: &Path) -> Result<()>;

    fn format_name(&self) -> &str;
}

/// Result of format validation
#[derive(Debug, Clone, Default)]
pub struct FormatValidation {
    /// Validation errors that prevent reading
    pub errors: Vec<String>,

    /// Warnings that don't prevent reading but indicate potential issues
    pub warnings: Vec<String>,
}

impl FormatValidation {
    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Central registry for format readers
pub struct FormatRegistry {
    readers: Vec<Box<dyn FormatReader>>,
}

impl FormatRegistry {
    /// Create a new empty format registry
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// Registry with the GeoJSON, Shapefile and CSV readers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(GeoJsonReader));
        registry.register(Box::new(ShapefileReader));
        registry.register(Box::new(CsvReader::new()));
        registry
    }

    /// Register a format reader
    pub fn register(&mut self, reader: Box<dyn FormatReader>) {
        self.readers.push(reader);
    }

    /// Detect format and return appropriate reader
    pub fn detect_format(&self, path: &Path) -> Result<&dyn FormatReader> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| GeoframeError::UnsupportedFormat {
                extension: "none".to_string(),
                supported: self.supported_formats(),
            })?;

        self.readers
            .iter()
            .find(|r| r.supported_extensions().contains(&extension.as_str()))
            .map(|r| r.as_ref())
            .ok_or_else(|| GeoframeError::UnsupportedFormat {
                extension,
                supported: self.supported_formats(),
            })
    }

    /// Detect the format, validate the file, read it and apply the
    /// geometry validity policy
    pub fn load(&self, path: &Path, validity: ValidityMode) -> Result<FeatureCollection> {
        apply_validity(self.read(path)?, validity)
    }

    /// Detect the format, validate the file and read it with every geometry
    /// as stored, valid or not
    pub fn read(&self, path: &Path) -> Result<FeatureCollection> {
        let reader = self.detect_format(path)?;

        let validation = reader.validate(path)?;
        for warning in &validation.warnings {
            tracing::warn!("{}: {}", path.display(), warning);
        }
        validation::FormatValidator::ensure_valid(&validation, reader.format_name())?;

        let collection = reader.read(path)?;
        tracing::debug!(
            "Read {} features from {} ({}), CRS {}",
            collection.features().len(),
            path.display(),
            reader.format_name(),
            collection.crs().map(|c| c.to_string()).unwrap_or_else(|| "none".to_string())
        );

        Ok(collection)
    }

    /// Get list of all supported format extensions
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions())
            .map(|s| s.to_string())
            .collect()
    }

    /// Get all registered readers
    pub fn readers(&self) -> &[Box<dyn FormatReader>] {
        &self.readers
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
