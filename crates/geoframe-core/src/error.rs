//! Error types for geoframe

use crate::models::{Crs, CrsUnits};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoframeError {
    // Schema errors
    #[error("Schema error on column '{column}': {reason}")]
    Schema { column: String, reason: String },

    #[error("Grouping key '{column}' not found")]
    Key { column: String },

    #[error("Type mismatch in column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    // CRS errors
    #[error("CRS mismatch: left has {left}, right has {right}. Reproject one side first")]
    CrsMismatch { left: String, right: String },

    #[error("No CRS set on input to {operation}. Call set_crs first")]
    MissingCrs { operation: String },

    #[error("{operation} requires a CRS with linear units, but {crs} {reason}")]
    Unit {
        crs: String,
        operation: String,
        reason: String,
    },

    #[error("Failed to reproject from {from} to {to}: {reason}")]
    Projection {
        from: String,
        to: String,
        reason: String,
    },

    // Geometry errors
    #[error("Invalid geometry at feature {feature_id}: {reason}")]
    InvalidGeometry {
        feature_id: String,
        reason: String,
    },

    // Format errors
    #[error("Unsupported format '.{extension}'. Supported: {}", supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },

    #[error("{format} error: {message}")]
    FormatError { format: String, message: String },

    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeoframeError {
    /// A measurement refused because `crs` has no linear units
    pub fn unit(crs: &Crs, operation: impl Into<String>) -> Self {
        let reason = match crs.units {
            CrsUnits::Degrees => "is in degrees. Reproject to a projected CRS first".to_string(),
            CrsUnits::Unknown => format!(
                "has unknown units: EPSG:{} is not in the built-in CRS table. \
                 Reproject to a listed metre or foot CRS such as a UTM zone",
                crs.epsg
            ),
            CrsUnits::Meters | CrsUnits::UsFeet => "is not linear".to_string(),
        };
        GeoframeError::Unit { crs: crs.to_string(), operation: operation.into(), reason }
    }

    /// Shorthand for a missing column
    pub fn missing_column(column: impl Into<String>) -> Self {
        GeoframeError::Schema {
            column: column.into(),
            reason: "column not found".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoframeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_error_names_the_cause() {
        let degrees = GeoframeError::unit(&Crs::wgs84(), "area").to_string();
        assert!(degrees.starts_with("area requires a CRS with linear units"));
        assert!(degrees.contains("degrees"));

        let unlisted = GeoframeError::unit(&Crs::from_epsg(27700), "buffer").to_string();
        assert!(unlisted.contains("unknown units"));
        assert!(unlisted.contains("EPSG:27700 is not in the built-in CRS table"));
    }
}
