//! geoframe core - domain models, configuration and file formats
//!
//! This crate holds the typed table and feature collection models shared by
//! the geometry and operations crates, plus the readers and writers that
//! move collections in and out of files.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod validation;

pub use error::{GeoframeError, Result};
pub use models::{
    Column, ColumnType, Crs, CrsUnits, Feature, FeatureCollection, Geometry, GeometryType,
    KeyValue, MatchPolicy, OpsOptions, Predicate, Row, Schema, Suffixes, Table, Tabular,
    ValidityMode, Value,
};
