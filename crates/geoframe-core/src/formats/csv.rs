//! CSV reader for attribute tables and point coordinates

use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::error::{GeoframeError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{FormatReader, FormatValidation};
use crate::models::{Column, ColumnType, Crs, Feature, FeatureCollection, Schema, Table, Value};

/// CSV reader.
///
/// Column types are inferred from the raw cells unless overridden with
/// [`with_dtype`](Self::with_dtype). Codes such as FIPS or GEOID must be
/// overridden to text, otherwise "001" is read as the integer 1 and will
/// not join against a text key. Empty cells are null.
#[derive(Debug, Clone)]
pub struct CsvReader {
    dtypes: HashMap<String, ColumnType>,
    xy: Option<(String, String)>,
    crs: Option<Crs>,
    delimiter: u8,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self { dtypes: HashMap::new(), xy: None, crs: None, delimiter: b',' }
    }

    /// Force a column's type instead of inferring it
    pub fn with_dtype(mut self, column: impl Into<String>, dtype: ColumnType) -> Self {
        self.dtypes.insert(column.into(), dtype);
        self
    }

    /// Build point geometries from two coordinate columns
    pub fn with_xy(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.xy = Some((x.into(), y.into()));
        self
    }

    /// CRS of the coordinate columns. CSV carries no CRS metadata of its own.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read a plain attribute table
    pub fn read_table(&self, path: &Path) -> Result<Table> {
        let file = std::fs::File::open(path)?;
        self.parse_table(file)
    }

    /// Parse a plain attribute table from any reader
    pub fn parse_table<R: io::Read>(&self, input: R) -> Result<Table> {
        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(input);

        let names: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut raw: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            raw.push(record.iter().map(|cell| cell.trim().to_string()).collect());
        }

        for name in self.dtypes.keys() {
            if !names.contains(name) {
                return Err(GeoframeError::missing_column(name.clone()));
            }
        }

        let columns: Vec<Column> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let dtype = self
                    .dtypes
                    .get(name)
                    .copied()
                    .unwrap_or_else(|| infer_column(raw.iter().map(|row| row[idx].as_str())));
                Column::new(name.clone(), dtype)
            })
            .collect();

        let rows = raw
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&columns)
                    .map(|(cell, column)| parse_cell(cell, column))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Table::new(Schema::new(columns)?, rows)
    }
}

impl FormatReader for CsvReader {
    fn read(&self, path: &Path) -> Result<FeatureCollection> {
        let table = self.read_table(path)?;

        match (&self.xy, &self.crs) {
            (Some((x, y)), Some(crs)) => FeatureCollection::from_xy(&table, x, y, crs.clone()),
            (Some(_), None) => Err(GeoframeError::MissingCrs {
                operation: format!("building points from {}", path.display()),
            }),
            (None, crs) => {
                let (schema, rows) = table.into_parts();
                let features = rows.into_iter().map(Feature::without_geometry).collect();
                FeatureCollection::new(crs.clone(), schema, features)
            }
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["csv", "tsv", "txt"]
    }

    fn format_name(&self) -> &str {
        "CSV"
    }

    fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }
        Ok(FormatValidator::validate_csv_header(path, self.delimiter))
    }
}

fn csv_error(e: ::csv::Error) -> GeoframeError {
    GeoframeError::FormatError { format: "CSV".to_string(), message: e.to_string() }
}

/// Narrowest type every non-empty cell parses as
fn infer_column<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut dtype: Option<ColumnType> = None;
    for cell in cells.filter(|c| !c.is_empty()) {
        let cell_type = if cell.parse::<i64>().is_ok() {
            ColumnType::Int
        } else if cell.parse::<f64>().is_ok() {
            ColumnType::Float
        } else if parse_bool(cell).is_some() {
            ColumnType::Bool
        } else {
            return ColumnType::Text;
        };
        dtype = Some(dtype.map_or(cell_type, |d| d.widen(cell_type)));
        if dtype == Some(ColumnType::Text) {
            return ColumnType::Text;
        }
    }
    dtype.unwrap_or(ColumnType::Text)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_cell(cell: &str, column: &Column) -> Result<Value> {
    if cell.is_empty() {
        return Ok(Value::Null);
    }

    let mismatch = || GeoframeError::TypeMismatch {
        column: column.name.clone(),
        expected: column.dtype.to_string(),
        found: format!("'{}'", cell),
    };

    match column.dtype {
        ColumnType::Text => Ok(Value::Text(cell.to_string())),
        ColumnType::Int => cell.parse().map(Value::Int).map_err(|_| mismatch()),
        ColumnType::Float => cell.parse().map(Value::Float).map_err(|_| mismatch()),
        ColumnType::Bool => parse_bool(cell).map(Value::Bool).ok_or_else(mismatch),
    }
}
