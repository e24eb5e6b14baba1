//! Declared column schemas.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::Value;
use crate::error::{GeoframeError, Result};

/// Column value type. Every column is nullable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    Text,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::Float)
    }

    /// Smallest type able to hold values of both types
    pub fn widen(self, other: ColumnType) -> ColumnType {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnType::Int, ColumnType::Float) | (ColumnType::Float, ColumnType::Int) => {
                ColumnType::Float
            }
            _ => ColumnType::Text,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Bool => "bool",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        };
        f.write_str(name)
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self { name: name.into(), dtype }
    }
}

/// Ordered set of uniquely named columns
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut schema = Self::default();
        for column in columns {
            schema.push(column)?;
        }
        Ok(schema)
    }

    /// Build from `(name, type)` pairs
    pub fn of(columns: &[(&str, ColumnType)]) -> Result<Self> {
        Self::new(columns.iter().map(|(name, dtype)| Column::new(*name, *dtype)).collect())
    }

    /// Infer column types from observed values.
    ///
    /// Int and Float widen to Float, any other mix widens to Text. A column
    /// with only nulls is typed Text.
    pub fn infer(names: &[String], rows: &[Vec<Value>]) -> Result<Self> {
        let columns = names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let dtype = rows
                    .iter()
                    .filter_map(|row| row.get(idx).and_then(Value::column_type))
                    .reduce(ColumnType::widen)
                    .unwrap_or(ColumnType::Text);
                Column::new(name.clone(), dtype)
            })
            .collect();
        Self::new(columns)
    }

    pub fn push(&mut self, column: Column) -> Result<()> {
        if self.contains(&column.name) {
            return Err(GeoframeError::Schema {
                column: column.name,
                reason: "duplicate column name".to_string(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Index of a column that must exist
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| GeoframeError::missing_column(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn column(&self, idx: usize) -> &Column {
        &self.columns[idx]
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Check a row against the schema, widening ints stored in float columns
    pub fn conform(&self, row: Vec<Value>) -> Result<Vec<Value>> {
        if row.len() != self.columns.len() {
            return Err(GeoframeError::Schema {
                column: "<row>".to_string(),
                reason: format!("expected {} values, found {}", self.columns.len(), row.len()),
            });
        }

        row.into_iter()
            .zip(&self.columns)
            .map(|(value, column)| {
                let value = value.widen_to(column.dtype);
                match value.column_type() {
                    None => Ok(value),
                    Some(t) if t == column.dtype => Ok(value),
                    Some(t) => Err(GeoframeError::TypeMismatch {
                        column: column.name.clone(),
                        expected: column.dtype.to_string(),
                        found: t.to_string(),
                    }),
                }
            })
            .collect()
    }
}
