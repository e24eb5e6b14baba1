//! Plain attribute tables (no geometry).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::schema::{Column, ColumnType, Schema};
use super::value::{KeyValue, Value};
use crate::error::{GeoframeError, Result};

/// One row of attribute values, aligned with a [`Schema`]
pub type Row = Vec<Value>;

/// Read access shared by [`Table`] and feature collections
pub trait Tabular {
    fn schema(&self) -> &Schema;

    fn row(&self, idx: usize) -> &Row;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of a named column in one row
    fn value(&self, idx: usize, column: &str) -> Result<&Value> {
        let col = self.schema().require(column)?;
        Ok(&self.row(idx)[col])
    }

    /// All values of a named column, in row order
    fn column_values(&self, column: &str) -> Result<Vec<&Value>> {
        let col = self.schema().require(column)?;
        Ok((0..self.len()).map(|i| &self.row(i)[col]).collect())
    }
}

/// Typed attribute table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    /// Create a table, checking every row against the schema
    pub fn new(schema: Schema, rows: Vec<Row>) -> Result<Self> {
        let rows = rows.into_iter().map(|row| schema.conform(row)).collect::<Result<_>>()?;
        Ok(Self { schema, rows })
    }

    pub fn empty(schema: Schema) -> Self {
        Self { schema, rows: Vec::new() }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_parts(self) -> (Schema, Vec<Row>) {
        (self.schema, self.rows)
    }

    /// Keep only the named columns, in the given order
    pub fn select(&self, columns: &[&str]) -> Result<Table> {
        let (schema, indices) = project_schema(&self.schema, columns)?;
        let rows = self.rows.iter().map(|row| indices.iter().map(|&i| row[i].clone()).collect());
        Ok(Table { schema, rows: rows.collect() })
    }

    /// Remove the named columns
    pub fn drop_columns(&self, columns: &[&str]) -> Result<Table> {
        for name in columns {
            self.schema.require(name)?;
        }
        let keep: Vec<&str> =
            self.schema.names().into_iter().filter(|n| !columns.contains(n)).collect();
        self.select(&keep)
    }

    /// Keep rows for which the predicate holds
    pub fn filter(&self, mut predicate: impl FnMut(&Schema, &Row) -> bool) -> Table {
        let rows = self.rows.iter().filter(|row| predicate(&self.schema, row)).cloned().collect();
        Table { schema: self.schema.clone(), rows }
    }

    /// Replace nulls in one column
    pub fn fill_null(&self, column: &str, fill: Value) -> Result<Table> {
        let col = self.schema.require(column)?;
        let fill = checked_fill(self.schema.column(col), fill)?;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                if row[col].is_null() {
                    row[col] = fill.clone();
                }
                row
            })
            .collect();
        Ok(Table { schema: self.schema.clone(), rows })
    }

    /// Count occurrences of each non-null value, most frequent first
    pub fn value_counts(&self, column: &str) -> Result<Table> {
        let col = self.schema.require(column)?;
        let mut counts: BTreeMap<KeyValue, i64> = BTreeMap::new();
        for key in self.rows.iter().filter_map(|row| row[col].key()) {
            *counts.entry(key).or_default() += 1;
        }

        let mut entries: Vec<(KeyValue, i64)> = counts.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let schema = Schema::new(vec![
            self.schema.column(col).clone(),
            Column::new("count", ColumnType::Int),
        ])?;
        let rows = entries.into_iter().map(|(k, n)| vec![k.to_value(), Value::Int(n)]).collect();
        Ok(Table { schema, rows })
    }
}

impl Tabular for Table {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn row(&self, idx: usize) -> &Row {
        &self.rows[idx]
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Sub-schema for a column selection, with the source indices
pub(crate) fn project_schema(schema: &Schema, columns: &[&str]) -> Result<(Schema, Vec<usize>)> {
    let indices = columns.iter().map(|name| schema.require(name)).collect::<Result<Vec<_>>>()?;
    let projected = Schema::new(indices.iter().map(|&i| schema.column(i).clone()).collect())?;
    Ok((projected, indices))
}

pub(crate) fn checked_fill(column: &Column, fill: Value) -> Result<Value> {
    let fill = fill.widen_to(column.dtype);
    match fill.column_type() {
        Some(t) if t != column.dtype => Err(GeoframeError::TypeMismatch {
            column: column.name.clone(),
            expected: column.dtype.to_string(),
            found: t.to_string(),
        }),
        _ => Ok(fill),
    }
}
