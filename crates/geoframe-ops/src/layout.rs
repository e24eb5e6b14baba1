//! Output column layout shared by attribute and spatial joins.

use geoframe_core::error::Result;
use geoframe_core::models::{Column, ColumnType, Row, Schema, Suffixes, Value};

/// How left and right rows are combined into one output row.
///
/// Left columns come first, then the optional index column, then the right
/// columns. A key column shared by name and type appears once, at its left
/// position. Any other name present on both sides gets the configured
/// suffixes.
#[derive(Debug, Clone)]
pub(crate) struct RowLayout {
    schema: Schema,
    left_width: usize,
    shared_key: Option<(usize, usize)>,
    has_index: bool,
    right_columns: Vec<usize>,
}

impl RowLayout {
    pub(crate) fn new(
        left: &Schema,
        right: &Schema,
        shared_key: Option<(usize, usize)>,
        index_column: Option<&str>,
        suffixes: &Suffixes,
    ) -> Result<Self> {
        let right_columns: Vec<usize> = (0..right.len())
            .filter(|&j| shared_key.map(|(_, rk)| rk != j).unwrap_or(true))
            .collect();
        let right_names: Vec<&str> =
            right_columns.iter().map(|&j| right.column(j).name.as_str()).collect();

        let mut columns = Vec::with_capacity(left.len() + right_columns.len() + 1);
        for column in left.columns() {
            let name = if right_names.contains(&column.name.as_str()) {
                format!("{}{}", column.name, suffixes.left)
            } else {
                column.name.clone()
            };
            columns.push(Column::new(name, column.dtype));
        }
        if let Some(index) = index_column {
            columns.push(Column::new(index, ColumnType::Int));
        }
        for &j in &right_columns {
            let column = right.column(j);
            let name = if left.contains(&column.name) {
                format!("{}{}", column.name, suffixes.right)
            } else {
                column.name.clone()
            };
            columns.push(Column::new(name, column.dtype));
        }

        Ok(Self {
            schema: Schema::new(columns)?,
            left_width: left.len(),
            shared_key,
            has_index: index_column.is_some(),
            right_columns,
        })
    }

    pub(crate) fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Build an output row. A missing side contributes nulls, except that a
    /// shared key column is filled from the right row.
    pub(crate) fn combine(&self, left: Option<&Row>, right: Option<&Row>, index: Option<usize>) -> Row {
        let mut row = Vec::with_capacity(self.schema.len());
        match left {
            Some(left) => row.extend(left.iter().cloned()),
            None => {
                row.resize(self.left_width, Value::Null);
                if let (Some((lk, rk)), Some(right)) = (self.shared_key, right) {
                    row[lk] = right[rk].clone();
                }
            }
        }
        if self.has_index {
            row.push(index.map(|i| Value::Int(i as i64)).unwrap_or(Value::Null));
        }
        match right {
            Some(right) => row.extend(self.right_columns.iter().map(|&j| right[j].clone())),
            None => row.extend(self.right_columns.iter().map(|_| Value::Null)),
        }
        row
    }
}
