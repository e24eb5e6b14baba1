//! Groupby and dissolve aggregation.
//!
//! Rows are partitioned by the non-null values of the grouping key. Groups
//! come out in ascending key order; rows with a null key belong to no group.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use geoframe_core::error::{GeoframeError, Result};
use geoframe_core::models::{
    Column, ColumnType, Feature, FeatureCollection, Geometry, KeyValue, Schema, Table, Tabular,
    Value,
};
use geoframe_geo::overlay::union_all;

use crate::models::{Aggregation, Reducer};

/// Member row positions of every group
fn partition<T: Tabular>(input: &T, key_col: usize) -> BTreeMap<KeyValue, Vec<usize>> {
    let mut groups: BTreeMap<KeyValue, Vec<usize>> = BTreeMap::new();
    let mut null_keys = 0usize;
    for idx in 0..input.len() {
        match input.row(idx)[key_col].key() {
            Some(key) => groups.entry(key).or_default().push(idx),
            None => null_keys += 1,
        }
    }
    if null_keys > 0 {
        tracing::debug!(rows = null_keys, "Rows with a null grouping key were skipped");
    }
    groups
}

/// Validated column positions and the output schema for an aggregation
struct Plan {
    key_col: usize,
    target_col: Option<usize>,
    schema: Schema,
}

fn plan(schema: &Schema, agg: &Aggregation) -> Result<Plan> {
    let key_col = schema
        .index_of(&agg.by)
        .ok_or_else(|| GeoframeError::Key { column: agg.by.clone() })?;

    let target_col = match &agg.target {
        Some(target) => Some(schema.require(target)?),
        None if agg.reducer == Reducer::Count => None,
        None => {
            return Err(GeoframeError::Schema {
                column: agg.by.clone(),
                reason: format!("reducer '{}' needs a target column", agg.reducer),
            })
        }
    };

    let output_type = match (agg.reducer, target_col) {
        (Reducer::Count, _) => ColumnType::Int,
        (_, None) => ColumnType::Int,
        (reducer, Some(col)) => {
            let column = schema.column(col);
            match reducer {
                Reducer::Sum | Reducer::Mean if !column.dtype.is_numeric() => {
                    return Err(GeoframeError::TypeMismatch {
                        column: column.name.clone(),
                        expected: "Int or Float".to_string(),
                        found: column.dtype.to_string(),
                    })
                }
                Reducer::Mean => ColumnType::Float,
                _ => column.dtype,
            }
        }
    };

    let schema = Schema::new(vec![
        schema.column(key_col).clone(),
        Column::new(agg.output_column(), output_type),
    ])?;
    Ok(Plan { key_col, target_col, schema })
}

/// Apply a reducer to the member values of one group
pub fn reduce(reducer: Reducer, values: &[&Value]) -> Value {
    if reducer == Reducer::Count {
        return Value::Int(values.len() as i64);
    }

    let present: Vec<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();
    if present.is_empty() {
        return Value::Null;
    }

    match reducer {
        Reducer::Count => Value::Int(values.len() as i64),
        Reducer::Sum => {
            if present.iter().all(|v| matches!(v, Value::Int(_))) {
                let total = present
                    .iter()
                    .filter_map(|v| match v {
                        Value::Int(i) => Some(*i),
                        _ => None,
                    })
                    .fold(0i64, i64::saturating_add);
                Value::Int(total)
            } else {
                Value::Float(present.iter().filter_map(|v| v.as_f64()).sum())
            }
        }
        Reducer::Mean => {
            let numbers: Vec<f64> = present.iter().filter_map(|v| v.as_f64()).collect();
            if numbers.is_empty() {
                Value::Null
            } else {
                Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64)
            }
        }
        Reducer::Min => extreme(&present, Ordering::Less),
        Reducer::Max => extreme(&present, Ordering::Greater),
    }
}

fn extreme(values: &[&Value], wanted: Ordering) -> Value {
    values
        .iter()
        .filter_map(|v| v.key().map(|k| (k, *v)))
        .reduce(|best, next| if next.0.cmp(&best.0) == wanted { next } else { best })
        .map(|(_, v)| v.clone())
        .unwrap_or(Value::Null)
}

fn reduced_row<T: Tabular>(input: &T, plan: &Plan, agg: &Aggregation, key: &KeyValue, members: &[usize]) -> Vec<Value> {
    let values: Vec<&Value> = match plan.target_col {
        Some(col) => members.iter().map(|&i| &input.row(i)[col]).collect(),
        None => members.iter().map(|&i| &input.row(i)[plan.key_col]).collect(),
    };
    vec![key.to_value(), reduce(agg.reducer, &values)]
}

/// One row per distinct key with the reduced value, as a plain table
pub fn groupby<T: Tabular>(input: &T, agg: &Aggregation) -> Result<Table> {
    let plan = plan(input.schema(), agg)?;
    let groups = partition(input, plan.key_col);

    let rows = groups
        .iter()
        .map(|(key, members)| reduced_row(input, &plan, agg, key, members))
        .collect();

    tracing::debug!(by = %agg.by, reducer = %agg.reducer, groups = groups.len(), "Groupby complete");
    Table::new(plan.schema, rows)
}

/// One feature per distinct key whose geometry is the union of the group.
///
/// A group with a single geometry keeps it unchanged; a group whose members
/// all lack geometry gets none.
pub fn dissolve(input: &FeatureCollection, agg: &Aggregation) -> Result<FeatureCollection> {
    let plan = plan(input.schema(), agg)?;
    let groups = partition(input, plan.key_col);

    let features = groups
        .iter()
        .map(|(key, members)| {
            let geometries: Vec<&Geometry> = members
                .iter()
                .filter_map(|&i| input.features()[i].geometry.as_ref())
                .collect();
            Feature {
                geometry: union_all(&geometries),
                attributes: reduced_row(input, &plan, agg, key, members),
            }
        })
        .collect();

    tracing::debug!(by = %agg.by, reducer = %agg.reducer, groups = groups.len(), "Dissolve complete");
    FeatureCollection::new(input.crs().cloned(), plan.schema, features)
}
