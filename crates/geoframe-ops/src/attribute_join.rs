//! Key-equality joins between a feature collection (or table) and a table.

use std::collections::HashMap;

use geoframe_core::error::Result;
use geoframe_core::models::{Feature, FeatureCollection, KeyValue, Row, Suffixes, Table, Tabular};

use crate::layout::RowLayout;
use crate::models::{JoinHow, JoinKey};

/// Output rows of a join, each with the left row it came from
struct JoinedRows {
    layout: RowLayout,
    rows: Vec<(Option<usize>, Row)>,
}

/// Join a plain table onto a feature collection.
///
/// Output geometry is the left geometry; rows that exist only on the right
/// have no geometry. The CRS tag is carried over from the left.
pub fn attribute_join(
    left: &FeatureCollection,
    right: &Table,
    key: &JoinKey,
    how: JoinHow,
    suffixes: &Suffixes,
) -> Result<FeatureCollection> {
    let joined = join_rows(left, right, key, how, suffixes)?;
    let features = joined
        .rows
        .into_iter()
        .map(|(left_idx, row)| Feature {
            geometry: left_idx.and_then(|i| left.features()[i].geometry.clone()),
            attributes: row,
        })
        .collect();

    FeatureCollection::new(left.crs().cloned(), joined.layout.schema().clone(), features)
}

/// Join two plain tables
pub fn join_tables(
    left: &Table,
    right: &Table,
    key: &JoinKey,
    how: JoinHow,
    suffixes: &Suffixes,
) -> Result<Table> {
    let joined = join_rows(left, right, key, how, suffixes)?;
    let rows = joined.rows.into_iter().map(|(_, row)| row).collect();
    Table::new(joined.layout.schema().clone(), rows)
}

/// Positions of the rows carrying each non-null key, in row order
fn key_positions<T: Tabular>(table: &T, col: usize) -> HashMap<KeyValue, Vec<usize>> {
    let mut positions: HashMap<KeyValue, Vec<usize>> = HashMap::new();
    for idx in 0..table.len() {
        if let Some(key) = table.row(idx)[col].key() {
            positions.entry(key).or_default().push(idx);
        }
    }
    positions
}

fn join_rows<L: Tabular, R: Tabular>(
    left: &L,
    right: &R,
    key: &JoinKey,
    how: JoinHow,
    suffixes: &Suffixes,
) -> Result<JoinedRows> {
    let lk = left.schema().require(&key.left)?;
    let rk = right.schema().require(&key.right)?;
    let left_type = left.schema().column(lk).dtype;
    let right_type = right.schema().column(rk).dtype;

    // keys are compared type-exactly, so differing column types never match
    let comparable = left_type == right_type;
    if !comparable {
        tracing::warn!(
            left_key = %key.left,
            right_key = %key.right,
            left_type = %left_type,
            right_type = %right_type,
            "Join key types differ; no rows will match"
        );
    }

    let shared_key = (key.left == key.right && comparable).then_some((lk, rk));
    let layout = RowLayout::new(left.schema(), right.schema(), shared_key, None, suffixes)?;

    let mut rows = Vec::new();
    if how == JoinHow::Right {
        let left_positions = if comparable { key_positions(left, lk) } else { HashMap::new() };
        for j in 0..right.len() {
            let matches = right.row(j)[rk].key().and_then(|k| left_positions.get(&k));
            match matches {
                Some(matches) => {
                    for &i in matches {
                        rows.push((Some(i), layout.combine(Some(left.row(i)), Some(right.row(j)), None)));
                    }
                }
                None => rows.push((None, layout.combine(None, Some(right.row(j)), None))),
            }
        }
    } else {
        let right_positions = if comparable { key_positions(right, rk) } else { HashMap::new() };
        let mut right_matched = vec![false; right.len()];
        for i in 0..left.len() {
            let matches = left.row(i)[lk].key().and_then(|k| right_positions.get(&k));
            match matches {
                Some(matches) => {
                    for &j in matches {
                        right_matched[j] = true;
                        rows.push((Some(i), layout.combine(Some(left.row(i)), Some(right.row(j)), None)));
                    }
                }
                None if how.keeps_unmatched_left() => {
                    rows.push((Some(i), layout.combine(Some(left.row(i)), None, None)))
                }
                None => {}
            }
        }
        if how.keeps_unmatched_right() {
            for (j, _) in right_matched.iter().enumerate().filter(|(_, matched)| !**matched) {
                rows.push((None, layout.combine(None, Some(right.row(j)), None)));
            }
        }
    }

    tracing::debug!(
        how = %how,
        left_rows = left.len(),
        right_rows = right.len(),
        output_rows = rows.len(),
        "Attribute join complete"
    );
    Ok(JoinedRows { layout, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoframe_core::models::{ColumnType, Crs, Geometry, Schema, Value};
    use geoframe_core::GeoframeError;

    fn tracts() -> FeatureCollection {
        let schema = Schema::of(&[("GEOID", ColumnType::Text), ("name", ColumnType::Text)]).unwrap();
        let features = ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let x = i as f64 * 10.0;
                Feature::new(
                    Geometry::rect([x, 0.0], [x + 10.0, 10.0]),
                    vec![Value::text(*id), Value::text(format!("tract {}", id))],
                )
            })
            .collect();
        FeatureCollection::new(Some(Crs::nad83_utm(10)), schema, features).unwrap()
    }

    fn income() -> Table {
        let schema = Schema::of(&[
            ("GEOID", ColumnType::Text),
            ("name", ColumnType::Text),
            ("income", ColumnType::Int),
        ])
        .unwrap();
        Table::new(
            schema,
            vec![
                vec!["A".into(), "a".into(), Value::Int(50)],
                vec!["A".into(), "a2".into(), Value::Int(55)],
                vec!["D".into(), "d".into(), Value::Int(70)],
                vec![Value::Null, "n".into(), Value::Int(1)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_inner_join_one_to_many() {
        let out =
            attribute_join(&tracts(), &income(), &JoinKey::on("GEOID"), JoinHow::Inner, &Suffixes::default())
                .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.schema().names(), vec!["GEOID", "name_left", "name_right", "income"]);
        assert_eq!(out.value(1, "income").unwrap(), &Value::Int(55));
        assert!(out.features().iter().all(|f| f.geometry.is_some()));
        assert_eq!(out.crs().unwrap().epsg, 26910);
    }

    #[test]
    fn test_left_join_keeps_unmatched() {
        let out =
            attribute_join(&tracts(), &income(), &JoinKey::on("GEOID"), JoinHow::Left, &Suffixes::default())
                .unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out.value(2, "GEOID").unwrap(), &Value::text("B"));
        assert_eq!(out.value(2, "income").unwrap(), &Value::Null);
    }

    #[test]
    fn test_outer_join_appends_right_only_rows() {
        let out =
            attribute_join(&tracts(), &income(), &JoinKey::on("GEOID"), JoinHow::Outer, &Suffixes::default())
                .unwrap();
        // A twice, B, C, then D and the null-key row
        assert_eq!(out.len(), 6);
        assert_eq!(out.value(4, "GEOID").unwrap(), &Value::text("D"));
        assert!(out.features()[4].geometry.is_none());
        assert_eq!(out.value(5, "GEOID").unwrap(), &Value::Null);
    }

    #[test]
    fn test_right_join_follows_right_order() {
        let out =
            attribute_join(&tracts(), &income(), &JoinKey::on("GEOID"), JoinHow::Right, &Suffixes::default())
                .unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out.value(1, "name_right").unwrap(), &Value::text("a2"));
        assert_eq!(out.value(2, "GEOID").unwrap(), &Value::text("D"));
        assert_eq!(out.value(2, "name_left").unwrap(), &Value::Null);
    }

    #[test]
    fn test_missing_key_column() {
        let result = attribute_join(
            &tracts(),
            &income(),
            &JoinKey::pair("FIPS", "GEOID"),
            JoinHow::Inner,
            &Suffixes::default(),
        );
        assert!(matches!(result, Err(GeoframeError::Schema { .. })));
    }

    #[test]
    fn test_text_key_never_matches_integer_key() {
        let codes = Table::new(
            Schema::of(&[("code", ColumnType::Text)]).unwrap(),
            vec![vec![Value::text("001")]],
        )
        .unwrap();
        let numbers = Table::new(
            Schema::of(&[("code", ColumnType::Int), ("v", ColumnType::Int)]).unwrap(),
            vec![vec![Value::Int(1), Value::Int(9)]],
        )
        .unwrap();

        let inner =
            join_tables(&codes, &numbers, &JoinKey::on("code"), JoinHow::Inner, &Suffixes::default())
                .unwrap();
        assert!(inner.is_empty());

        let outer =
            join_tables(&codes, &numbers, &JoinKey::on("code"), JoinHow::Outer, &Suffixes::default())
                .unwrap();
        assert_eq!(outer.len(), 2);
        assert_eq!(outer.schema().names(), vec!["code_left", "code_right", "v"]);
    }
}
