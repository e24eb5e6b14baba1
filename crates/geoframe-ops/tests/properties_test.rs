use geoframe_core::{ColumnType, Crs, Feature, FeatureCollection, Geometry, Schema, Table, Tabular, Value};
use geoframe_geo::Predicate;
use geoframe_ops::{groupby, join_tables, Aggregation, JoinHow, JoinKey, SpatialRelater, Suffixes};
use proptest::prelude::*;

fn key_table(keys: &[Option<i64>]) -> Table {
    let schema = Schema::of(&[("k", ColumnType::Int)]).unwrap();
    let rows = keys.iter().map(|k| vec![k.map(Value::Int).unwrap_or(Value::Null)]).collect();
    Table::new(schema, rows).unwrap()
}

fn keys() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::weighted(0.9, 0..5i64), 0..12)
}

fn collection(geometries: Vec<Geometry>) -> FeatureCollection {
    let schema = Schema::default();
    let features = geometries.into_iter().map(|g| Feature::new(g, vec![])).collect();
    FeatureCollection::new(Some(Crs::nad83_utm(10)), schema, features).unwrap()
}

fn points() -> impl Strategy<Value = Vec<Geometry>> {
    prop::collection::vec((0.0..100.0f64, 0.0..100.0f64), 0..20)
        .prop_map(|coords| coords.into_iter().map(|(x, y)| Geometry::point(x.round(), y.round())).collect())
}

fn boxes() -> impl Strategy<Value = Vec<Geometry>> {
    prop::collection::vec((0.0..90.0f64, 0.0..90.0f64, 1.0..30.0f64), 0..8).prop_map(|specs| {
        specs
            .into_iter()
            .map(|(x, y, size)| Geometry::rect([x.round(), y.round()], [(x + size).round(), (y + size).round()]))
            .collect()
    })
}

fn predicates() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        Just(Predicate::Intersects),
        Just(Predicate::Within),
        Just(Predicate::Contains),
        (0.0..15.0f64).prop_map(Predicate::DistanceWithin),
    ]
}

proptest! {
    #[test]
    fn prop_inner_join_counts_equal_key_pairs(left in keys(), right in keys()) {
        let expected = left
            .iter()
            .flatten()
            .map(|l| right.iter().flatten().filter(|r| *r == l).count())
            .sum::<usize>();

        let out = join_tables(&key_table(&left), &key_table(&right), &JoinKey::on("k"), JoinHow::Inner, &Suffixes::default())
            .unwrap();
        prop_assert_eq!(out.len(), expected);
    }

    #[test]
    fn prop_left_join_keeps_every_left_row(left in keys(), right in keys()) {
        let out = join_tables(&key_table(&left), &key_table(&right), &JoinKey::on("k"), JoinHow::Left, &Suffixes::default())
            .unwrap();
        prop_assert!(out.len() >= left.len());
    }

    #[test]
    fn prop_group_counts_sum_to_non_null_rows(input in keys()) {
        let counts = groupby(&key_table(&input), &Aggregation::count("k")).unwrap();
        let total: i64 = counts.rows().iter().filter_map(|row| match row[1] {
            Value::Int(n) => Some(n),
            _ => None,
        }).sum();
        prop_assert_eq!(total as usize, input.iter().flatten().count());
    }

    #[test]
    fn prop_index_matches_brute_force(
        left in points(),
        right in boxes(),
        predicate in predicates(),
        tolerance in prop_oneof![Just(0.0), 0.0..2.0f64],
    ) {
        let left = collection(left);
        let right = collection(right);
        let relater = SpatialRelater::new(predicate).with_snap_tolerance(tolerance);

        let indexed = relater.with_index(true).relate(&left, &right).unwrap();
        let brute = relater.with_index(false).relate(&left, &right).unwrap();
        prop_assert_eq!(indexed, brute);
    }
}
