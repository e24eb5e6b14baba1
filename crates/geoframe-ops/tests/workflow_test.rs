use geoframe_core::{ColumnType, Crs, Feature, FeatureCollection, GeoframeError, Geometry, Schema, Tabular, Value};
use geoframe_ops::{
    attribute_join, dissolve, groupby, spatial_join, Aggregation, JoinHow, JoinKey, OpsOptions,
    Pipeline, Reducer, SpatialJoinHow, Suffixes,
};
use geoframe_geo::Predicate;

fn utm() -> Crs {
    Crs::nad83_utm(10)
}

fn tracts() -> FeatureCollection {
    let schema = Schema::of(&[("GEOID", ColumnType::Text), ("pop", ColumnType::Int)]).unwrap();
    FeatureCollection::new(
        Some(utm()),
        schema,
        vec![
            Feature::new(Geometry::rect([0.0, 0.0], [100.0, 100.0]), vec!["A".into(), Value::Int(1200)]),
            Feature::new(Geometry::rect([100.0, 0.0], [200.0, 100.0]), vec!["B".into(), Value::Int(800)]),
            Feature::new(Geometry::rect([200.0, 0.0], [300.0, 100.0]), vec!["C".into(), Value::Int(300)]),
        ],
    )
    .unwrap()
}

fn schools() -> FeatureCollection {
    let schema = Schema::of(&[("Site", ColumnType::Text)]).unwrap();
    let points = [
        ("Oak", [10.0, 10.0]),
        ("Elm", [50.0, 90.0]),
        ("Ash", [150.0, 50.0]),
        ("Fir", [500.0, 50.0]),
        ("Yew", [150.0, -40.0]),
    ];
    FeatureCollection::new(
        Some(utm()),
        schema,
        points
            .iter()
            .map(|(name, [x, y])| Feature::new(Geometry::point(*x, *y), vec![Value::text(*name)]))
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_points_in_tracts_scenario() {
    let joined = spatial_join(
        &schools(),
        &tracts(),
        Predicate::Within,
        SpatialJoinHow::Left,
        &OpsOptions::default(),
    )
    .unwrap();

    assert_eq!(joined.len(), 5);
    let geoids = joined.column_values("GEOID").unwrap();
    assert_eq!(geoids.iter().filter(|v| **v == &Value::text("A")).count(), 2);
    assert_eq!(geoids.iter().filter(|v| **v == &Value::text("B")).count(), 1);
    assert_eq!(geoids.iter().filter(|v| v.is_null()).count(), 2);

    let counts = dissolve(&joined, &Aggregation::count("GEOID")).unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts.row(0), &vec![Value::text("A"), Value::Int(2)]);
    assert_eq!(counts.row(1), &vec![Value::text("B"), Value::Int(1)]);
}

#[test]
fn test_zero_fill_for_tracts_without_points() {
    let joined = spatial_join(
        &schools(),
        &tracts(),
        Predicate::Within,
        SpatialJoinHow::Inner,
        &OpsOptions::default(),
    )
    .unwrap();
    let counts = groupby(&joined, &Aggregation::count("GEOID")).unwrap();

    let filled = attribute_join(&tracts(), &counts, &JoinKey::on("GEOID"), JoinHow::Left, &Suffixes::default())
        .unwrap()
        .fill_null("count", Value::Int(0))
        .unwrap();

    assert_eq!(filled.len(), 3);
    assert_eq!(filled.value(0, "count").unwrap(), &Value::Int(2));
    assert_eq!(filled.value(1, "count").unwrap(), &Value::Int(1));
    assert_eq!(filled.value(2, "count").unwrap(), &Value::Int(0));
    assert!(filled.features().iter().all(|f| f.geometry.is_some()));
}

#[test]
fn test_point_on_buffer_boundary_is_within() {
    let schema = Schema::of(&[("road", ColumnType::Text)]).unwrap();
    let road = FeatureCollection::new(
        Some(utm()),
        schema,
        vec![Feature::new(Geometry::line_string(vec![[0.0, 0.0], [1000.0, 0.0]]), vec!["I-80".into()])],
    )
    .unwrap();
    let corridor = geoframe_ops::geometry_ops::buffer(&road, 200.0).unwrap();

    let schema = Schema::of(&[("id", ColumnType::Int)]).unwrap();
    let homes = FeatureCollection::new(
        Some(utm()),
        schema.clone(),
        vec![
            Feature::new(Geometry::point(500.0, 200.0), vec![Value::Int(1)]),
            Feature::new(Geometry::point(500.0, 260.0), vec![Value::Int(2)]),
            Feature::new(Geometry::point(1200.0, 0.0), vec![Value::Int(3)]),
            Feature::new(Geometry::point(-200.0, 0.0), vec![Value::Int(4)]),
        ],
    )
    .unwrap();

    let near = spatial_join(&homes, &corridor, Predicate::Within, SpatialJoinHow::Inner, &OpsOptions::default())
        .unwrap();
    let ids: Vec<&Value> = (0..near.len()).map(|i| near.value(i, "id").unwrap()).collect();
    assert_eq!(ids, vec![&Value::Int(1), &Value::Int(3), &Value::Int(4)]);
    assert_eq!(near.value(0, "road").unwrap(), &Value::text("I-80"));

    let half = std::f64::consts::FRAC_1_SQRT_2 * 200.0;
    let diagonal = FeatureCollection::new(
        Some(utm()),
        schema,
        vec![Feature::new(Geometry::point(1000.0 + half, half), vec![Value::Int(5)])],
    )
    .unwrap();

    // the buffer overlay rounds arc vertices off the exact circle by ~1e-7
    let options = OpsOptions { snap_tolerance: 1e-6, ..Default::default() };
    let cap = spatial_join(&diagonal, &corridor, Predicate::Within, SpatialJoinHow::Inner, &options).unwrap();
    assert_eq!(cap.len(), 1);
}

#[test]
fn test_text_code_never_matches_integer_code() {
    let schema = Schema::of(&[("FIPS", ColumnType::Text)]).unwrap();
    let counties = FeatureCollection::new(
        Some(utm()),
        schema,
        vec![Feature::new(Geometry::point(0.0, 0.0), vec![Value::text("001")])],
    )
    .unwrap();
    let stats = geoframe_core::Table::new(
        Schema::of(&[("FIPS", ColumnType::Int), ("rate", ColumnType::Float)]).unwrap(),
        vec![vec![Value::Int(1), Value::Float(0.5)]],
    )
    .unwrap();

    let inner = attribute_join(&counties, &stats, &JoinKey::on("FIPS"), JoinHow::Inner, &Suffixes::default())
        .unwrap();
    assert!(inner.is_empty());
}

#[test]
fn test_dissolve_sum_is_idempotent() {
    let agg = Aggregation::new("GEOID", "pop", Reducer::Sum);
    let once = dissolve(&tracts(), &agg).unwrap();
    let twice = dissolve(&once, &agg).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_spatial_join_rejects_mismatched_crs() {
    let wgs = schools().override_crs(Crs::wgs84());
    let result = spatial_join(&wgs, &tracts(), Predicate::Within, SpatialJoinHow::Left, &OpsOptions::default());
    assert!(matches!(result, Err(GeoframeError::CrsMismatch { .. })));
}

#[test]
fn test_pipeline_workflow() {
    let pipeline = Pipeline::new(schools())
        .spatial_join(&tracts(), Predicate::Within, SpatialJoinHow::Inner)
        .unwrap()
        .dissolve(&Aggregation::new("GEOID", "pop", Reducer::Max))
        .unwrap();

    assert_eq!(pipeline.steps().len(), 2);
    assert_eq!(pipeline.steps()[0].rows_out, 3);
    assert_eq!(pipeline.steps()[1].rows_out, 2);

    let out = pipeline.finish();
    assert_eq!(out.value(0, "pop").unwrap(), &Value::Int(1200));
    assert!(matches!(out.features()[0].geometry, Some(Geometry::MultiPoint { .. })));
}
