//! Spatial joins: relater pairs turned into a combined collection.

use geoframe_core::error::Result;
use geoframe_core::models::{
    Feature, FeatureCollection, MatchPolicy, OpsOptions, Predicate, Tabular,
};

use crate::layout::RowLayout;
use crate::models::SpatialJoinHow;
use crate::relate::SpatialRelater;

/// Column holding the matched right row position (left and inner joins)
pub const INDEX_RIGHT: &str = "index_right";

/// Column holding the matched left row position (right joins)
pub const INDEX_LEFT: &str = "index_left";

/// Join the attributes of `right` onto `left` where the predicate holds.
///
/// Every matching pair yields one row unless the match policy is
/// [`MatchPolicy::First`], which keeps the lowest-index match per driving
/// row. Both sides must carry the same CRS; nothing is reprojected here.
pub fn spatial_join(
    left: &FeatureCollection,
    right: &FeatureCollection,
    predicate: Predicate,
    how: SpatialJoinHow,
    options: &OpsOptions,
) -> Result<FeatureCollection> {
    let relater = SpatialRelater::with_options(predicate, options);
    let crs = relater.check_inputs(left, right)?;
    let pairs = relater.relate(left, right)?;

    let index_column = match how {
        SpatialJoinHow::Right => INDEX_LEFT,
        _ => INDEX_RIGHT,
    };
    let layout =
        RowLayout::new(left.schema(), right.schema(), None, Some(index_column), &options.suffixes)?;

    let features = match how {
        SpatialJoinHow::Left | SpatialJoinHow::Inner => {
            let matches = group_matches(left.len(), pairs.iter().copied(), options.match_policy);
            let mut features = Vec::new();
            for (i, matched) in matches.into_iter().enumerate() {
                let geometry = &left.features()[i].geometry;
                if matched.is_empty() && how == SpatialJoinHow::Left {
                    features.push(Feature {
                        geometry: geometry.clone(),
                        attributes: layout.combine(Some(left.row(i)), None, None),
                    });
                }
                for j in matched {
                    features.push(Feature {
                        geometry: geometry.clone(),
                        attributes: layout.combine(Some(left.row(i)), Some(right.row(j)), Some(j)),
                    });
                }
            }
            features
        }
        SpatialJoinHow::Right => {
            let flipped = pairs.iter().map(|&(i, j)| (j, i));
            let matches = group_matches(right.len(), flipped, options.match_policy);
            let mut features = Vec::new();
            for (j, matched) in matches.into_iter().enumerate() {
                let geometry = &right.features()[j].geometry;
                if matched.is_empty() {
                    features.push(Feature {
                        geometry: geometry.clone(),
                        attributes: layout.combine(None, Some(right.row(j)), None),
                    });
                }
                for i in matched {
                    features.push(Feature {
                        geometry: geometry.clone(),
                        attributes: layout.combine(Some(left.row(i)), Some(right.row(j)), Some(i)),
                    });
                }
            }
            features
        }
    };

    tracing::debug!(
        how = %how,
        predicate = %predicate,
        pairs = pairs.len(),
        output_rows = features.len(),
        "Spatial join complete"
    );
    FeatureCollection::new(Some(crs), layout.schema().clone(), features)
}

/// Matches per driving row, ascending, trimmed by the match policy
fn group_matches(
    rows: usize,
    pairs: impl Iterator<Item = (usize, usize)>,
    policy: MatchPolicy,
) -> Vec<Vec<usize>> {
    let mut matches = vec![Vec::new(); rows];
    for (driver, other) in pairs {
        matches[driver].push(other);
    }
    for matched in &mut matches {
        matched.sort_unstable();
        if policy == MatchPolicy::First {
            matched.truncate(1);
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoframe_core::models::{ColumnType, Crs, Geometry, Schema, Value};

    fn zones() -> FeatureCollection {
        let schema = Schema::of(&[("zone", ColumnType::Text)]).unwrap();
        FeatureCollection::new(
            Some(Crs::nad83_utm(10)),
            schema,
            vec![
                Feature::new(Geometry::rect([0.0, 0.0], [10.0, 10.0]), vec![Value::text("west")]),
                Feature::new(Geometry::rect([10.0, 0.0], [20.0, 10.0]), vec![Value::text("east")]),
                Feature::new(Geometry::rect([50.0, 50.0], [60.0, 60.0]), vec![Value::text("far")]),
            ],
        )
        .unwrap()
    }

    fn wells() -> FeatureCollection {
        let schema = Schema::of(&[("well", ColumnType::Int)]).unwrap();
        FeatureCollection::new(
            Some(Crs::nad83_utm(10)),
            schema,
            vec![
                Feature::new(Geometry::point(10.0, 5.0), vec![Value::Int(1)]),
                Feature::new(Geometry::point(2.0, 2.0), vec![Value::Int(2)]),
                Feature::new(Geometry::point(30.0, 30.0), vec![Value::Int(3)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_left_join_multiplicity() {
        let out = spatial_join(&wells(), &zones(), Predicate::Within, SpatialJoinHow::Left, &OpsOptions::default())
            .unwrap();
        assert_eq!(out.schema().names(), vec!["well", "index_right", "zone"]);
        // well 1 sits on the shared edge and matches both zones
        assert_eq!(out.len(), 4);
        assert_eq!(out.value(0, "zone").unwrap(), &Value::text("west"));
        assert_eq!(out.value(1, "zone").unwrap(), &Value::text("east"));
        assert_eq!(out.value(3, "index_right").unwrap(), &Value::Null);
    }

    #[test]
    fn test_first_match_policy() {
        let options = OpsOptions { match_policy: MatchPolicy::First, ..Default::default() };
        let out = spatial_join(&wells(), &zones(), Predicate::Within, SpatialJoinHow::Inner, &options).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.value(0, "index_right").unwrap(), &Value::Int(0));
    }

    #[test]
    fn test_right_join_uses_right_geometry() {
        let out = spatial_join(&wells(), &zones(), Predicate::Within, SpatialJoinHow::Right, &OpsOptions::default())
            .unwrap();
        assert_eq!(out.schema().names(), vec!["well", "index_left", "zone"]);
        // west: wells 0 and 1, east: well 0, far: unmatched
        assert_eq!(out.len(), 4);
        assert_eq!(out.value(1, "index_left").unwrap(), &Value::Int(1));
        assert_eq!(out.features()[3].geometry, Some(Geometry::rect([50.0, 50.0], [60.0, 60.0])));
        assert_eq!(out.value(3, "well").unwrap(), &Value::Null);
    }

    #[test]
    fn test_colliding_columns_suffixed() {
        let left = wells();
        let schema = Schema::of(&[("well", ColumnType::Int)]).unwrap();
        let right = FeatureCollection::new(
            Some(Crs::nad83_utm(10)),
            schema,
            vec![Feature::new(Geometry::rect([0.0, 0.0], [5.0, 5.0]), vec![Value::Int(99)])],
        )
        .unwrap();
        let out = spatial_join(&left, &right, Predicate::Intersects, SpatialJoinHow::Inner, &OpsOptions::default())
            .unwrap();
        assert_eq!(out.schema().names(), vec!["well_left", "index_right", "well_right"]);
        assert_eq!(out.row(0), &vec![Value::Int(2), Value::Int(0), Value::Int(99)]);
    }
}
