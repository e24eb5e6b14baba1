//! Spatial predicate evaluation.
//!
//! Predicates are boundary-inclusive and evaluated on the DE-9IM matrix:
//! `within` is covered-by (a point on the edge of a polygon is within it),
//! `contains` is its converse.

use crate::models::{to_geo_geometry, Geometry, GeometryExt, Predicate};
use geo::{Distance, Euclidean, Geometry as GeoGeometry, Intersects, Relate};

/// Evaluate a predicate between a left and a right geometry.
///
/// Empty geometries never match. A positive `snap_tolerance` lets a point
/// lying within that distance of the other geometry count as on it, which
/// absorbs the coordinate error of constructed geometries such as buffers.
pub fn evaluate_predicate(
    left: &Geometry,
    right: &Geometry,
    predicate: Predicate,
    snap_tolerance: f64,
) -> bool {
    if left.is_empty() || right.is_empty() {
        return false;
    }

    let l = to_geo_geometry(left);
    let r = to_geo_geometry(right);

    match predicate {
        Predicate::Intersects => {
            l.intersects(&r) || (snap_tolerance > 0.0 && distance(&l, &r) <= snap_tolerance)
        }
        Predicate::Within => covered_by_snapped(left, &l, &r, snap_tolerance),
        Predicate::Contains => covered_by_snapped(right, &r, &l, snap_tolerance),
        Predicate::DistanceWithin(d) => distance(&l, &r) <= d,
    }
}

/// Every point of `a` lies in the closure of `b`
pub fn covered_by(a: &GeoGeometry, b: &GeoGeometry) -> bool {
    a.relate(b).is_coveredby()
}

fn covered_by_snapped(
    a_canonical: &Geometry,
    a: &GeoGeometry,
    b: &GeoGeometry,
    snap_tolerance: f64,
) -> bool {
    if covered_by(a, b) {
        return true;
    }
    if snap_tolerance <= 0.0 || !a_canonical.is_puntal() {
        return false;
    }

    // each point is either covered or within tolerance of b
    a_canonical.coords().iter().all(|[x, y]| {
        let point = GeoGeometry::Point(geo::Point::new(*x, *y));
        covered_by(&point, b) || distance(&point, b) <= snap_tolerance
    })
}

/// Euclidean distance in CRS units, zero when the geometries intersect
pub fn distance(a: &GeoGeometry, b: &GeoGeometry) -> f64 {
    Euclidean.distance(a, b)
}
