//! Constructive geometry: buffers, unions and clipping.
//!
//! Results that collapse to nothing are returned as `None` so callers can
//! store them as missing geometries.

use crate::models::{from_geo_geometry, from_multi_polygon, to_geo_geometry, Geometry, GeometryExt};
use crate::spatial::covered_by;
use geo::algorithm::buffer::{Buffer, BufferStyle, LineCap, LineJoin};
use geo::{BooleanOps, Geometry as GeoGeometry};
use std::f64::consts::PI;

/// Largest angle between consecutive vertices on round caps and joins
const ARC_STEP: f64 = PI / 32.0;

/// Buffer a geometry by `distance` CRS units with round caps and joins.
///
/// Arcs are sampled every `ARC_STEP` radians. Points on an axis-aligned cap
/// or side at exactly `distance` are covered.
pub fn buffer(geometry: &Geometry, distance: f64) -> Option<Geometry> {
    if geometry.is_empty() {
        return None;
    }
    let style = BufferStyle::new(distance)
        .line_cap(LineCap::Round(ARC_STEP))
        .line_join(LineJoin::Round(ARC_STEP));
    from_multi_polygon(to_geo_geometry(geometry).buffer_with_style(style))
}

/// Polygonal parts of a geometry as a MultiPolygon
pub fn polygonal(geometry: &Geometry) -> Option<geo::MultiPolygon> {
    match to_geo_geometry(geometry) {
        GeoGeometry::Polygon(p) => Some(geo::MultiPolygon::new(vec![p])),
        GeoGeometry::MultiPolygon(mp) => Some(mp),
        GeoGeometry::GeometryCollection(gc) if geometry.is_polygonal() => {
            let polygons = gc
                .0
                .into_iter()
                .flat_map(|g| match g {
                    GeoGeometry::Polygon(p) => vec![p],
                    GeoGeometry::MultiPolygon(mp) => mp.0,
                    _ => vec![],
                })
                .collect();
            Some(geo::MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

fn points_of(geometries: &[&Geometry]) -> Vec<[f64; 2]> {
    geometries.iter().flat_map(|g| g.coords()).collect()
}

fn lines_of(geometry: &Geometry) -> Vec<Vec<[f64; 2]>> {
    match geometry {
        Geometry::LineString { coordinates } => vec![coordinates.clone()],
        Geometry::MultiLineString { coordinates } => coordinates.clone(),
        Geometry::GeometryCollection { geometries } => geometries.iter().flat_map(lines_of).collect(),
        _ => vec![],
    }
}

fn is_lineal(geometry: &Geometry) -> bool {
    match geometry {
        Geometry::LineString { .. } | Geometry::MultiLineString { .. } => true,
        Geometry::GeometryCollection { geometries } => {
            !geometries.is_empty() && geometries.iter().all(is_lineal)
        }
        _ => false,
    }
}

/// Merge geometries into one.
///
/// Polygons are dissolved so shared edges disappear. Points and lines are
/// gathered into their multi type, and mixed inputs become a collection.
pub fn union_all(geometries: &[&Geometry]) -> Option<Geometry> {
    let parts: Vec<&Geometry> = geometries.iter().copied().filter(|g| !g.is_empty()).collect();
    match parts.as_slice() {
        [] => None,
        [single] => Some((*single).clone()),
        _ if parts.iter().all(|g| g.is_polygonal()) => {
            let polygons: Vec<geo::Polygon> =
                parts.iter().filter_map(|g| polygonal(g)).flat_map(|mp| mp.0).collect();
            from_multi_polygon(geo::unary_union(&polygons))
        }
        _ if parts.iter().all(|g| g.is_puntal()) => {
            Some(Geometry::MultiPoint { coordinates: points_of(&parts) })
        }
        _ if parts.iter().all(|g| is_lineal(g)) => Some(Geometry::MultiLineString {
            coordinates: parts.iter().flat_map(|g| lines_of(g)).collect(),
        }),
        _ => Some(Geometry::GeometryCollection {
            geometries: parts.into_iter().cloned().collect(),
        }),
    }
}

/// Clip a geometry to a polygonal mask.
///
/// Returns `None` when nothing of the geometry lies inside the mask or the
/// mask is not polygonal.
pub fn clip(geometry: &Geometry, mask: &Geometry) -> Option<Geometry> {
    let mask_polygons = polygonal(mask)?;
    if geometry.is_empty() {
        return None;
    }

    match geometry {
        Geometry::Point { .. } | Geometry::MultiPoint { .. } => {
            let mask_geo = GeoGeometry::MultiPolygon(mask_polygons);
            let kept: Vec<[f64; 2]> = geometry
                .coords()
                .into_iter()
                .filter(|[x, y]| covered_by(&GeoGeometry::Point(geo::Point::new(*x, *y)), &mask_geo))
                .collect();
            match kept.as_slice() {
                [] => None,
                [only] if matches!(geometry, Geometry::Point { .. }) => {
                    Some(Geometry::point(only[0], only[1]))
                }
                _ => Some(Geometry::MultiPoint { coordinates: kept }),
            }
        }
        Geometry::LineString { .. } | Geometry::MultiLineString { .. } => {
            let lines = match to_geo_geometry(geometry) {
                GeoGeometry::LineString(ls) => geo::MultiLineString::new(vec![ls]),
                GeoGeometry::MultiLineString(mls) => mls,
                _ => return None,
            };
            let clipped = mask_polygons.clip(&lines, false);
            match clipped.0.len() {
                0 => None,
                1 => Some(from_geo_geometry(&GeoGeometry::LineString(clipped.0[0].clone()))),
                _ => Some(from_geo_geometry(&GeoGeometry::MultiLineString(clipped))),
            }
        }
        Geometry::Polygon { .. } | Geometry::MultiPolygon { .. } => {
            let subject = polygonal(geometry)?;
            from_multi_polygon(subject.intersection(&mask_polygons))
        }
        Geometry::GeometryCollection { geometries } => {
            let parts: Vec<Geometry> = geometries.iter().filter_map(|g| clip(g, mask)).collect();
            if parts.is_empty() {
                None
            } else {
                Some(Geometry::GeometryCollection { geometries: parts })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::area;

    #[test]
    fn test_buffer_point() {
        let circle = buffer(&Geometry::point(0.0, 0.0), 10.0).unwrap();
        assert!(matches!(circle, Geometry::Polygon { .. }));

        let expected = std::f64::consts::PI * 100.0;
        assert!((area(&circle) - expected).abs() / expected < 0.01);
    }

    #[test]
    fn test_buffered_line_reaches_its_caps() {
        let line = Geometry::line_string(vec![[0.0, 0.0], [1000.0, 0.0]]);
        let zone = to_geo_geometry(&buffer(&line, 200.0).unwrap());

        for [x, y] in [[1200.0, 0.0], [-200.0, 0.0], [500.0, 200.0], [500.0, -200.0]] {
            let point = GeoGeometry::Point(geo::Point::new(x, y));
            assert!(covered_by(&point, &zone), "({}, {}) should be on the buffer", x, y);
        }

        let beyond = GeoGeometry::Point(geo::Point::new(1200.5, 0.0));
        assert!(!covered_by(&beyond, &zone));
    }

    #[test]
    fn test_union_adjacent_polygons() {
        let left = Geometry::rect([0.0, 0.0], [1.0, 1.0]);
        let right = Geometry::rect([1.0, 0.0], [2.0, 1.0]);

        let merged = union_all(&[&left, &right]).unwrap();
        assert!(matches!(merged, Geometry::Polygon { .. }));
        assert!((area(&merged) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_disjoint_polygons() {
        let a = Geometry::rect([0.0, 0.0], [1.0, 1.0]);
        let b = Geometry::rect([5.0, 5.0], [6.0, 6.0]);
        assert!(matches!(union_all(&[&a, &b]), Some(Geometry::MultiPolygon { .. })));
    }

    #[test]
    fn test_union_points_and_single() {
        let a = Geometry::point(0.0, 0.0);
        let b = Geometry::point(1.0, 1.0);
        assert_eq!(
            union_all(&[&a, &b]),
            Some(Geometry::MultiPoint { coordinates: vec![[0.0, 0.0], [1.0, 1.0]] })
        );
        assert_eq!(union_all(&[&a]), Some(a.clone()));
        assert_eq!(union_all(&[]), None);
    }

    #[test]
    fn test_clip_polygon() {
        let subject = Geometry::rect([0.0, 0.0], [10.0, 10.0]);
        let mask = Geometry::rect([5.0, 5.0], [20.0, 20.0]);
        let clipped = clip(&subject, &mask).unwrap();
        assert!((area(&clipped) - 25.0).abs() < 1e-9);

        let far = Geometry::rect([50.0, 50.0], [60.0, 60.0]);
        assert!(clip(&subject, &far).is_none());
    }

    #[test]
    fn test_clip_points_and_lines() {
        let mask = Geometry::rect([0.0, 0.0], [10.0, 10.0]);
        let points = Geometry::MultiPoint { coordinates: vec![[1.0, 1.0], [20.0, 1.0], [10.0, 5.0]] };
        assert_eq!(
            clip(&points, &mask),
            Some(Geometry::MultiPoint { coordinates: vec![[1.0, 1.0], [10.0, 5.0]] })
        );

        let line = Geometry::line_string(vec![[-5.0, 5.0], [5.0, 5.0]]);
        let clipped = clip(&line, &mask).unwrap();
        assert!((crate::measure::length(&clipped) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_clip_requires_polygonal_mask() {
        let line_mask = Geometry::line_string(vec![[0.0, 0.0], [1.0, 1.0]]);
        assert!(clip(&Geometry::point(0.5, 0.5), &line_mask).is_none());
    }
}
