//! Planar measurements in CRS units.
//!
//! Callers are responsible for checking that the CRS has linear units when
//! the result must mean metres or feet.

use crate::models::{to_geo_geometry, Geometry};
use geo::{Area, BoundingRect, Centroid, Euclidean, Length};

/// Unsigned planar area. Zero for points and lines.
pub fn area(geometry: &Geometry) -> f64 {
    to_geo_geometry(geometry).unsigned_area()
}

fn path_length(coords: &[[f64; 2]]) -> f64 {
    Euclidean.length(&geo::LineString::from(coords.to_vec()))
}

/// Planar length. Lines are measured along their path, polygons by the
/// perimeter of every ring, points are zero.
pub fn length(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Point { .. } | Geometry::MultiPoint { .. } => 0.0,
        Geometry::LineString { coordinates } => path_length(coordinates),
        Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
            coordinates.iter().map(|ring| path_length(ring)).sum()
        }
        Geometry::MultiPolygon { coordinates } => {
            coordinates.iter().flatten().map(|ring| path_length(ring)).sum()
        }
        Geometry::GeometryCollection { geometries } => geometries.iter().map(length).sum(),
    }
}

/// Minimum planar distance between two geometries
pub fn distance(a: &Geometry, b: &Geometry) -> f64 {
    crate::spatial::distance(&to_geo_geometry(a), &to_geo_geometry(b))
}

/// Centroid, None for empty geometries
pub fn centroid(geometry: &Geometry) -> Option<Geometry> {
    to_geo_geometry(geometry).centroid().map(|p| Geometry::point(p.x(), p.y()))
}

/// Bounding box as `[minx, miny, maxx, maxy]`
pub fn bounds(geometry: &Geometry) -> Option<[f64; 4]> {
    to_geo_geometry(geometry).bounding_rect().map(|r| {
        let (min, max) = (r.min(), r.max());
        [min.x, min.y, max.x, max.y]
    })
}

/// Union of the bounding boxes of every geometry
pub fn total_bounds<'a>(geometries: impl IntoIterator<Item = &'a Geometry>) -> Option<[f64; 4]> {
    geometries.into_iter().filter_map(bounds).reduce(|acc, b| {
        [acc[0].min(b[0]), acc[1].min(b[1]), acc[2].max(b[2]), acc[3].max(b[3])]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_and_perimeter() {
        let square = Geometry::rect([0.0, 0.0], [4.0, 3.0]);
        assert_eq!(area(&square), 12.0);
        assert_eq!(length(&square), 14.0);
    }

    #[test]
    fn test_polygon_hole_reduces_area() {
        let holed = Geometry::polygon(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[2.0, 2.0], [4.0, 2.0], [4.0, 4.0], [2.0, 4.0], [2.0, 2.0]],
        ]);
        assert_eq!(area(&holed), 96.0);
    }

    #[test]
    fn test_line_length() {
        let line = Geometry::line_string(vec![[0.0, 0.0], [3.0, 4.0], [3.0, 10.0]]);
        assert_eq!(length(&line), 11.0);
        assert_eq!(area(&line), 0.0);
        assert_eq!(length(&Geometry::point(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_length_of_multi_parts() {
        let holed = Geometry::polygon(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[2.0, 2.0], [4.0, 2.0], [4.0, 4.0], [2.0, 4.0], [2.0, 2.0]],
        ]);
        assert_eq!(length(&holed), 48.0);

        let lines = Geometry::MultiLineString {
            coordinates: vec![vec![[0.0, 0.0], [0.0, 5.0]], vec![[1.0, 1.0]], vec![]],
        };
        assert_eq!(length(&lines), 5.0);
    }

    #[test]
    fn test_distance_and_centroid() {
        let square = Geometry::rect([0.0, 0.0], [2.0, 2.0]);
        assert_eq!(distance(&Geometry::point(5.0, 1.0), &square), 3.0);
        assert_eq!(distance(&Geometry::point(1.0, 1.0), &square), 0.0);
        assert_eq!(centroid(&square), Some(Geometry::point(1.0, 1.0)));
    }

    #[test]
    fn test_total_bounds() {
        let geometries = [Geometry::point(-1.0, 5.0), Geometry::rect([0.0, 0.0], [2.0, 2.0])];
        assert_eq!(total_bounds(&geometries), Some([-1.0, 0.0, 2.0, 5.0]));
        assert_eq!(total_bounds(std::iter::empty()), None);
    }
}
