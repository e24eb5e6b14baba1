//! Conversions between the canonical geometry and the `geo` crate types.

use geo::Geometry as GeoGeometry;

pub use geoframe_core::models::{Crs, CrsUnits, Geometry, GeometryType, Predicate};

fn coord(c: &[f64; 2]) -> geo::Coord {
    geo::Coord { x: c[0], y: c[1] }
}

fn line_string(coords: &[[f64; 2]]) -> geo::LineString {
    geo::LineString::new(coords.iter().map(coord).collect())
}

fn polygon(rings: &[Vec<[f64; 2]>]) -> geo::Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => geo::Polygon::new(
            line_string(exterior),
            interiors.iter().map(|r| line_string(r)).collect(),
        ),
        None => geo::Polygon::new(geo::LineString::new(vec![]), vec![]),
    }
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(line_string(coordinates)),
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(geo::MultiPoint::new(
            coordinates.iter().map(|c| geo::Point::new(c[0], c[1])).collect(),
        )),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            geo::MultiLineString::new(coordinates.iter().map(|l| line_string(l)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(
            geo::MultiPolygon::new(coordinates.iter().map(|p| polygon(p)).collect()),
        ),
        Geometry::GeometryCollection { geometries } => GeoGeometry::GeometryCollection(
            geo::GeometryCollection(geometries.iter().map(to_geo_geometry).collect()),
        ),
    }
}

fn rings_of(p: &geo::Polygon) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(p.exterior())
        .chain(p.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}

/// Convert a geo::Geometry to a canonical Geometry
pub fn from_geo_geometry(geom: &GeoGeometry) -> Geometry {
    match geom {
        GeoGeometry::Point(p) => Geometry::Point { coordinates: [p.x(), p.y()] },
        GeoGeometry::Line(l) => Geometry::LineString {
            coordinates: vec![[l.start.x, l.start.y], [l.end.x, l.end.y]],
        },
        GeoGeometry::LineString(ls) => Geometry::LineString {
            coordinates: ls.coords().map(|c| [c.x, c.y]).collect(),
        },
        GeoGeometry::Polygon(p) => Geometry::Polygon { coordinates: rings_of(p) },
        GeoGeometry::MultiPoint(mp) => Geometry::MultiPoint {
            coordinates: mp.iter().map(|p| [p.x(), p.y()]).collect(),
        },
        GeoGeometry::MultiLineString(mls) => Geometry::MultiLineString {
            coordinates: mls.iter().map(|ls| ls.coords().map(|c| [c.x, c.y]).collect()).collect(),
        },
        GeoGeometry::MultiPolygon(mp) => {
            Geometry::MultiPolygon { coordinates: mp.iter().map(rings_of).collect() }
        }
        GeoGeometry::GeometryCollection(gc) => Geometry::GeometryCollection {
            geometries: gc.iter().map(from_geo_geometry).collect(),
        },
        GeoGeometry::Rect(r) => Geometry::Polygon { coordinates: rings_of(&r.to_polygon()) },
        GeoGeometry::Triangle(t) => Geometry::Polygon { coordinates: rings_of(&t.to_polygon()) },
    }
}

/// A polygon result as the simplest canonical type: one part stays a
/// Polygon, several become a MultiPolygon, none is `None`
pub fn from_multi_polygon(mp: geo::MultiPolygon) -> Option<Geometry> {
    match mp.0.len() {
        0 => None,
        1 => Some(Geometry::Polygon { coordinates: rings_of(&mp.0[0]) }),
        _ => Some(from_geo_geometry(&GeoGeometry::MultiPolygon(mp))),
    }
}

/// Extension trait for Geometry with geo-crate operations
pub trait GeometryExt {
    /// Whether every part is a point
    fn is_puntal(&self) -> bool;

    /// Whether every part is a polygon
    fn is_polygonal(&self) -> bool;
}

impl GeometryExt for Geometry {
    fn is_puntal(&self) -> bool {
        match self {
            Geometry::Point { .. } | Geometry::MultiPoint { .. } => true,
            Geometry::GeometryCollection { geometries } => {
                !geometries.is_empty() && geometries.iter().all(|g| g.is_puntal())
            }
            _ => false,
        }
    }

    fn is_polygonal(&self) -> bool {
        match self {
            Geometry::Polygon { .. } | Geometry::MultiPolygon { .. } => true,
            Geometry::GeometryCollection { geometries } => {
                !geometries.is_empty() && geometries.iter().all(|g| g.is_polygonal())
            }
            _ => false,
        }
    }
}
