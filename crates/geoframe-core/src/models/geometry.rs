//! Canonical geometry and CRS types used across all geoframe crates.
//!
//! These types provide a bridge between GeoJSON serialization and the
//! computational geo crate types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of measure of a CRS's coordinate axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrsUnits {
    Degrees,
    Meters,
    UsFeet,
    Unknown,
}

impl CrsUnits {
    /// Whether area, length, distance and buffer radius make sense in this unit
    pub fn is_linear(&self) -> bool {
        matches!(self, CrsUnits::Meters | CrsUnits::UsFeet)
    }
}

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
    pub units: CrsUnits,
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>, units: CrsUnits) -> Self {
        Self { epsg, name: name.into(), units }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84", CrsUnits::Degrees)
    }

    /// Web Mercator (EPSG:3857)
    pub fn web_mercator() -> Self {
        Self::new(3857, "WGS 84 / Pseudo-Mercator", CrsUnits::Meters)
    }

    /// NAD83 / UTM zone `zone`N (EPSG:269xx)
    pub fn nad83_utm(zone: u32) -> Self {
        Self::new(26900 + zone, format!("NAD83 / UTM zone {}N", zone), CrsUnits::Meters)
    }

    /// Look up a tag by EPSG code.
    ///
    /// Codes outside the known set get a generic name and `Unknown` units,
    /// so they can still be joined but measuring them fails with a
    /// [`GeoframeError::Unit`](crate::GeoframeError::Unit) naming the cause.
    pub fn from_epsg(epsg: u32) -> Self {
        match epsg {
            4326 => Self::wgs84(),
            4269 => Self::new(epsg, "NAD83", CrsUnits::Degrees),
            4267 => Self::new(epsg, "NAD27", CrsUnits::Degrees),
            4258 => Self::new(epsg, "ETRS89", CrsUnits::Degrees),
            3857 => Self::web_mercator(),
            5070 => Self::new(epsg, "NAD83 / Conus Albers", CrsUnits::Meters),
            3310 => Self::new(epsg, "NAD83 / California Albers", CrsUnits::Meters),
            2227 => Self::new(epsg, "NAD83 / California zone 3 (ftUS)", CrsUnits::UsFeet),
            26901..=26923 => Self::nad83_utm(epsg - 26900),
            32601..=32660 => {
                Self::new(epsg, format!("WGS 84 / UTM zone {}N", epsg - 32600), CrsUnits::Meters)
            }
            32701..=32760 => {
                Self::new(epsg, format!("WGS 84 / UTM zone {}S", epsg - 32700), CrsUnits::Meters)
            }
            _ => {
                tracing::warn!("EPSG:{} is not in the known CRS table; units unknown", epsg);
                Self::new(epsg, format!("EPSG:{}", epsg), CrsUnits::Unknown)
            }
        }
    }

    /// Parse `EPSG:n`, `epsg:n`, `urn:ogc:def:crs:EPSG::n` or a bare code
    pub fn parse(s: &str) -> Option<Self> {
        let code = s.trim().rsplit(':').next()?.trim();
        code.parse().ok().map(Self::from_epsg)
    }

    pub fn is_linear(&self) -> bool {
        self.units.is_linear()
    }

    /// Authority string understood by PROJ
    pub fn authority(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{} ({})", self.epsg, self.name)
    }
}

/// Geometry validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValidityMode {
    /// Strict validation - reject any invalid geometries
    Strict,
    /// Lenient validation - drop invalid geometries to null
    #[default]
    Lenient,
}

/// Spatial predicate evaluated between a left and a right geometry.
///
/// All predicates are boundary-inclusive: a point on a polygon's edge is
/// `within` it and the polygon `contains` it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Predicate {
    /// Left and right share at least one point
    #[default]
    Intersects,
    /// Every point of left lies in the closed right geometry
    Within,
    /// Every point of right lies in the closed left geometry
    Contains,
    /// Euclidean distance is at most the given value, in CRS units
    DistanceWithin(f64),
}

impl Predicate {
    /// Parse from a predicate name, with the distance for `dwithin`
    pub fn parse(name: &str, distance: Option<f64>) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "intersects" => Some(Predicate::Intersects),
            "within" => Some(Predicate::Within),
            "contains" => Some(Predicate::Contains),
            "dwithin" | "distance_within" => distance.map(Predicate::DistanceWithin),
            _ => None,
        }
    }

    pub fn needs_linear_units(&self) -> bool {
        matches!(self, Predicate::DistanceWithin(_))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Intersects => f.write_str("intersects"),
            Predicate::Within => f.write_str("within"),
            Predicate::Contains => f.write_str("contains"),
            Predicate::DistanceWithin(d) => write!(f, "distance_within({})", d),
        }
    }
}

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometryType {
    #[default]
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    Mixed,
}

/// GeoJSON-compatible geometry representation
///
/// This enum directly maps to GeoJSON geometry types with coordinate arrays.
/// It can be serialized/deserialized as GeoJSON and converted to/from `geo` crate types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
}

impl Geometry {
    /// Create a Point geometry
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point { coordinates: [x, y] }
    }

    /// Create a LineString geometry
    pub fn line_string(coords: Vec<[f64; 2]>) -> Self {
        Geometry::LineString { coordinates: coords }
    }

    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Axis-aligned rectangle as a closed polygon
    pub fn rect(min: [f64; 2], max: [f64; 2]) -> Self {
        Geometry::polygon(vec![vec![
            [min[0], min[1]],
            [max[0], min[1]],
            [max[0], max[1]],
            [min[0], max[1]],
            [min[0], min[1]],
        ]])
    }

    /// Get the geometry type
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point { .. } => GeometryType::Point,
            Geometry::LineString { .. } => GeometryType::LineString,
            Geometry::Polygon { .. } => GeometryType::Polygon,
            Geometry::MultiPoint { .. } => GeometryType::MultiPoint,
            Geometry::MultiLineString { .. } => GeometryType::MultiLineString,
            Geometry::MultiPolygon { .. } => GeometryType::MultiPolygon,
            Geometry::GeometryCollection { .. } => GeometryType::GeometryCollection,
        }
    }

    /// True when the geometry holds no coordinates
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point { .. } => false,
            Geometry::LineString { coordinates } | Geometry::MultiPoint { coordinates } => {
                coordinates.is_empty()
            }
            Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
                coordinates.iter().all(|ring| ring.is_empty())
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().all(|ring| ring.is_empty())
            }
            Geometry::GeometryCollection { geometries } => geometries.iter().all(Self::is_empty),
        }
    }

    /// Apply a fallible function to every coordinate
    pub fn try_map_coords<E>(
        &self,
        f: &impl Fn([f64; 2]) -> Result<[f64; 2], E>,
    ) -> Result<Geometry, E> {
        let line = |coords: &Vec<[f64; 2]>| -> Result<Vec<[f64; 2]>, E> {
            coords.iter().map(|c| f(*c)).collect()
        };
        let rings = |rings: &Vec<Vec<[f64; 2]>>| -> Result<Vec<Vec<[f64; 2]>>, E> {
            rings.iter().map(line).collect()
        };

        Ok(match self {
            Geometry::Point { coordinates } => Geometry::Point { coordinates: f(*coordinates)? },
            Geometry::LineString { coordinates } => {
                Geometry::LineString { coordinates: line(coordinates)? }
            }
            Geometry::Polygon { coordinates } => Geometry::Polygon { coordinates: rings(coordinates)? },
            Geometry::MultiPoint { coordinates } => {
                Geometry::MultiPoint { coordinates: line(coordinates)? }
            }
            Geometry::MultiLineString { coordinates } => {
                Geometry::MultiLineString { coordinates: rings(coordinates)? }
            }
            Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
                coordinates: coordinates.iter().map(rings).collect::<Result<_, E>>()?,
            },
            Geometry::GeometryCollection { geometries } => Geometry::GeometryCollection {
                geometries: geometries.iter().map(|g| g.try_map_coords(f)).collect::<Result<_, E>>()?,
            },
        })
    }

    /// Every coordinate, in storage order
    pub fn coords(&self) -> Vec<[f64; 2]> {
        let mut out = Vec::new();
        self.collect_coords(&mut out);
        out
    }

    fn collect_coords(&self, out: &mut Vec<[f64; 2]>) {
        match self {
            Geometry::Point { coordinates } => out.push(*coordinates),
            Geometry::LineString { coordinates } | Geometry::MultiPoint { coordinates } => {
                out.extend(coordinates)
            }
            Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
                out.extend(coordinates.iter().flatten())
            }
            Geometry::MultiPolygon { coordinates } => {
                out.extend(coordinates.iter().flatten().flatten())
            }
            Geometry::GeometryCollection { geometries } => {
                geometries.iter().for_each(|g| g.collect_coords(out))
            }
        }
    }

    /// Try to parse from a serde_json::Value (GeoJSON)
    pub fn from_geojson(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Convert to serde_json::Value (GeoJSON)
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_serialization() {
        let point = Geometry::point(115.0, -8.5);
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("Point"));
        assert!(json.contains("115"));

        let parsed: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(point, parsed);
    }

    #[test]
    fn test_crs_lookup() {
        assert!(!Crs::from_epsg(4326).is_linear());
        assert!(Crs::from_epsg(26910).is_linear());
        assert_eq!(Crs::from_epsg(26910).name, "NAD83 / UTM zone 10N");
        assert!(Crs::from_epsg(32633).is_linear());
        assert_eq!(Crs::from_epsg(999_999).units, CrsUnits::Unknown);
    }

    #[test]
    fn test_crs_parse() {
        assert_eq!(Crs::parse("EPSG:3857").unwrap().epsg, 3857);
        assert_eq!(Crs::parse("epsg:26910").unwrap().epsg, 26910);
        assert_eq!(Crs::parse("urn:ogc:def:crs:EPSG::4269").unwrap().epsg, 4269);
        assert_eq!(Crs::parse("EPSG: 26910").unwrap().epsg, 26910);
        assert_eq!(Crs::parse(" 2227 ").unwrap().units, CrsUnits::UsFeet);
        assert!(Crs::parse("not-a-crs").is_none());
    }

    #[test]
    fn test_predicate_parse() {
        assert_eq!(Predicate::parse("WITHIN", None), Some(Predicate::Within));
        assert_eq!(Predicate::parse("dwithin", Some(200.0)), Some(Predicate::DistanceWithin(200.0)));
        assert_eq!(Predicate::parse("dwithin", None), None);
        assert!(Predicate::DistanceWithin(1.0).needs_linear_units());
    }

    #[test]
    fn test_try_map_coords() {
        let square = Geometry::rect([0.0, 0.0], [1.0, 1.0]);
        let shifted = square
            .try_map_coords(&|[x, y]| Ok::<_, ()>([x + 10.0, y]))
            .unwrap();
        assert_eq!(shifted.coords()[2], [11.0, 1.0]);
    }

    #[test]
    fn test_is_empty() {
        assert!(Geometry::line_string(vec![]).is_empty());
        assert!(!Geometry::point(0.0, 0.0).is_empty());
        assert!(Geometry::GeometryCollection { geometries: vec![] }.is_empty());
    }
}
