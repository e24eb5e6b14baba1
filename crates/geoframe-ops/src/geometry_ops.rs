//! Collection-level geometry operations.
//!
//! Measurements (`area`, `length`, `distance_to`) and `buffer` need a CRS
//! with linear units. Missing geometries produce `None` and stay missing.

use geoframe_core::error::{GeoframeError, Result};
use geoframe_core::models::{Crs, FeatureCollection, Geometry, Predicate, Tabular};
use geoframe_geo::{evaluate_predicate, measure, overlay, voronoi_cells, GeometryExt};

fn require_linear<'a>(collection: &'a FeatureCollection, operation: &str) -> Result<&'a Crs> {
    let crs = collection.require_crs(operation)?;
    if !crs.is_linear() {
        return Err(GeoframeError::unit(crs, operation));
    }
    Ok(crs)
}

fn per_feature<T>(collection: &FeatureCollection, f: impl Fn(&Geometry) -> T) -> Vec<Option<T>> {
    collection.geometries().map(|g| g.map(&f)).collect()
}

/// Planar area of every feature
pub fn area(collection: &FeatureCollection) -> Result<Vec<Option<f64>>> {
    require_linear(collection, "area")?;
    Ok(per_feature(collection, measure::area))
}

/// Planar length of every feature (perimeter for polygons)
pub fn length(collection: &FeatureCollection) -> Result<Vec<Option<f64>>> {
    require_linear(collection, "length")?;
    Ok(per_feature(collection, measure::length))
}

/// Distance from every feature to one geometry in the same CRS
pub fn distance_to(collection: &FeatureCollection, other: &Geometry) -> Result<Vec<Option<f64>>> {
    require_linear(collection, "distance")?;
    Ok(per_feature(collection, |g| measure::distance(g, other)))
}

/// Buffer every geometry by `distance` CRS units
pub fn buffer(collection: &FeatureCollection, distance: f64) -> Result<FeatureCollection> {
    require_linear(collection, "buffer")?;
    if !distance.is_finite() {
        return Err(GeoframeError::ConfigInvalid {
            key: "distance".to_string(),
            reason: format!("buffer distance must be finite, got {}", distance),
        });
    }
    let geometries = collection
        .geometries()
        .map(|g| g.and_then(|g| overlay::buffer(g, distance)))
        .collect();
    collection.with_geometries(geometries)
}

/// Replace every geometry with its centroid
pub fn centroids(collection: &FeatureCollection) -> Result<FeatureCollection> {
    collection.require_crs("centroid")?;
    let geometries = collection.geometries().map(|g| g.and_then(measure::centroid)).collect();
    collection.with_geometries(geometries)
}

/// Voronoi region of every point, clipped to a polygonal boundary in the
/// same CRS.
///
/// Attributes are carried over. Features without geometry get no region and
/// any other non-point geometry is an error.
pub fn voronoi_regions(points: &FeatureCollection, boundary: &Geometry) -> Result<FeatureCollection> {
    require_linear(points, "voronoi_regions")?;
    if !boundary.is_polygonal() {
        return Err(GeoframeError::InvalidGeometry {
            feature_id: "<boundary>".to_string(),
            reason: format!("Voronoi boundary must be polygonal, got {:?}", boundary.geometry_type()),
        });
    }

    let mut sites = Vec::new();
    let mut owners = Vec::new();
    for (idx, geometry) in points.geometries().enumerate() {
        match geometry {
            None => {}
            Some(Geometry::Point { coordinates }) => {
                sites.push(*coordinates);
                owners.push(idx);
            }
            Some(other) => {
                return Err(GeoframeError::InvalidGeometry {
                    feature_id: idx.to_string(),
                    reason: format!("Voronoi sites must be points, got {:?}", other.geometry_type()),
                })
            }
        }
    }

    let mut regions = vec![None; points.len()];
    for (owner, cell) in owners.into_iter().zip(voronoi_cells(&sites, boundary)?) {
        regions[owner] = cell;
    }
    points.with_geometries(regions)
}

/// `[minx, miny, maxx, maxy]` over every geometry
pub fn total_bounds(collection: &FeatureCollection) -> Option<[f64; 4]> {
    measure::total_bounds(collection.geometries().flatten())
}

/// Union of every geometry in the collection
pub fn unary_union(collection: &FeatureCollection) -> Option<Geometry> {
    let geometries: Vec<&Geometry> = collection.geometries().flatten().collect();
    overlay::union_all(&geometries)
}

/// Clip every geometry to a polygonal mask, dropping features left empty
pub fn clip(collection: &FeatureCollection, mask: &Geometry) -> Result<FeatureCollection> {
    collection.require_crs("clip")?;
    if !mask.is_polygonal() {
        return Err(GeoframeError::InvalidGeometry {
            feature_id: "<mask>".to_string(),
            reason: format!("clip mask must be polygonal, got {:?}", mask.geometry_type()),
        });
    }

    let clipped: Vec<Option<Geometry>> = collection
        .geometries()
        .map(|g| g.and_then(|g| overlay::clip(g, mask)))
        .collect();
    let keep: Vec<usize> = clipped
        .iter()
        .enumerate()
        .filter_map(|(i, g)| g.as_ref().map(|_| i))
        .collect();

    let kept_geometries = clipped.into_iter().flatten().map(Some).collect();
    collection.take(&keep).with_geometries(kept_geometries)
}

fn mask_predicate(collection: &FeatureCollection, mask: &Geometry, predicate: Predicate) -> Vec<bool> {
    collection
        .geometries()
        .map(|g| g.map(|g| evaluate_predicate(g, mask, predicate, 0.0)).unwrap_or(false))
        .collect()
}

/// Whether each feature lies within the mask
pub fn within_mask(collection: &FeatureCollection, mask: &Geometry) -> Vec<bool> {
    mask_predicate(collection, mask, Predicate::Within)
}

/// Whether each feature intersects the mask
pub fn intersects_mask(collection: &FeatureCollection, mask: &Geometry) -> Vec<bool> {
    mask_predicate(collection, mask, Predicate::Intersects)
}

/// Features whose geometry intersects the box `[min, max]`
pub fn cx(collection: &FeatureCollection, min: [f64; 2], max: [f64; 2]) -> FeatureCollection {
    let window = Geometry::rect(min, max);
    let keep: Vec<usize> = intersects_mask(collection, &window)
        .into_iter()
        .enumerate()
        .filter_map(|(i, hit)| hit.then_some(i))
        .collect();
    collection.take(&keep)
}
