//! CRS checks and reprojection

use crate::models::{Crs, Geometry};
use geoframe_core::error::{GeoframeError, Result};
use geoframe_core::FeatureCollection;
use proj::Proj;

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// Detect CRS mismatch between the two sides of a binary operation
pub fn check_crs_match(left: &Crs, right: &Crs) -> Result<()> {
    if !crs_match(left, right) {
        return Err(GeoframeError::CrsMismatch {
            left: left.to_string(),
            right: right.to_string(),
        });
    }
    Ok(())
}

fn build_proj(from: &Crs, to: &Crs) -> Result<Proj> {
    Proj::new_known_crs(&from.authority(), &to.authority(), None).map_err(|e| {
        GeoframeError::Projection {
            from: from.to_string(),
            to: to.to_string(),
            reason: e.to_string(),
        }
    })
}

fn convert_with(proj: &Proj, geometry: &Geometry, from: &Crs, to: &Crs) -> Result<Geometry> {
    geometry.try_map_coords(&|[x, y]| {
        let (tx, ty) = proj.convert((x, y)).map_err(|e| GeoframeError::Projection {
            from: from.to_string(),
            to: to.to_string(),
            reason: e.to_string(),
        })?;
        if tx.is_finite() && ty.is_finite() {
            Ok([tx, ty])
        } else {
            Err(GeoframeError::Projection {
                from: from.to_string(),
                to: to.to_string(),
                reason: format!("coordinate ({}, {}) is outside the target domain", x, y),
            })
        }
    })
}

/// Reproject a geometry from one CRS to another
pub fn reproject_geometry(geometry: &Geometry, from: &Crs, to: &Crs) -> Result<Geometry> {
    if crs_match(from, to) {
        return Ok(geometry.clone());
    }
    let proj = build_proj(from, to)?;
    convert_with(&proj, geometry, from, to)
}

/// Transform every geometry of a collection into `to` and retag it.
///
/// The source must carry a CRS. Attributes and row order are unchanged, and
/// missing geometries stay missing.
pub fn reproject_collection(collection: &FeatureCollection, to: &Crs) -> Result<FeatureCollection> {
    let from = collection.require_crs("to_crs")?.clone();
    if crs_match(&from, to) {
        return Ok(collection.clone().override_crs(to.clone()));
    }

    let proj = build_proj(&from, to)?;
    let geometries = collection
        .geometries()
        .map(|g| g.map(|g| convert_with(&proj, g, &from, to)).transpose())
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(from = %from, to = %to, features = geometries.len(), "Reprojected collection");
    Ok(collection.with_geometries(geometries)?.override_crs(to.clone()))
}
