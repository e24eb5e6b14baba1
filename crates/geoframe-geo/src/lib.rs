//! geoframe geo - geometry predicates, measures, overlays and CRS transforms
//!
//! This crate bridges the canonical [`Geometry`] model to the `geo` crate
//! algorithms, builds R-tree indexes with `rstar`, triangulates point sets
//! with `spade`, and reprojects coordinates through PROJ.

pub mod index;
pub mod measure;
pub mod models;
pub mod overlay;
pub mod spatial;
pub mod transform;
pub mod voronoi;

pub use index::SpatialIndex;
pub use models::{from_geo_geometry, to_geo_geometry, Crs, CrsUnits, Geometry, GeometryExt, Predicate};
pub use spatial::evaluate_predicate;
pub use transform::{check_crs_match, crs_match, reproject_collection, reproject_geometry};
pub use voronoi::voronoi_cells;
