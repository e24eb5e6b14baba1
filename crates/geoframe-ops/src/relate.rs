//! Pairwise spatial predicate evaluation between two collections.

use geoframe_core::error::{GeoframeError, Result};
use geoframe_core::models::{Crs, FeatureCollection, OpsOptions, Predicate, Tabular};
use geoframe_geo::{check_crs_match, evaluate_predicate, SpatialIndex};

/// Evaluates one predicate for every (left, right) feature pair.
///
/// Results are `(left, right)` row positions sorted ascending. The R-tree
/// path only prunes candidates by envelope, so it returns exactly the pairs
/// the brute-force path returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialRelater {
    predicate: Predicate,
    snap_tolerance: f64,
    use_index: bool,
}

impl SpatialRelater {
    pub fn new(predicate: Predicate) -> Self {
        Self { predicate, snap_tolerance: 0.0, use_index: true }
    }

    /// Relater configured from the shared join options
    pub fn with_options(predicate: Predicate, options: &OpsOptions) -> Self {
        Self { predicate, snap_tolerance: options.snap_tolerance, use_index: options.use_index }
    }

    pub fn with_snap_tolerance(mut self, tolerance: f64) -> Self {
        self.snap_tolerance = tolerance;
        self
    }

    pub fn with_index(mut self, use_index: bool) -> Self {
        self.use_index = use_index;
        self
    }

    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// Check that both sides can be related and return their common CRS
    pub fn check_inputs(&self, left: &FeatureCollection, right: &FeatureCollection) -> Result<Crs> {
        let operation = format!("spatial predicate '{}'", self.predicate);
        let left_crs = left.require_crs(&operation)?;
        let right_crs = right.require_crs(&operation)?;
        check_crs_match(left_crs, right_crs)?;

        if self.predicate.needs_linear_units() && !left_crs.is_linear() {
            return Err(GeoframeError::unit(left_crs, operation));
        }
        if let Predicate::DistanceWithin(d) = self.predicate {
            if !d.is_finite() || d < 0.0 {
                return Err(GeoframeError::ConfigInvalid {
                    key: "distance".to_string(),
                    reason: format!("distance must be a non-negative number, got {}", d),
                });
            }
        }
        Ok(left_crs.clone())
    }

    /// All matching pairs
    pub fn relate(
        &self,
        left: &FeatureCollection,
        right: &FeatureCollection,
    ) -> Result<Vec<(usize, usize)>> {
        self.check_inputs(left, right)?;

        let pairs = if self.use_index {
            self.relate_indexed(left, right)
        } else {
            self.relate_brute_force(left, right)
        };

        tracing::debug!(
            predicate = %self.predicate,
            left = left.len(),
            right = right.len(),
            pairs = pairs.len(),
            indexed = self.use_index,
            "Spatial relate complete"
        );
        Ok(pairs)
    }

    /// Envelope margin covering every pair the predicate can accept
    fn query_margin(&self) -> f64 {
        match self.predicate {
            Predicate::DistanceWithin(d) => d.max(self.snap_tolerance),
            _ => self.snap_tolerance,
        }
    }

    fn relate_indexed(&self, left: &FeatureCollection, right: &FeatureCollection) -> Vec<(usize, usize)> {
        let index = SpatialIndex::from_geometries(right.geometries().enumerate());
        let margin = self.query_margin();

        let mut pairs = Vec::new();
        for (i, geometry) in left.geometries().enumerate() {
            let Some(geometry) = geometry else { continue };
            for j in index.query_expanded(geometry, margin) {
                if let Some(candidate) = &right.features()[j].geometry {
                    if evaluate_predicate(geometry, candidate, self.predicate, self.snap_tolerance) {
                        pairs.push((i, j));
                    }
                }
            }
        }
        pairs
    }

    fn relate_brute_force(
        &self,
        left: &FeatureCollection,
        right: &FeatureCollection,
    ) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, l) in left.geometries().enumerate() {
            let Some(l) = l else { continue };
            for (j, r) in right.geometries().enumerate() {
                let Some(r) = r else { continue };
                if evaluate_predicate(l, r, self.predicate, self.snap_tolerance) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}
