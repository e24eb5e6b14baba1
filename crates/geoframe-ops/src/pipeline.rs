use geoframe_core::error::Result;
use geoframe_core::models::{
    Crs, Feature, FeatureCollection, Geometry, OpsOptions, Predicate, Schema, Table, Tabular,
};
use geoframe_geo::reproject_collection;

use crate::aggregate::{dissolve, groupby};
use crate::attribute_join::attribute_join;
use crate::geometry_ops;
use crate::models::{Aggregation, JoinHow, JoinKey, SpatialJoinHow, StepSummary};
use crate::spatial_join::spatial_join;

/// Builder that threads one collection through a sequence of stages.
///
/// Every stage produces a new collection and records how many rows went in
/// and came out, so a run can be explained afterwards.
#[derive(Debug, Clone)]
pub struct Pipeline {
    collection: FeatureCollection,
    options: OpsOptions,
    steps: Vec<StepSummary>,
}

impl Pipeline {
    /// Create a pipeline with default options
    pub fn new(collection: FeatureCollection) -> Self {
        Self { collection, options: OpsOptions::default(), steps: Vec::new() }
    }

    /// Set the options used by join stages
    pub fn with_options(mut self, options: OpsOptions) -> Self {
        self.options = options;
        self
    }

    fn record(mut self, name: impl Into<String>, next: FeatureCollection) -> Self {
        let step = StepSummary {
            name: name.into(),
            rows_in: self.collection.len(),
            rows_out: next.len(),
        };
        tracing::debug!(step = %step, "Pipeline step");
        self.steps.push(step);
        self.collection = next;
        self
    }

    /// Reproject into `crs`
    pub fn to_crs(self, crs: &Crs) -> Result<Self> {
        let next = reproject_collection(&self.collection, crs)?;
        Ok(self.record(format!("to_crs({})", crs.authority()), next))
    }

    /// Join a table on a key column
    pub fn attribute_join(self, right: &Table, key: &JoinKey, how: JoinHow) -> Result<Self> {
        let next = attribute_join(&self.collection, right, key, how, &self.options.suffixes)?;
        Ok(self.record(format!("attribute_join({}, {})", key.left, how), next))
    }

    /// Join another collection by a spatial predicate
    pub fn spatial_join(
        self,
        right: &FeatureCollection,
        predicate: Predicate,
        how: SpatialJoinHow,
    ) -> Result<Self> {
        let next = spatial_join(&self.collection, right, predicate, how, &self.options)?;
        Ok(self.record(format!("spatial_join({}, {})", predicate, how), next))
    }

    /// Keep features for which the predicate holds
    pub fn filter(self, name: &str, predicate: impl FnMut(&Schema, &Feature) -> bool) -> Self {
        let next = self.collection.filter(predicate);
        self.record(format!("filter({})", name), next)
    }

    /// Keep only the named columns
    pub fn select(self, columns: &[&str]) -> Result<Self> {
        let next = self.collection.select(columns)?;
        Ok(self.record(format!("select({})", columns.join(", ")), next))
    }

    pub fn buffer(self, distance: f64) -> Result<Self> {
        let next = geometry_ops::buffer(&self.collection, distance)?;
        Ok(self.record(format!("buffer({})", distance), next))
    }

    pub fn clip(self, mask: &Geometry) -> Result<Self> {
        let next = geometry_ops::clip(&self.collection, mask)?;
        Ok(self.record("clip", next))
    }

    pub fn dissolve(self, agg: &Aggregation) -> Result<Self> {
        let next = dissolve(&self.collection, agg)?;
        Ok(self.record(format!("dissolve({}, {})", agg.by, agg.reducer), next))
    }

    /// Final groupby stage; returns the table and the recorded steps
    pub fn groupby(mut self, agg: &Aggregation) -> Result<(Table, Vec<StepSummary>)> {
        let table = groupby(&self.collection, agg)?;
        self.steps.push(StepSummary {
            name: format!("groupby({}, {})", agg.by, agg.reducer),
            rows_in: self.collection.len(),
            rows_out: table.len(),
        });
        Ok((table, self.steps))
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn steps(&self) -> &[StepSummary] {
        &self.steps
    }

    /// One line per recorded stage
    pub fn explain(&self) -> String {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn finish(self) -> FeatureCollection {
        self.collection
    }
}
