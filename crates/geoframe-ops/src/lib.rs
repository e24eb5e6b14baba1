//! geoframe ops - joins and aggregation over feature collections
//!
//! This crate implements the workflow stages: attribute joins, spatial
//! relating and joining, groupby and dissolve aggregation, collection-level
//! geometry operations and a pipeline builder that chains them.

pub mod aggregate;
pub mod attribute_join;
pub mod geometry_ops;
mod layout;
pub mod models;
pub mod pipeline;
pub mod relate;
pub mod spatial_join;

pub use aggregate::{dissolve, groupby, reduce};
pub use attribute_join::{attribute_join, join_tables};
pub use models::{
    Aggregation, JoinHow, JoinKey, MatchPolicy, OpsOptions, Reducer, SpatialJoinHow, StepSummary,
    Suffixes,
};
pub use pipeline::Pipeline;
pub use relate::SpatialRelater;
pub use spatial_join::{spatial_join, INDEX_LEFT, INDEX_RIGHT};
