//! Attribute join command implementation

use super::finish_collection;
use crate::cli::JoinArgs;
use crate::input::{load_collection, load_table};
use crate::output::OutputWriter;
use anyhow::{anyhow, Result};
use geoframe_core::config::LayeredConfig;
use geoframe_core::Tabular;
use geoframe_ops::{JoinHow, JoinKey, Pipeline};

pub fn execute(args: JoinArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let how = JoinHow::parse(&args.how)
        .ok_or_else(|| anyhow!("Invalid --how '{}': use left, right, inner or outer", args.how))?;
    let key = JoinKey::pair(
        args.left_on.clone(),
        args.right_on.clone().unwrap_or_else(|| args.left_on.clone()),
    );

    let left = load_collection(&args.left, &args.input, config.geometry_validity.value)?;
    let right = load_table(&args.right, &args.input)?;
    tracing::info!(
        "Joining {} rows onto {} features on {} = {} ({})",
        right.len(),
        left.len(),
        key.left,
        key.right,
        how
    );

    let pipeline = Pipeline::new(left)
        .with_options(config.to_ops_options())
        .attribute_join(&right, &key, how)?;

    finish_collection(pipeline.collection(), args.output.as_deref(), pipeline.steps(), output)
}
