//! Spatial join command implementation

use super::finish_collection;
use crate::cli::SjoinArgs;
use crate::input::load_collection;
use crate::output::OutputWriter;
use anyhow::{anyhow, Result};
use geoframe_core::config::LayeredConfig;
use geoframe_core::Predicate;
use geoframe_ops::{Pipeline, SpatialJoinHow};

pub fn execute(args: SjoinArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let predicate = parse_predicate(&args.predicate, args.distance)?;
    let how = SpatialJoinHow::parse(&args.how)
        .ok_or_else(|| anyhow!("Invalid --how '{}': use left, right or inner", args.how))?;

    let validity = config.geometry_validity.value;
    let left = load_collection(&args.left, &args.input, validity)?;
    let right = load_collection(&args.right, &args.right_input(), validity)?;

    let pipeline = Pipeline::new(left)
        .with_options(config.to_ops_options())
        .spatial_join(&right, predicate, how)?;

    finish_collection(pipeline.collection(), args.output.as_deref(), pipeline.steps(), output)
}

fn parse_predicate(name: &str, distance: Option<f64>) -> Result<Predicate> {
    if let Some(predicate) = Predicate::parse(name, distance) {
        return Ok(predicate);
    }
    match name.to_lowercase().as_str() {
        "dwithin" | "distance_within" => Err(anyhow!("Predicate '{}' requires --distance", name)),
        _ => Err(anyhow!(
            "Invalid --predicate '{}': use intersects, within, contains or dwithin",
            name
        )),
    }
}
