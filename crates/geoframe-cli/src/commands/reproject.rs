//! Reproject command implementation

use super::finish_collection;
use crate::cli::ReprojectArgs;
use crate::input::load_collection;
use crate::output::OutputWriter;
use anyhow::Result;
use geoframe_core::config::LayeredConfig;
use geoframe_core::Crs;
use geoframe_ops::Pipeline;

pub fn execute(args: ReprojectArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let collection = load_collection(&args.path, &args.input, config.geometry_validity.value)?;
    let target = Crs::from_epsg(args.to);

    let pipeline = Pipeline::new(collection)
        .with_options(config.to_ops_options())
        .to_crs(&target)?;

    finish_collection(pipeline.collection(), Some(args.output.as_path()), pipeline.steps(), output)
}
