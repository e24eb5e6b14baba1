//! Dissolve and groupby command implementations

use super::{finish_collection, report_steps};
use crate::cli::AggregateArgs;
use crate::input::load_collection;
use crate::output::OutputWriter;
use crate::output_types::GroupbyOutput;
use anyhow::{anyhow, bail, Result};
use geoframe_core::config::LayeredConfig;
use geoframe_core::Tabular;
use geoframe_ops::{Aggregation, Pipeline, Reducer};

fn aggregation(args: &AggregateArgs) -> Result<Aggregation> {
    let reducer = Reducer::parse(&args.reducer)
        .ok_or_else(|| anyhow!("Invalid --reducer '{}': use count, sum, mean, min or max", args.reducer))?;

    Ok(match &args.target {
        Some(target) => Aggregation::new(args.by.clone(), target.clone(), reducer),
        None => Aggregation { by: args.by.clone(), target: None, reducer },
    })
}

pub fn dissolve(args: AggregateArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let agg = aggregation(&args)?;
    let collection = load_collection(&args.path, &args.input, config.geometry_validity.value)?;

    let pipeline = Pipeline::new(collection)
        .with_options(config.to_ops_options())
        .dissolve(&agg)?;

    finish_collection(pipeline.collection(), args.output.as_deref(), pipeline.steps(), output)
}

pub fn groupby(args: AggregateArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    if args.output.is_some() {
        bail!("groupby prints its table; use dissolve to write grouped geometries");
    }

    let agg = aggregation(&args)?;
    let collection = load_collection(&args.path, &args.input, config.geometry_validity.value)?;

    let (table, steps) = Pipeline::new(collection)
        .with_options(config.to_ops_options())
        .groupby(&agg)?;

    if output.is_json() {
        let (schema, rows) = table.into_parts();
        return output.result(GroupbyOutput {
            columns: schema.names().iter().map(|n| n.to_string()).collect(),
            rows: rows.iter().map(|row| row.iter().map(|v| v.to_json()).collect()).collect(),
            steps,
        });
    }

    output.preview_table(&table, table.len());
    report_steps(&steps, output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::InputOptions;
    use std::path::PathBuf;

    fn args(target: Option<&str>, reducer: &str) -> AggregateArgs {
        AggregateArgs {
            path: PathBuf::from("schools.csv"),
            by: "GEOID".to_string(),
            target: target.map(String::from),
            reducer: reducer.to_string(),
            output: None,
            input: InputOptions::default(),
        }
    }

    #[test]
    fn test_aggregation_from_args() {
        let count = aggregation(&args(None, "count")).unwrap();
        assert_eq!(count, Aggregation::count("GEOID"));

        let mean = aggregation(&args(Some("pop"), "avg")).unwrap();
        assert_eq!(mean.reducer, Reducer::Mean);
        assert_eq!(mean.output_column(), "pop");

        assert!(aggregation(&args(None, "median")).is_err());
    }
}
