//! Command implementations

mod aggregate;
mod config;
mod inspect;
mod join;
mod reproject;
mod sjoin;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::CommandOutput;
use anyhow::{bail, Context, Result};
use geoframe_core::formats::{FormatWriter, GeoJsonWriter};
use geoframe_core::FeatureCollection;
use geoframe_ops::StepSummary;
use std::path::Path;

/// Rows shown when a result is printed instead of written
const PREVIEW_ROWS: usize = 10;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let settings = load_config(&cli)?;

    match cli.command {
        Commands::Inspect(args) => inspect::execute(args, &settings, &output),
        Commands::Reproject(args) => reproject::execute(args, &settings, &output),
        Commands::Join(args) => join::execute(args, &settings, &output),
        Commands::Sjoin(args) => sjoin::execute(args, &settings, &output),
        Commands::Dissolve(args) => aggregate::dissolve(args, &settings, &output),
        Commands::Groupby(args) => aggregate::groupby(args, &settings, &output),
        Commands::Config => config::execute(&settings, &output),
    }
}

/// Write a result collection as GeoJSON
fn write_geojson(collection: &FeatureCollection, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if extension != "geojson" && extension != "json" {
        bail!("Output must be a .geojson or .json file: {}", path.display());
    }

    GeoJsonWriter::default()
        .write(collection, path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the collection when an output path is given, otherwise preview it,
/// then report the pipeline steps
fn finish_collection(
    collection: &FeatureCollection,
    output_path: Option<&Path>,
    steps: &[StepSummary],
    output: &OutputWriter,
) -> Result<()> {
    if let Some(path) = output_path {
        write_geojson(collection, path)?;
    }

    if output.is_json() {
        return output.result(CommandOutput {
            output_path: output_path.map(|p| p.display().to_string()),
            rows: collection.features().len(),
            crs: collection.crs().map(|c| c.epsg),
            steps: steps.to_vec(),
        });
    }

    match output_path {
        Some(path) => output.success(format!(
            "Wrote {} features to {}",
            collection.features().len(),
            path.display()
        )),
        None => output.preview_collection(collection, PREVIEW_ROWS),
    }
    report_steps(steps, output);
    Ok(())
}

fn report_steps(steps: &[StepSummary], output: &OutputWriter) {
    if steps.is_empty() {
        return;
    }
    output.section("Steps");
    for (i, step) in steps.iter().enumerate() {
        println!("{}. {}", i + 1, step);
    }
}
