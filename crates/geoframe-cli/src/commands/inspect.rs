//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::input::read_collection;
use crate::output::OutputWriter;
use crate::output_types::{ColumnInfo, CrsInfo, InspectOutput};
use anyhow::Result;
use geoframe_core::config::LayeredConfig;
use geoframe_core::validation::{apply_validity, count_invalid_geometries};
use geoframe_core::{FeatureCollection, Tabular};
use geoframe_ops::geometry_ops::total_bounds;
use serde::Serialize;
use tabled::Tabled;

pub fn execute(args: InspectArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let stored = read_collection(&args.path, &args.input)?;
    let invalid = count_invalid_geometries(&stored);
    let collection = apply_validity(stored, config.geometry_validity.value)?;
    let summary = summarize(&args.path.display().to_string(), &collection, invalid);

    if output.is_json() {
        return output.result(summary);
    }

    output.section(format!("Dataset: {}", summary.path));
    match &summary.crs {
        Some(crs) => output.kv("CRS", format!("EPSG:{} ({}, {})", crs.epsg, crs.name, crs.units)),
        None => output.warning("No CRS; spatial operations will be refused until one is set"),
    }
    output.kv("Features", summary.feature_count);
    if summary.missing_geometries > 0 {
        output.kv("Missing geometries", summary.missing_geometries);
    }
    if summary.invalid_geometries > 0 {
        output.kv("Invalid geometries", summary.invalid_geometries);
    }
    if let Some([min_x, min_y, max_x, max_y]) = summary.bounds {
        output.kv("Bounds", format!("[{}, {}, {}, {}]", min_x, min_y, max_x, max_y));
    }

    output.section("Columns");

    #[derive(Tabled, Serialize)]
    struct ColumnRow {
        #[tabled(rename = "Column")]
        name: String,
        #[tabled(rename = "Type")]
        dtype: String,
        #[tabled(rename = "Nulls")]
        nulls: usize,
    }

    let rows: Vec<ColumnRow> = summary
        .columns
        .into_iter()
        .map(|c| ColumnRow { name: c.name, dtype: c.dtype, nulls: c.nulls })
        .collect();
    output.table(rows)?;

    if args.head > 0 {
        output.section("Preview");
        output.preview_collection(&collection, args.head);
    }

    Ok(())
}

fn summarize(path: &str, collection: &FeatureCollection, invalid_geometries: usize) -> InspectOutput {
    let columns = collection
        .schema()
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| ColumnInfo {
            name: column.name.clone(),
            dtype: column.dtype.to_string(),
            nulls: collection.features().iter().filter(|f| f.attributes[idx].is_null()).count(),
        })
        .collect();

    InspectOutput {
        path: path.to_string(),
        crs: collection.crs().map(|crs| CrsInfo {
            epsg: crs.epsg,
            name: crs.name.clone(),
            units: format!("{:?}", crs.units),
        }),
        feature_count: collection.len(),
        missing_geometries: collection.features().iter().filter(|f| !f.has_geometry()).count(),
        invalid_geometries,
        bounds: total_bounds(collection),
        columns,
    }
}
