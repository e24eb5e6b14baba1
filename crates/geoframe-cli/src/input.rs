//! Loading input files with the per-input CLI options

use anyhow::{bail, Context, Result};
use geoframe_core::formats::{CsvReader, FormatRegistry, GeoJsonReader, ShapefileReader};
use geoframe_core::validation::apply_validity;
use geoframe_core::{ColumnType, Crs, FeatureCollection, Table, ValidityMode};
use std::path::Path;

use crate::cli::InputOptions;

fn parse_column_type(s: &str) -> Option<ColumnType> {
    match s.trim().to_lowercase().as_str() {
        "text" | "str" | "string" => Some(ColumnType::Text),
        "int" | "integer" => Some(ColumnType::Int),
        "float" | "double" => Some(ColumnType::Float),
        "bool" | "boolean" => Some(ColumnType::Bool),
        _ => None,
    }
}

/// Parse `column=type` overrides
pub fn parse_dtypes(entries: &[String]) -> Result<Vec<(String, ColumnType)>> {
    entries
        .iter()
        .map(|entry| {
            let Some((column, dtype)) = entry.split_once('=') else {
                bail!("Invalid --dtype '{}': expected COLUMN=TYPE", entry);
            };
            let Some(dtype) = parse_column_type(dtype) else {
                bail!("Invalid --dtype '{}': type must be text, int, float or bool", entry);
            };
            Ok((column.trim().to_string(), dtype))
        })
        .collect()
}

impl InputOptions {
    fn csv_reader(&self) -> Result<CsvReader> {
        let mut reader = CsvReader::new();
        for (column, dtype) in parse_dtypes(&self.dtype)? {
            reader = reader.with_dtype(column, dtype);
        }
        if let (Some(x), Some(y)) = (&self.x, &self.y) {
            reader = reader.with_xy(x.clone(), y.clone());
        }
        if let Some(epsg) = self.crs {
            reader = reader.with_crs(Crs::from_epsg(epsg));
        }
        Ok(reader)
    }

    fn registry(&self) -> Result<FormatRegistry> {
        let mut registry = FormatRegistry::new();
        registry.register(Box::new(GeoJsonReader));
        registry.register(Box::new(ShapefileReader));
        registry.register(Box::new(self.csv_reader()?));
        Ok(registry)
    }
}

/// Load a feature collection, tagging it with `--crs` when it has none and
/// applying the geometry validity policy
pub fn load_collection(
    path: &Path,
    options: &InputOptions,
    validity: ValidityMode,
) -> Result<FeatureCollection> {
    let collection = read_collection(path, options)?;
    apply_validity(collection, validity).with_context(|| format!("Failed to load {}", path.display()))
}

/// Read a feature collection with its geometries as stored, tagging it with
/// `--crs` when it has none
pub fn read_collection(path: &Path, options: &InputOptions) -> Result<FeatureCollection> {
    let collection = options
        .registry()?
        .read(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    match options.crs {
        Some(epsg) => collection
            .set_crs(Crs::from_epsg(epsg))
            .with_context(|| format!("--crs conflicts with the CRS stored in {}", path.display())),
        None => {
            if collection.crs().is_none() {
                tracing::warn!("{} has no CRS; pass --crs to tag it", path.display());
            }
            Ok(collection)
        }
    }
}

/// Load a plain attribute table. CSV files are read directly; other formats
/// have their geometry dropped.
pub fn load_table(path: &Path, options: &InputOptions) -> Result<Table> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "csv" | "tsv" | "txt"))
        .unwrap_or(false);

    if is_csv {
        let reader = options.csv_reader()?;
        return reader.read_table(path).with_context(|| format!("Failed to read {}", path.display()));
    }

    let collection = options
        .registry()?
        .load(path, ValidityMode::Lenient)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(collection.to_table())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dtypes() {
        let parsed = parse_dtypes(&["GEOID=text".to_string(), "pop = Int".to_string()]).unwrap();
        assert_eq!(parsed, vec![("GEOID".to_string(), ColumnType::Text), ("pop".to_string(), ColumnType::Int)]);

        assert!(parse_dtypes(&["GEOID".to_string()]).is_err());
        assert!(parse_dtypes(&["GEOID=date".to_string()]).is_err());
    }

    #[test]
    fn test_csv_points_need_crs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wells.csv");
        std::fs::write(&path, "id,X,Y\n1,5,5\n").unwrap();

        let mut options = InputOptions { x: Some("X".into()), y: Some("Y".into()), ..Default::default() };
        assert!(load_collection(&path, &options, ValidityMode::Lenient).is_err());

        options.crs = Some(26910);
        let wells = load_collection(&path, &options, ValidityMode::Lenient).unwrap();
        assert_eq!(wells.crs().unwrap().epsg, 26910);
        assert!(wells.features()[0].geometry.is_some());
    }
}
