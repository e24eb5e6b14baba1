use geoframe_ops::StepSummary;
use serde::Serialize;

/// Output for inspect command
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub path: String,
    pub crs: Option<CrsInfo>,
    pub feature_count: usize,
    pub missing_geometries: usize,
    pub invalid_geometries: usize,
    pub bounds: Option<[f64; 4]>,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Serialize)]
pub struct CrsInfo {
    pub epsg: u32,
    pub name: String,
    pub units: String,
}

#[derive(Debug, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub nulls: usize,
}

/// Output for commands that produce a collection or table
#[derive(Debug, Serialize)]
pub struct CommandOutput {
    pub output_path: Option<String>,
    pub rows: usize,
    pub crs: Option<u32>,
    pub steps: Vec<StepSummary>,
}

/// Output for groupby command
#[derive(Debug, Serialize)]
pub struct GroupbyOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub steps: Vec<StepSummary>,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}
