use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// geoframe - joins and aggregation over geospatial feature collections
#[derive(Parser, Debug)]
#[command(name = "geoframe")]
#[command(about = "Attribute joins, spatial joins and dissolve over vector files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./geoframe.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suffix for colliding left column names
    #[arg(long, global = true)]
    pub left_suffix: Option<String>,

    /// Suffix for colliding right column names
    #[arg(long, global = true)]
    pub right_suffix: Option<String>,

    /// How multiple spatial matches are kept (all or first)
    #[arg(long, global = true)]
    pub match_policy: Option<String>,

    /// Distance in CRS units within which a point counts as on a geometry
    #[arg(long, global = true)]
    pub snap_tolerance: Option<f64>,

    /// Evaluate spatial joins pairwise without the R-tree
    #[arg(long, global = true)]
    pub no_index: bool,

    /// Geometry validity mode (strict or lenient)
    #[arg(long, global = true)]
    pub geometry_validity: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show CRS, feature count and schema of a file
    Inspect(InspectArgs),

    /// Transform a file into another CRS
    Reproject(ReprojectArgs),

    /// Join a table onto a collection by key columns
    Join(JoinArgs),

    /// Join two collections by a spatial predicate
    Sjoin(SjoinArgs),

    /// Merge geometries by key and reduce a column
    Dissolve(AggregateArgs),

    /// Reduce a column by key and print the table
    Groupby(AggregateArgs),

    /// Show effective configuration values and their sources
    Config,
}

/// Options applied to every input file
#[derive(Args, Debug, Clone, Default)]
pub struct InputOptions {
    /// X coordinate column for CSV inputs
    #[arg(long, requires = "y")]
    pub x: Option<String>,

    /// Y coordinate column for CSV inputs
    #[arg(long, requires = "x")]
    pub y: Option<String>,

    /// EPSG code to tag inputs that carry no CRS
    #[arg(long, value_name = "EPSG")]
    pub crs: Option<u32>,

    /// Column type override for CSV inputs, e.g. GEOID=text
    #[arg(long, value_name = "COLUMN=TYPE")]
    pub dtype: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    pub path: PathBuf,

    #[command(flatten)]
    pub input: InputOptions,

    /// Number of attribute rows to preview
    #[arg(long, default_value = "5")]
    pub head: usize,
}

#[derive(Parser, Debug)]
pub struct ReprojectArgs {
    pub path: PathBuf,

    /// Target EPSG code
    #[arg(long)]
    pub to: u32,

    /// Output GeoJSON path
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    #[command(flatten)]
    pub input: InputOptions,
}

#[derive(Parser, Debug)]
pub struct JoinArgs {
    /// Left collection
    pub left: PathBuf,

    /// Right table
    pub right: PathBuf,

    /// Key column in the left input
    #[arg(long)]
    pub left_on: String,

    /// Key column in the right input (defaults to --left-on)
    #[arg(long)]
    pub right_on: Option<String>,

    /// left, right, inner or outer
    #[arg(long, default_value = "left")]
    pub how: String,

    /// Output GeoJSON path; prints a preview when omitted
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub input: InputOptions,
}

#[derive(Parser, Debug)]
pub struct SjoinArgs {
    pub left: PathBuf,

    pub right: PathBuf,

    /// intersects, within, contains or dwithin
    #[arg(long, default_value = "intersects")]
    pub predicate: String,

    /// Distance for dwithin, in CRS units
    #[arg(long)]
    pub distance: Option<f64>,

    /// left, right or inner
    #[arg(long, default_value = "left")]
    pub how: String,

    /// Output GeoJSON path; prints a preview when omitted
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Loading options for the left input; --dtype also applies to the right
    #[command(flatten)]
    pub input: InputOptions,

    /// X coordinate column when the right input is a CSV
    #[arg(long, requires = "right_y")]
    pub right_x: Option<String>,

    /// Y coordinate column when the right input is a CSV
    #[arg(long, requires = "right_x")]
    pub right_y: Option<String>,

    /// EPSG code to tag the right input when it carries no CRS
    #[arg(long, value_name = "EPSG")]
    pub right_crs: Option<u32>,
}

impl SjoinArgs {
    /// Loading options for the right input. Only --dtype is shared with the left.
    pub fn right_input(&self) -> InputOptions {
        InputOptions {
            x: self.right_x.clone(),
            y: self.right_y.clone(),
            crs: self.right_crs,
            dtype: self.input.dtype.clone(),
        }
    }
}

#[derive(Parser, Debug)]
pub struct AggregateArgs {
    pub path: PathBuf,

    /// Grouping key column
    #[arg(long)]
    pub by: String,

    /// Column to reduce (not needed for count)
    #[arg(long)]
    pub target: Option<String>,

    /// count, sum, mean, min or max
    #[arg(long, default_value = "count")]
    pub reducer: String,

    /// Output GeoJSON path (dissolve only)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub input: InputOptions,
}
