pub mod feature;
pub mod geometry;
pub mod options;
pub mod schema;
pub mod table;
pub mod value;

pub use feature::{Feature, FeatureCollection};
pub use geometry::{Crs, CrsUnits, Geometry, GeometryType, Predicate, ValidityMode};
pub use options::{MatchPolicy, OpsOptions, Suffixes};
pub use schema::{Column, ColumnType, Schema};
pub use table::{Row, Table, Tabular};
pub use value::{KeyValue, Value};
