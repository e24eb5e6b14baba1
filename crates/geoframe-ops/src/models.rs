use serde::{Deserialize, Serialize};
use std::fmt;

pub use geoframe_core::models::{MatchPolicy, OpsOptions, Suffixes};

/// Row-retention mode of an attribute join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JoinHow {
    /// Every left row at least once
    #[default]
    Left,
    /// Every right row at least once
    Right,
    /// Only rows with a match on both sides
    Inner,
    /// Union of left and right
    Outer,
}

impl JoinHow {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" => Some(JoinHow::Left),
            "right" => Some(JoinHow::Right),
            "inner" => Some(JoinHow::Inner),
            "outer" => Some(JoinHow::Outer),
            _ => None,
        }
    }

    pub(crate) fn keeps_unmatched_left(&self) -> bool {
        matches!(self, JoinHow::Left | JoinHow::Outer)
    }

    pub(crate) fn keeps_unmatched_right(&self) -> bool {
        matches!(self, JoinHow::Right | JoinHow::Outer)
    }
}

impl fmt::Display for JoinHow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JoinHow::Left => "left",
            JoinHow::Right => "right",
            JoinHow::Inner => "inner",
            JoinHow::Outer => "outer",
        };
        f.write_str(s)
    }
}

/// Row-retention mode of a spatial join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpatialJoinHow {
    #[default]
    Left,
    /// Driven by the right side; output geometry comes from the right
    Right,
    Inner,
}

impl SpatialJoinHow {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" => Some(SpatialJoinHow::Left),
            "right" => Some(SpatialJoinHow::Right),
            "inner" => Some(SpatialJoinHow::Inner),
            _ => None,
        }
    }
}

impl fmt::Display for SpatialJoinHow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpatialJoinHow::Left => "left",
            SpatialJoinHow::Right => "right",
            SpatialJoinHow::Inner => "inner",
        };
        f.write_str(s)
    }
}

/// Join key columns. The two names may differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinKey {
    pub left: String,
    pub right: String,
}

impl JoinKey {
    /// Same column name on both sides
    pub fn on(column: impl Into<String>) -> Self {
        let column = column.into();
        Self { left: column.clone(), right: column }
    }

    pub fn pair(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self { left: left.into(), right: right.into() }
    }
}

/// Reduction applied to the members of each group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    #[default]
    Count,
    Sum,
    Mean,
    Min,
    Max,
}

impl Reducer {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "count" => Some(Reducer::Count),
            "sum" => Some(Reducer::Sum),
            "mean" | "avg" => Some(Reducer::Mean),
            "min" => Some(Reducer::Min),
            "max" => Some(Reducer::Max),
            _ => None,
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Reducer::Count => "count",
            Reducer::Sum => "sum",
            Reducer::Mean => "mean",
            Reducer::Min => "min",
            Reducer::Max => "max",
        };
        f.write_str(s)
    }
}

/// Groupby or dissolve request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Grouping key column
    pub by: String,

    /// Column the reducer reads. Optional for `count`.
    pub target: Option<String>,

    pub reducer: Reducer,
}

impl Aggregation {
    /// Count member rows per group
    pub fn count(by: impl Into<String>) -> Self {
        Self { by: by.into(), target: None, reducer: Reducer::Count }
    }

    pub fn new(by: impl Into<String>, target: impl Into<String>, reducer: Reducer) -> Self {
        Self { by: by.into(), target: Some(target.into()), reducer }
    }

    /// Name of the reduced output column
    pub fn output_column(&self) -> String {
        match &self.target {
            Some(target) if target == &self.by => format!("{}_{}", target, self.reducer),
            Some(target) => target.clone(),
            None => self.reducer.to_string(),
        }
    }
}

/// One stage of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    pub name: String,
    pub rows_in: usize,
    pub rows_out: usize,
}

impl fmt::Display for StepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {} rows", self.name, self.rows_in, self.rows_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!(JoinHow::parse("OUTER"), Some(JoinHow::Outer));
        assert_eq!(SpatialJoinHow::parse("right"), Some(SpatialJoinHow::Right));
        assert_eq!(SpatialJoinHow::parse("outer"), None);
        assert_eq!(Reducer::parse("avg"), Some(Reducer::Mean));
        assert_eq!(Reducer::parse("median"), None);
    }

    #[test]
    fn test_output_column_names() {
        assert_eq!(Aggregation::count("GEOID").output_column(), "count");
        assert_eq!(Aggregation::new("GEOID", "pop", Reducer::Sum).output_column(), "pop");
        assert_eq!(Aggregation::new("GEOID", "GEOID", Reducer::Max).output_column(), "GEOID_max");
    }
}
