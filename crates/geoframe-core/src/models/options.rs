//! Options shared by the join and aggregation operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How multiple spatial matches for one driving row are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Keep every match, one output row per pair
    #[default]
    All,
    /// Keep only the lowest-index match
    First,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::All => f.write_str("all"),
            MatchPolicy::First => f.write_str("first"),
        }
    }
}

/// Suffixes appended to colliding non-key column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suffixes {
    pub left: String,
    pub right: String,
}

impl Default for Suffixes {
    fn default() -> Self {
        Self { left: "_left".to_string(), right: "_right".to_string() }
    }
}

/// Tuning knobs for joins. None of them change which pairs match except
/// `snap_tolerance`, which is zero unless configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpsOptions {
    pub suffixes: Suffixes,
    pub match_policy: MatchPolicy,
    /// Distance in CRS units within which a point counts as on a geometry
    pub snap_tolerance: f64,
    pub use_index: bool,
}

impl Default for OpsOptions {
    fn default() -> Self {
        Self {
            suffixes: Suffixes::default(),
            match_policy: MatchPolicy::All,
            snap_tolerance: 0.0,
            use_index: true,
        }
    }
}
