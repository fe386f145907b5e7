use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::HelpError;

/// Documentation entry for a single keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRecord {
    /// Short synopsis shown in hovers
    pub description: String,
    /// Manual page, relative to `<root>/<version>/`
    pub file: String,
}

/// Simulator engine whose keyword vocabulary a dictionary entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Solver {
    Gem,
    Imex,
    Stars,
}

impl Solver {
    pub const ALL: [Solver; 3] = [Solver::Gem, Solver::Imex, Solver::Stars];

    pub fn as_str(&self) -> &'static str {
        match self {
            Solver::Gem => "GEM",
            Solver::Imex => "IMEX",
            Solver::Stars => "STARS",
        }
    }

    /// Solvers consulted before this one, in the order they are applied.
    pub fn fallbacks(&self) -> [Solver; 2] {
        match self {
            Solver::Imex => [Solver::Stars, Solver::Gem],
            Solver::Gem => [Solver::Stars, Solver::Imex],
            Solver::Stars => [Solver::Imex, Solver::Gem],
        }
    }
}

impl std::fmt::Display for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Solver {
    type Err = HelpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GEM" => Ok(Solver::Gem),
            "IMEX" => Ok(Solver::Imex),
            "STARS" => Ok(Solver::Stars),
            _ => Err(HelpError::UnknownSolver(s.to_string())),
        }
    }
}

/// Keyword name -> record, for one solver of one version
pub type KeywordMap = HashMap<String, KeywordRecord>;

/// Solver name (as written in the dictionary) -> keyword map
pub type VariantSet = HashMap<String, KeywordMap>;

/// Version -> solvers, in document order
pub type VersionedDictionary = IndexMap<String, VariantSet>;

/// Flattened lookup table for one version and one solver precedence
pub type MergedKeywordTable = HashMap<String, KeywordRecord>;

/// Top-level shape of `CMGKeywords.json`
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordDictionary {
    pub versions: VersionedDictionary,
}

/// JSON output for lookup command
#[derive(Debug, Clone, Serialize)]
pub struct LookupResult {
    pub keyword: String,
    pub found: bool,
    pub solver: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// JSON output for doc command
#[derive(Debug, Clone, Serialize)]
pub struct DocResult {
    pub keyword: String,
    pub path: String,
    pub version: String,
    /// True when the page was found under a version other than the configured one
    pub fallback: bool,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
    pub content: String,
}

/// JSON output for versions command
#[derive(Debug, Serialize)]
pub struct VersionsResult {
    pub requested: String,
    pub effective: String,
    pub available: Vec<String>,
}

/// JSON output for keywords command
#[derive(Debug, Serialize)]
pub struct KeywordsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub solver: String,
    pub version: String,
    pub results: Vec<KeywordEntry>,
}

#[derive(Debug, Serialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub description: String,
    pub file: String,
}
