//! Configuration sources and validation.
//!
//! Raw settings come from CLI flags (with `CMGHELP_*` environment fallbacks)
//! and LSP initialization options; `Config::validate` turns them into `Settings`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{HelpError, Result};
use crate::model::Solver;
use crate::resolver::DEFAULT_EXTENSIONS;

pub const ENV_ROOT_PREFIX: &str = "CMGHELP_ROOT_PREFIX";
pub const ENV_VERSION: &str = "CMGHELP_VERSION";
pub const ENV_SOLVER: &str = "CMGHELP_SOLVER";
pub const ENV_KEYWORD_DATA: &str = "CMGHELP_KEYWORD_DATA";

/// File name looked up in the home directory when no dictionary path is set
pub const DEFAULT_DICTIONARY_FILE: &str = "CMGKeywords.json";

/// Unvalidated settings; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Installation root holding one directory per version
    pub root_prefix: Option<String>,
    pub version: Option<String>,
    pub solver: Option<String>,
    /// Override for the dictionary location
    pub keyword_data_path: Option<String>,
    pub disable: Option<bool>,
    pub file_extensions: Option<Vec<String>>,
}

/// Validated settings used to build a keyword index
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root_prefix: PathBuf,
    pub version: String,
    pub solver: Solver,
    pub dictionary_path: PathBuf,
    pub file_extensions: Vec<String>,
}

impl Config {
    /// Parse editor settings, accepting both flat and `{"cmghelp": {...}}` shapes.
    ///
    /// `null` (sent by pull-model clients) is an empty overlay.
    pub fn from_json(value: &serde_json::Value) -> serde_json::Result<Self> {
        if value.is_null() {
            return Ok(Config::default());
        }
        let section = value.get("cmghelp").unwrap_or(value);
        serde_json::from_value(section.clone())
    }

    /// Fields set in `other` replace the ones in `self`
    pub fn overlay(mut self, other: Config) -> Self {
        if other.root_prefix.is_some() {
            self.root_prefix = other.root_prefix;
        }
        if other.version.is_some() {
            self.version = other.version;
        }
        if other.solver.is_some() {
            self.solver = other.solver;
        }
        if other.keyword_data_path.is_some() {
            self.keyword_data_path = other.keyword_data_path;
        }
        if other.disable.is_some() {
            self.disable = other.disable;
        }
        if other.file_extensions.is_some() {
            self.file_extensions = other.file_extensions;
        }
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disable.unwrap_or(false)
    }

    /// Check that the required keys are present and resolve defaults.
    pub fn validate(&self) -> Result<Settings> {
        let root_prefix = present(&self.root_prefix);
        let version = present(&self.version);
        let solver = present(&self.solver);

        let mut missing = Vec::new();
        if root_prefix.is_none() {
            missing.push("rootPrefix");
        }
        if version.is_none() {
            missing.push("version");
        }
        if solver.is_none() {
            missing.push("solver");
        }

        let (Some(root_prefix), Some(version), Some(solver)) = (root_prefix, version, solver)
        else {
            return Err(HelpError::ConfigurationMissing(missing));
        };

        let solver: Solver = solver.parse()?;

        let dictionary_path = match present(&self.keyword_data_path) {
            Some(path) => PathBuf::from(path),
            None => default_dictionary_path()
                .ok_or(HelpError::ConfigurationMissing(vec!["keywordDataPath"]))?,
        };

        let file_extensions = match &self.file_extensions {
            Some(exts) if !exts.is_empty() => exts.clone(),
            _ => DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        };

        Ok(Settings {
            root_prefix: PathBuf::from(root_prefix),
            version: version.to_string(),
            solver,
            dictionary_path,
            file_extensions,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// `$HOME/CMGKeywords.json` (or `%USERPROFILE%` on Windows)
pub fn default_dictionary_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(|home| PathBuf::from(home).join(DEFAULT_DICTIONARY_FILE))
}
