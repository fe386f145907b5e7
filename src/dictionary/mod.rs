//! Keyword dictionary loading and per-version merging.

mod merge;

pub use merge::{merge, MergeOutcome};

use std::path::Path;

use crate::error::{HelpError, Result};
use crate::model::KeywordDictionary;

/// Read and parse a `CMGKeywords.json` file.
///
/// Missing files, unreadable files and malformed JSON are reported as
/// distinct errors so callers never mistake a broken install for an empty
/// dictionary.
pub fn load_dictionary(path: &Path) -> Result<KeywordDictionary> {
    if !path.exists() {
        return Err(HelpError::DictionaryFileMissing(path.to_path_buf()));
    }

    let raw = std::fs::read_to_string(path).map_err(|source| HelpError::DictionaryRead {
        path: path.to_path_buf(),
        source,
    })?;

    let dictionary = parse_dictionary(&raw).map_err(|source| HelpError::DictionaryParse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        versions = dictionary.versions.len(),
        "loaded keyword dictionary"
    );
    Ok(dictionary)
}

/// Parse dictionary JSON that is already in memory
pub fn parse_dictionary(raw: &str) -> serde_json::Result<KeywordDictionary> {
    serde_json::from_str(raw)
}
