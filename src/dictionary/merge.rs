use crate::error::{HelpError, Result};
use crate::model::{MergedKeywordTable, Solver, VersionedDictionary};

/// Result of merging one version of the dictionary
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: MergedKeywordTable,
    /// Version the table was built from
    pub version: String,
    /// True when the requested version was absent and `version` was substituted
    pub substituted: bool,
    /// Every version key in the dictionary, in document order
    pub available_versions: Vec<String>,
}

/// Flatten the per-solver keyword maps of one version into a single table.
///
/// Fallback solvers are applied in `preferred.fallbacks()` order, each one
/// *replacing* the table built so far, so only the last fallback that has
/// data survives. The preferred solver is then layered on top key by key.
pub fn merge(
    dictionary: &VersionedDictionary,
    version: &str,
    preferred: Solver,
) -> Result<MergeOutcome> {
    let available_versions: Vec<String> = dictionary.keys().cloned().collect();

    let (effective, variants, substituted) = match dictionary.get_key_value(version) {
        Some((key, variants)) => (key.clone(), variants, false),
        None => {
            let (key, variants) = dictionary
                .first()
                .ok_or(HelpError::EmptyDictionary)?;
            (key.clone(), variants, true)
        }
    };

    let mut table = MergedKeywordTable::new();
    for fallback in preferred.fallbacks() {
        if let Some(keywords) = variants.get(fallback.as_str()) {
            table = keywords.clone();
        }
    }

    if let Some(keywords) = variants.get(preferred.as_str()) {
        table.extend(keywords.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    Ok(MergeOutcome {
        table,
        version: effective,
        substituted,
        available_versions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::parse_dictionary;
    use crate::model::KeywordRecord;

    fn dict(json: &str) -> VersionedDictionary {
        parse_dictionary(json).unwrap().versions
    }

    fn record(description: &str, file: &str) -> KeywordRecord {
        KeywordRecord {
            description: description.to_string(),
            file: file.to_string(),
        }
    }

    const SHARED: &str = r#"{"versions":{"2023":{
        "GEM":{"PERM":{"description":"d1","file":"a.htm"}},
        "IMEX":{"PERM":{"description":"d2","file":"b.htm"}}
    }}}"#;

    #[test]
    fn preferred_wins_on_conflict() {
        let out = merge(&dict(SHARED), "2023", Solver::Gem).unwrap();
        assert_eq!(out.table.len(), 1);
        assert_eq!(out.table["PERM"], record("d1", "a.htm"));
        assert!(!out.substituted);
    }

    #[test]
    fn absent_preferred_uses_last_fallback_with_data() {
        // STARS falls back through IMEX then GEM; GEM is applied last
        let out = merge(&dict(SHARED), "2023", Solver::Stars).unwrap();
        assert_eq!(out.table["PERM"], record("d1", "a.htm"));

        // IMEX falls back through STARS then GEM, then IMEX overrides
        let out = merge(&dict(SHARED), "2023", Solver::Imex).unwrap();
        assert_eq!(out.table["PERM"], record("d2", "b.htm"));
    }

    #[test]
    fn fallback_fills_keys_missing_from_preferred() {
        let json = r#"{"versions":{"2023":{
            "STARS":{"TEMP":{"description":"t","file":"t.htm"}},
            "IMEX":{"PERMI":{"description":"i","file":"i.htm"}},
            "GEM":{"PERMJ":{"description":"g","file":"g.htm"}}
        }}}"#;
        let out = merge(&dict(json), "2023", Solver::Gem).unwrap();
        assert_eq!(out.table["PERMI"], record("i", "i.htm"));
        assert_eq!(out.table["PERMJ"], record("g", "g.htm"));
    }

    #[test]
    fn fallbacks_replace_rather_than_union() {
        let json = r#"{"versions":{"2023":{
            "STARS":{"TEMP":{"description":"t","file":"t.htm"}},
            "IMEX":{"PERMI":{"description":"i","file":"i.htm"}},
            "GEM":{"PERMJ":{"description":"g","file":"g.htm"}}
        }}}"#;
        // GEM order is STARS then IMEX: IMEX replaces STARS entirely
        let out = merge(&dict(json), "2023", Solver::Gem).unwrap();
        assert!(!out.table.contains_key("TEMP"));
        assert_eq!(out.table.len(), 2);
    }

    #[test]
    fn missing_version_substitutes_first() {
        let out = merge(&dict(SHARED), "1999", Solver::Gem).unwrap();
        assert!(out.substituted);
        assert_eq!(out.version, "2023");
        assert_eq!(out.available_versions, vec!["2023".to_string()]);
        assert_eq!(out.table["PERM"], record("d1", "a.htm"));
    }

    #[test]
    fn substitution_follows_document_order() {
        let json = r#"{"versions":{"2024":{"GEM":{"A":{"description":"new","file":"a.htm"}}},
                                   "2019":{"GEM":{"A":{"description":"old","file":"a.htm"}}}}}"#;
        let out = merge(&dict(json), "2030", Solver::Gem).unwrap();
        assert_eq!(out.version, "2024");
        assert_eq!(out.available_versions, vec!["2024", "2019"]);
        assert_eq!(out.table["A"].description, "new");
    }

    #[test]
    fn no_solver_data_gives_empty_table() {
        let json = r#"{"versions":{"2023":{"OTHER":{"X":{"description":"x","file":"x.htm"}}}}}"#;
        let out = merge(&dict(json), "2023", Solver::Imex).unwrap();
        assert!(out.table.is_empty());
    }

    #[test]
    fn empty_dictionary_is_an_error() {
        let err = merge(&dict(r#"{"versions":{}}"#), "2023", Solver::Gem).unwrap_err();
        assert!(matches!(err, HelpError::EmptyDictionary));
    }

    #[test]
    fn merge_is_deterministic() {
        let d = dict(SHARED);
        for solver in Solver::ALL {
            let a = merge(&d, "2023", solver).unwrap();
            let b = merge(&d, "2023", solver).unwrap();
            assert_eq!(a.table, b.table);
        }
    }
}
