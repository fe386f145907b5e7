//! Keyword extraction and lookup.

use std::path::Path;

use regex::Regex;

use crate::model::{KeywordRecord, MergedKeywordTable};

/// File extensions of simulator decks that get keyword lookups by default
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["dat", "inc"];

/// Leading keyword of a deck line: optional blanks/asterisks, then an
/// uppercase token of at least two letters or hyphens.
pub fn keyword_pattern() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[\s*]*([A-Z-]{2,}[A-Z0-9-]*)").expect("invalid keyword pattern")
    })
}

/// Extract the keyword a line starts with, already normalized.
///
/// Tokens further along the line are never considered.
pub fn extract_keyword(line: &str) -> Option<String> {
    let caps = keyword_pattern().captures(line.trim())?;
    caps.get(1).map(|m| normalize_keyword(m.as_str()))
}

/// Byte range of the leading keyword within an untrimmed line
pub fn keyword_span(line: &str) -> Option<std::ops::Range<usize>> {
    keyword_pattern().captures(line)?.get(1).map(|m| m.range())
}

/// Normalize a lookup candidate: drop leading blanks and `*`, trim, uppercase.
pub fn normalize_keyword(candidate: &str) -> String {
    candidate
        .trim_start_matches(|c: char| c.is_whitespace() || c == '*')
        .trim()
        .to_uppercase()
}

/// Exact lookup of a normalized candidate. Absence is the common case.
pub fn resolve<'a>(table: &'a MergedKeywordTable, candidate: &str) -> Option<&'a KeywordRecord> {
    table.get(&normalize_keyword(candidate))
}

/// Whether a document path has one of the deck extensions (case-insensitive)
pub fn is_keyword_document<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MergedKeywordTable {
        let mut t = MergedKeywordTable::new();
        t.insert(
            "PERM".to_string(),
            KeywordRecord {
                description: "Permeability".to_string(),
                file: "perm.htm".to_string(),
            },
        );
        t.insert(
            "*INUNIT".to_string(),
            KeywordRecord {
                description: "never matched".to_string(),
                file: "x.htm".to_string(),
            },
        );
        t
    }

    // ── extract_keyword ──

    #[test]
    fn plain_keyword() {
        assert_eq!(extract_keyword("PERMI ALL"), Some("PERMI".to_string()));
    }

    #[test]
    fn asterisk_prefix() {
        assert_eq!(extract_keyword("*INUNIT *FIELD"), Some("INUNIT".to_string()));
        assert_eq!(extract_keyword("  ** *GRID"), Some("GRID".to_string()));
    }

    #[test]
    fn hyphens_and_digits() {
        assert_eq!(extract_keyword("*K-EQ2 1.0"), Some("K-EQ2".to_string()));
        assert_eq!(extract_keyword("*DI-J"), Some("DI-J".to_string()));
    }

    #[test]
    fn single_letter_is_not_a_keyword() {
        assert_eq!(extract_keyword("*I 100"), None);
    }

    #[test]
    fn numeric_and_lowercase_lines_ignored() {
        assert_eq!(extract_keyword("100*0.25 0.3"), None);
        assert_eq!(extract_keyword("perm 3"), None);
        assert_eq!(extract_keyword(""), None);
    }

    #[test]
    fn only_leading_token_is_eligible() {
        assert_eq!(extract_keyword("1.0 PERM"), None);
        assert_eq!(extract_keyword("PORO PERM"), Some("PORO".to_string()));
    }

    #[test]
    fn span_points_at_keyword() {
        let line = "   *PERMI *ALL";
        let span = keyword_span(line).unwrap();
        assert_eq!(&line[span], "PERMI");
        assert!(keyword_span("** comment").is_none());
    }

    // ── normalize_keyword ──

    #[test]
    fn normalization_is_prefix_and_case_insensitive() {
        assert_eq!(normalize_keyword("  *PERM"), "PERM");
        assert_eq!(normalize_keyword("perm"), "PERM");
        assert_eq!(normalize_keyword("PERM"), "PERM");
        assert_eq!(normalize_keyword("\t**perm  "), "PERM");
    }

    // ── resolve ──

    #[test]
    fn resolves_known_keyword() {
        let t = table();
        let record = resolve(&t, "*perm").unwrap();
        assert_eq!(record.description, "Permeability");
    }

    #[test]
    fn unknown_keyword_is_none() {
        let t = table();
        assert!(resolve(&t, "PER").is_none());
        assert!(resolve(&t, "PERMX").is_none());
        assert!(resolve(&t, "").is_none());
    }

    #[test]
    fn normalized_candidate_cannot_reach_prefixed_key() {
        let t = table();
        assert!(resolve(&t, "*INUNIT").is_none());
    }

    // ── is_keyword_document ──

    #[test]
    fn deck_extensions() {
        assert!(is_keyword_document(Path::new("/runs/base.dat"), &DEFAULT_EXTENSIONS));
        assert!(is_keyword_document(Path::new("grid.INC"), &DEFAULT_EXTENSIONS));
        assert!(!is_keyword_document(Path::new("notes.txt"), &DEFAULT_EXTENSIONS));
        assert!(!is_keyword_document(Path::new("Makefile"), &DEFAULT_EXTENSIONS));
        assert!(is_keyword_document(Path::new("a.gem"), &[".gem"]));
    }
}
