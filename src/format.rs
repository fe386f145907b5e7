//! Markdown output formatters for CLI commands

use crate::model::{DocResult, KeywordsResult, LookupResult, VersionsResult};

#[cfg(test)]
use crate::model::KeywordEntry;

/// Format a LookupResult as markdown
pub fn lookup(result: &LookupResult) -> String {
    if !result.found {
        return format!(
            "No documentation found for keyword: {} ({} {})\n",
            result.keyword, result.solver, result.version
        );
    }

    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", result.keyword));
    if let Some(description) = &result.description {
        md.push_str(description);
        md.push_str("\n\n");
    }
    if let Some(file) = &result.file {
        md.push_str(&format!("**Page**: `{}`\n", file));
    }
    md.push_str(&format!("**Solver**: {} | **Version**: {}\n", result.solver, result.version));
    md
}

/// Format a DocResult as markdown
pub fn doc(result: &DocResult) -> String {
    let mut md = String::new();

    match &result.title {
        Some(title) if !title.eq_ignore_ascii_case(&result.keyword) => {
            md.push_str(&format!("# {} — {}\n\n", result.keyword, title));
        }
        _ => md.push_str(&format!("# {}\n\n", result.keyword)),
    }

    md.push_str(&format!("**Source**: `{}`", result.path));
    if let Some(fragment) = &result.fragment {
        md.push_str(&format!(" (#{})", fragment));
    }
    md.push_str("\n\n");

    if result.fallback {
        md.push_str(&format!(
            "> **Note:** page not installed for the configured version, showing {}\n\n",
            result.version
        ));
    }

    md.push_str(&result.content);
    md.push('\n');
    md
}

/// Format a VersionsResult as markdown
pub fn versions(result: &VersionsResult) -> String {
    let mut md = String::from("# Versions\n\n");
    for version in &result.available {
        let marker = if *version == result.effective { " (active)" } else { "" };
        md.push_str(&format!("- {}{}\n", version, marker));
    }
    if result.requested != result.effective {
        md.push_str(&format!(
            "\nRequested {} is not in the dictionary; using {}.\n",
            result.requested, result.effective
        ));
    }
    md
}

/// Format a KeywordsResult as markdown
pub fn keywords(result: &KeywordsResult) -> String {
    let mut md = String::new();

    match &result.pattern {
        Some(pattern) => md.push_str(&format!("# Keywords matching `{}`\n\n", pattern)),
        None => md.push_str("# Keywords\n\n"),
    }
    md.push_str(&format!("{} {}\n\n", result.solver, result.version));

    if result.results.is_empty() {
        md.push_str("No results.\n");
    } else {
        for entry in &result.results {
            md.push_str(&format!("- **{}** — {}\n", entry.keyword, entry.description));
        }
    }

    md
}
