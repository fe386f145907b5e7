//! cmg-help: keyword documentation lookup for CMG simulator decks
//!
//! Loads the locally installed `CMGKeywords.json` dictionary, merges the
//! GEM/IMEX/STARS keyword sets for one version, and resolves the keyword a
//! deck line starts with to its synopsis and manual page. Used by the
//! `cmg-help` CLI and its stdio language server.

pub mod config;
pub mod dictionary;
pub mod docs;
pub mod error;
pub mod format;
pub mod lsp;
pub mod model;
pub mod resolver;
pub mod session;

use std::sync::Arc;

use config::Config;
use docs::DocTarget;
use error::Result;
use session::{KeywordIndex, KeywordSession};

/// Build a one-shot index for CLI-style calls
fn open_index(config: &Config) -> Result<Arc<KeywordIndex>> {
    KeywordSession::new().load(config)
}

/// Resolve a deck line or a bare keyword
///
/// A line is reduced to its leading keyword first; text that does not look
/// like a deck line is treated as the keyword itself.
///
/// # Returns
/// `LookupResult` with `found = false` when the dictionary has no entry
pub fn lookup(config: &Config, text: &str) -> Result<model::LookupResult> {
    let index = open_index(config)?;
    let keyword =
        resolver::extract_keyword(text).unwrap_or_else(|| resolver::normalize_keyword(text));
    let record = index.resolve(&keyword);

    Ok(model::LookupResult {
        found: record.is_some(),
        description: record.map(|r| r.description.clone()),
        file: record.map(|r| r.file.clone()),
        keyword,
        solver: index.settings().solver.to_string(),
        version: index.effective_version().to_string(),
    })
}

/// Locate and render the manual page for a keyword or page link
///
/// # Arguments
/// * `target` - a keyword (`PERMI`) or a page path (`imex/perm.htm#perm`)
///
/// # Returns
/// `DocResult` with the page converted to markdown
pub fn documentation(config: &Config, target: &str) -> Result<model::DocResult> {
    let index = open_index(config)?;

    let target = DocTarget::parse(target);
    let location = index.locate_documentation(&target)?;
    let html = docs::read_page(&location)?;
    let page = docs::markdown::render_page(&html, &location.path);

    let fragment = match &target {
        DocTarget::Page { fragment, .. } => fragment.clone(),
        DocTarget::Keyword(_) => None,
    };

    Ok(model::DocResult {
        keyword: target.keyword(),
        path: location.path.display().to_string(),
        version: location.version,
        fallback: location.fallback,
        title: page.title,
        fragment,
        content: page.markdown,
    })
}

/// Requested, effective and available dictionary versions
pub fn list_versions(config: &Config) -> Result<model::VersionsResult> {
    let index = open_index(config)?;

    Ok(model::VersionsResult {
        requested: index.settings().version.clone(),
        effective: index.effective_version().to_string(),
        available: index.available_versions().to_vec(),
    })
}

/// Keywords of the merged table, optionally filtered by a `*` glob
pub fn list_keywords(
    config: &Config,
    pattern: Option<&str>,
    limit: usize,
) -> Result<model::KeywordsResult> {
    let index = open_index(config)?;

    let results = index
        .keywords(pattern)
        .into_iter()
        .take(limit)
        .map(|(keyword, record)| model::KeywordEntry {
            keyword: keyword.to_string(),
            description: record.description.clone(),
            file: record.file.clone(),
        })
        .collect();

    Ok(model::KeywordsResult {
        pattern: pattern.map(str::to_string),
        solver: index.settings().solver.to_string(),
        version: index.effective_version().to_string(),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn install(dir: &Path) -> Config {
        let dict = r#"{"versions":{
            "2023.10":{"IMEX":{"PERMI":{"description":"Permeability in I","file":"imex/permi_1.htm"}}},
            "2022.10":{"IMEX":{"PERMI":{"description":"old","file":"imex/permi_1.htm"}},
                       "GEM":{"DIFCOR-OIL":{"description":"Diffusion","file":"gem/dif.htm"}}}
        }}"#;
        let dict_path = dir.join("CMGKeywords.json");
        std::fs::write(&dict_path, dict).unwrap();

        let page = dir.join("cmg/2022.10/imex/permi_1.htm");
        std::fs::create_dir_all(page.parent().unwrap()).unwrap();
        std::fs::write(
            &page,
            r#"<html><head><title>PERMI</title></head><body><p>See <a href="poro.htm">POR</a>.</p></body></html>"#,
        )
        .unwrap();
        std::fs::write(
            page.with_file_name("poro.htm"),
            r#"<html><head><title>POR</title></head><body><h2 id="units">Units</h2></body></html>"#,
        )
        .unwrap();

        Config {
            root_prefix: Some(dir.join("cmg").display().to_string()),
            version: Some("2023.10".to_string()),
            solver: Some("IMEX".to_string()),
            keyword_data_path: Some(dict_path.display().to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn lookup_line_and_bare_keyword() {
        let dir = tempfile::tempdir().unwrap();
        let config = install(dir.path());

        let line = lookup(&config, "*PERMI *ALL 100.0").unwrap();
        assert!(line.found);
        assert_eq!(line.keyword, "PERMI");
        assert_eq!(line.description.as_deref(), Some("Permeability in I"));
        assert_eq!(line.version, "2023.10");

        let bare = lookup(&config, "permi").unwrap();
        assert!(bare.found);

        let missing = lookup(&config, "*SWT").unwrap();
        assert!(!missing.found);
        assert_eq!(missing.keyword, "SWT");
    }

    #[test]
    fn documentation_falls_back_to_older_version() {
        let dir = tempfile::tempdir().unwrap();
        let config = install(dir.path());

        let doc = documentation(&config, "PERMI").unwrap();
        assert_eq!(doc.keyword, "PERMI");
        assert_eq!(doc.version, "2022.10");
        assert!(doc.fallback);
        assert_eq!(doc.title.as_deref(), Some("PERMI"));
        assert!(doc.content.contains("2022.10/imex/poro.htm"));
    }

    #[test]
    fn documentation_for_page_link() {
        let dir = tempfile::tempdir().unwrap();
        let config = install(dir.path());

        let doc = documentation(&config, "imex/permi_1.htm#units").unwrap();
        assert_eq!(doc.keyword, "PERMI");
        assert_eq!(doc.fragment.as_deref(), Some("units"));
    }

    #[test]
    fn rendered_links_can_be_followed() {
        let dir = tempfile::tempdir().unwrap();
        let config = install(dir.path());

        let doc = documentation(&config, "PERMI").unwrap();
        let start = doc.content.find("](").unwrap() + 2;
        let end = start + doc.content[start..].find(')').unwrap();
        let link = &doc.content[start..end];
        assert!(link.starts_with("file://"));

        let followed = documentation(&config, link).unwrap();
        assert_eq!(followed.keyword, "PORO");
        assert_eq!(followed.title.as_deref(), Some("POR"));
        assert_eq!(followed.version, "2022.10");
        assert!(followed.content.contains("Units"));

        let with_fragment = documentation(&config, &format!("{link}#units")).unwrap();
        assert_eq!(with_fragment.fragment.as_deref(), Some("units"));

        let by_path = dir.path().join("cmg/2022.10/imex/poro.htm");
        let followed = documentation(&config, &by_path.display().to_string()).unwrap();
        assert_eq!(followed.keyword, "PORO");
    }

    #[test]
    fn documentation_for_unknown_keyword() {
        let dir = tempfile::tempdir().unwrap();
        let config = install(dir.path());
        let err = documentation(&config, "NOPE").unwrap_err();
        assert!(matches!(err, error::HelpError::KeywordNotFound(_)));
    }

    #[test]
    fn versions_in_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = install(dir.path());
        config.version = Some("2030.10".to_string());

        let versions = list_versions(&config).unwrap();
        assert_eq!(versions.requested, "2030.10");
        assert_eq!(versions.effective, "2023.10");
        assert_eq!(versions.available, vec!["2023.10", "2022.10"]);
    }

    #[test]
    fn keywords_with_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = install(dir.path());
        config.version = Some("2022.10".to_string());

        let all = list_keywords(&config, None, 50).unwrap();
        let names: Vec<&str> = all.results.iter().map(|e| e.keyword.as_str()).collect();
        assert_eq!(names, ["DIFCOR-OIL", "PERMI"]);

        let one = list_keywords(&config, Some("*OIL"), 50).unwrap();
        assert_eq!(one.results.len(), 1);

        let limited = list_keywords(&config, None, 1).unwrap();
        assert_eq!(limited.results.len(), 1);
    }
}
