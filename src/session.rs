//! Keyword session: the loaded dictionary snapshot and the enable toggle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::config::{Config, Settings};
use crate::dictionary::{load_dictionary, merge};
use crate::docs::{self, DocLocation, DocTarget};
use crate::error::{HelpError, Result};
use crate::model::{KeywordRecord, MergedKeywordTable, VersionedDictionary};
use crate::resolver;

/// Immutable result of one configuration load
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    settings: Settings,
    table: MergedKeywordTable,
    effective_version: String,
    substituted: bool,
    available_versions: Vec<String>,
}

/// A keyword resolved against an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub keyword: String,
    pub record: Option<KeywordRecord>,
}

impl KeywordIndex {
    /// Merge an already-parsed dictionary for the configured version and solver
    pub fn build(settings: Settings, dictionary: &VersionedDictionary) -> Result<Self> {
        let outcome = merge(dictionary, &settings.version, settings.solver)?;
        if outcome.substituted {
            tracing::warn!(
                requested = %settings.version,
                using = %outcome.version,
                available = %outcome.available_versions.join(", "),
                "version not in keyword dictionary, substituting"
            );
        }
        Ok(Self {
            settings,
            table: outcome.table,
            effective_version: outcome.version,
            substituted: outcome.substituted,
            available_versions: outcome.available_versions,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Version the table was merged from (may differ from the configured one)
    pub fn effective_version(&self) -> &str {
        &self.effective_version
    }

    pub fn substituted(&self) -> bool {
        self.substituted
    }

    pub fn available_versions(&self) -> &[String] {
        &self.available_versions
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn resolve(&self, candidate: &str) -> Option<&KeywordRecord> {
        resolver::resolve(&self.table, candidate)
    }

    pub fn lookup(&self, candidate: &str) -> Lookup {
        Lookup {
            keyword: resolver::normalize_keyword(candidate),
            record: self.resolve(candidate).cloned(),
        }
    }

    /// Keywords matching a `*` glob (all when `None`), sorted by name
    pub fn keywords(&self, pattern: Option<&str>) -> Vec<(&str, &KeywordRecord)> {
        let matcher = pattern.map(glob_to_regex);
        let mut entries: Vec<(&str, &KeywordRecord)> = self
            .table
            .iter()
            .filter(|(k, _)| matcher.as_ref().map_or(true, |re| re.is_match(k)))
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Find the manual page for a keyword or a followed link.
    ///
    /// Pages are looked up under the configured version directory first, as
    /// the install layout is independent of which version the table came from.
    /// Absolute links into the install are treated like their relative form.
    pub fn locate_documentation(&self, target: &DocTarget) -> Result<DocLocation> {
        let file = match target {
            DocTarget::Keyword(keyword) => self
                .resolve(keyword)
                .map(|r| r.file.clone())
                .ok_or_else(|| HelpError::KeywordNotFound(resolver::normalize_keyword(keyword)))?,
            // links copied from a rendered page point into a specific version
            DocTarget::Page { file, .. } => docs::relative_page(&self.settings.root_prefix, file)
                .unwrap_or_else(|| file.clone()),
        };
        docs::locate(
            &self.settings.root_prefix,
            &self.settings.version,
            &self.available_versions,
            &file,
        )
    }
}

fn glob_to_regex(pattern: &str) -> regex::Regex {
    let escaped = regex::escape(&pattern.to_uppercase()).replace(r"\*", ".*");
    regex::Regex::new(&format!("^{escaped}$")).expect("escaped glob is a valid regex")
}

/// Process-wide keyword state with explicit load/reload.
///
/// Readers take an `Arc` snapshot; a reload swaps in a freshly built index in
/// one store, so a lookup sees either the old table or the new one.
#[derive(Debug)]
pub struct KeywordSession {
    index: ArcSwapOption<KeywordIndex>,
    enabled: AtomicBool,
}

impl Default for KeywordSession {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordSession {
    /// An empty, enabled session with nothing loaded
    pub fn new() -> Self {
        Self {
            index: ArcSwapOption::empty(),
            enabled: AtomicBool::new(true),
        }
    }

    /// Create a session and load it, failing if the configuration is unusable
    pub fn open(config: &Config) -> Result<Self> {
        let session = Self::new();
        session.load(config)?;
        Ok(session)
    }

    /// Validate `config`, read the dictionary and install a new index.
    ///
    /// On failure the session is left with no index.
    pub fn load(&self, config: &Config) -> Result<Arc<KeywordIndex>> {
        self.enabled.store(!config.is_disabled(), Ordering::Relaxed);
        match Self::build(config) {
            Ok(index) => {
                let index = Arc::new(index);
                self.index.store(Some(Arc::clone(&index)));
                tracing::info!(
                    keywords = index.len(),
                    version = %index.effective_version(),
                    solver = %index.settings().solver,
                    "keyword index loaded"
                );
                Ok(index)
            }
            Err(e) => {
                self.index.store(None);
                tracing::error!("keyword index not loaded: {}", e.chain());
                Err(e)
            }
        }
    }

    /// Rebuild from scratch; identical to `load` but logged as a reload
    pub fn reload(&self, config: &Config) -> Result<Arc<KeywordIndex>> {
        tracing::info!("reloading keyword dictionary");
        self.load(config)
    }

    fn build(config: &Config) -> Result<KeywordIndex> {
        let settings = config.validate()?;
        let dictionary = load_dictionary(&settings.dictionary_path)?;
        KeywordIndex::build(settings, &dictionary.versions)
    }

    pub fn index(&self) -> Option<Arc<KeywordIndex>> {
        self.index.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.index.load().is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        tracing::info!(enabled, "keyword help toggled");
    }

    /// Look up a candidate; `None` when disabled or nothing is loaded
    pub fn lookup(&self, candidate: &str) -> Option<Lookup> {
        if !self.is_enabled() {
            return None;
        }
        self.index.load_full().map(|idx| idx.lookup(candidate))
    }

    /// Look up the keyword a deck line starts with
    pub fn lookup_line(&self, line: &str) -> Option<Lookup> {
        let keyword = resolver::extract_keyword(line)?;
        tracing::debug!(%keyword, "keyword under cursor");
        self.lookup(&keyword)
    }
}
