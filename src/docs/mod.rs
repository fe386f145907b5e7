//! Locating and rendering keyword manual pages.

pub mod markdown;

use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::error::{HelpError, Result};

/// What the user asked to open: a keyword, or a manual page followed from a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocTarget {
    Keyword(String),
    Page {
        /// Path relative to `<root>/<version>/`
        file: String,
        fragment: Option<String>,
    },
}

impl DocTarget {
    /// Anything mentioning an `.htm` page is a link, everything else a keyword.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if !input.to_ascii_lowercase().contains(".htm") {
            return DocTarget::Keyword(input.to_string());
        }
        let (file, fragment) = match input.split_once('#') {
            Some((file, fragment)) if !fragment.is_empty() => {
                (file.to_string(), Some(fragment.to_string()))
            }
            Some((file, _)) => (file.to_string(), None),
            None => (input.to_string(), None),
        };
        DocTarget::Page { file, fragment }
    }

    /// Keyword shown as the page heading.
    ///
    /// For links this is the file stem up to the first `_`, as manual pages
    /// are named `<keyword>_<suffix>.htm`.
    pub fn keyword(&self) -> String {
        match self {
            DocTarget::Keyword(keyword) => crate::resolver::normalize_keyword(keyword),
            DocTarget::Page { file, .. } => {
                let name = file.rsplit(['/', '\\']).next().unwrap_or(file);
                let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
                stem.split('_').next().unwrap_or(stem).to_uppercase()
            }
        }
    }
}

/// A manual page found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLocation {
    pub path: PathBuf,
    /// Version directory the page was found under
    pub version: String,
    /// True when `version` differs from the configured one
    pub fallback: bool,
}

/// Join a dictionary-relative file onto a directory.
///
/// Dictionary paths come from Windows installs and may use `\`.
pub fn page_path(root: &Path, version: &str, file: &str) -> PathBuf {
    let mut path = root.join(version);
    for part in file.split(['/', '\\']).filter(|p| !p.is_empty() && *p != ".") {
        path.push(part);
    }
    path
}

/// Reduce a link to an installed page back to a path relative to its version
/// directory.
///
/// Accepts `file://` URIs (as emitted in rendered pages) and absolute paths
/// under `root`. Returns `None` for relative references and for anything
/// outside the install.
pub fn relative_page(root: &Path, file: &str) -> Option<String> {
    let absolute = if file.get(..5).is_some_and(|s| s.eq_ignore_ascii_case("file:")) {
        Url::parse(file).ok()?.to_file_path().ok()?
    } else {
        let path = PathBuf::from(file);
        if !path.is_absolute() {
            return None;
        }
        path
    };

    let mut parts = absolute.strip_prefix(root).ok()?.components();
    // first component is the version directory
    match parts.next()? {
        Component::Normal(_) => {}
        _ => return None,
    }
    let rest = parts
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    (!rest.is_empty()).then(|| rest.join("/"))
}

/// Find `file` under the configured version, then under every other known
/// version in order.
///
/// Fails with the last path tried.
pub fn locate(root: &Path, version: &str, available: &[String], file: &str) -> Result<DocLocation> {
    let mut attempted = page_path(root, version, file);
    if attempted.is_file() {
        return Ok(DocLocation {
            path: attempted,
            version: version.to_string(),
            fallback: false,
        });
    }
    tracing::debug!(path = %attempted.display(), "manual page missing for configured version");

    for other in available.iter().filter(|v| v.as_str() != version) {
        attempted = page_path(root, other, file);
        if attempted.is_file() {
            tracing::info!(path = %attempted.display(), "found manual page under another version");
            return Ok(DocLocation {
                path: attempted,
                version: other.clone(),
                fallback: true,
            });
        }
    }

    Err(HelpError::DocumentationFileMissing(attempted))
}

/// Read a located page from disk
pub fn read_page(location: &DocLocation) -> Result<String> {
    let bytes = std::fs::read(&location.path).map_err(|source| HelpError::DocumentationRead {
        path: location.path.clone(),
        source,
    })?;
    // Older manuals ship as Windows-1252; keep what is valid instead of failing
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
