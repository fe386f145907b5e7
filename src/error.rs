use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while configuring the keyword session or opening a manual page.
///
/// A keyword that simply is not in the dictionary is *not* an error; lookups
/// return `None` for that case.
#[derive(Debug, Error)]
pub enum HelpError {
    #[error("missing configuration: {}", .0.join(", "))]
    ConfigurationMissing(Vec<&'static str>),

    #[error("unknown solver `{0}` (expected GEM, IMEX or STARS)")]
    UnknownSolver(String),

    #[error("keyword dictionary not found: {}", .0.display())]
    DictionaryFileMissing(PathBuf),

    #[error("failed to read keyword dictionary {}", path.display())]
    DictionaryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse keyword dictionary {}", path.display())]
    DictionaryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("keyword dictionary contains no versions")]
    EmptyDictionary,

    #[error("no documentation for keyword {0}")]
    KeywordNotFound(String),

    #[error("documentation page not found: {}", .0.display())]
    DocumentationFileMissing(PathBuf),

    #[error("failed to read documentation page {}", path.display())]
    DocumentationRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HelpError {
    /// The message followed by each underlying cause, for surfaces that only show one line
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

pub type Result<T, E = HelpError> = std::result::Result<T, E>;
