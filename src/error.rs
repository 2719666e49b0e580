//! Error types for promptgen.
//!
//! Resolution failures are structured: the offending logical name, the tier
//! that produced the ambiguity, and the candidate or searched-root lists are
//! all carried on the error so callers can render a precise diagnostic.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::template::Tier;

/// Result type alias for promptgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// One competing match reported by an ambiguous resolution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Candidate {
    /// Path relative to the candidate's template root, including extension
    pub relative_path: PathBuf,
    /// Recognized extension of the candidate, including the leading dot
    pub extension: String,
}

/// Main error type for promptgen
#[derive(Error, Debug)]
pub enum Error {
    /// Template name rejected before any catalog lookup
    #[error("invalid template name '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why the name was rejected
        reason: String,
    },

    /// No tier produced a candidate for the name
    #[error("template '{name}' not found; searched roots: {}", format_roots(.searched_roots))]
    NotFound {
        /// The unresolvable name
        name: String,
        /// Every template root that was searched, in precedence order
        searched_roots: Vec<PathBuf>,
    },

    /// More than one candidate matched within the winning tier
    #[error("template name '{name}' is ambiguous in the {tier} tier; candidates: {}", format_candidates(.candidates))]
    Ambiguous {
        /// The ambiguous name
        name: String,
        /// The tier whose candidates collided
        tier: Tier,
        /// All competing candidates, in catalog order
        candidates: Vec<Candidate>,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Template file could not be read
    #[error("template error in {template}: {message}")]
    Template {
        /// Logical name or path of the template
        template: String,
        /// Error message
        message: String,
    },

    /// Template rendering failed inside the host engine
    #[error("render error in '{template}': {message}")]
    Render {
        /// Logical name of the template being rendered
        template: String,
        /// Error message from the engine
        message: String,
    },

    /// Generation (provider/API) errors
    #[error("generation error: {0}")]
    Generation(String),

    /// Command-line usage errors
    #[error("usage error: {0}")]
    Usage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Create a template error
    pub fn template<S: Into<String>, M: Into<String>>(template: S, message: M) -> Self {
        Error::Template {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Check whether this is a resolution outcome (as opposed to an IO,
    /// configuration, or engine failure)
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Error::InvalidName { .. } | Error::NotFound { .. } | Error::Ambiguous { .. }
        )
    }

    /// Rebuild a resolution failure so it can be recovered after crossing a
    /// foreign error boundary (the host engine keeps the original only as a
    /// `source()` reference)
    pub fn clone_resolution(&self) -> Option<Self> {
        match self {
            Error::InvalidName { name, reason } => Some(Error::InvalidName {
                name: name.clone(),
                reason: reason.clone(),
            }),
            Error::NotFound {
                name,
                searched_roots,
            } => Some(Error::NotFound {
                name: name.clone(),
                searched_roots: searched_roots.clone(),
            }),
            Error::Ambiguous {
                name,
                tier,
                candidates,
            } => Some(Error::Ambiguous {
                name: name.clone(),
                tier: *tier,
                candidates: candidates.clone(),
            }),
            _ => None,
        }
    }
}

fn format_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{} ({})", c.relative_path.display(), c.extension))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_roots(roots: &[PathBuf]) -> String {
    if roots.is_empty() {
        return "(no template roots configured)".to_string();
    }
    roots
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
