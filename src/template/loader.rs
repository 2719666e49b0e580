//! Source retrieval for a host templating engine.
//!
//! [`SourceLoader`] is the capability interface any engine with a
//! pluggable-loader concept can bind to: a logical name in, source text plus
//! provenance and a freshness check out. [`CatalogLoader`] implements it on
//! top of the resolver, so nested references inside templates go through the
//! same tier rules as top-level lookups.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::Result;
use crate::template::catalog::TemplateCatalog;
use crate::template::resolver::resolve;

/// Source text and provenance for one loaded template.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    source: String,
    absolute_path: PathBuf,
    mtime: Option<SystemTime>,
}

impl TemplateSource {
    /// The template source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consume the loaded source, returning the text
    pub fn into_source(self) -> String {
        self.source
    }

    /// Absolute path the source was read from
    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    /// Freshness check: true while the file's modification time is unchanged
    /// since loading. Reports stale when the mtime was or becomes unreadable.
    pub fn is_current(&self) -> bool {
        let Some(loaded) = self.mtime else {
            return false;
        };
        match std::fs::metadata(&self.absolute_path).and_then(|m| m.modified()) {
            Ok(current) => current == loaded,
            Err(_) => false,
        }
    }
}

/// Capability interface for supplying template source text by logical name
pub trait SourceLoader: Send + Sync {
    /// Resolve `name` and read its source
    fn get_source(&self, name: &str) -> Result<TemplateSource>;
}

/// Loader that resolves names through a [`TemplateCatalog`].
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    catalog: Arc<TemplateCatalog>,
}

impl CatalogLoader {
    /// Create a loader over the given catalog
    pub fn new(catalog: Arc<TemplateCatalog>) -> Self {
        tracing::debug!("catalog loader initialized with {} templates", catalog.len());
        Self { catalog }
    }

    /// The catalog this loader resolves against
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }
}

impl SourceLoader for CatalogLoader {
    fn get_source(&self, name: &str) -> Result<TemplateSource> {
        let record = resolve(&self.catalog, name)?;

        let source = std::fs::read_to_string(&record.absolute_path).map_err(|e| {
            crate::error::Error::template(
                name,
                format!("cannot read {}: {}", record.absolute_path.display(), e),
            )
        })?;

        let mtime = std::fs::metadata(&record.absolute_path)
            .and_then(|m| m.modified())
            .ok();

        tracing::trace!("loaded template '{}' from {}", name, record.absolute_path.display());

        Ok(TemplateSource {
            source,
            absolute_path: record.absolute_path.clone(),
            mtime,
        })
    }
}
