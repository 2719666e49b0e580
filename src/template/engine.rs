//! Host templating environment wired to catalog-based resolution.
//!
//! The environment's loader hook delegates every name (top-level renders and
//! nested `{% extends %}` / `{% include %}` / `{% import %}` references alike)
//! to the catalog resolver, so composition to any depth obeys the same tier
//! precedence rules. Resolution failures cross the engine boundary on its
//! single not-found channel, carrying the structured error along as `source()`
//! so callers still see the full diagnostic.

use std::sync::Arc;

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::template::catalog::TemplateCatalog;
use crate::template::loader::{CatalogLoader, SourceLoader};
use crate::template::resolver::resolve;

/// A templating environment bound to one catalog.
pub struct CatalogEngine {
    catalog: Arc<TemplateCatalog>,
    env: Environment<'static>,
}

impl CatalogEngine {
    /// Build an environment over the given catalog.
    ///
    /// Undefined variables are strict errors, block tags trim their trailing
    /// newline, and auto-escaping is off: templates produce prompt text, not
    /// markup.
    pub fn new(catalog: Arc<TemplateCatalog>) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);

        let loader = CatalogLoader::new(Arc::clone(&catalog));
        env.set_loader(move |name| match loader.get_source(name) {
            Ok(source) => Ok(Some(source.into_source())),
            Err(err) => Err(minijinja::Error::new(
                minijinja::ErrorKind::TemplateNotFound,
                err.to_string(),
            )
            .with_source(err)),
        });

        Self { catalog, env }
    }

    /// The catalog this environment resolves against
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Render a named template with the given variables.
    ///
    /// The entry name goes through the resolver first so callers get the
    /// structured resolution error directly; nested references fail through
    /// [`recover_error`].
    pub fn render<S: Serialize>(&self, name: &str, vars: &S) -> Result<String> {
        resolve(&self.catalog, name)?;

        let template = self
            .env
            .get_template(name)
            .map_err(|e| recover_error(name, e))?;
        template.render(vars).map_err(|e| recover_error(name, e))
    }

    /// Render a literal template string with the given variables.
    ///
    /// The string is evaluated inside this environment, so it may reference
    /// catalog templates via `{% include %}` and friends. `label` names the
    /// string in error messages.
    pub fn render_literal<S: Serialize>(&self, source: &str, vars: &S, label: &str) -> Result<String> {
        self.env
            .render_str(source, vars)
            .map_err(|e| recover_error(label, e))
    }
}

impl std::fmt::Debug for CatalogEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEngine")
            .field("templates", &self.catalog.len())
            .finish()
    }
}

/// Translate an engine error back into the crate's error type.
///
/// When the failure originated in the loader, the original resolution error
/// rides the engine error's `source()` chain and is recovered verbatim;
/// anything else (syntax errors, undefined variables) becomes a render error
/// for `template`.
fn recover_error(template: &str, err: minijinja::Error) -> Error {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(e) = current {
        if let Some(ours) = e.downcast_ref::<Error>() {
            if let Some(resolution) = ours.clone_resolution() {
                return resolution;
            }
        }
        current = e.source();
    }

    // minijinja chains render errors; include the full chain for context
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(e) = source {
        message.push_str(": ");
        message.push_str(&e.to_string());
        source = e.source();
    }

    Error::Render {
        template: template.to_string(),
        message,
    }
}
