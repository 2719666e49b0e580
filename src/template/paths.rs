//! Platform-specific path resolution for template root directories.
//!
//! Raw configured roots may be relative or use `~` shorthand; resolution
//! turns them into absolute, existing directories and drops the rest with a
//! logged notice. A missing root is a normal configuration state (e.g. no
//! project templates yet), never an error.

use std::path::{Path, PathBuf};

use crate::template::record::TierRoots;

/// Utility for resolving template root paths
#[derive(Debug)]
pub struct PathResolver;

impl PathResolver {
    /// Get the builtin (system-wide) template directory
    pub fn builtin_template_dir() -> PathBuf {
        #[cfg(unix)]
        {
            PathBuf::from("/usr/local/share/promptgen/templates")
        }

        #[cfg(windows)]
        {
            let program_data =
                std::env::var("ProgramData").unwrap_or_else(|_| "C:\\ProgramData".to_string());
            PathBuf::from(program_data)
                .join("promptgen")
                .join("templates")
        }
    }

    /// Get the user-specific template directory
    pub fn user_template_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("promptgen").join("templates"))
            .unwrap_or_else(|| PathBuf::from("~/.config/promptgen/templates"))
    }

    /// Get the project template directory, anchored at the repository root
    /// when inside one, otherwise at the current directory
    pub fn project_template_dir() -> PathBuf {
        let base = std::env::current_dir()
            .ok()
            .and_then(|cwd| find_repo_root(&cwd))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(".promptgen").join("templates")
    }

    /// Default roots for all tiers, one directory per tier
    pub fn default_roots() -> TierRoots {
        TierRoots {
            project: vec![Self::project_template_dir()],
            user: vec![Self::user_template_dir()],
            builtin: vec![Self::builtin_template_dir()],
        }
    }

    /// Resolve a raw tier→roots mapping into absolute, existing directories.
    ///
    /// Each entry is home-expanded, absolutized against the current
    /// directory, and canonicalized. Entries that do not exist are skipped
    /// with a debug notice; entries that exist but are not directories are
    /// skipped with a warning. Ordering within each tier is preserved.
    pub fn resolve_roots(raw: &TierRoots) -> TierRoots {
        TierRoots {
            project: Self::resolve_tier(&raw.project),
            user: Self::resolve_tier(&raw.user),
            builtin: Self::resolve_tier(&raw.builtin),
        }
    }

    fn resolve_tier(roots: &[PathBuf]) -> Vec<PathBuf> {
        roots
            .iter()
            .filter_map(|root| Self::resolve_one(root))
            .collect()
    }

    fn resolve_one(root: &Path) -> Option<PathBuf> {
        let expanded = Self::expand_home(root);
        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            match std::env::current_dir() {
                Ok(cwd) => cwd.join(expanded),
                Err(e) => {
                    tracing::warn!(
                        "cannot resolve relative template root {}: {}",
                        root.display(),
                        e
                    );
                    return None;
                }
            }
        };

        if !absolute.exists() {
            tracing::debug!("template root does not exist, skipping: {}", absolute.display());
            return None;
        }
        if !absolute.is_dir() {
            tracing::warn!(
                "template root is not a directory, skipping: {}",
                absolute.display()
            );
            return None;
        }

        match absolute.canonicalize() {
            Ok(canonical) => Some(canonical),
            Err(e) => {
                tracing::warn!(
                    "cannot canonicalize template root {}: {}",
                    absolute.display(),
                    e
                );
                None
            }
        }
    }

    /// Expand a leading `~` to the user's home directory
    pub fn expand_home(path: &Path) -> PathBuf {
        let Some(text) = path.to_str() else {
            return path.to_path_buf();
        };
        if text == "~" {
            return dirs::home_dir().unwrap_or_else(|| path.to_path_buf());
        }
        if let Some(rest) = text.strip_prefix("~/").or_else(|| text.strip_prefix("~\\")) {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        path.to_path_buf()
    }
}

/// Find the root of the enclosing Git repository, if any, by walking up from
/// `start` looking for a `.git` marker
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}
