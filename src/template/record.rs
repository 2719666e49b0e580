//! Core data model for the template catalog: tiers, records, extension sets,
//! and the tier→roots mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Precedence class grouping template roots.
///
/// Tiers are totally ordered: `project` shadows `user`, which shadows
/// `builtin`. Resolution walks them top-down and never backtracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Repository-local templates (highest precedence)
    Project,
    /// Per-user templates
    User,
    /// System-wide templates shipped with the tool (lowest precedence)
    Builtin,
}

impl Tier {
    /// All tiers, in precedence order (highest first)
    pub const ALL: [Tier; 3] = [Tier::Project, Tier::User, Tier::Builtin];

    /// Precedence rank for this tier; lower ranks shadow higher ones
    pub fn precedence(self) -> u8 {
        match self {
            Tier::Project => 0,
            Tier::User => 1,
            Tier::Builtin => 2,
        }
    }

    /// Lowercase tier name as used in configuration and output
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Project => "project",
            Tier::User => "user",
            Tier::Builtin => "builtin",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one discovered template file.
///
/// The true identity key is `absolute_path` together with tier and root; the
/// logical name is unique within a `(tier, root)` pair but not globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateRecord {
    /// Extensionless, `/`-separated name (e.g. `layout/base`)
    pub logical_name: String,
    /// Path relative to the template root, including extension
    pub relative_path: PathBuf,
    /// Absolute filesystem path of the template file
    pub absolute_path: PathBuf,
    /// The tier this record was discovered under
    pub tier: Tier,
    /// Zero-based position of the record's root within its tier's root list
    pub root_index: usize,
    /// Matched extension including the leading dot (e.g. `.j2`, `.j2.md`)
    pub extension: String,
}

impl TemplateRecord {
    /// Final `/`-segment of the logical name
    pub fn basename(&self) -> &str {
        self.logical_name
            .rsplit('/')
            .next()
            .unwrap_or(&self.logical_name)
    }
}

/// The set of recognized template extensions.
///
/// Extensions are matched longest-suffix-first so a compound extension like
/// `.j2.md` wins over a bare `.md` or `.j2` tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: Vec<String>,
}

impl ExtensionSet {
    /// Build a set from configured extensions.
    ///
    /// A missing leading dot is added; duplicates are dropped. The stored
    /// order is longest-first, ties broken lexicographically.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut normalized: Vec<String> = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.into();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        normalized.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        normalized.dedup();
        Self {
            extensions: normalized,
        }
    }

    /// Match a file name against the set, longest suffix first
    pub fn match_file_name(&self, file_name: &str) -> Option<&str> {
        self.extensions
            .iter()
            .find(|ext| file_name.ends_with(ext.as_str()))
            .map(String::as_str)
    }

    /// Split an explicit extension off a template name.
    ///
    /// Returns the base name and, when the name ends in a recognized
    /// extension, that extension.
    pub fn split_explicit<'a>(&self, name: &'a str) -> (&'a str, Option<&str>) {
        for ext in &self.extensions {
            if let Some(base) = name.strip_suffix(ext.as_str()) {
                return (base, Some(ext.as_str()));
            }
        }
        (name, None)
    }

    /// The extensions in matching order (longest first)
    pub fn as_slice(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new([".j2", ".j2.md"])
    }
}

/// Ordered template root directories, grouped by tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierRoots {
    /// Project-tier roots, in configuration order
    pub project: Vec<PathBuf>,
    /// User-tier roots, in configuration order
    pub user: Vec<PathBuf>,
    /// Builtin-tier roots, in configuration order
    pub builtin: Vec<PathBuf>,
}

impl TierRoots {
    /// The roots configured for one tier
    pub fn get(&self, tier: Tier) -> &[PathBuf] {
        match tier {
            Tier::Project => &self.project,
            Tier::User => &self.user,
            Tier::Builtin => &self.builtin,
        }
    }

    /// Iterate tiers in precedence order with their roots
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &[PathBuf])> + '_ {
        Tier::ALL.into_iter().map(move |tier| (tier, self.get(tier)))
    }

    /// Every root in search order: tier precedence, then configuration order
    pub fn all_roots(&self) -> Vec<PathBuf> {
        self.iter()
            .flat_map(|(_, roots)| roots.iter().cloned())
            .collect()
    }

    /// True when no tier has any root
    pub fn is_empty(&self) -> bool {
        self.project.is_empty() && self.user.is_empty() && self.builtin.is_empty()
    }
}
