//! Recursive template discovery across tier roots.
//!
//! Discovery walks each resolved root, emitting one record per file whose
//! name ends in a recognized extension. Symlinks are not followed: neither
//! symlinked directories (cycle avoidance) nor symlinked files. Unreadable
//! entries are skipped with a warning; discovery itself never fails.

use std::path::Path;

use walkdir::WalkDir;

use crate::template::record::{ExtensionSet, TemplateRecord, TierRoots};

/// Discover template files across all tier roots.
///
/// Tiers are scanned in precedence order and roots within a tier in
/// configuration order, so the returned records are already grouped the way
/// the catalog orders them. The roots must have been resolved beforehand
/// (absolute, existing directories); anything else is skipped.
pub fn discover(roots: &TierRoots, extensions: &ExtensionSet) -> Vec<TemplateRecord> {
    let mut records = Vec::new();

    for (tier, tier_roots) in roots.iter() {
        for (root_index, root) in tier_roots.iter().enumerate() {
            if !root.is_dir() {
                tracing::debug!("template root is not a directory, skipping: {}", root.display());
                continue;
            }

            tracing::debug!(
                "scanning template root [{}:{}]: {}",
                tier,
                root_index,
                root.display()
            );

            for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!("skipping unreadable entry under {}: {}", root.display(), e);
                        continue;
                    }
                };

                if !entry.file_type().is_file() {
                    continue;
                }

                let Some(file_name) = entry.file_name().to_str() else {
                    tracing::warn!(
                        "skipping file with non-UTF-8 name: {}",
                        entry.path().display()
                    );
                    continue;
                };

                let Some(extension) = extensions.match_file_name(file_name) else {
                    continue;
                };

                let relative_path = match entry.path().strip_prefix(root) {
                    Ok(rel) => rel.to_path_buf(),
                    Err(_) => {
                        tracing::warn!(
                            "cannot compute path of {} relative to {}",
                            entry.path().display(),
                            root.display()
                        );
                        continue;
                    }
                };

                let Some(logical_name) = logical_name_for(&relative_path, extension) else {
                    tracing::warn!(
                        "skipping file with non-UTF-8 path component: {}",
                        entry.path().display()
                    );
                    continue;
                };

                tracing::trace!(
                    "discovered template: {} -> {}",
                    logical_name,
                    entry.path().display()
                );

                records.push(TemplateRecord {
                    logical_name,
                    relative_path,
                    absolute_path: entry.path().to_path_buf(),
                    tier,
                    root_index,
                    extension: extension.to_string(),
                });
            }
        }
    }

    records
}

/// Compute the logical name: the relative path with separators normalized to
/// `/` and the matched extension stripped
fn logical_name_for(relative_path: &Path, extension: &str) -> Option<String> {
    let mut segments = Vec::new();
    for component in relative_path.components() {
        segments.push(component.as_os_str().to_str()?);
    }
    let joined = segments.join("/");
    let name = joined.strip_suffix(extension).unwrap_or(&joined);
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_logical_name_strips_extension() {
        assert_eq!(
            logical_name_for(Path::new("summary.j2"), ".j2"),
            Some("summary".to_string())
        );
        assert_eq!(
            logical_name_for(Path::new("notes/summary.j2.md"), ".j2.md"),
            Some("notes/summary".to_string())
        );
    }

    #[test]
    fn test_logical_name_uses_forward_slashes() {
        let path: PathBuf = ["layout", "base.j2"].iter().collect();
        assert_eq!(
            logical_name_for(&path, ".j2"),
            Some("layout/base".to_string())
        );
    }
}
