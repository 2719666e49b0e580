//! Tier-aware template name resolution.
//!
//! Resolution walks tiers top-down and decides within the first tier that
//! has any candidate: one match wins, several are a hard ambiguity, and no
//! backtracking into lower tiers ever happens once a tier has spoken. The
//! outcome is a pure function of the catalog and the name.

use crate::error::{Candidate, Error, Result};
use crate::template::catalog::TemplateCatalog;
use crate::template::record::{TemplateRecord, Tier};

/// Resolve a logical template name to exactly one record.
///
/// The name may carry an explicit recognized extension (`summary.j2`), which
/// filters candidates within a tier but never alters the tier walk itself. A
/// name containing `/` must match a full logical name exactly; a bare name
/// matches the final segment of any logical name, at any depth.
///
/// # Errors
///
/// * [`Error::InvalidName`] for empty names, `..` segments, or
///   absolute-looking prefixes, checked before any lookup.
/// * [`Error::Ambiguous`] when the first tier with candidates has more than
///   one, listing every competitor.
/// * [`Error::NotFound`] when no tier matches, listing every searched root.
pub fn resolve<'a>(catalog: &'a TemplateCatalog, name: &str) -> Result<&'a TemplateRecord> {
    validate_name(name)?;

    let (base_name, required_extension) = catalog.extensions().split_explicit(name);
    if base_name.is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "nothing left after stripping the extension".to_string(),
        });
    }

    let path_specific = base_name.contains('/');
    tracing::debug!(
        "resolving '{}': base='{}', extension={:?}, {}",
        name,
        base_name,
        required_extension,
        if path_specific {
            "path-specific"
        } else {
            "basename-only"
        }
    );

    let matches = if path_specific {
        catalog.records_by_full_name(base_name)
    } else {
        catalog.records_by_basename(base_name)
    };

    for tier in Tier::ALL {
        let tier_candidates: Vec<&TemplateRecord> = matches
            .iter()
            .filter(|r| r.tier == tier)
            .filter(|r| required_extension.map_or(true, |ext| r.extension == ext))
            .copied()
            .collect();

        match tier_candidates.as_slice() {
            [] => continue,
            [record] => {
                tracing::debug!("resolved '{}' to {}", name, record.absolute_path.display());
                return Ok(*record);
            }
            _ => {
                return Err(Error::Ambiguous {
                    name: name.to_string(),
                    tier,
                    candidates: tier_candidates
                        .iter()
                        .map(|r| Candidate {
                            relative_path: r.relative_path.clone(),
                            extension: r.extension.clone(),
                        })
                        .collect(),
                })
            }
        }
    }

    Err(Error::NotFound {
        name: name.to_string(),
        searched_roots: catalog.searched_roots().to_vec(),
    })
}

/// Reject names that are empty, traverse upward, or look absolute
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "name is empty"));
    }
    if name.starts_with('/') || name.starts_with('\\') {
        return Err(invalid(name, "absolute paths are not allowed"));
    }
    let bytes = name.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return Err(invalid(name, "absolute paths are not allowed"));
    }
    if name.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(invalid(name, "path traversal segments are not allowed"));
    }
    Ok(())
}

fn invalid(name: &str, reason: &str) -> Error {
    Error::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_rejects_bad_shapes() {
        assert!(validate_name("").is_err());
        assert!(validate_name("/etc/passwd").is_err());
        assert!(validate_name("\\windows").is_err());
        assert!(validate_name("c:/windows").is_err());
        assert!(validate_name("../secrets").is_err());
        assert!(validate_name("a/../b").is_err());
        assert!(validate_name("a\\..\\b").is_err());
    }

    #[test]
    fn test_validate_name_accepts_normal_shapes() {
        assert!(validate_name("summary").is_ok());
        assert!(validate_name("layout/base").is_ok());
        assert!(validate_name("summary.j2").is_ok());
        assert!(validate_name("notes..md").is_ok());
        assert!(validate_name("a.b/c").is_ok());
    }
}
