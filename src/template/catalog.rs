//! Immutable template catalog with lookup indices.
//!
//! A catalog is built once per command invocation from the resolved roots and
//! is read-only afterwards: every accessor borrows, nothing mutates, and the
//! whole structure is discarded wholesale when roots change. Queries are safe
//! from any number of threads.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::template::discovery::discover;
use crate::template::paths::PathResolver;
use crate::template::record::{ExtensionSet, TemplateRecord, TierRoots};

/// The immutable, ordered collection of discovered templates.
///
/// Records are held in canonical order (tier precedence, then root index,
/// then relative path) and indexed both by full logical name and by the
/// final name segment.
#[derive(Debug)]
pub struct TemplateCatalog {
    records: Vec<TemplateRecord>,
    by_full_name: HashMap<String, Vec<usize>>,
    by_basename: HashMap<String, Vec<usize>>,
    searched_roots: Vec<PathBuf>,
    extensions: ExtensionSet,
}

impl TemplateCatalog {
    /// Build a catalog from raw tier roots: resolve the roots, discover the
    /// templates under them, and index the result
    pub fn build(raw_roots: &TierRoots, extensions: ExtensionSet) -> Self {
        let roots = PathResolver::resolve_roots(raw_roots);
        let records = discover(&roots, &extensions);
        tracing::info!("discovered {} templates", records.len());
        Self::from_records(records, roots.all_roots(), extensions)
    }

    /// Build a catalog from pre-discovered records.
    ///
    /// Records are re-sorted into canonical order, so callers need not care
    /// about input order. `searched_roots` is kept verbatim for not-found
    /// diagnostics.
    pub fn from_records(
        mut records: Vec<TemplateRecord>,
        searched_roots: Vec<PathBuf>,
        extensions: ExtensionSet,
    ) -> Self {
        records.sort_by(|a, b| {
            (a.tier.precedence(), a.root_index, &a.relative_path).cmp(&(
                b.tier.precedence(),
                b.root_index,
                &b.relative_path,
            ))
        });

        let mut by_full_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_basename: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            by_full_name
                .entry(record.logical_name.clone())
                .or_default()
                .push(index);
            by_basename
                .entry(record.basename().to_string())
                .or_default()
                .push(index);
        }

        Self {
            records,
            by_full_name,
            by_basename,
            searched_roots,
            extensions,
        }
    }

    /// All records in canonical order
    pub fn records(&self) -> &[TemplateRecord] {
        &self.records
    }

    /// Iterate over records in canonical order
    pub fn iter(&self) -> std::slice::Iter<'_, TemplateRecord> {
        self.records.iter()
    }

    /// Number of records in the catalog
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when discovery found nothing
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose full logical name matches `name`, in canonical order
    /// (which groups them by tier)
    pub fn records_by_full_name(&self, name: &str) -> Vec<&TemplateRecord> {
        self.lookup(&self.by_full_name, name)
    }

    /// Records whose final name segment matches `segment`, in canonical order
    /// (which groups them by tier)
    pub fn records_by_basename(&self, segment: &str) -> Vec<&TemplateRecord> {
        self.lookup(&self.by_basename, segment)
    }

    /// Every root that was searched during discovery, in precedence order
    pub fn searched_roots(&self) -> &[PathBuf] {
        &self.searched_roots
    }

    /// The recognized-extension set this catalog was built with
    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    fn lookup(&self, index: &HashMap<String, Vec<usize>>, key: &str) -> Vec<&TemplateRecord> {
        index
            .get(key)
            .map(|ids| ids.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a TemplateCatalog {
    type Item = &'a TemplateRecord;
    type IntoIter = std::slice::Iter<'a, TemplateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::record::Tier;

    fn record(tier: Tier, root_index: usize, rel: &str, ext: &str) -> TemplateRecord {
        let logical = rel.strip_suffix(ext).unwrap().to_string();
        TemplateRecord {
            logical_name: logical,
            relative_path: PathBuf::from(rel),
            absolute_path: PathBuf::from("/roots").join(rel),
            tier,
            root_index,
            extension: ext.to_string(),
        }
    }

    #[test]
    fn test_canonical_order() {
        let records = vec![
            record(Tier::Builtin, 0, "zeta.j2", ".j2"),
            record(Tier::Project, 1, "alpha.j2", ".j2"),
            record(Tier::Project, 0, "beta.j2", ".j2"),
            record(Tier::User, 0, "gamma.j2", ".j2"),
            record(Tier::Project, 0, "alpha.j2", ".j2"),
        ];
        let catalog = TemplateCatalog::from_records(records, Vec::new(), ExtensionSet::default());

        let names: Vec<(Tier, usize, &str)> = catalog
            .iter()
            .map(|r| (r.tier, r.root_index, r.logical_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                (Tier::Project, 0, "alpha"),
                (Tier::Project, 0, "beta"),
                (Tier::Project, 1, "alpha"),
                (Tier::User, 0, "gamma"),
                (Tier::Builtin, 0, "zeta"),
            ]
        );
    }

    #[test]
    fn test_full_name_index_spans_tiers() {
        let records = vec![
            record(Tier::User, 0, "summary.j2", ".j2"),
            record(Tier::Project, 0, "summary.j2", ".j2"),
        ];
        let catalog = TemplateCatalog::from_records(records, Vec::new(), ExtensionSet::default());

        let found = catalog.records_by_full_name("summary");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].tier, Tier::Project);
        assert_eq!(found[1].tier, Tier::User);
    }

    #[test]
    fn test_basename_index_matches_any_depth() {
        let records = vec![
            record(Tier::Project, 0, "email/summary.j2", ".j2"),
            record(Tier::Project, 0, "summary.j2", ".j2"),
            record(Tier::Project, 0, "email/other.j2", ".j2"),
        ];
        let catalog = TemplateCatalog::from_records(records, Vec::new(), ExtensionSet::default());

        let found = catalog.records_by_basename("summary");
        assert_eq!(found.len(), 2);
        assert!(catalog.records_by_basename("missing").is_empty());
    }
}
