//! Integration tests for template discovery and catalog construction

use promptgen::template::{ExtensionSet, TemplateCatalog, Tier, TierRoots};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// Helper to create a template file under a root, creating parent directories
fn write_template(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn roots(project: &Path, user: &Path, builtin: &Path) -> TierRoots {
    TierRoots {
        project: vec![project.to_path_buf()],
        user: vec![user.to_path_buf()],
        builtin: vec![builtin.to_path_buf()],
    }
}

fn single_tier(project: &Path) -> TierRoots {
    TierRoots {
        project: vec![project.to_path_buf()],
        user: vec![],
        builtin: vec![],
    }
}

/// Every file with a recognized extension yields exactly one record; nothing
/// else yields any
#[test]
fn test_one_record_per_recognized_file() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "summary.j2", "s");
    write_template(dir.path(), "notes.j2.md", "n");
    write_template(dir.path(), "README.md", "not a template");
    write_template(dir.path(), "script.py", "not a template");

    let catalog = TemplateCatalog::build(&single_tier(dir.path()), ExtensionSet::default());

    let names: Vec<&str> = catalog.iter().map(|r| r.logical_name.as_str()).collect();
    assert_eq!(names, vec!["notes", "summary"]);
}

/// Compound extensions are matched before their shorter tails
#[test]
fn test_longest_suffix_extension_wins() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "summary.j2.md", "x");

    let catalog = TemplateCatalog::build(&single_tier(dir.path()), ExtensionSet::default());

    assert_eq!(catalog.len(), 1);
    let record = &catalog.records()[0];
    assert_eq!(record.logical_name, "summary");
    assert_eq!(record.extension, ".j2.md");
}

/// Nested directories become `/`-separated logical names
#[test]
fn test_nested_directories_form_slash_names() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "email/drafts/summary.j2", "x");

    let catalog = TemplateCatalog::build(&single_tier(dir.path()), ExtensionSet::default());

    let record = &catalog.records()[0];
    assert_eq!(record.logical_name, "email/drafts/summary");
    assert_eq!(
        record.relative_path,
        Path::new("email").join("drafts").join("summary.j2")
    );
    assert!(record.absolute_path.is_absolute());
}

/// Missing roots are a normal configuration state, not an error
#[test]
fn test_missing_roots_are_skipped() {
    let project = TempDir::new().unwrap();
    write_template(project.path(), "summary.j2", "x");

    let raw = TierRoots {
        project: vec![project.path().to_path_buf()],
        user: vec![project.path().join("does-not-exist")],
        builtin: vec![],
    };

    let catalog = TemplateCatalog::build(&raw, ExtensionSet::default());
    assert_eq!(catalog.len(), 1);
    // only the existing root counts as searched
    assert_eq!(catalog.searched_roots().len(), 1);
}

/// Records come out in canonical order: tier precedence, then root index,
/// then relative path
#[test]
fn test_canonical_ordering_across_tiers_and_roots() {
    let project_a = TempDir::new().unwrap();
    let project_b = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    let builtin = TempDir::new().unwrap();

    write_template(project_a.path(), "zeta.j2", "x");
    write_template(project_a.path(), "alpha.j2", "x");
    write_template(project_b.path(), "beta.j2", "x");
    write_template(user.path(), "user.j2", "x");
    write_template(builtin.path(), "base.j2", "x");

    let raw = TierRoots {
        project: vec![project_a.path().to_path_buf(), project_b.path().to_path_buf()],
        user: vec![user.path().to_path_buf()],
        builtin: vec![builtin.path().to_path_buf()],
    };

    let catalog = TemplateCatalog::build(&raw, ExtensionSet::default());

    let listing: Vec<(Tier, usize, String)> = catalog
        .iter()
        .map(|r| (r.tier, r.root_index, r.logical_name.clone()))
        .collect();
    assert_eq!(
        listing,
        vec![
            (Tier::Project, 0, "alpha".to_string()),
            (Tier::Project, 0, "zeta".to_string()),
            (Tier::Project, 1, "beta".to_string()),
            (Tier::User, 0, "user".to_string()),
            (Tier::Builtin, 0, "base".to_string()),
        ]
    );
}

/// Discovery on unchanged filesystem state is deterministic
#[test]
fn test_discovery_is_deterministic() {
    let project = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    let builtin = TempDir::new().unwrap();
    for name in ["b/two.j2", "a/one.j2", "top.j2.md", "z.j2"] {
        write_template(project.path(), name, "x");
    }
    write_template(user.path(), "u.j2", "x");

    let raw = roots(project.path(), user.path(), builtin.path());

    let first = TemplateCatalog::build(&raw, ExtensionSet::default());
    let second = TemplateCatalog::build(&raw, ExtensionSet::default());

    assert_eq!(first.records(), second.records());
}

/// Symlinked directories are not descended into
#[cfg(unix)]
#[test]
fn test_symlinked_directories_not_followed() {
    let dir = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    write_template(outside.path(), "hidden.j2", "x");
    write_template(dir.path(), "visible.j2", "x");

    std::os::unix::fs::symlink(outside.path(), dir.path().join("linked")).unwrap();

    let catalog = TemplateCatalog::build(&single_tier(dir.path()), ExtensionSet::default());

    let names: Vec<&str> = catalog.iter().map(|r| r.logical_name.as_str()).collect();
    assert_eq!(names, vec!["visible"]);
}

/// A custom extension set replaces the default one
#[test]
fn test_custom_extension_set() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "summary.tpl", "x");
    write_template(dir.path(), "other.j2", "x");

    let catalog = TemplateCatalog::build(&single_tier(dir.path()), ExtensionSet::new([".tpl"]));

    let names: Vec<&str> = catalog.iter().map(|r| r.logical_name.as_str()).collect();
    assert_eq!(names, vec!["summary"]);
}

/// The same logical name may exist in several tiers; the catalog keeps all of
/// them, grouped by tier in its indices
#[test]
fn test_same_name_across_tiers_kept_separately() {
    let project = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    let builtin = TempDir::new().unwrap();
    write_template(project.path(), "summary.j2", "p");
    write_template(user.path(), "summary.j2", "u");

    let catalog = TemplateCatalog::build(
        &roots(project.path(), user.path(), builtin.path()),
        ExtensionSet::default(),
    );

    let found = catalog.records_by_full_name("summary");
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].tier, Tier::Project);
    assert_eq!(found[1].tier, Tier::User);

    let by_basename = catalog.records_by_basename("summary");
    assert_eq!(by_basename.len(), 2);
}

/// The basename index only compares the final segment, at any depth
#[test]
fn test_basename_index_spans_depths() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "summary.j2", "x");
    write_template(dir.path(), "email/summary.j2", "x");
    write_template(dir.path(), "email/summary-of-others.j2", "x");

    let catalog = TemplateCatalog::build(&single_tier(dir.path()), ExtensionSet::default());

    let found = catalog.records_by_basename("summary");
    let names: Vec<&str> = found.iter().map(|r| r.logical_name.as_str()).collect();
    assert_eq!(names, vec!["email/summary", "summary"]);
}

/// An unreadable or empty tree just produces an empty catalog
#[test]
fn test_empty_roots_yield_empty_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog = TemplateCatalog::build(&single_tier(dir.path()), ExtensionSet::default());
    assert!(catalog.is_empty());
    assert_eq!(catalog.len(), 0);
}
