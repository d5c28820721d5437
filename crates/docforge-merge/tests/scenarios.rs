/*
 * scenarios.rs
 *
 * End-to-end merges of realistic mkdocs.yml files against the built-in
 * ownership table.
 */

use docforge_merge::{
    ChangeKind, DocumentRole, MergeError, MergeOptions, MergeOutcome, merge_texts, mkdocs_table,
};
use docforge_yaml::{KeyPath, Node, parse};

fn merge(template: &str, existing: Option<&str>) -> MergeOutcome {
    merge_texts(template, existing, mkdocs_table(), &MergeOptions::default()).unwrap()
}

fn records(outcome: &MergeOutcome) -> Vec<(String, ChangeKind)> {
    outcome
        .changes
        .iter()
        .map(|record| (record.path.to_string(), record.kind))
        .collect()
}

fn get(text: &str, path: &str) -> Node {
    parse(text)
        .unwrap()
        .get(&KeyPath::parse(path).unwrap())
        .cloned()
        .unwrap_or_else(|| panic!("missing {path}"))
}

const TEMPLATE: &str = "\
site_name: Demo Project
site_url: https://example.github.io/demo/
repo_url: https://github.com/example/demo
theme:
  name: material
  palette:
    - scheme: default
      primary: indigo
  features:
    - navigation.tabs
    - content.code.copy
plugins:
  - search
  - gen-files:
      scripts:
        - docs/generated/gen_ref_pages.py
  - literate-nav
  - mkdocstrings:
      handlers:
        python:
          paths: [src]
markdown_extensions:
  - admonition
  - pymdownx.superfences
nav:
  - Home: index.md
  - Python API: generated/python-api.md
";

const EXISTING: &str = "\
# Site configuration - edit freely, docforge keeps your changes.
site_name: Old Name
site_url: https://docs.example.com/   # custom domain

theme:
  name: material
  logo: assets/logo.svg
  palette:
    - scheme: slate
      primary: teal
  features: [navigation.tabs, content.code.copy]

plugins:
  - search:
      lang: de
  - mkdocstrings:
      handlers:
        python:
          paths: [lib]
          options:
            docstring_style: numpy   # team convention
  - my-company-plugin

markdown_extensions:
  - admonition
  - footnotes

# Hand-written navigation
nav:
  - Home: index.md
  - Guide:
      - guide/setup.md
      - guide/usage.md

extra:
  analytics:
    provider: google
    property: G-XXXX
";

#[test]
fn test_plugins_and_comments_scenario() {
    let template = "plugins:\n  - search\n  - mkdocstrings\nsite_name: X\n";
    let existing = "\
site_name: Old
plugins:
  - search
  - extra-plugin
# Navigation
nav:
  - Home: index.md
  - About: about.md
";
    let outcome = merge(template, Some(existing));
    assert_eq!(
        outcome.text,
        "\
plugins:
  - search
  - mkdocstrings
  - extra-plugin
site_name: X
# Navigation
nav:
  - Home: index.md
  - About: about.md
"
    );
    assert_eq!(
        records(&outcome),
        vec![
            ("plugins[mkdocstrings]".to_string(), ChangeKind::Added),
            ("plugins[extra-plugin]".to_string(), ChangeKind::Preserved),
            ("site_name".to_string(), ChangeKind::Updated),
        ]
    );
}

#[test]
fn test_list_merge_ordering() {
    let outcome = merge(
        "plugins:\n  - A\n  - B:\n      x: 1\n",
        Some("plugins:\n  - B:\n      x: 2\n      y: 3\n  - C\n"),
    );
    // B is in both lists; with no managed keys below it the user's body wins.
    assert_eq!(
        outcome.text,
        "plugins:\n  - A\n  - B:\n      x: 2\n      y: 3\n  - C\n"
    );
    assert_eq!(
        records(&outcome),
        vec![
            ("plugins[A]".to_string(), ChangeKind::Added),
            ("plugins[B]".to_string(), ChangeKind::Preserved),
            ("plugins[C]".to_string(), ChangeKind::Preserved),
        ]
    );
}

#[test]
fn test_realistic_merge() {
    let outcome = merge(TEMPLATE, Some(EXISTING));

    // Managed paths take the template's values.
    assert_eq!(get(&outcome.text, "site_name").as_str(), Some("Demo Project"));
    assert_eq!(
        get(&outcome.text, "site_url").as_str(),
        Some("https://example.github.io/demo/")
    );
    assert!(
        get(&outcome.text, "theme.palette").same_value(&get(TEMPLATE, "theme.palette"))
    );
    assert!(
        get(&outcome.text, "plugins[mkdocstrings].handlers.python.paths")
            .same_value(&get(TEMPLATE, "plugins[mkdocstrings].handlers.python.paths"))
    );

    // Comments on replaced values stay.
    assert!(outcome.text.contains("site_url: https://example.github.io/demo/   # custom domain\n"));

    // Everything else is the user's.
    assert!(outcome.text.contains("            docstring_style: numpy   # team convention\n"));
    assert_eq!(get(&outcome.text, "theme.logo").as_str(), Some("assets/logo.svg"));
    assert!(outcome.text.contains("  - search:\n      lang: de\n"));
    assert!(outcome.text.contains(
        "\n# Hand-written navigation\nnav:\n  - Home: index.md\n  - Guide:\n      - guide/setup.md\n      - guide/usage.md\n"
    ));

    let plugin_ids: Vec<String> = get(&outcome.text, "plugins")
        .as_sequence()
        .unwrap()
        .items
        .iter()
        .map(|item| item.identity("name").unwrap())
        .collect();
    assert_eq!(
        plugin_ids,
        [
            "search",
            "gen-files",
            "literate-nav",
            "mkdocstrings",
            "my-company-plugin"
        ]
    );

    let updated: Vec<String> = outcome
        .changes
        .of_kind(ChangeKind::Updated)
        .map(|record| record.path.to_string())
        .collect();
    assert_eq!(
        updated,
        [
            "site_name",
            "site_url",
            "theme.palette",
            "plugins[mkdocstrings].handlers.python.paths"
        ]
    );
    assert!(outcome.changes.warnings().next().is_none());
}

#[test]
fn test_preservation_is_byte_identical() {
    let outcome = merge(TEMPLATE, Some(EXISTING));
    let merged = parse(&outcome.text).unwrap();
    let existing = parse(EXISTING).unwrap();
    for path in ["extra", "nav", "theme.logo", "plugins[my-company-plugin]"] {
        let path = KeyPath::parse(path).unwrap();
        let before = existing.get(&path).unwrap();
        let after = merged.get(&path).unwrap();
        assert!(after.same_structure(before), "{path} changed");
    }
    assert!(outcome.text.contains(
        "extra:\n  analytics:\n    provider: google\n    property: G-XXXX\n"
    ));
    assert!(outcome.text.starts_with(
        "# Site configuration - edit freely, docforge keeps your changes.\nsite_name: Demo Project\n"
    ));
}

#[test]
fn test_idempotent_on_realistic_files() {
    let first = merge(TEMPLATE, Some(EXISTING));
    assert!(first.changes.has_changes());

    let second = merge(TEMPLATE, Some(&first.text));
    assert!(
        !second.changes.has_changes(),
        "unexpected changes: {:?}",
        records(&second)
    );
    assert_eq!(second.text, first.text);
}

#[test]
fn test_first_run() {
    let outcome = merge(TEMPLATE, None);
    assert_eq!(outcome.text, TEMPLATE);
    let added: Vec<String> = outcome
        .changes
        .of_kind(ChangeKind::Added)
        .map(|record| record.path.to_string())
        .collect();
    assert_eq!(
        added,
        [
            "site_name",
            "site_url",
            "repo_url",
            "theme",
            "plugins",
            "markdown_extensions",
            "nav"
        ]
    );
    assert_eq!(outcome.changes.len(), added.len());
}

#[test]
fn test_empty_existing_file_adds_everything() {
    let outcome = merge(TEMPLATE, Some(""));
    assert_eq!(outcome.text, TEMPLATE);
    assert_eq!(outcome.changes.of_kind(ChangeKind::Added).count(), 7);
}

#[test]
fn test_depth_bound_on_block_nesting() {
    let mut existing = String::from("site_name: A\nextra:\n");
    for level in 1..=80 {
        existing.push_str(&"  ".repeat(level));
        existing.push_str("level:\n");
    }
    let err = merge_texts(
        "site_name: A\n",
        Some(&existing),
        mkdocs_table(),
        &MergeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MergeError::DepthExceeded {
            max_depth: 50,
            role: DocumentRole::Existing,
            ..
        }
    ));
}

fn assert_existing_too_deep(existing: &str) {
    let err = merge_texts(
        "site_name: A\n",
        Some(existing),
        mkdocs_table(),
        &MergeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MergeError::DepthExceeded {
            role: DocumentRole::Existing,
            ..
        }
    ));
}

#[test]
fn test_depth_bound_on_pathological_block_mappings() {
    let mut existing = String::new();
    for level in 0..10_000 {
        existing.push_str(&" ".repeat(level));
        existing.push_str("k:\n");
    }
    assert_existing_too_deep(&existing);
}

#[test]
fn test_depth_bound_on_pathological_compact_sequences() {
    let existing = format!("{}a\n", "- ".repeat(10_000));
    assert_existing_too_deep(&existing);
}

#[test]
fn test_depth_bound_on_pathological_flow_nesting() {
    let depth = 10_000;
    let template = format!("a: {}{}\n", "[".repeat(depth), "]".repeat(depth));
    let err = merge_texts(&template, None, mkdocs_table(), &MergeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        MergeError::DepthExceeded {
            role: DocumentRole::Template,
            ..
        }
    ));
}
