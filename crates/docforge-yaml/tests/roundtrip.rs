/*
 * roundtrip.rs
 *
 * Parse/serialize fidelity of the lossless YAML model.
 *
 * Hand-written files must come back byte-for-byte; generated trees must
 * survive serialize -> parse -> serialize with the same values and text.
 */

use docforge_yaml::{Document, Error, KeyPath, Node, Trivia, parse};
use proptest::prelude::*;

const MKDOCS_FIXTURE: &str = r##"# Project documentation
site_name: Demo Project
site_url: https://example.github.io/demo/   # deployed here
repo_url: https://github.com/example/demo

theme:
  name: material
  palette:
    # Light mode
    - scheme: default
      primary: indigo
      toggle:
        icon: material/brightness-7
        name: Switch to dark mode

    # Dark mode
    - scheme: slate
      toggle: {icon: material/brightness-4, name: Switch to light mode}
  features: [navigation.tabs, content.code.copy]

plugins:
- search
- gen-files:
    scripts:
      - docs/generated/gen_ref_pages.py
- mkdocstrings:
    handlers:
      python:
        paths: [src]
        options:
          docstring_style: google   # project convention

markdown_extensions:
  - admonition
  - pymdownx.superfences:
      custom_fences:
        - name: mermaid
          class: mermaid
          format: !!python/name:mermaid2.fence_mermaid_custom
  - toc:
      permalink: "#"

extra_css:
  - css/extra.css

extra:
  analytics: !ENV [ANALYTICS_ID, 'none']
  banner: >
    Folded text that
    spans two lines.
  quote: 'It''s here'

nav:
  - Home: index.md
  - API:
    - Python: generated/python-api.md
# trailing notes
"##;

#[test]
fn test_fixture_round_trips_byte_for_byte() {
    let doc = parse(MKDOCS_FIXTURE).unwrap();
    assert_eq!(doc.serialize(), MKDOCS_FIXTURE);
    assert!(doc.warnings.is_empty());
}

#[test]
fn test_fixture_values() {
    let doc = parse(MKDOCS_FIXTURE).unwrap();
    let get = |p: &str| doc.get(&KeyPath::parse(p).unwrap()).cloned();

    let docstyle = get("plugins[mkdocstrings].handlers.python.options.docstring_style").unwrap();
    assert_eq!(docstyle.as_str(), Some("google"));
    assert_eq!(
        docstyle.trivia.trailing_comment.as_deref(),
        Some("   # project convention")
    );

    let quote = get("extra.quote").unwrap();
    assert_eq!(quote.as_str(), Some("It's here"));

    let banner = get("extra.banner").unwrap();
    assert_eq!(banner.as_str(), Some("Folded text that spans two lines.\n"));

    let permalink = get("markdown_extensions[toc].permalink").unwrap();
    assert_eq!(permalink.as_str(), Some("#"));

    let dark = get("theme.palette[1]").unwrap();
    assert_eq!(dark.trivia.leading, vec!["# Dark mode"]);
    assert!(dark.trivia.blank_line_before);

    assert_eq!(doc.trailing, vec!["# trailing notes"]);
    assert_eq!(doc.sequence_indent, 2);
}

#[test]
fn test_edit_touches_only_the_edited_line() {
    let mut doc = parse(MKDOCS_FIXTURE).unwrap();
    doc.set(
        &KeyPath::parse("site_name").unwrap(),
        Node::string("Renamed"),
        None,
    )
    .unwrap();
    let expected = MKDOCS_FIXTURE.replace("site_name: Demo Project", "site_name: Renamed");
    assert_eq!(doc.serialize(), expected);
}

#[test]
fn test_new_entry_with_fresh_comment() {
    let mut doc = parse(MKDOCS_FIXTURE).unwrap();
    doc.set(
        &KeyPath::parse("edit_uri").unwrap(),
        Node::string("edit/main/docs/"),
        Some(Trivia::new().with_blank_line_before().with_comment("Edit links")),
    )
    .unwrap();
    let text = doc.serialize();
    assert!(text.ends_with("# trailing notes\n"));
    assert!(text.contains("\n\n# Edit links\nedit_uri: edit/main/docs/\n"));
}

#[test]
fn test_deep_nesting_is_rejected_without_overflow() {
    let depth = 1_000;
    let mut text = String::new();
    for level in 0..depth {
        text.push_str(&" ".repeat(level));
        text.push_str("k:\n");
    }
    let err = parse(&text).unwrap_err();
    assert!(matches!(err, Error::NestingTooDeep { max_depth: 256, .. }));
}

#[test]
fn test_tab_indentation_is_rejected() {
    let err = parse("a:\n\tb: 1\n").unwrap_err();
    assert!(matches!(err, Error::Syntax { .. } | Error::Unsupported { .. }));
}

// ============================================================================
// Generated trees
// ============================================================================

fn gen_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z_]{0,6}",
        Just("yes".to_string()),
        Just("site.url".to_string()),
        Just("with space".to_string()),
    ]
}

fn gen_scalar() -> impl Strategy<Value = Node> {
    prop_oneof![
        "[a-zA-Z0-9 .:/#'_-]{0,12}".prop_map(Node::string),
        any::<i32>().prop_map(|i| Node::integer(i64::from(i))),
        any::<bool>().prop_map(Node::boolean),
        Just(Node::null()),
        Just(Node::tagged("!ENV", "SITE_URL")),
    ]
}

/// Untagged scalars: tags inside flow collections are not kept.
fn gen_flow_item() -> impl Strategy<Value = Node> {
    prop_oneof![
        "[a-zA-Z0-9 .:/#'_-]{0,12}".prop_map(Node::string),
        any::<i32>().prop_map(|i| Node::integer(i64::from(i))),
        any::<bool>().prop_map(Node::boolean),
        Just(Node::null()),
    ]
}

fn gen_tree() -> impl Strategy<Value = Node> {
    gen_scalar().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Node::sequence),
            prop::collection::vec((gen_key(), inner.clone()), 0..4).prop_map(Node::mapping),
            prop::collection::vec(gen_flow_item(), 0..3).prop_map(|items| Node::sequence(items).flow()),
        ]
    })
}

fn gen_document() -> impl Strategy<Value = Node> {
    prop::collection::vec((gen_key(), gen_tree()), 0..6).prop_map(Node::mapping)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// serialize -> parse keeps every value, and serializing again is stable
    #[test]
    fn test_generated_documents_round_trip(root in gen_document()) {
        let text = Document::from_root(root.clone()).serialize();
        let parsed = match parse(&text) {
            Ok(doc) => doc,
            Err(err) => panic!("failed to parse generated text:\n{text}\n{err}"),
        };
        prop_assert!(parsed.root.same_value(&root), "values changed for:\n{}", text);
        prop_assert_eq!(parsed.serialize(), text.clone());

        let reparsed = parse(&parsed.serialize()).unwrap();
        prop_assert!(reparsed.root.same_structure(&parsed.root));
    }
}
