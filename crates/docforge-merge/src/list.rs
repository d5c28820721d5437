//! LIST_MERGE: union of identity-keyed sequences.
//!
//! Template entries come first in template order, followed by the entries
//! only the user has in their original order. An entry present in both is
//! merged recursively under the path `list[identity]`; for the single-key
//! `- name: {...}` form the merge continues on the inner value, so sub-paths
//! read `plugins[mkdocstrings].handlers`.

use crate::merge::{Merger, rebuild};
use crate::types::MergeError;
use docforge_yaml::{KeyPath, Mapping, Node, NodeValue, Sequence, Trivia};
use indexmap::IndexMap;

pub(crate) fn merge_sequences(
    merger: &mut Merger<'_>,
    template: &Sequence,
    existing: &Sequence,
    path: &KeyPath,
    depth: usize,
) -> Result<Vec<Node>, MergeError> {
    let field = merger.table().identity_field(path).to_string();

    // Positions per identity, so repeated identities pair up in order.
    let mut by_identity: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (position, item) in existing.items.iter().enumerate() {
        if let Some(id) = item.identity(&field) {
            by_identity.entry(id).or_default().push(position);
        }
    }
    let mut consumed = vec![false; existing.items.len()];
    let mut items = Vec::with_capacity(template.items.len() + existing.items.len());

    for t_item in &template.items {
        match t_item.identity(&field) {
            Some(id) => {
                let matched = by_identity
                    .get(&id)
                    .and_then(|positions| positions.iter().copied().find(|&p| !consumed[p]));
                let entry_path = path.entry(&id);
                match matched {
                    Some(position) => {
                        consumed[position] = true;
                        let e_item = &existing.items[position];
                        items.push(merge_entry(merger, t_item, e_item, &id, &entry_path, depth + 1)?);
                    }
                    None => items.push(merger.add(t_item, entry_path)),
                }
            }
            None => {
                // Entries without identity can only be matched by value.
                let matched = existing
                    .items
                    .iter()
                    .enumerate()
                    .position(|(p, e_item)| !consumed[p] && e_item.same_value(t_item));
                match matched {
                    Some(position) => {
                        consumed[position] = true;
                        items.push(existing.items[position].clone());
                    }
                    None => {
                        let index = items.len();
                        items.push(merger.add(t_item, path.index(index)));
                    }
                }
            }
        }
    }

    for (position, e_item) in existing.items.iter().enumerate() {
        if consumed[position] {
            continue;
        }
        let entry_path = match e_item.identity(&field) {
            Some(id) => path.entry(id),
            None => path.index(items.len()),
        };
        merger.preserve_user_entry(e_item, entry_path);
        items.push(e_item.clone());
    }

    Ok(items)
}

/// Merge two entries with the same identity.
fn merge_entry(
    merger: &mut Merger<'_>,
    template: &Node,
    existing: &Node,
    id: &str,
    path: &KeyPath,
    depth: usize,
) -> Result<Node, MergeError> {
    match (template.wraps_entry(id), existing.wraps_entry(id)) {
        (true, true) => {
            let body = merger.merge_node(
                template.entry_body(id),
                existing.entry_body(id),
                path,
                depth,
            )?;
            Ok(with_body(existing, body))
        }
        // The template names the entry with a body the user never wrote:
        // merge that body into an empty one.
        (true, false) if existing.as_str() == Some(id) => {
            let Some(body) = template.entry_body(id).as_mapping() else {
                return merger.merge_node(template, existing, path, depth);
            };
            let merged = merger.merge_mapping(body, &Mapping::new(), path, depth)?;
            let mut entry = template.clone();
            entry.clear_style();
            // The comment after `- id` moves to the `id:` line.
            entry.trivia = Trivia {
                trailing_comment: None,
                ..existing.trivia.clone()
            };
            let mut body = Node::new(NodeValue::Mapping(merged));
            body.trivia.trailing_comment = existing.trivia.trailing_comment.clone();
            Ok(with_body(&entry, body))
        }
        // A bare name in the template has no opinion on the user's body.
        (false, _) if template.as_str() == Some(id) && existing.as_str() != Some(id) => {
            Ok(existing.clone())
        }
        _ => merger.merge_node(template, existing, path, depth),
    }
}

/// A `- id: body` entry with its body swapped.
fn with_body(entry: &Node, body: Node) -> Node {
    let mut value = entry.value.clone();
    if let NodeValue::Mapping(mapping) = &mut value {
        if let Some(only) = mapping.entries.first_mut() {
            only.value = body;
        }
    }
    rebuild(entry, value)
}

#[cfg(test)]
mod tests {
    use crate::types::ChangeKind;
    use crate::{MergeOptions, merge_texts, mkdocs_table};

    fn merge(template: &str, existing: &str) -> crate::MergeOutcome {
        merge_texts(template, Some(existing), mkdocs_table(), &MergeOptions::default()).unwrap()
    }

    fn paths(outcome: &crate::MergeOutcome, kind: ChangeKind) -> Vec<String> {
        outcome
            .changes
            .of_kind(kind)
            .map(|record| record.path.to_string())
            .collect()
    }

    #[test]
    fn test_template_entries_then_user_entries() {
        let outcome = merge(
            "plugins:\n  - a\n  - b\n",
            "plugins:\n  - b\n  - c\n",
        );
        assert_eq!(outcome.text, "plugins:\n  - a\n  - b\n  - c\n");
        assert_eq!(paths(&outcome, ChangeKind::Added), vec!["plugins[a]"]);
        assert_eq!(paths(&outcome, ChangeKind::Preserved), vec!["plugins[c]"]);
    }

    #[test]
    fn test_unchanged_list_keeps_flow_text() {
        let existing = "markdown_extensions: [admonition,  toc]\n";
        let outcome = merge("markdown_extensions:\n  - admonition\n  - toc\n", existing);
        assert_eq!(outcome.text, existing);
        assert!(outcome.changes.is_empty());
    }

    #[test]
    fn test_wrapped_entries_merge_inner_value() {
        let template = "\
plugins:
  - mkdocstrings:
      handlers:
        python:
          paths: [src]
";
        let existing = "\
plugins:
  - mkdocstrings:
      handlers:
        python:
          paths: [lib]  # old layout
          options:
            show_source: false
";
        let outcome = merge(template, existing);
        assert_eq!(
            outcome.text,
            "\
plugins:
  - mkdocstrings:
      handlers:
        python:
          paths: [src]  # old layout
          options:
            show_source: false
"
        );
        assert_eq!(
            paths(&outcome, ChangeKind::Updated),
            vec!["plugins[mkdocstrings].handlers.python.paths"]
        );
    }

    #[test]
    fn test_bare_user_entry_gains_template_body() {
        let outcome = merge(
            "plugins:\n  - gen-files:\n      scripts:\n        - gen.py\n",
            "plugins:\n  - gen-files  # generator\n",
        );
        assert_eq!(
            outcome.text,
            "plugins:\n  - gen-files:  # generator\n      scripts:\n        - gen.py\n"
        );
        assert_eq!(
            paths(&outcome, ChangeKind::Added),
            vec!["plugins[gen-files].scripts"]
        );
    }

    #[test]
    fn test_bare_template_entry_keeps_user_body() {
        let existing = "plugins:\n  - search:\n      lang: de\n";
        let outcome = merge("plugins:\n  - search\n", existing);
        assert_eq!(outcome.text, existing);
        assert!(outcome.changes.is_empty());
    }

    #[test]
    fn test_named_mapping_entries() {
        let outcome = merge(
            "markdown_extensions:\n  - name: toc\n    permalink: true\n",
            "markdown_extensions:\n  - name: toc\n    permalink: '#'\n  - name: abbr\n",
        );
        assert_eq!(
            outcome.text,
            "markdown_extensions:\n  - name: toc\n    permalink: '#'\n  - name: abbr\n"
        );
        assert_eq!(
            paths(&outcome, ChangeKind::Preserved),
            vec!["markdown_extensions[toc]", "markdown_extensions[abbr]"]
        );
    }

    #[test]
    fn test_anonymous_entries_match_by_value() {
        let outcome = merge(
            "markdown_extensions:\n  - [a, b]\n  - 3\n",
            "markdown_extensions:\n  - 3\n  - [a, b]\n  - 4\n",
        );
        assert_eq!(
            outcome.text,
            "markdown_extensions:\n  - [a, b]\n  - 3\n  - 4\n"
        );
        assert!(!outcome.changes.has_changes());
        assert_eq!(
            paths(&outcome, ChangeKind::Preserved),
            vec!["markdown_extensions[2]"]
        );
    }
}
