//! The merge engine.
//!
//! A depth-first walk of the template against the existing document. Each
//! visited path is classified by the [`OwnershipTable`] and reconciled by
//! its policy; every decision that touches the output is appended to the
//! [`ChangeLog`] in visiting order.

use crate::ownership::OwnershipTable;
use crate::types::{
    ChangeLog, ChangeRecord, DocumentRole, MergeError, MergeOptions, MergePolicy, MergeWarning,
};
use docforge_yaml::{
    Document, KeyPath, Location, Mapping, MappingEntry, Node, NodeValue, ParseWarning, PathSegment,
};

/// Result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub document: Document,
    /// The merged document serialized.
    pub text: String,
    pub changes: ChangeLog,
    /// Parse warnings of the template followed by those of the existing
    /// document, each with the document it came from.
    pub warnings: Vec<(DocumentRole, ParseWarning)>,
}

/// Parse both texts and merge them.
///
/// # Errors
///
/// Returns `MergeError::Parse` naming the document that failed to parse, or
/// `MergeError::DepthExceeded` when either document nests too deeply.
pub fn merge_texts(
    template: &str,
    existing: Option<&str>,
    table: &OwnershipTable,
    options: &MergeOptions,
) -> Result<MergeOutcome, MergeError> {
    let template = Document::parse(template)
        .map_err(|err| MergeError::from_parse(DocumentRole::Template, err))?;
    let existing = existing
        .map(|text| {
            Document::parse(text).map_err(|err| MergeError::from_parse(DocumentRole::Existing, err))
        })
        .transpose()?;
    merge_documents(&template, existing.as_ref(), table, options)
}

/// Merge `template` into `existing`.
///
/// Without an existing document the template is the result and every
/// top-level template key is recorded as Added.
///
/// # Errors
///
/// Returns `MergeError::DepthExceeded` before doing any work when either
/// document nests deeper than `options.max_depth`.
pub fn merge_documents(
    template: &Document,
    existing: Option<&Document>,
    table: &OwnershipTable,
    options: &MergeOptions,
) -> Result<MergeOutcome, MergeError> {
    check_depth(template, DocumentRole::Template, options.max_depth)?;
    if let Some(existing) = existing {
        check_depth(existing, DocumentRole::Existing, options.max_depth)?;
    }

    let mut warnings: Vec<(DocumentRole, ParseWarning)> = template
        .warnings
        .iter()
        .map(|warning| (DocumentRole::Template, warning.clone()))
        .collect();
    let mut merger = Merger::new(table, options);

    let document = match existing {
        None => {
            merger.record_first_run(&template.root);
            let mut document = template.clone();
            document.warnings.clear();
            document
        }
        Some(existing) => {
            warnings.extend(
                existing
                    .warnings
                    .iter()
                    .map(|warning| (DocumentRole::Existing, warning.clone())),
            );
            let root = merger.merge_root(&template.root, &existing.root)?;
            Document::from_root(root).with_style_of(existing)
        }
    };

    tracing::debug!(
        changes = merger.changes.len(),
        first_run = existing.is_none(),
        "merge finished"
    );

    let text = document.serialize();
    Ok(MergeOutcome {
        document,
        text,
        changes: merger.changes,
        warnings,
    })
}

/// State of one merge: the table, the limits and the log being built.
pub(crate) struct Merger<'t> {
    table: &'t OwnershipTable,
    max_depth: usize,
    pub(crate) changes: ChangeLog,
}

impl<'t> Merger<'t> {
    fn new(table: &'t OwnershipTable, options: &MergeOptions) -> Self {
        Self {
            table,
            max_depth: options.max_depth,
            changes: ChangeLog::new(),
        }
    }

    pub(crate) fn table(&self) -> &'t OwnershipTable {
        self.table
    }

    fn record_first_run(&mut self, template: &Node) {
        match template.as_mapping() {
            Some(mapping) => {
                for entry in &mapping.entries {
                    self.changes.push(ChangeRecord::added(
                        KeyPath::root().key(&entry.key),
                        entry.value.clone(),
                    ));
                }
            }
            None => self
                .changes
                .push(ChangeRecord::added(KeyPath::root(), template.clone())),
        }
    }

    fn merge_root(&mut self, template: &Node, existing: &Node) -> Result<Node, MergeError> {
        match (template.as_mapping(), existing.as_mapping()) {
            (Some(t), Some(e)) => {
                let merged = self.merge_mapping(t, e, &KeyPath::root(), 0)?;
                Ok(rebuild(existing, NodeValue::Mapping(merged)))
            }
            _ => Ok(self.replace(template, existing, &KeyPath::root())),
        }
    }

    /// Template keys in template order, then the keys only the existing
    /// mapping has, verbatim.
    pub(crate) fn merge_mapping(
        &mut self,
        template: &Mapping,
        existing: &Mapping,
        path: &KeyPath,
        depth: usize,
    ) -> Result<Mapping, MergeError> {
        let mut merged = Mapping {
            entries: Vec::with_capacity(template.len().max(existing.len())),
            style: existing.style.clone(),
        };

        for t_entry in &template.entries {
            let child_path = path.key(&t_entry.key);
            match existing.get_entry(&t_entry.key) {
                Some(e_entry) => {
                    let value = self.merge_node(&t_entry.value, &e_entry.value, &child_path, depth + 1)?;
                    merged.entries.push(MappingEntry {
                        key: e_entry.key.clone(),
                        raw_key: e_entry.raw_key.clone(),
                        value,
                    });
                }
                None => {
                    let value = self.add(&t_entry.value, child_path);
                    merged.entries.push(MappingEntry {
                        key: t_entry.key.clone(),
                        raw_key: t_entry.raw_key.clone(),
                        value,
                    });
                }
            }
        }

        merged.entries.extend(
            existing
                .entries
                .iter()
                .filter(|entry| !template.contains_key(&entry.key))
                .cloned(),
        );
        Ok(merged)
    }

    /// Reconcile a path present in both documents.
    pub(crate) fn merge_node(
        &mut self,
        template: &Node,
        existing: &Node,
        path: &KeyPath,
        depth: usize,
    ) -> Result<Node, MergeError> {
        if depth > self.max_depth {
            return Err(MergeError::DepthExceeded {
                max_depth: self.max_depth,
                path: Some(path.clone()),
                location: existing.location,
                role: DocumentRole::Existing,
            });
        }

        let policy = self.table.resolve(path, Some(template));
        tracing::debug!(path = %path, %policy, "merging path");

        match policy {
            MergePolicy::Replace => Ok(self.replace(template, existing, path)),
            MergePolicy::Preserve => self.preserve(template, existing, path, depth),
            MergePolicy::ListMerge => match (template.as_sequence(), existing.as_sequence()) {
                (Some(t), Some(e)) => {
                    let items = crate::list::merge_sequences(self, t, e, path, depth)?;
                    if items == e.items {
                        return Ok(existing.clone());
                    }
                    let mut sequence = e.clone();
                    sequence.items = items;
                    Ok(rebuild(existing, NodeValue::Sequence(sequence)))
                }
                _ => Ok(self.replace(template, existing, path)),
            },
        }
    }

    /// The template's value wins; the existing node's comments stay.
    fn replace(&mut self, template: &Node, existing: &Node, path: &KeyPath) -> Node {
        if template.same_value(existing) {
            return existing.clone();
        }

        let mut value = template.clone();
        value.clear_style();
        value.trivia = existing.trivia.clone();

        let warning = (template.kind() != existing.kind()).then(|| MergeWarning::TypeMismatch {
            existing: existing.kind(),
            template: template.kind(),
        });
        if let Some(warning) = &warning {
            tracing::debug!(path = %path, %warning, "replacing value of a different type");
        }
        self.changes.push(
            ChangeRecord::updated(path.clone(), existing.clone(), value.clone()).with_warning(warning),
        );
        value
    }

    /// The existing value wins, but paths registered below it are still
    /// reconciled.
    fn preserve(
        &mut self,
        template: &Node,
        existing: &Node,
        path: &KeyPath,
        depth: usize,
    ) -> Result<Node, MergeError> {
        if self.table.has_managed_descendants(path) {
            if let (Some(t), Some(e)) = (template.as_mapping(), existing.as_mapping()) {
                let merged = self.merge_mapping(t, e, path, depth)?;
                return Ok(rebuild(existing, NodeValue::Mapping(merged)));
            }
        }

        if !template.same_value(existing) {
            self.changes
                .push(ChangeRecord::preserved(path.clone(), existing.clone()));
        }
        Ok(existing.clone())
    }

    /// Take a template subtree the existing document does not have.
    pub(crate) fn add(&mut self, template: &Node, path: KeyPath) -> Node {
        let mut value = template.clone();
        value.clear_style();
        tracing::debug!(path = %path, "adding template value");
        self.changes.push(ChangeRecord::added(path, value.clone()));
        value
    }

    pub(crate) fn preserve_user_entry(&mut self, existing: &Node, path: KeyPath) {
        tracing::trace!(path = %path, "keeping user entry");
        self.changes.push(ChangeRecord::preserved(path, existing.clone()));
    }
}

/// `existing` with its value swapped, dropping stale flow text when the
/// content changed.
pub(crate) fn rebuild(existing: &Node, value: NodeValue) -> Node {
    let mut node = existing.clone();
    let changed = node.value != value;
    node.value = value;
    if changed {
        node.invalidate_flow_source();
    }
    node
}

fn check_depth(document: &Document, role: DocumentRole, max_depth: usize) -> Result<(), MergeError> {
    match find_too_deep(&document.root, 0, max_depth) {
        None => Ok(()),
        Some((mut segments, location)) => {
            segments.reverse();
            Err(MergeError::DepthExceeded {
                max_depth,
                path: Some(KeyPath::new(segments)),
                location,
                role,
            })
        }
    }
}

/// The first node deeper than `max_depth`, as reversed path segments.
fn find_too_deep(
    node: &Node,
    depth: usize,
    max_depth: usize,
) -> Option<(Vec<PathSegment>, Option<Location>)> {
    if depth > max_depth {
        return Some((Vec::new(), node.location));
    }
    match &node.value {
        NodeValue::Scalar(_) => None,
        NodeValue::Sequence(seq) => seq.items.iter().enumerate().find_map(|(i, item)| {
            let (mut segments, location) = find_too_deep(item, depth + 1, max_depth)?;
            segments.push(PathSegment::Index(i));
            Some((segments, location))
        }),
        NodeValue::Mapping(map) => map.entries.iter().find_map(|entry| {
            let (mut segments, location) = find_too_deep(&entry.value, depth + 1, max_depth)?;
            segments.push(PathSegment::Key(entry.key.clone()));
            Some((segments, location))
        }),
    }
}
