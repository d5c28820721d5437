//! Core type definitions for merging.

use docforge_yaml::{KeyPath, Location, Node, NodeKind};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// How a managed path is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The template's value always wins.
    Replace,

    /// The existing value wins whenever present; the template only supplies
    /// a first-run default. Applies to every path without a rule.
    Preserve,

    /// Identity-keyed sequences: template entries first, then entries only
    /// the user has, with shared entries merged recursively.
    ListMerge,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergePolicy::Replace => "replace",
            MergePolicy::Preserve => "preserve",
            MergePolicy::ListMerge => "list-merge",
        };
        f.write_str(name)
    }
}

/// Classification of a change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// The path did not exist and now holds the template's value.
    Added,
    /// The existing value was overwritten by the template's value.
    Updated,
    /// The template proposed a different value but the user's value was kept.
    Preserved,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Added => "Added",
            ChangeKind::Updated => "Updated",
            ChangeKind::Preserved => "Preserved",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Non-fatal findings attached to a change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeWarning {
    /// The value changed shape between the existing and the template document.
    TypeMismatch { existing: NodeKind, template: NodeKind },
}

impl MergeWarning {
    /// Stable error code of the warning.
    pub fn code(&self) -> &'static str {
        match self {
            MergeWarning::TypeMismatch { .. } => "D-2-2",
        }
    }
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeWarning::TypeMismatch { existing, template } => {
                write!(f, "type changed from {existing} to {template}")
            }
        }
    }
}

/// One decision of the merge engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub path: KeyPath,
    /// The value that was overwritten (Updated records only).
    pub previous: Option<Node>,
    /// The value now in the merged document.
    pub value: Node,
    pub kind: ChangeKind,
    pub warning: Option<MergeWarning>,
}

impl ChangeRecord {
    pub fn added(path: KeyPath, value: Node) -> Self {
        Self {
            path,
            previous: None,
            value,
            kind: ChangeKind::Added,
            warning: None,
        }
    }

    pub fn updated(path: KeyPath, previous: Node, value: Node) -> Self {
        Self {
            path,
            previous: Some(previous),
            value,
            kind: ChangeKind::Updated,
            warning: None,
        }
    }

    pub fn preserved(path: KeyPath, value: Node) -> Self {
        Self {
            path,
            previous: None,
            value,
            kind: ChangeKind::Preserved,
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: Option<MergeWarning>) -> Self {
        self.warning = warning;
        self
    }
}

/// Ordered change records, in the order the engine visited the paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeLog {
    records: Vec<ChangeRecord>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ChangeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when the merge added or overwrote anything. Preserved records
    /// only report that the user's value won.
    pub fn has_changes(&self) -> bool {
        self.records
            .iter()
            .any(|record| matches!(record.kind, ChangeKind::Added | ChangeKind::Updated))
    }

    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(move |record| record.kind == kind)
    }

    /// Records carrying a warning.
    pub fn warnings(&self) -> impl Iterator<Item = (&ChangeRecord, &MergeWarning)> {
        self.records
            .iter()
            .filter_map(|record| record.warning.as_ref().map(|warning| (record, warning)))
    }
}

impl<'a> IntoIterator for &'a ChangeLog {
    type Item = &'a ChangeRecord;
    type IntoIter = std::slice::Iter<'a, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Which input a parse failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRole {
    Template,
    Existing,
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRole::Template => f.write_str("template"),
            DocumentRole::Existing => f.write_str("existing"),
        }
    }
}

/// Fatal merge errors. Nothing may be written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    /// One of the inputs is not a document the codec accepts.
    #[error("failed to parse the {role} document: {source}")]
    Parse {
        role: DocumentRole,
        source: docforge_yaml::Error,
    },

    /// Nesting exceeds `MergeOptions::max_depth` (or the parser's own limit).
    #[error("document nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded {
        max_depth: usize,
        /// Path of the first node past the limit, when known.
        path: Option<KeyPath>,
        location: Option<Location>,
        role: DocumentRole,
    },
}

impl MergeError {
    /// Wrap a parse error, mapping parser nesting overflow to
    /// [`MergeError::DepthExceeded`].
    pub fn from_parse(role: DocumentRole, error: docforge_yaml::Error) -> Self {
        match error {
            docforge_yaml::Error::NestingTooDeep {
                max_depth,
                location,
            } => MergeError::DepthExceeded {
                max_depth,
                path: None,
                location: Some(location),
                role,
            },
            source => MergeError::Parse { role, source },
        }
    }

    pub fn role(&self) -> DocumentRole {
        match self {
            MergeError::Parse { role, .. } | MergeError::DepthExceeded { role, .. } => *role,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            MergeError::Parse { source, .. } => source.location(),
            MergeError::DepthExceeded { location, .. } => *location,
        }
    }
}

/// Options for merging.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Maximum nesting depth of either document (default: 50).
    ///
    /// Merging fails with `MergeError::DepthExceeded` before producing any
    /// output if a document nests deeper.
    pub max_depth: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { max_depth: 50 }
    }
}
