//! A parsed configuration file: root node plus file-level formatting.

use crate::node::{Mapping, MappingEntry, Node, NodeValue, DEFAULT_IDENTITY_FIELD};
use crate::{Error, KeyPath, ParseWarning, PathSegment, Result, Trivia};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A YAML document that serializes back to its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Node,
    /// Offset of a mapping nested under a key.
    pub indent: usize,
    /// Offset of a sequence nested under a key (0 for flush `- item` lists).
    pub sequence_indent: usize,
    pub line_ending: LineEnding,
    /// Whether the document starts with a bare `---` line.
    pub explicit_start: bool,
    /// Lines before the `---` marker, verbatim.
    pub header: Vec<String>,
    /// Comment and blank lines after the last node, verbatim.
    pub trailing: Vec<String>,
    pub trailing_newline: bool,
    /// Non-fatal findings from parsing.
    pub warnings: Vec<ParseWarning>,
}

impl Document {
    /// A document around `root` in canonical style: two-space indentation,
    /// indented sequences, `\n` line endings.
    pub fn from_root(root: Node) -> Self {
        Self {
            root,
            indent: 2,
            sequence_indent: 2,
            line_ending: LineEnding::Lf,
            explicit_start: false,
            header: Vec::new(),
            trailing: Vec::new(),
            trailing_newline: true,
            warnings: Vec::new(),
        }
    }

    /// A document holding an empty mapping.
    pub fn empty() -> Self {
        Self::from_root(Node::new(NodeValue::Mapping(Mapping::new())))
    }

    /// Parse YAML text. See [`crate::parse`].
    pub fn parse(text: &str) -> Result<Self> {
        crate::parse(text)
    }

    pub fn root_mapping(&self) -> Option<&Mapping> {
        self.root.as_mapping()
    }

    pub fn get(&self, path: &KeyPath) -> Option<&Node> {
        let mut node = &self.root;
        let mut segments = path.segments().iter().peekable();
        while let Some(segment) = segments.next() {
            node = match segment {
                PathSegment::Key(key) => node.as_mapping()?.get(key)?,
                PathSegment::Index(index) => node.as_sequence()?.items.get(*index)?,
                PathSegment::Entry(id) => {
                    let seq = node.as_sequence()?;
                    let item = &seq.items[seq.position_of(id, DEFAULT_IDENTITY_FIELD)?];
                    // The `- id: {...}` form addresses the inner value, but
                    // only when the path continues into it.
                    if segments.peek().is_some() {
                        item.entry_body(id)
                    } else {
                        item
                    }
                }
            };
        }
        Some(node)
    }

    pub fn get_mut(&mut self, path: &KeyPath) -> Option<&mut Node> {
        get_in_mut(&mut self.root, path.segments())
    }

    /// Set the value at `path`, creating intermediate mappings for missing
    /// keys.
    ///
    /// The trivia already attached at `path` is kept unless `trivia` is
    /// given. A new entry takes `trivia`, or the value's own trivia.
    ///
    /// # Errors
    ///
    /// Fails when the path runs through a scalar, names a missing sequence
    /// position, or addresses a list entry that does not exist.
    pub fn set(&mut self, path: &KeyPath, value: Node, trivia: Option<Trivia>) -> Result<()> {
        set_in(&mut self.root, path, path.segments(), value, trivia)
    }

    pub fn serialize(&self) -> String {
        crate::emitter::emit(self)
    }

    /// Adopt the file-level formatting of `other`: indent widths, line
    /// endings, document marker and the lines around the root.
    pub fn with_style_of(mut self, other: &Document) -> Self {
        self.indent = other.indent;
        self.sequence_indent = other.sequence_indent;
        self.line_ending = other.line_ending;
        self.explicit_start = other.explicit_start;
        self.header = other.header.clone();
        self.trailing = other.trailing.clone();
        self.trailing_newline = other.trailing_newline;
        self
    }

    /// True when the root is an empty mapping.
    pub fn is_empty(&self) -> bool {
        self.root.as_mapping().is_some_and(Mapping::is_empty)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

fn get_in_mut<'n>(node: &'n mut Node, segments: &[PathSegment]) -> Option<&'n mut Node> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(node);
    };
    let child = match segment {
        PathSegment::Key(key) => node.as_mapping_mut()?.get_mut(key)?,
        PathSegment::Index(index) => node.as_sequence_mut()?.items.get_mut(*index)?,
        PathSegment::Entry(id) => {
            let seq = node.as_sequence_mut()?;
            let position = seq.position_of(id, DEFAULT_IDENTITY_FIELD)?;
            let item = &mut seq.items[position];
            if !rest.is_empty() && item.wraps_entry(id) {
                item.single_value_mut()?
            } else {
                item
            }
        }
    };
    get_in_mut(child, rest)
}

fn set_in(
    node: &mut Node,
    path: &KeyPath,
    segments: &[PathSegment],
    mut value: Node,
    trivia: Option<Trivia>,
) -> Result<()> {
    let Some((segment, rest)) = segments.split_first() else {
        value.trivia = trivia.unwrap_or_else(|| std::mem::take(&mut node.trivia));
        *node = value;
        return Ok(());
    };

    let invalid = |reason: String| Error::InvalidPath {
        path: path.to_string(),
        reason,
    };

    node.invalidate_flow_source();
    let kind = node.kind();
    match segment {
        PathSegment::Key(key) => {
            let mapping = node
                .as_mapping_mut()
                .ok_or_else(|| invalid(format!("expected a mapping at `{key}`, found a {kind}")))?;
            match mapping.get_mut(key) {
                Some(child) => set_in(child, path, rest, value, trivia),
                None if rest.is_empty() => {
                    if let Some(trivia) = trivia {
                        value.trivia = trivia;
                    }
                    mapping.entries.push(MappingEntry::new(key.clone(), value));
                    Ok(())
                }
                None => {
                    let mut child = Node::new(NodeValue::Mapping(Mapping::new()));
                    set_in(&mut child, path, rest, value, trivia)?;
                    mapping.entries.push(MappingEntry::new(key.clone(), child));
                    Ok(())
                }
            }
        }
        PathSegment::Index(index) => {
            let seq = node
                .as_sequence_mut()
                .ok_or_else(|| invalid(format!("expected a sequence at [{index}], found a {kind}")))?;
            let len = seq.items.len();
            let child = seq
                .items
                .get_mut(*index)
                .ok_or_else(|| invalid(format!("index {index} is out of range (length {len})")))?;
            set_in(child, path, rest, value, trivia)
        }
        PathSegment::Entry(id) => {
            let seq = node
                .as_sequence_mut()
                .ok_or_else(|| invalid(format!("expected a sequence at [{id}], found a {kind}")))?;
            match seq.position_of(id, DEFAULT_IDENTITY_FIELD) {
                Some(position) => {
                    let item = &mut seq.items[position];
                    let target = if !rest.is_empty() && item.wraps_entry(id) {
                        item.invalidate_flow_source();
                        item.single_value_mut()
                            .ok_or_else(|| invalid(format!("entry `{id}` has no value")))?
                    } else {
                        item
                    };
                    set_in(target, path, rest, value, trivia)
                }
                None if rest.is_empty() => {
                    if let Some(trivia) = trivia {
                        value.trivia = trivia;
                    }
                    seq.items.push(value);
                    Ok(())
                }
                None => Err(invalid(format!("no list entry named `{id}`"))),
            }
        }
    }
}
