//! Serialization of a [`Document`] back to text.
//!
//! Parsed nodes are written with the indentation they were read with;
//! nodes without recorded style use the document's detected indent widths.

use crate::node::{CollectionStyle, Mapping, Node, NodeValue, Sequence};
use crate::{Document, Trivia};

/// Offset of children below a `-` when nothing else is known.
const ITEM_INDENT: usize = 2;

pub(crate) fn emit(doc: &Document) -> String {
    let mut emitter = Emitter {
        lines: doc.header.clone(),
        indent: doc.indent.max(1),
        sequence_indent: doc.sequence_indent,
    };
    if doc.explicit_start {
        emitter.lines.push("---".to_string());
    }
    emitter.emit_root(&doc.root);
    emitter.lines.extend(doc.trailing.iter().cloned());

    if emitter.lines.is_empty() {
        return String::new();
    }
    let ending = doc.line_ending.as_str();
    let mut text = emitter.lines.join(ending);
    if doc.trailing_newline {
        text.push_str(ending);
    }
    text
}

struct Emitter {
    lines: Vec<String>,
    indent: usize,
    sequence_indent: usize,
}

impl Emitter {
    fn emit_root(&mut self, root: &Node) {
        let col = match &root.value {
            NodeValue::Mapping(Mapping {
                style: CollectionStyle::Block { indent },
                ..
            })
            | NodeValue::Sequence(Sequence {
                style: CollectionStyle::Block { indent },
                ..
            }) => indent.unwrap_or(0),
            _ => 0,
        };

        match &root.value {
            NodeValue::Mapping(map) if map.entries.is_empty() && !root.is_flow() => {}
            NodeValue::Mapping(map) if !root.is_flow() => {
                self.emit_trivia(&root.trivia, col);
                self.emit_entries(map, col);
            }
            NodeValue::Sequence(seq) if !seq.items.is_empty() && !root.is_flow() => {
                self.emit_trivia(&root.trivia, col);
                self.emit_items(seq, col);
            }
            _ => {
                self.emit_trivia(&root.trivia, 0);
                let comment = root.trivia.trailing_comment.as_deref().unwrap_or("");
                match &root.value {
                    NodeValue::Scalar(scalar) => {
                        self.lines.push(format!("{}{comment}", scalar.inline_text()));
                        self.emit_continuation(&scalar.continuation, 0);
                    }
                    _ => self.lines.push(format!("{}{comment}", flow_text(root))),
                }
            }
        }
    }

    fn emit_trivia(&mut self, trivia: &Trivia, col: usize) {
        if trivia.blank_line_before {
            self.lines.push(String::new());
        }
        for line in &trivia.leading {
            if line.starts_with('#') {
                self.lines.push(format!("{}{line}", pad(col)));
            } else {
                self.lines.push(line.clone());
            }
        }
    }

    fn emit_entries(&mut self, map: &Mapping, col: usize) {
        for entry in &map.entries {
            self.emit_trivia(&entry.value.trivia, col);
            let head = format!("{}{}:", pad(col), entry.raw_key);
            self.emit_value(head, &entry.value, col, true);
        }
    }

    fn emit_items(&mut self, seq: &Sequence, col: usize) {
        for item in &seq.items {
            self.emit_trivia(&item.trivia, col);
            let dash = format!("{}-", pad(col));

            let Some(offset) = compact_offset(item) else {
                self.emit_value(dash, item, col, false);
                continue;
            };

            // Write the block at the item column, then put the dash into the
            // indentation of its first line.
            let item_col = col + offset;
            let start = self.lines.len();
            match &item.value {
                NodeValue::Mapping(map) => self.emit_entries(map, item_col),
                NodeValue::Sequence(inner) => self.emit_items(inner, item_col),
                NodeValue::Scalar(_) => {}
            }
            if let Some(first) = self.lines.get_mut(start) {
                let rest = first[item_col..].to_string();
                *first = format!("{dash}{}{rest}", pad(offset - 1));
            }
        }
    }

    /// Write a value that follows `head` (`key:` or `-`). `owner_col` is the
    /// column `head` starts at.
    fn emit_value(&mut self, head: String, node: &Node, owner_col: usize, under_key: bool) {
        let comment = node.trivia.trailing_comment.as_deref().unwrap_or("");

        match &node.value {
            NodeValue::Scalar(scalar) => {
                let text = scalar.inline_text();
                if text.is_empty() {
                    self.lines.push(format!("{head}{comment}"));
                } else {
                    self.lines.push(format!("{head} {text}{comment}"));
                }
                self.emit_continuation(&scalar.continuation, owner_col);
            }
            NodeValue::Sequence(seq) if seq.items.is_empty() || node.is_flow() => {
                self.lines.push(format!("{head} {}{comment}", flow_text(node)));
            }
            NodeValue::Mapping(map) if map.entries.is_empty() || node.is_flow() => {
                self.lines.push(format!("{head} {}{comment}", flow_text(node)));
            }
            NodeValue::Sequence(seq) => {
                self.lines.push(format!("{head}{comment}"));
                let default = if under_key { self.sequence_indent } else { ITEM_INDENT };
                let offset = block_indent(&seq.style).unwrap_or(default);
                self.emit_items(seq, owner_col + offset);
            }
            NodeValue::Mapping(map) => {
                self.lines.push(format!("{head}{comment}"));
                let default = if under_key { self.indent } else { ITEM_INDENT };
                let offset = block_indent(&map.style).unwrap_or(default).max(1);
                self.emit_entries(map, owner_col + offset);
            }
        }
    }

    fn emit_continuation(&mut self, lines: &[String], owner_col: usize) {
        for line in lines {
            if line.is_empty() {
                self.lines.push(String::new());
            } else {
                self.lines.push(format!("{}{line}", pad(owner_col)));
            }
        }
    }
}

/// Offset of the item column for a block collection written on the `-`
/// line itself, or `None` when the item must start on the next line.
fn compact_offset(item: &Node) -> Option<usize> {
    if item.trivia.trailing_comment.is_some() || item.is_flow() {
        return None;
    }
    let (style, first_trivia) = match &item.value {
        NodeValue::Mapping(map) => (&map.style, &map.entries.first()?.value.trivia),
        NodeValue::Sequence(seq) => (&seq.style, &seq.items.first()?.trivia),
        NodeValue::Scalar(_) => return None,
    };
    if first_trivia.blank_line_before || !first_trivia.leading.is_empty() {
        return None;
    }
    Some(block_indent(style).unwrap_or(ITEM_INDENT).max(2))
}

fn block_indent(style: &CollectionStyle) -> Option<usize> {
    match style {
        CollectionStyle::Block { indent } => *indent,
        CollectionStyle::Flow { .. } => None,
    }
}

fn flow_text(node: &Node) -> String {
    let style = match &node.value {
        NodeValue::Sequence(seq) => &seq.style,
        NodeValue::Mapping(map) => &map.style,
        NodeValue::Scalar(_) => return node.to_flow_string(),
    };
    match style {
        CollectionStyle::Flow {
            source: Some(source),
        } => source.clone(),
        _ => node.to_flow_string(),
    }
}

fn pad(width: usize) -> String {
    " ".repeat(width)
}
