//! Parser producing a lossless [`Document`].
//!
//! Parsing runs in two phases. The text is first fed through the
//! `yaml-rust2` event parser, which rejects invalid YAML with the scanner's
//! own line and column and flags constructs the tree does not model. A
//! line-oriented pass then builds the tree, keeping comments, blank lines and
//! the source text of every scalar.

use crate::node::{CollectionStyle, Mapping, MappingEntry, Node, NodeValue, Scalar, Sequence};
use crate::scalar::{decode, encode, split_tag};
use crate::{Document, Error, LineEnding, Location, ParseWarning, Result, Trivia};
use yaml_rust2::parser::{Event, Parser};
use yaml_rust2::scanner::Marker;
use yaml_rust2::{Yaml, YamlLoader};

/// Limits applied while parsing.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum collection nesting depth (default: 256).
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Parse YAML text into a [`Document`].
///
/// # Example
///
/// ```rust
/// use docforge_yaml::parse;
///
/// let text = "# Site\nsite_name: Demo  # shown in the header\n";
/// let doc = parse(text).unwrap();
/// assert_eq!(doc.serialize(), text);
/// ```
///
/// # Errors
///
/// Returns an error if the text is not valid YAML, uses a construct the
/// codec does not support, or nests deeper than the default limit.
pub fn parse(text: &str) -> Result<Document> {
    parse_with_options(text, &ParseOptions::default())
}

/// Parse YAML text with explicit limits.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Document> {
    validate(text, options)?;

    let line_ending = if text.contains("\r\n") {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    };
    // An empty file has no preference; new content gets a final newline.
    let trailing_newline = text.is_empty() || text.ends_with('\n');
    let lines = split_lines(text);

    let builder = TreeBuilder {
        lines,
        pos: 0,
        max_depth: options.max_depth,
        warnings: Vec::new(),
        indent: None,
        sequence_indent: None,
    };
    builder.build(line_ending, trailing_newline)
}

// Phase one: event-level validation

fn validate(text: &str, options: &ParseOptions) -> Result<()> {
    let mut checker = EventChecker {
        source: text,
        max_depth: options.max_depth,
        depth: 0,
        documents: 0,
        error: None,
    };
    // Pulled one event at a time: `Parser::load` recurses once per nesting
    // level and would exhaust the stack before the depth check fires.
    let mut parser = Parser::new_from_str(text);
    loop {
        match parser.next_token() {
            Ok((Event::StreamEnd, _)) => return Ok(()),
            Ok((event, marker)) => {
                checker.check(event, &marker);
                if let Some(err) = checker.error.take() {
                    return Err(err);
                }
            }
            Err(err) => {
                let location = Location::from_marker(err.marker(), text);
                // The scanner caps flow nesting on its own (at 255 levels).
                if err.info().contains("recursion limit")
                    || checker.depth >= SCANNER_FLOW_LIMIT
                {
                    return Err(Error::NestingTooDeep {
                        max_depth: options.max_depth,
                        location,
                    });
                }
                return Err(Error::Syntax {
                    message: err.info().to_string(),
                    location,
                });
            }
        }
    }
}

const SCANNER_FLOW_LIMIT: usize = u8::MAX as usize;

/// Records the first event the tree cannot hold.
struct EventChecker<'a> {
    source: &'a str,
    max_depth: usize,
    depth: usize,
    documents: usize,
    error: Option<Error>,
}

impl EventChecker<'_> {
    fn unsupported(&mut self, message: &str, marker: &Marker) {
        self.error = Some(Error::Unsupported {
            message: message.to_string(),
            location: Location::from_marker(marker, self.source),
        });
    }

    fn check(&mut self, ev: Event, marker: &Marker) {
        match ev {
            Event::DocumentStart => {
                self.documents += 1;
                if self.documents > 1 {
                    self.unsupported("multiple documents in one file are not supported", marker);
                }
            }
            Event::SequenceStart(anchor, _) | Event::MappingStart(anchor, _) => {
                if anchor > 0 {
                    self.unsupported("anchors are not supported", marker);
                    return;
                }
                self.depth += 1;
                if self.depth > self.max_depth {
                    self.error = Some(Error::NestingTooDeep {
                        max_depth: self.max_depth,
                        location: Location::from_marker(marker, self.source),
                    });
                }
            }
            Event::SequenceEnd | Event::MappingEnd => {
                self.depth = self.depth.saturating_sub(1);
            }
            Event::Scalar(_, _, anchor, _) if anchor > 0 => {
                self.unsupported("anchors are not supported", marker);
            }
            Event::Alias(_) => {
                self.unsupported("aliases are not supported", marker);
            }
            _ => {}
        }
    }
}

// Phase two: line-oriented tree building

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Comment,
    Content,
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// Line text without the line ending.
    raw: &'a str,
    /// 1-based line number.
    number: usize,
    /// Byte offset of the line start.
    offset: usize,
    /// Column where `content` starts.
    indent: usize,
    /// Suffix of `raw` the parser still has to consume.
    content: &'a str,
    kind: LineKind,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut pieces: Vec<&str> = text.split('\n').collect();
    if text.ends_with('\n') {
        pieces.pop();
    }

    let mut offset = 0;
    let mut lines = Vec::with_capacity(pieces.len());
    for (index, piece) in pieces.into_iter().enumerate() {
        let raw = piece.strip_suffix('\r').unwrap_or(piece);
        let content = raw.trim_start_matches(' ');
        let trimmed = raw.trim();
        let kind = if trimmed.is_empty() {
            LineKind::Blank
        } else if trimmed.starts_with('#') {
            LineKind::Comment
        } else {
            LineKind::Content
        };
        lines.push(Line {
            raw,
            number: index + 1,
            offset,
            indent: raw.len() - content.len(),
            content,
            kind,
        });
        offset += piece.len() + 1;
    }
    lines
}

struct TreeBuilder<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    max_depth: usize,
    warnings: Vec<ParseWarning>,
    /// First observed offset of a mapping nested under a key.
    indent: Option<usize>,
    /// First observed offset of a sequence nested under a key.
    sequence_indent: Option<usize>,
}

impl<'a> TreeBuilder<'a> {
    fn build(mut self, line_ending: LineEnding, trailing_newline: bool) -> Result<Document> {
        let (header, explicit_start) = self.take_header()?;

        let root = match self.peek_content() {
            Some(index) => {
                let col = self.lines[index].indent;
                let mut root = self.parse_block(col, 1)?;
                set_block_indent(&mut root, col);
                root
            }
            None => Node::new(NodeValue::Mapping(Mapping::new())),
        };

        if let Some(index) = self.peek_content() {
            let line = self.lines[index];
            let message = if line.content.starts_with("---") {
                "multiple documents in one file are not supported"
            } else if line.content.starts_with("...") {
                "document end markers are not supported"
            } else {
                "unexpected content after the document root"
            };
            return Err(self.unsupported(&line, message));
        }

        let trailing = self.lines[self.pos..]
            .iter()
            .map(|line| line.raw.to_string())
            .collect();
        let indent = self.indent.unwrap_or(2);

        Ok(Document {
            root,
            indent,
            sequence_indent: self.sequence_indent.unwrap_or(indent),
            line_ending,
            explicit_start,
            header,
            trailing,
            trailing_newline,
            warnings: self.warnings,
        })
    }

    /// Consume everything up to and including a leading `---` marker.
    fn take_header(&mut self) -> Result<(Vec<String>, bool)> {
        let mut index = 0;
        while let Some(line) = self.lines.get(index) {
            match line.kind {
                LineKind::Content if line.content.starts_with('%') => index += 1,
                LineKind::Content => break,
                _ => index += 1,
            }
        }

        let Some(line) = self.lines.get(index).copied() else {
            return Ok((Vec::new(), false));
        };
        if line.indent != 0 || !line.content.starts_with("---") {
            return Ok((Vec::new(), false));
        }
        let after = &line.content[3..];
        if !after.is_empty() && !after.starts_with([' ', '\t']) {
            return Ok((Vec::new(), false));
        }
        if !after.trim().is_empty() && !after.trim_start().starts_with('#') {
            return Err(self.unsupported(
                &line,
                "content on the `---` line is not supported",
            ));
        }

        let header = self.lines[..=index]
            .iter()
            .map(|line| line.raw.to_string())
            .collect::<Vec<_>>();
        self.pos = index + 1;
        // The marker line itself is re-emitted from the flag unless it
        // carries a comment, in which case it stays in the header verbatim.
        if after.trim().is_empty() {
            let mut header = header;
            header.pop();
            Ok((header, true))
        } else {
            Ok((header, false))
        }
    }

    fn peek_content(&self) -> Option<usize> {
        (self.pos..self.lines.len()).find(|&i| self.lines[i].kind == LineKind::Content)
    }

    fn take_trivia(&mut self, col: usize) -> Trivia {
        let mut leading = Vec::new();
        while let Some(line) = self.lines.get(self.pos) {
            match line.kind {
                LineKind::Content => break,
                LineKind::Blank => leading.push(line.raw.to_string()),
                LineKind::Comment => {
                    if line.indent == col && line.content.starts_with('#') {
                        leading.push(line.content.to_string());
                    } else {
                        leading.push(line.raw.to_string());
                    }
                }
            }
            self.pos += 1;
        }

        let blank_line_before = leading.first().is_some_and(|line| line.trim().is_empty());
        if blank_line_before {
            leading.remove(0);
        }
        Trivia {
            leading,
            trailing_comment: None,
            blank_line_before,
        }
    }

    fn parse_block(&mut self, col: usize, depth: usize) -> Result<Node> {
        let Some(index) = self.peek_content() else {
            return Ok(Node::new(NodeValue::Mapping(Mapping::new())));
        };
        let line = self.lines[index];
        if is_dash(line.content) {
            self.parse_sequence(col, depth)
        } else if is_mapping_line(line.content) {
            self.parse_mapping(col, depth)
        } else {
            let trivia = self.take_trivia(col);
            self.pos += 1;
            let mut node = self.parse_value(&line, line.content, col, depth, false)?;
            node.trivia.leading = trivia.leading;
            node.trivia.blank_line_before = trivia.blank_line_before;
            Ok(node)
        }
    }

    fn parse_mapping(&mut self, col: usize, depth: usize) -> Result<Node> {
        self.check_depth(depth)?;

        let mut mapping = Mapping::new();
        let mut location = None;

        loop {
            let mark = self.pos;
            let trivia = self.take_trivia(col);
            let Some(line) = self.lines.get(self.pos).copied() else {
                self.pos = mark;
                break;
            };
            if line.indent < col || is_document_marker(&line) || is_dash(line.content) {
                self.pos = mark;
                break;
            }
            if line.indent > col {
                return Err(self.unsupported(&line, "unexpected indentation"));
            }
            self.check_structural_line(&line)?;

            let Some((raw_key, key, rest)) = split_key(line.content) else {
                return Err(self.unsupported(&line, "expected a mapping key"));
            };
            let key_location = self.location_at(&line, line.content);
            location.get_or_insert(key_location);

            self.pos += 1;
            let mut value = self.parse_value(&line, rest, col, depth + 1, true)?;
            value.trivia.leading = trivia.leading;
            value.trivia.blank_line_before = trivia.blank_line_before;

            if let Some(previous) = mapping.entries.iter().position(|entry| entry.key == key) {
                mapping.entries.remove(previous);
                self.warnings.push(ParseWarning::DuplicateKey {
                    key: key.clone(),
                    location: key_location,
                });
            }
            mapping.entries.push(MappingEntry {
                key,
                raw_key,
                value,
            });
        }

        let mut node = Node::new(NodeValue::Mapping(mapping));
        node.location = location;
        Ok(node)
    }

    fn parse_sequence(&mut self, col: usize, depth: usize) -> Result<Node> {
        self.check_depth(depth)?;

        let mut items = Vec::new();
        let mut location = None;

        loop {
            let mark = self.pos;
            let trivia = self.take_trivia(col);
            let Some(line) = self.lines.get(self.pos).copied() else {
                self.pos = mark;
                break;
            };
            if line.indent < col || is_document_marker(&line) {
                self.pos = mark;
                break;
            }
            if line.indent > col {
                return Err(self.unsupported(&line, "unexpected indentation"));
            }
            self.check_structural_line(&line)?;
            if !is_dash(line.content) {
                self.pos = mark;
                break;
            }
            location.get_or_insert(self.location_at(&line, line.content));

            let after = &line.content[1..];
            let rest = after.trim_start_matches(' ');
            let item_col = col + 1 + (after.len() - rest.len());

            let mut item = if rest.is_empty() || rest.starts_with('#') {
                self.pos += 1;
                self.parse_value(&line, after, col, depth + 1, false)?
            } else if is_dash(rest) || is_mapping_line(rest) {
                // Compact form: re-read the rest of the line as the first line
                // of a block starting at the item's column.
                self.lines[self.pos].indent = item_col;
                self.lines[self.pos].content = rest;
                let mut node = if is_dash(rest) {
                    self.parse_sequence(item_col, depth + 1)?
                } else {
                    self.parse_mapping(item_col, depth + 1)?
                };
                set_block_indent(&mut node, item_col - col);
                node
            } else {
                self.pos += 1;
                self.parse_value(&line, after, col, depth + 1, false)?
            };

            item.trivia.leading = trivia.leading;
            item.trivia.blank_line_before = trivia.blank_line_before;
            items.push(item);
        }

        let mut node = Node::new(NodeValue::Sequence(Sequence {
            items,
            style: CollectionStyle::default(),
        }));
        node.location = location;
        Ok(node)
    }

    /// Parse the value that follows `key:` or `-` on `line`.
    ///
    /// `rest` is the remainder of the line after the indicator, `owner_col`
    /// the column of the key or dash. The line itself is already consumed.
    fn parse_value(
        &mut self,
        line: &Line<'a>,
        rest: &'a str,
        owner_col: usize,
        depth: usize,
        under_key: bool,
    ) -> Result<Node> {
        let (value_part, comment) = split_comment(rest);
        let value_text = value_part.trim_start();
        let start = line.raw.len() - rest.len() + (value_part.len() - value_text.len());
        let location = self.location_at_byte(line, start);
        let text = value_text.trim_end();
        let (tag, body) = split_tag(text);
        let tag = tag.map(str::to_string);

        let mut node = if body.is_empty() {
            self.parse_nested(owner_col, depth, tag, under_key)?
        } else if body.starts_with(['|', '>']) {
            let keep = body.contains('+');
            let continuation = self.take_block_lines(owner_col, keep);
            self.scalar_node(body, continuation, tag)
        } else if body.starts_with(['[', '{']) {
            if tag.is_some() {
                // Tagged flow collections stay opaque scalars (`!ENV [A, b]`).
                self.scalar_node(body, Vec::new(), tag)
            } else {
                self.parse_flow(line, body, depth)?
            }
        } else if let Some(quote) = body.chars().next().filter(|c| matches!(c, '"' | '\'')) {
            let continuation = if quoted_end(&body[1..], quote).is_some() {
                Vec::new()
            } else {
                self.take_quoted_lines(quote, owner_col)
            };
            self.scalar_node(body, continuation, tag)
        } else {
            let continuation = self.take_plain_lines(owner_col);
            self.scalar_node(body, continuation, tag)
        };

        if node.location.is_none() {
            node.location = Some(location);
        }
        if let Some(comment) = comment {
            node.trivia.trailing_comment = Some(comment.to_string());
        }
        Ok(node)
    }

    /// A key or dash with nothing after it: the value is a block collection
    /// on the following lines, a scalar continued there, or null.
    fn parse_nested(
        &mut self,
        owner_col: usize,
        depth: usize,
        tag: Option<String>,
        under_key: bool,
    ) -> Result<Node> {
        let mark = self.pos;
        let next = self
            .peek_content()
            .map(|index| self.lines[index])
            .filter(|line| !is_document_marker(line));

        match next {
            Some(next) if next.indent > owner_col => {
                let offset = next.indent - owner_col;
                if is_dash(next.content) || is_mapping_line(next.content) {
                    if tag.is_some() {
                        return Err(self.unsupported(&next, "tags on block collections are not supported"));
                    }
                    let mut node = if is_dash(next.content) {
                        if under_key {
                            self.sequence_indent.get_or_insert(offset);
                        }
                        self.parse_sequence(next.indent, depth)?
                    } else {
                        if under_key {
                            self.indent.get_or_insert(offset);
                        }
                        self.parse_mapping(next.indent, depth)?
                    };
                    set_block_indent(&mut node, offset);
                    Ok(node)
                } else {
                    let continuation = self.take_plain_lines(owner_col);
                    Ok(self.scalar_node("", continuation, tag))
                }
            }
            Some(next) if under_key && next.indent == owner_col && is_dash(next.content) => {
                if tag.is_some() {
                    return Err(self.unsupported(&next, "tags on block collections are not supported"));
                }
                self.sequence_indent.get_or_insert(0);
                let mut node = self.parse_sequence(owner_col, depth)?;
                set_block_indent(&mut node, 0);
                Ok(node)
            }
            _ => {
                self.pos = mark;
                Ok(self.scalar_node("", Vec::new(), tag))
            }
        }
    }

    fn parse_flow(&mut self, line: &Line<'a>, body: &str, depth: usize) -> Result<Node> {
        let single_line = flow_balanced(body);
        let mut text = body.to_string();
        let mut trailing_comment = None;

        if !single_line {
            while let Some(next) = self.lines.get(self.pos).copied() {
                self.pos += 1;
                let (part, comment) = split_comment(next.raw);
                text.push(' ');
                text.push_str(part.trim());
                trailing_comment = comment.map(str::to_string);
                if flow_balanced(&text) {
                    break;
                }
            }
        }

        let value = YamlLoader::load_from_str(&format!("v: {text}"))
            .ok()
            .and_then(|docs| docs.into_iter().next())
            .map(|doc| doc["v"].clone())
            .filter(|value| !value.is_badvalue())
            .ok_or_else(|| Error::Syntax {
                message: "malformed flow collection".to_string(),
                location: self.location_at(line, line.content),
            })?;

        if depth + yaml_depth(&value) > self.max_depth + 1 {
            return Err(Error::NestingTooDeep {
                max_depth: self.max_depth,
                location: self.location_at(line, line.content),
            });
        }

        let mut node = Node::from(value);
        let source = single_line.then(|| body.to_string());
        match &mut node.value {
            NodeValue::Sequence(seq) => seq.style = CollectionStyle::Flow { source },
            NodeValue::Mapping(map) => map.style = CollectionStyle::Flow { source },
            NodeValue::Scalar(_) => {}
        }
        node.trivia.trailing_comment = trailing_comment;
        Ok(node)
    }

    fn scalar_node(&self, raw: &str, continuation: Vec<String>, tag: Option<String>) -> Node {
        let value = decode(raw, &continuation);
        Node::scalar(Scalar {
            raw: raw.to_string(),
            continuation,
            value,
            tag,
        })
    }

    /// Lines of a literal or folded block scalar: everything indented past
    /// the owner column, including interior blank lines. Trailing blank lines
    /// belong to the scalar only under keep chomping (`|+`).
    fn take_block_lines(&mut self, owner_col: usize, keep: bool) -> Vec<String> {
        let mut index = self.pos;
        let mut end = self.pos;
        while let Some(line) = self.lines.get(index) {
            if line.kind == LineKind::Blank {
                index += 1;
                if keep {
                    end = index;
                }
            } else if line.indent > owner_col {
                index += 1;
                end = index;
            } else {
                break;
            }
        }
        self.collect_relative(end, owner_col)
    }

    /// Continuation lines of a multi-line plain scalar.
    fn take_plain_lines(&mut self, owner_col: usize) -> Vec<String> {
        let mut index = self.pos;
        let mut end = self.pos;
        while let Some(line) = self.lines.get(index) {
            match line.kind {
                LineKind::Blank => index += 1,
                LineKind::Content
                    if line.indent > owner_col
                        && !is_document_marker(line)
                        && !is_mapping_line(line.content)
                        && !is_dash(line.content) =>
                {
                    index += 1;
                    end = index;
                }
                _ => break,
            }
        }
        self.collect_relative(end, owner_col)
    }

    /// Remaining lines of a quoted scalar, up to the closing quote.
    fn take_quoted_lines(&mut self, quote: char, owner_col: usize) -> Vec<String> {
        let mut end = self.pos;
        while let Some(line) = self.lines.get(end) {
            end += 1;
            if quoted_end(line.content, quote).is_some() {
                break;
            }
        }
        self.collect_relative(end, owner_col)
    }

    fn collect_relative(&mut self, end: usize, owner_col: usize) -> Vec<String> {
        let lines = self.lines[self.pos..end]
            .iter()
            .map(|line| strip_columns(line.raw, owner_col).to_string())
            .collect();
        self.pos = end;
        lines
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth <= self.max_depth {
            return Ok(());
        }
        let line = self.lines[self.pos.min(self.lines.len().saturating_sub(1))];
        Err(Error::NestingTooDeep {
            max_depth: self.max_depth,
            location: self.location_at(&line, line.content),
        })
    }

    fn check_structural_line(&self, line: &Line<'a>) -> Result<()> {
        if line.content.starts_with('\t') {
            return Err(self.unsupported(line, "tab characters in indentation are not supported"));
        }
        if line.content == "?" || line.content.starts_with("? ") {
            return Err(self.unsupported(line, "explicit `?` keys are not supported"));
        }
        Ok(())
    }

    /// Location of `suffix`, which must be a suffix of `line.raw`.
    fn location_at(&self, line: &Line<'a>, suffix: &str) -> Location {
        self.location_at_byte(line, line.raw.len() - suffix.len())
    }

    fn location_at_byte(&self, line: &Line<'a>, start: usize) -> Location {
        Location::new(
            line.offset + start,
            line.number,
            line.raw[..start].chars().count() + 1,
        )
    }

    fn unsupported(&self, line: &Line<'a>, message: &str) -> Error {
        Error::Unsupported {
            message: message.to_string(),
            location: self.location_at(line, line.content),
        }
    }
}

fn set_block_indent(node: &mut Node, offset: usize) {
    let style = match &mut node.value {
        NodeValue::Sequence(seq) => &mut seq.style,
        NodeValue::Mapping(map) => &mut map.style,
        NodeValue::Scalar(_) => return,
    };
    if let CollectionStyle::Block { indent } = style {
        *indent = Some(offset);
    }
}

fn yaml_depth(value: &Yaml) -> usize {
    match value {
        Yaml::Array(items) => 1 + items.iter().map(yaml_depth).max().unwrap_or(0),
        Yaml::Hash(hash) => 1 + hash.values().map(yaml_depth).max().unwrap_or(0),
        _ => 0,
    }
}

fn is_dash(content: &str) -> bool {
    content == "-" || content.starts_with("- ") || content.starts_with("-\t")
}

fn is_mapping_line(content: &str) -> bool {
    content == "?" || content.starts_with("? ") || split_key(content).is_some()
}

fn is_document_marker(line: &Line<'_>) -> bool {
    line.indent == 0
        && ["---", "..."].iter().any(|marker| {
            line.content == *marker
                || line
                    .content
                    .strip_prefix(marker)
                    .is_some_and(|rest| rest.starts_with([' ', '\t']))
        })
}

fn strip_columns(raw: &str, columns: usize) -> &str {
    let spaces = raw.len() - raw.trim_start_matches(' ').len();
    &raw[spaces.min(columns)..]
}

/// Split `key: rest` into the key as written, the decoded key and the text
/// after the colon.
fn split_key(content: &str) -> Option<(String, String, &str)> {
    let first = content.chars().next()?;
    match first {
        '"' | '\'' => {
            let close = quoted_end(&content[1..], first)? + 1;
            let raw_key = &content[..=close];
            let rest = content[close + 1..].trim_start_matches(' ').strip_prefix(':')?;
            if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
                return None;
            }
            let key = match decode(raw_key, &[]) {
                Yaml::String(s) => s,
                other => encode(&other),
            };
            Some((raw_key.to_string(), key, rest))
        }
        '[' | '{' | '#' | '&' | '*' | '!' | '|' | '>' | '%' | '@' | '`' => None,
        '-' if is_dash(content) => None,
        _ => {
            for (i, ch) in content.char_indices() {
                if ch == '#' && content[..i].ends_with([' ', '\t']) {
                    return None;
                }
                if ch == ':' {
                    let rest = &content[i + 1..];
                    if rest.is_empty() || rest.starts_with([' ', '\t']) {
                        let raw_key = content[..i].trim_end();
                        if raw_key.is_empty() {
                            return None;
                        }
                        return Some((raw_key.to_string(), raw_key.to_string(), rest));
                    }
                }
            }
            None
        }
    }
}

/// Byte index of the closing quote in `text`, which starts just after the
/// opening quote.
fn quoted_end(text: &str, quote: char) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if quote == '"' && ch == '\\' {
            chars.next();
            continue;
        }
        if ch == quote {
            if quote == '\'' && chars.peek().is_some_and(|&(_, c)| c == '\'') {
                chars.next();
                continue;
            }
            return Some(i);
        }
    }
    None
}

/// Split a trailing comment off `text`. The comment keeps the whitespace
/// that separates it from the value.
fn split_comment(text: &str) -> (&str, Option<&str>) {
    let (_, body) = split_tag(text.trim_start());
    let structured = body.starts_with(['"', '\'', '[', '{']);

    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        match quote {
            Some('"') => {
                if ch == '\\' {
                    chars.next();
                } else if ch == '"' {
                    quote = None;
                }
            }
            Some(q) => {
                if ch == q {
                    if chars.peek().is_some_and(|&(_, c)| c == q) {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => {
                if ch == '#' && prev.is_none_or(char::is_whitespace) {
                    let gap = text[..i].trim_end().len();
                    return (&text[..gap], Some(&text[gap..]));
                }
                if structured
                    && matches!(ch, '"' | '\'')
                    && prev.is_none_or(|p| p.is_whitespace() || "[{,:".contains(p))
                {
                    quote = Some(ch);
                }
            }
        }
        prev = Some(ch);
    }
    (text, None)
}

/// True once every bracket opened in `text` is closed.
fn flow_balanced(text: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match quote {
            Some('"') => {
                if ch == '\\' {
                    chars.next();
                } else if ch == '"' {
                    quote = None;
                }
            }
            Some(q) => {
                if ch == q {
                    if chars.peek() == Some(&q) {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => match ch {
                '[' | '{' => depth += 1,
                ']' | '}' => depth = depth.saturating_sub(1),
                '"' | '\'' if prev.is_none_or(|p| p.is_whitespace() || "[{,:".contains(p)) => {
                    quote = Some(ch);
                }
                _ => {}
            },
        }
        prev = Some(ch);
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyPath;

    fn path(text: &str) -> KeyPath {
        KeyPath::parse(text).unwrap()
    }

    #[test]
    fn test_empty_source_is_empty_mapping() {
        let doc = parse("").unwrap();
        assert!(doc.root.as_mapping().is_some_and(Mapping::is_empty));
        assert_eq!(doc.serialize(), "");
    }

    #[test]
    fn test_comment_only_source() {
        let text = "# nothing here yet\n\n# another\n";
        let doc = parse(text).unwrap();
        assert!(doc.root.as_mapping().is_some_and(Mapping::is_empty));
        assert_eq!(doc.serialize(), text);
    }

    #[test]
    fn test_scalar_values_decoded() {
        let doc = parse("a: 1\nb: 'two'\nc: true\nd:\ne: \"x\\ty\"\n").unwrap();
        let get = |p: &str| doc.get(&path(p)).and_then(Node::as_scalar).map(|s| s.value.clone());
        assert_eq!(get("a"), Some(Yaml::Integer(1)));
        assert_eq!(get("b"), Some(Yaml::String("two".into())));
        assert_eq!(get("c"), Some(Yaml::Boolean(true)));
        assert_eq!(get("d"), Some(Yaml::Null));
        assert_eq!(get("e"), Some(Yaml::String("x\ty".into())));
    }

    #[test]
    fn test_comments_attach_to_following_node() {
        let doc = parse("# top\nsite_name: X  # inline\n\n# about nav\nnav: []\n").unwrap();
        let site = doc.get(&path("site_name")).unwrap();
        assert_eq!(site.trivia.leading, vec!["# top"]);
        assert_eq!(site.trivia.trailing_comment.as_deref(), Some("  # inline"));
        let nav = doc.get(&path("nav")).unwrap();
        assert!(nav.trivia.blank_line_before);
        assert_eq!(nav.trivia.leading, vec!["# about nav"]);
    }

    #[test]
    fn test_compact_and_flush_sequences() {
        let text = "plugins:\n- search\n- mkdocstrings:\n    handlers:\n      python:\n        paths: [src]\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.sequence_indent, 0);
        let paths = doc
            .get(&path("plugins[mkdocstrings].handlers.python.paths"))
            .unwrap();
        assert_eq!(paths.to_flow_string(), "[src]");
        assert_eq!(doc.serialize(), text);
    }

    #[test]
    fn test_indent_detection() {
        let doc = parse("theme:\n    name: material\nnav:\n  - Home: index.md\n").unwrap();
        assert_eq!(doc.indent, 4);
        assert_eq!(doc.sequence_indent, 2);
    }

    #[test]
    fn test_block_scalar_kept_verbatim() {
        let text = "extra_css: |\n  body {\n    color: red;\n  }\n\nnext: 1\n";
        let doc = parse(text).unwrap();
        let css = doc.get(&path("extra_css")).and_then(Node::as_scalar).unwrap();
        assert_eq!(css.value, Yaml::String("body {\n  color: red;\n}\n".into()));
        assert!(doc.get(&path("next")).unwrap().trivia.blank_line_before);
        assert_eq!(doc.serialize(), text);
    }

    #[test]
    fn test_keep_chomping_owns_trailing_blank_lines() {
        let text = "a: |+\n  keep\n\nb: |\n  clip\n\nc: 1\n";
        let doc = parse(text).unwrap();
        let get = |p: &str| doc.get(&path(p)).and_then(Node::as_scalar).map(|s| s.value.clone());
        assert_eq!(get("a"), Some(Yaml::String("keep\n\n".into())));
        assert_eq!(get("b"), Some(Yaml::String("clip\n".into())));
        assert_eq!(doc.serialize(), text);
    }

    #[test]
    fn test_multiline_flow_is_decoded() {
        let doc = parse("features: [a,\n  b, c]\n").unwrap();
        let features = doc.get(&path("features")).unwrap();
        assert_eq!(features.to_flow_string(), "[a, b, c]");
        assert_eq!(doc.serialize(), "features: [a, b, c]\n");
    }

    #[test]
    fn test_tags_are_kept() {
        let text = "markdown_extensions:\n  - pymdownx.superfences:\n      custom_fences:\n        - name: mermaid\n          format: !!python/name:mermaid2.fence_mermaid_custom\n";
        let doc = parse(text).unwrap();
        let fences = doc
            .get(&path("markdown_extensions[pymdownx.superfences].custom_fences[mermaid].format"))
            .and_then(Node::as_scalar)
            .unwrap();
        assert_eq!(
            fences.tag.as_deref(),
            Some("!!python/name:mermaid2.fence_mermaid_custom")
        );
        assert_eq!(doc.serialize(), text);
    }

    #[test]
    fn test_duplicate_key_last_wins_with_warning() {
        let doc = parse("a: 1\nb: 2\na: 3\n").unwrap();
        let root = doc.root.as_mapping().unwrap();
        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(doc.warnings.len(), 1);
        let ParseWarning::DuplicateKey { key, location } = &doc.warnings[0];
        assert_eq!(key, "a");
        assert_eq!(location.line, 3);
    }

    #[test]
    fn test_syntax_error_has_location() {
        let err = parse("a: [1, 2\nb: 3\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
        assert!(err.location().is_some());
    }

    #[test]
    fn test_unsupported_constructs() {
        let anchors = parse("base: &b\n  x: 1\nother: *b\n").unwrap_err();
        assert!(matches!(anchors, Error::Unsupported { .. }));

        let documents = parse("a: 1\n---\nb: 2\n").unwrap_err();
        assert!(matches!(documents, Error::Unsupported { .. }));

        let explicit = parse("? a\n: 1\n").unwrap_err();
        assert!(matches!(explicit, Error::Unsupported { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let options = ParseOptions { max_depth: 3 };
        let text = "a:\n  b:\n    c:\n      d: 1\n";
        let err = parse_with_options(text, &options).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { max_depth: 3, .. }));
        assert!(parse_with_options("a:\n  b:\n    c: 1\n", &options).is_ok());
    }

    #[test]
    fn test_nesting_limit_stops_before_deep_input() {
        let mut mappings = String::new();
        for level in 0..2_000 {
            mappings.push_str(&" ".repeat(level));
            mappings.push_str("k:\n");
        }
        let err = parse(&mappings).unwrap_err();
        let Error::NestingTooDeep { location, .. } = &err else {
            panic!("expected a nesting error, got {err:?}");
        };
        // Reported where the limit is crossed, not at the end of the input.
        assert!(location.line < 300, "{location:?}");

        let sequences = format!("{}a\n", "- ".repeat(2_000));
        let err = parse(&sequences).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { max_depth: 256, .. }));
    }

    #[test]
    fn test_explicit_start_and_crlf() {
        let text = "---\r\nsite_name: X\r\n";
        let doc = parse(text).unwrap();
        assert!(doc.explicit_start);
        assert_eq!(doc.line_ending, LineEnding::CrLf);
        assert_eq!(doc.serialize(), text);
    }

    #[test]
    fn test_split_comment() {
        assert_eq!(split_comment(" value  # c"), (" value", Some("  # c")));
        assert_eq!(split_comment(" 'a # b'"), (" 'a # b'", None));
        assert_eq!(split_comment(" a#b"), (" a#b", None));
        assert_eq!(split_comment(" [x, 'y # z'] # c"), (" [x, 'y # z']", Some(" # c")));
        assert_eq!(split_comment("   # only"), ("", Some("   # only")));
    }

    #[test]
    fn test_split_key() {
        assert_eq!(
            split_key("site_url: https://x.org"),
            Some(("site_url".into(), "site_url".into(), " https://x.org"))
        );
        assert_eq!(
            split_key("'odd: key': 1"),
            Some(("'odd: key'".into(), "odd: key".into(), " 1"))
        );
        assert_eq!(split_key("https://x.org"), None);
        assert_eq!(split_key("- a: 1"), None);
        assert_eq!(split_key("plain # not: key"), None);
    }
}
