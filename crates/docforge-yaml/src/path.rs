//! Key paths addressing nodes inside a document.
//!
//! Paths render in dotted/bracket notation: `plugins[mkdocstrings].handlers`,
//! `nav[0]`. Keys that would be ambiguous in that notation are written as
//! `["a.b"]`.

use crate::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// One step of a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A mapping key.
    Key(String),
    /// A sequence position.
    Index(usize),
    /// The sequence element whose identity equals the string.
    Entry(String),
}

/// A location in a document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Parse dotted/bracket notation. Numeric brackets become indexes; any
    /// other bracket becomes an entry identity.
    pub fn parse(text: &str) -> Result<Self> {
        let segments = split_path(text)?
            .into_iter()
            .map(|token| match token {
                PathToken::Key(key) => PathSegment::Key(key),
                PathToken::Bracket(inner) => match inner.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Entry(inner),
                },
            })
            .collect();
        Ok(Self(segments))
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        self.child(PathSegment::Key(key.into()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(PathSegment::Index(index))
    }

    pub fn entry(&self, identity: impl Into<String>) -> Self {
        self.child(PathSegment::Entry(identity.into()))
    }

    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<PathSegment>> for KeyPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if needs_brackets(key) => {
                    let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
                    write!(f, "[\"{escaped}\"]")?;
                }
                PathSegment::Key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Entry(identity) => write!(f, "[{identity}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn needs_brackets(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']', '"'])
}

/// A lexical piece of a path string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// A bare or quoted key (`site_name`, `["a.b"]`).
    Key(String),
    /// Unquoted bracket content (`0`, `mkdocstrings`, `*`).
    Bracket(String),
}

/// Tokenize dotted/bracket path notation.
pub fn split_path(text: &str) -> Result<Vec<PathToken>> {
    let invalid = |reason: &str| Error::InvalidPath {
        path: text.to_string(),
        reason: reason.to_string(),
    };

    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut key = String::new();
    let mut expect_key = true;

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if key.is_empty() {
                    return Err(invalid("empty key"));
                }
                tokens.push(PathToken::Key(std::mem::take(&mut key)));
                expect_key = true;
            }
            '[' => {
                if !key.is_empty() {
                    tokens.push(PathToken::Key(std::mem::take(&mut key)));
                }
                let mut inner = String::new();
                let mut closed = false;
                if chars.peek() == Some(&'"') {
                    chars.next();
                    let mut escaped = false;
                    for c in chars.by_ref() {
                        if escaped {
                            inner.push(c);
                            escaped = false;
                        } else if c == '\\' {
                            escaped = true;
                        } else if c == '"' {
                            closed = true;
                            break;
                        } else {
                            inner.push(c);
                        }
                    }
                    if !closed || chars.next() != Some(']') {
                        return Err(invalid("unterminated quoted key"));
                    }
                    tokens.push(PathToken::Key(inner));
                } else {
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err(invalid("missing `]`"));
                    }
                    if inner.is_empty() {
                        return Err(invalid("empty brackets"));
                    }
                    tokens.push(PathToken::Bracket(inner));
                }
                expect_key = false;
                if chars.peek() == Some(&'.') {
                    chars.next();
                    expect_key = true;
                    if chars.peek().is_none() {
                        return Err(invalid("empty key"));
                    }
                }
            }
            ']' => return Err(invalid("unexpected `]`")),
            c => {
                if !expect_key {
                    return Err(invalid("expected `.` or `[` after `]`"));
                }
                key.push(c);
            }
        }
    }

    if !key.is_empty() {
        tokens.push(PathToken::Key(key));
    } else if expect_key && !tokens.is_empty() {
        return Err(invalid("empty key"));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_dotted_and_brackets() {
        let path = KeyPath::root()
            .key("plugins")
            .entry("mkdocstrings")
            .key("handlers")
            .key("python");
        assert_eq!(path.to_string(), "plugins[mkdocstrings].handlers.python");
        assert_eq!(KeyPath::root().key("nav").index(0).to_string(), "nav[0]");
        assert_eq!(KeyPath::root().to_string(), "<root>");
    }

    #[test]
    fn test_display_quotes_ambiguous_keys() {
        let path = KeyPath::root().key("extra").key("a.b");
        assert_eq!(path.to_string(), "extra[\"a.b\"]");
    }

    #[test]
    fn test_parse_round_trips_display() {
        for text in [
            "site_name",
            "plugins[mkdocstrings].handlers.python.paths",
            "nav[0]",
            "extra[\"a.b\"].x",
        ] {
            let path = KeyPath::parse(text).unwrap();
            assert_eq!(path.to_string(), text);
        }
    }

    #[test]
    fn test_parse_segments() {
        let path = KeyPath::parse("nav[2][Home]").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("nav".into()),
                PathSegment::Index(2),
                PathSegment::Entry("Home".into()),
            ]
        );
    }

    #[test]
    fn test_split_path_errors() {
        assert!(split_path("a..b").is_err());
        assert!(split_path("a[").is_err());
        assert!(split_path("a[]").is_err());
        assert!(split_path("a]").is_err());
        assert!(split_path("a[x]b").is_err());
        assert!(split_path("a.").is_err());
    }

    #[test]
    fn test_split_path_wildcard_token() {
        assert_eq!(
            split_path("plugins[*].name").unwrap(),
            vec![
                PathToken::Key("plugins".into()),
                PathToken::Bracket("*".into()),
                PathToken::Key("name".into()),
            ]
        );
    }

    #[test]
    fn test_serialize_as_string() {
        let path = KeyPath::root().key("theme").key("palette");
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"theme.palette\"");
    }
}
