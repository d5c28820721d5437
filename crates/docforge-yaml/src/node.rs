//! The document tree.
//!
//! Every [`Node`] owns its [`Trivia`], so moving a subtree between documents
//! carries its comments with it.

use crate::scalar::{decode, encode, encode_string};
use crate::{Location, Trivia};
use std::fmt;
use yaml_rust2::Yaml;

/// Field that identifies a mapping inside an identity-keyed list.
pub const DEFAULT_IDENTITY_FIELD: &str = "name";

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub value: NodeValue,
    pub trivia: Trivia,
    /// Where the node's text starts in the source it was parsed from.
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Scalar(Scalar),
    Sequence(Sequence),
    Mapping(Mapping),
}

/// A scalar with its source text.
///
/// `raw` is the text on the node's first line without any tag. Multi-line
/// scalars keep the remaining lines in `continuation`, relative to the column
/// of the line that owns the scalar (the key or the `-`).
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub raw: String,
    pub continuation: Vec<String>,
    pub value: Yaml,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionStyle {
    /// Block layout. `indent` is the children's offset from the owning line's
    /// column; `None` uses the document default.
    Block { indent: Option<usize> },
    /// `[a, b]` / `{k: v}` layout. `source` is the original text while the
    /// collection is unmodified.
    Flow { source: Option<String> },
}

impl Default for CollectionStyle {
    fn default() -> Self {
        CollectionStyle::Block { indent: None }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    pub items: Vec<Node>,
    pub style: CollectionStyle,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    pub entries: Vec<MappingEntry>,
    pub style: CollectionStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    /// Decoded key.
    pub key: String,
    /// Key as written in the source.
    pub raw_key: String,
    pub value: Node,
}

/// Shape of a node, used in warnings and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Scalar => "scalar",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

impl Scalar {
    /// Build a scalar from YAML text such as `material`, `"quoted"` or `42`.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = decode(&raw, &[]);
        Self {
            raw,
            continuation: Vec::new(),
            value,
            tag: None,
        }
    }

    /// Build a scalar from a decoded value, choosing its text.
    pub fn from_value(value: Yaml) -> Self {
        Self {
            raw: encode(&value),
            continuation: Vec::new(),
            value,
            tag: None,
        }
    }

    pub fn is_multiline(&self) -> bool {
        !self.continuation.is_empty()
    }

    /// Tag and first-line text as they appear after `key:` or `-`.
    pub fn inline_text(&self) -> String {
        match (&self.tag, self.raw.is_empty()) {
            (Some(tag), true) => tag.clone(),
            (Some(tag), false) => format!("{tag} {}", self.raw),
            (None, _) => self.raw.clone(),
        }
    }

    fn same_value(&self, other: &Scalar) -> bool {
        self.tag == other.tag && self.value == other.value
    }
}

impl Node {
    pub fn new(value: NodeValue) -> Self {
        Self {
            value,
            trivia: Trivia::default(),
            location: None,
        }
    }

    pub fn scalar(scalar: Scalar) -> Self {
        Self::new(NodeValue::Scalar(scalar))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::scalar(Scalar::from_value(Yaml::String(value.into())))
    }

    pub fn integer(value: i64) -> Self {
        Self::scalar(Scalar::from_value(Yaml::Integer(value)))
    }

    pub fn boolean(value: bool) -> Self {
        Self::scalar(Scalar::from_value(Yaml::Boolean(value)))
    }

    /// An empty value, rendered as `key:` with nothing after it.
    pub fn null() -> Self {
        Self::scalar(Scalar {
            raw: String::new(),
            continuation: Vec::new(),
            value: Yaml::Null,
            tag: None,
        })
    }

    /// A scalar written exactly as `raw`.
    pub fn raw(raw: impl Into<String>) -> Self {
        Self::scalar(Scalar::from_raw(raw))
    }

    /// A tagged scalar such as `!!python/name:pymdownx.superfences.fence_code_format`.
    pub fn tagged(tag: impl Into<String>, raw: impl Into<String>) -> Self {
        let mut scalar = Scalar::from_raw(raw);
        scalar.tag = Some(tag.into());
        Self::scalar(scalar)
    }

    pub fn sequence(items: Vec<Node>) -> Self {
        Self::new(NodeValue::Sequence(Sequence {
            items,
            style: CollectionStyle::default(),
        }))
    }

    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, Node)>) -> Self {
        let mut mapping = Mapping::default();
        for (key, value) in entries {
            mapping.insert(key, value);
        }
        Self::new(NodeValue::Mapping(mapping))
    }

    /// Switch a collection to flow layout (`[a, b]`, `{k: v}`).
    pub fn flow(mut self) -> Self {
        match &mut self.value {
            NodeValue::Sequence(seq) => seq.style = CollectionStyle::Flow { source: None },
            NodeValue::Mapping(map) => map.style = CollectionStyle::Flow { source: None },
            NodeValue::Scalar(_) => {}
        }
        self
    }

    pub fn with_trivia(mut self, trivia: Trivia) -> Self {
        self.trivia = trivia;
        self
    }

    /// Attach a full-line comment above the node.
    pub fn with_comment(mut self, text: &str) -> Self {
        self.trivia = std::mem::take(&mut self.trivia).with_comment(text);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn kind(&self) -> NodeKind {
        match &self.value {
            NodeValue::Scalar(_) => NodeKind::Scalar,
            NodeValue::Sequence(_) => NodeKind::Sequence,
            NodeValue::Mapping(_) => NodeKind::Mapping,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            NodeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match &self.value {
            NodeValue::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match &mut self.value {
            NodeValue::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match &self.value {
            NodeValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match &mut self.value {
            NodeValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// The decoded string of an untagged string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            NodeValue::Scalar(Scalar {
                value: Yaml::String(s),
                tag: None,
                ..
            }) => Some(s),
            _ => None,
        }
    }

    /// Null, an empty string, or an empty collection.
    pub fn is_empty_value(&self) -> bool {
        match &self.value {
            NodeValue::Scalar(s) => {
                s.tag.is_none() && (matches!(&s.value, Yaml::Null) || s.value.as_str() == Some(""))
            }
            NodeValue::Sequence(seq) => seq.items.is_empty(),
            NodeValue::Mapping(map) => map.entries.is_empty(),
        }
    }

    /// Value equality: scalars by tag and decoded value, mappings regardless
    /// of key order. Formatting and comments are ignored.
    pub fn same_value(&self, other: &Node) -> bool {
        match (&self.value, &other.value) {
            (NodeValue::Scalar(a), NodeValue::Scalar(b)) => a.same_value(b),
            (NodeValue::Sequence(a), NodeValue::Sequence(b)) => {
                a.items.len() == b.items.len()
                    && a.items.iter().zip(&b.items).all(|(x, y)| x.same_value(y))
            }
            (NodeValue::Mapping(a), NodeValue::Mapping(b)) => {
                a.entries.len() == b.entries.len()
                    && a.entries.iter().all(|entry| {
                        b.get(&entry.key)
                            .is_some_and(|value| entry.value.same_value(value))
                    })
            }
            _ => false,
        }
    }

    /// Equality of everything that serialization reproduces: values, key
    /// order, scalar text and comments. Source locations are ignored.
    pub fn same_structure(&self, other: &Node) -> bool {
        if self.trivia != other.trivia {
            return false;
        }
        match (&self.value, &other.value) {
            (NodeValue::Scalar(a), NodeValue::Scalar(b)) => {
                a.raw == b.raw && a.tag == b.tag && a.continuation == b.continuation
            }
            (NodeValue::Sequence(a), NodeValue::Sequence(b)) => {
                a.items.len() == b.items.len()
                    && a.items.iter().zip(&b.items).all(|(x, y)| x.same_structure(y))
            }
            (NodeValue::Mapping(a), NodeValue::Mapping(b)) => {
                a.entries.len() == b.entries.len()
                    && a.entries.iter().zip(&b.entries).all(|(x, y)| {
                        x.key == y.key && x.value.same_structure(&y.value)
                    })
            }
            _ => false,
        }
    }

    /// Identity of a list element: a string scalar is its own identity, a
    /// mapping is identified by its `field` value, or by its only key.
    pub fn identity(&self, field: &str) -> Option<String> {
        match &self.value {
            NodeValue::Scalar(_) => self.as_str().map(str::to_string),
            NodeValue::Mapping(map) => {
                if let Some(id) = map.get(field).and_then(Node::as_str) {
                    return Some(id.to_string());
                }
                match map.entries.as_slice() {
                    [only] => Some(only.key.clone()),
                    _ => None,
                }
            }
            NodeValue::Sequence(_) => None,
        }
    }

    /// The key and value of a mapping with exactly one entry.
    pub fn single_entry(&self) -> Option<(&str, &Node)> {
        match self.as_mapping()?.entries.as_slice() {
            [only] => Some((only.key.as_str(), &only.value)),
            _ => None,
        }
    }

    /// The content of the list element with identity `id`: the inner value
    /// for the `- id: {...}` form, the element itself otherwise.
    pub fn entry_body(&self, id: &str) -> &Node {
        match self.single_entry() {
            Some((key, value)) if key == id => value,
            _ => self,
        }
    }

    /// True for the `- id: {...}` form of a list element.
    pub fn wraps_entry(&self, id: &str) -> bool {
        matches!(self.single_entry(), Some((key, _)) if key == id)
    }

    pub fn single_value_mut(&mut self) -> Option<&mut Node> {
        match self.as_mapping_mut()?.entries.as_mut_slice() {
            [only] => Some(&mut only.value),
            _ => None,
        }
    }

    /// Render the node on a single line.
    pub fn to_flow_string(&self) -> String {
        match &self.value {
            NodeValue::Scalar(s) if s.is_multiline() => {
                let text = encode(&s.value);
                match &s.tag {
                    Some(tag) => format!("{tag} {text}"),
                    None => text,
                }
            }
            NodeValue::Scalar(s) => {
                let text = s.inline_text();
                if text.is_empty() { "null".to_string() } else { text }
            }
            NodeValue::Sequence(seq) => {
                let items: Vec<String> = seq.items.iter().map(Node::to_flow_string).collect();
                format!("[{}]", items.join(", "))
            }
            NodeValue::Mapping(map) => {
                let entries: Vec<String> = map
                    .entries
                    .iter()
                    .map(|entry| {
                        let value = entry.value.to_flow_string();
                        format!("{}: {}", entry.raw_key, value)
                    })
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }

    /// Drop source indentation so the subtree adopts the style of the
    /// document it is placed in. Flow collections keep their text.
    pub fn clear_style(&mut self) {
        self.location = None;
        match &mut self.value {
            NodeValue::Scalar(_) => {}
            NodeValue::Sequence(seq) => {
                if let CollectionStyle::Block { indent } = &mut seq.style {
                    *indent = None;
                }
                seq.items.iter_mut().for_each(Node::clear_style);
            }
            NodeValue::Mapping(map) => {
                if let CollectionStyle::Block { indent } = &mut map.style {
                    *indent = None;
                }
                map.entries
                    .iter_mut()
                    .for_each(|entry| entry.value.clear_style());
            }
        }
    }

    /// Forget the original flow text of this collection so it is re-rendered.
    pub fn invalidate_flow_source(&mut self) {
        let style = match &mut self.value {
            NodeValue::Sequence(seq) => &mut seq.style,
            NodeValue::Mapping(map) => &mut map.style,
            NodeValue::Scalar(_) => return,
        };
        if let CollectionStyle::Flow { source } = style {
            *source = None;
        }
    }

    pub fn is_flow(&self) -> bool {
        let style = match &self.value {
            NodeValue::Sequence(seq) => &seq.style,
            NodeValue::Mapping(map) => &map.style,
            NodeValue::Scalar(_) => return false,
        };
        matches!(style, CollectionStyle::Flow { .. })
    }
}

impl From<Yaml> for Node {
    /// Convert a decoded value into a tree in flow layout.
    fn from(value: Yaml) -> Self {
        match value {
            Yaml::Array(items) => {
                Node::sequence(items.into_iter().map(Node::from).collect()).flow()
            }
            Yaml::Hash(hash) => {
                let mut mapping = Mapping {
                    entries: Vec::new(),
                    style: CollectionStyle::Flow { source: None },
                };
                for (key, value) in hash {
                    let key = match key {
                        Yaml::String(s) => s,
                        other => encode(&other),
                    };
                    mapping.insert(key, Node::from(value));
                }
                Node::new(NodeValue::Mapping(mapping))
            }
            scalar => Node::scalar(Scalar::from_value(scalar)),
        }
    }
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|entry| entry.key == key)
            .map(|entry| &mut entry.value)
    }

    pub fn get_entry(&self, key: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replace the value of `key` in place, or append a new entry.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(existing) => *existing = value,
            None => self.entries.push(MappingEntry::new(key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let index = self.entries.iter().position(|entry| entry.key == key)?;
        Some(self.entries.remove(index).value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries
            .iter()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }
}

impl MappingEntry {
    pub fn new(key: impl Into<String>, value: Node) -> Self {
        let key = key.into();
        Self {
            raw_key: encode_string(&key),
            key,
            value,
        }
    }
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of the first item whose identity is `id`.
    pub fn position_of(&self, id: &str, field: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.identity(field).as_deref() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin(name: &str, body: Node) -> Node {
        Node::mapping([(name, body)])
    }

    #[test]
    fn test_identity_forms() {
        assert_eq!(
            Node::string("search").identity(DEFAULT_IDENTITY_FIELD),
            Some("search".to_string())
        );
        let named = Node::mapping([("name", Node::string("Home")), ("path", Node::string("x"))]);
        assert_eq!(named.identity("name"), Some("Home".to_string()));
        let wrapped = plugin("mkdocstrings", Node::mapping([("a", Node::integer(1))]));
        assert_eq!(wrapped.identity("name"), Some("mkdocstrings".to_string()));
        let anonymous = Node::mapping([("a", Node::integer(1)), ("b", Node::integer(2))]);
        assert_eq!(anonymous.identity("name"), None);
        assert_eq!(Node::integer(3).identity("name"), None);
    }

    #[test]
    fn test_entry_body_unwraps_single_key_form() {
        let inner = Node::mapping([("handlers", Node::null())]);
        let wrapped = plugin("mkdocstrings", inner.clone());
        assert!(wrapped.entry_body("mkdocstrings").same_value(&inner));
        assert!(wrapped.entry_body("other").same_value(&wrapped));
    }

    #[test]
    fn test_same_value_ignores_key_order_and_formatting() {
        let a = Node::mapping([("x", Node::integer(1)), ("y", Node::raw("'two'"))]);
        let b = Node::mapping([("y", Node::string("two")), ("x", Node::raw("1"))])
            .with_comment("comment");
        assert!(a.same_value(&b));
        assert!(!a.same_structure(&b));
    }

    #[test]
    fn test_same_value_respects_tags() {
        let tagged = Node::tagged("!ENV", "SITE_URL");
        assert!(!tagged.same_value(&Node::string("SITE_URL")));
        assert!(tagged.same_value(&Node::tagged("!ENV", "SITE_URL")));
    }

    #[test]
    fn test_sequences_compare_in_order() {
        let a = Node::sequence(vec![Node::string("a"), Node::string("b")]);
        let b = Node::sequence(vec![Node::string("b"), Node::string("a")]);
        assert!(!a.same_value(&b));
    }

    #[test]
    fn test_to_flow_string() {
        let node = Node::mapping([
            ("name", Node::string("material")),
            ("features", Node::sequence(vec![Node::string("navigation.tabs")])),
            ("empty", Node::null()),
        ]);
        assert_eq!(
            node.to_flow_string(),
            "{name: material, features: [navigation.tabs], empty: null}"
        );
    }

    #[test]
    fn test_is_empty_value() {
        assert!(Node::null().is_empty_value());
        assert!(Node::string("").is_empty_value());
        assert!(Node::sequence(vec![]).is_empty_value());
        assert!(!Node::string("x").is_empty_value());
        assert!(!Node::tagged("!ENV", "").is_empty_value());
    }

    #[test]
    fn test_from_yaml_builds_flow_tree() {
        let yaml = yaml_rust2::YamlLoader::load_from_str("{a: [1, 2]}")
            .unwrap()
            .remove(0);
        let node = Node::from(yaml);
        assert!(node.is_flow());
        assert_eq!(node.to_flow_string(), "{a: [1, 2]}");
    }

    #[test]
    fn test_mapping_insert_replaces_in_place() {
        let mut map = Mapping::new();
        map.insert("a", Node::integer(1));
        map.insert("b", Node::integer(2));
        map.insert("a", Node::integer(3));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a").and_then(|n| n.as_scalar()).map(|s| s.raw.as_str()), Some("3"));
    }
}
