//! # docforge-yaml
//!
//! Lossless YAML for hand-edited configuration files.
//!
//! A [`Document`] is a tree of [`Node`]s. Each node owns its [`Trivia`]
//! (comments and blank lines) and scalars keep their source text, so a file
//! that is parsed and serialized without edits comes back unchanged, and an
//! edited file only changes where it was edited.
//!
//! ## Example
//!
//! ```rust
//! use docforge_yaml::{parse, KeyPath, Node};
//!
//! let mut doc = parse("# Site settings\nsite_name: Old  # header text\n").unwrap();
//! let path = KeyPath::parse("site_name").unwrap();
//! doc.set(&path, Node::string("New"), None).unwrap();
//! assert_eq!(doc.serialize(), "# Site settings\nsite_name: New  # header text\n");
//! ```

mod document;
mod emitter;
mod error;
mod location;
mod node;
mod parser;
mod path;
pub mod scalar;
mod trivia;

pub use document::{Document, LineEnding};
pub use error::{Error, ParseWarning, Result};
pub use location::{Location, byte_to_char_offset, char_to_byte_offset};
pub use node::{
    CollectionStyle, DEFAULT_IDENTITY_FIELD, Mapping, MappingEntry, Node, NodeKind, NodeValue,
    Scalar, Sequence,
};
pub use parser::{ParseOptions, parse, parse_with_options};
pub use path::{KeyPath, PathSegment, PathToken, split_path};
pub use trivia::Trivia;
pub use yaml_rust2::Yaml;
