//! Error and warning types for the YAML codec.

use crate::Location;
use thiserror::Error;

/// Result type alias for docforge-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or editing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The text is not valid YAML.
    #[error("YAML syntax error at {location}: {message}")]
    Syntax { message: String, location: Location },

    /// Valid YAML that the lossless codec does not model
    /// (tabs in indentation, explicit `?` keys, anchors on collections,
    /// multi-document streams).
    #[error("unsupported YAML at {location}: {message}")]
    Unsupported { message: String, location: Location },

    /// Nesting exceeds `ParseOptions::max_depth`.
    #[error("YAML nesting too deep (max depth: {max_depth}) at {location}")]
    NestingTooDeep { max_depth: usize, location: Location },

    /// `Document::set` walked into a scalar or a missing sequence element.
    #[error("cannot set {path}: {reason}")]
    InvalidPath { path: String, reason: String },
}

impl Error {
    /// Source location of the error, when it refers to parsed text.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Syntax { location, .. }
            | Error::Unsupported { location, .. }
            | Error::NestingTooDeep { location, .. } => Some(*location),
            Error::InvalidPath { .. } => None,
        }
    }

    /// The message without the location prefix.
    pub fn reason(&self) -> String {
        match self {
            Error::Syntax { message, .. } | Error::Unsupported { message, .. } => message.clone(),
            Error::NestingTooDeep { max_depth, .. } => {
                format!("nesting exceeds the maximum depth of {max_depth}")
            }
            Error::InvalidPath { reason, .. } => reason.clone(),
        }
    }
}

/// Non-fatal findings collected while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A mapping key appeared more than once; the last occurrence wins.
    DuplicateKey { key: String, location: Location },
}

impl ParseWarning {
    pub fn location(&self) -> Location {
        match self {
            ParseWarning::DuplicateKey { location, .. } => *location,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ParseWarning::DuplicateKey { key, .. } => {
                format!("duplicate key `{key}`; the last occurrence is used")
            }
        }
    }
}
