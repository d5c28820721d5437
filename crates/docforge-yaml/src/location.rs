//! Source positions for parse errors, warnings and parsed nodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use yaml_rust2::scanner::Marker;

/// A position in source text.
///
/// `line` and `column` are 1-based and count characters; `offset` is a byte
/// offset from the start of the source.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Location {
    /// Byte offset from start of source
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters not bytes)
    pub column: usize,
}

impl Location {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Translate a `yaml-rust2` scanner marker into a location in `source`.
    ///
    /// The scanner counts characters, so the index is mapped back to a byte
    /// offset here.
    pub fn from_marker(marker: &Marker, source: &str) -> Self {
        Self {
            offset: char_to_byte_offset(source, marker.index()),
            line: marker.line().max(1),
            column: marker.col() + 1,
        }
    }

    /// Locate a byte offset in `source`. Offsets past the end clamp to the end.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut column = 1;

        for (index, ch) in source.char_indices() {
            if index >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Convert a character index into a byte offset, clamping to the end of `source`.
pub fn char_to_byte_offset(source: &str, char_index: usize) -> usize {
    source
        .char_indices()
        .nth(char_index)
        .map_or(source.len(), |(offset, _)| offset)
}

/// Convert a byte offset into a character index (used for span rendering).
pub fn byte_to_char_offset(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    source[..offset].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_offset_counts_lines_and_columns() {
        let source = "a: 1\nbb: 2\n";
        let loc = Location::from_offset(source, 6);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 2);
        assert_eq!(loc.offset, 6);
    }

    #[test]
    fn test_from_offset_clamps() {
        let loc = Location::from_offset("ab", 99);
        assert_eq!(loc.offset, 2);
        assert_eq!(loc.column, 3);
    }

    #[test]
    fn test_char_byte_conversion_with_multibyte() {
        let source = "é: ü";
        assert_eq!(char_to_byte_offset(source, 1), 2);
        assert_eq!(byte_to_char_offset(source, 2), 1);
        // A byte offset inside a multi-byte character snaps back
        assert_eq!(byte_to_char_offset(source, 1), 0);
        assert_eq!(char_to_byte_offset(source, 10), source.len());
    }

    #[test]
    fn test_display() {
        assert_eq!(Location::new(0, 3, 7).to_string(), "3:7");
    }
}
