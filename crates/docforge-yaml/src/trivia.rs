//! Comments and blank lines attached to a node.

/// Formatting that surrounds a node in source text.
///
/// `leading` holds the comment and blank lines directly above the node. A
/// comment written at the node's own column is stored without indentation and
/// re-indented on output; lines that start with whitespace are kept verbatim.
/// `blank_line_before` stands for one blank line above the first leading line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trivia {
    pub leading: Vec<String>,
    /// Inline comment including the whitespace gap before `#`, e.g. `"  # note"`.
    pub trailing_comment: Option<String>,
    pub blank_line_before: bool,
}

impl Trivia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a full-line comment above the node. A missing `#` is supplied.
    pub fn with_comment(mut self, text: &str) -> Self {
        self.leading.push(comment_line(text));
        self
    }

    /// Set the inline comment written after the node's value.
    pub fn with_trailing_comment(mut self, text: &str) -> Self {
        self.trailing_comment = Some(format!(" {}", comment_line(text)));
        self
    }

    pub fn with_blank_line_before(mut self) -> Self {
        self.blank_line_before = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing_comment.is_none() && !self.blank_line_before
    }

    /// Comment text of the leading lines, without `#` markers.
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.leading
            .iter()
            .map(|line| line.trim_start())
            .filter(|line| line.starts_with('#'))
            .map(|line| line.trim_start_matches('#').trim())
    }
}

fn comment_line(text: &str) -> String {
    let text = text.trim();
    if text.starts_with('#') {
        text.to_string()
    } else if text.is_empty() {
        "#".to_string()
    } else {
        format!("# {text}")
    }
}
