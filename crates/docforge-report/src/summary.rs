//! Text rendering of a change log.
//!
//! ```text
//! Changes to mkdocs.yml
//! Added:
//!   + plugins[mkdocstrings]: mkdocstrings
//! Updated:
//!   ~ site_name: Old -> X
//! Preserved:
//!   = plugins[extra-plugin]: extra-plugin
//! Warnings:
//!   ! theme.palette: type changed from scalar to sequence (D-2-2)
//! ```
//!
//! Groups appear in that order and empty groups are omitted. Within a group
//! records keep the order the engine visited them in.

use docforge_merge::{ChangeKind, ChangeLog};
use docforge_yaml::Node;
use std::fmt::Write;

/// Options for change summaries.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Longest value preview, in characters (default: 50).
    ///
    /// Longer values keep their first `preview_len - 3` characters followed
    /// by `...`.
    pub preview_len: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { preview_len: 50 }
    }
}

const GROUPS: [(ChangeKind, char); 3] = [
    (ChangeKind::Added, '+'),
    (ChangeKind::Updated, '~'),
    (ChangeKind::Preserved, '='),
];

/// Render `log` as a human-readable summary for `file`.
pub fn render_summary(log: &ChangeLog, file: &str, options: &ReportOptions) -> String {
    if log.is_empty() {
        return format!("No changes to {file}\n");
    }

    let mut out = String::new();
    let _ = writeln!(out, "Changes to {file}");

    for (kind, marker) in GROUPS {
        let mut records = log.of_kind(kind).peekable();
        if records.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "{}:", kind.label());
        for record in records {
            let value = preview(&record.value, options.preview_len);
            match &record.previous {
                Some(previous) => {
                    let previous = preview(previous, options.preview_len);
                    let _ = writeln!(out, "  {marker} {}: {previous} -> {value}", record.path);
                }
                None => {
                    let _ = writeln!(out, "  {marker} {}: {value}", record.path);
                }
            }
        }
    }

    let mut warnings = log.warnings().peekable();
    if warnings.peek().is_some() {
        out.push_str("Warnings:\n");
        for (record, warning) in warnings {
            let _ = writeln!(out, "  ! {}: {warning} ({})", record.path, warning.code());
        }
    }

    out
}

/// A node on one line, shortened to at most `max_len` characters.
pub fn preview(node: &Node, max_len: usize) -> String {
    truncate(&node.to_flow_string(), max_len)
}

/// Shorten `text` to at most `max_len` characters, ending in `...` when cut.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut short: String = text.chars().take(keep).collect();
    short.push_str(&"..."[..max_len.min(3)]);
    short
}
