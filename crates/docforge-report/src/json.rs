//! Machine-readable rendering of a change log.

use docforge_merge::{ChangeKind, ChangeLog, ChangeRecord};
use docforge_yaml::KeyPath;
use serde::Serialize;

/// JSON view of one merge.
#[derive(Debug, Serialize)]
pub struct ChangeReport<'a> {
    pub file: &'a str,
    /// True when anything was added or updated.
    pub changed: bool,
    pub counts: ChangeCounts,
    pub changes: Vec<ChangeEntry<'a>>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct ChangeCounts {
    pub added: usize,
    pub updated: usize,
    pub preserved: usize,
}

#[derive(Debug, Serialize)]
pub struct ChangeEntry<'a> {
    pub path: &'a KeyPath,
    pub kind: ChangeKind,
    /// The value on one line, untruncated.
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<WarningEntry>,
}

#[derive(Debug, Serialize)]
pub struct WarningEntry {
    pub code: &'static str,
    pub message: String,
}

impl<'a> ChangeReport<'a> {
    pub fn new(log: &'a ChangeLog, file: &'a str) -> Self {
        let mut counts = ChangeCounts::default();
        for record in log {
            match record.kind {
                ChangeKind::Added => counts.added += 1,
                ChangeKind::Updated => counts.updated += 1,
                ChangeKind::Preserved => counts.preserved += 1,
            }
        }
        Self {
            file,
            changed: log.has_changes(),
            counts,
            changes: log.iter().map(ChangeEntry::from_record).collect(),
        }
    }
}

impl<'a> ChangeEntry<'a> {
    fn from_record(record: &'a ChangeRecord) -> Self {
        Self {
            path: &record.path,
            kind: record.kind,
            value: record.value.to_flow_string(),
            previous: record.previous.as_ref().map(|node| node.to_flow_string()),
            warning: record.warning.map(|warning| WarningEntry {
                code: warning.code(),
                message: warning.to_string(),
            }),
        }
    }
}

/// Render `log` as a pretty-printed JSON document.
///
/// # Errors
///
/// Fails only if serialization itself fails.
pub fn render_json(log: &ChangeLog, file: &str) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ChangeReport::new(log, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docforge_merge::MergeWarning;
    use docforge_yaml::{Node, NodeKind};

    #[test]
    fn test_report_fields() {
        let mut log = ChangeLog::new();
        log.push(ChangeRecord::added(
            KeyPath::parse("plugins[search]").unwrap(),
            Node::string("search"),
        ));
        log.push(
            ChangeRecord::updated(
                KeyPath::parse("theme.palette").unwrap(),
                Node::string("default"),
                Node::sequence(vec![Node::mapping([("scheme", Node::string("slate"))])]),
            )
            .with_warning(Some(MergeWarning::TypeMismatch {
                existing: NodeKind::Scalar,
                template: NodeKind::Sequence,
            })),
        );

        let value: serde_json::Value =
            serde_json::from_str(&render_json(&log, "mkdocs.yml").unwrap()).unwrap();

        assert_eq!(value["file"], "mkdocs.yml");
        assert_eq!(value["changed"], true);
        assert_eq!(value["counts"]["added"], 1);
        assert_eq!(value["counts"]["updated"], 1);
        assert_eq!(value["changes"][0]["path"], "plugins[search]");
        assert_eq!(value["changes"][0]["kind"], "added");
        assert!(value["changes"][0].get("previous").is_none());
        assert_eq!(value["changes"][1]["previous"], "default");
        assert_eq!(value["changes"][1]["value"], "[{scheme: slate}]");
        assert_eq!(value["changes"][1]["warning"]["code"], "D-2-2");
    }

    #[test]
    fn test_preserved_only_is_unchanged() {
        let mut log = ChangeLog::new();
        log.push(ChangeRecord::preserved(
            KeyPath::parse("nav").unwrap(),
            Node::string("x"),
        ));
        let report = ChangeReport::new(&log, "mkdocs.yml");
        assert!(!report.changed);
        assert_eq!(
            report.counts,
            ChangeCounts {
                added: 0,
                updated: 0,
                preserved: 1
            }
        );
    }
}
