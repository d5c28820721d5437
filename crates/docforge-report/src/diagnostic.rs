//! Core diagnostic message types.
//!
//! Errors and warnings are structured messages (title, problem, details,
//! hints) in the tidyverse style. Messages with a source location render a
//! snippet of the offending file with `ariadne`.

use docforge_yaml::{Location, byte_to_char_offset};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::ops::Range;

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A problem that doesn't prevent completion
    Warning,
    /// Informational message
    Info,
    /// Additional context
    Note,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Info => "Info",
            DiagnosticKind::Note => "Note",
        }
    }
}

/// How detail items are presented (x/i bullet style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailKind {
    /// ✖ bullet
    Error,
    /// ℹ bullet
    Info,
    /// • bullet
    Note,
}

impl DetailKind {
    fn bullet(self) -> &'static str {
        match self {
            DetailKind::Error => "✖",
            DetailKind::Info => "ℹ",
            DetailKind::Note => "•",
        }
    }

    fn name(self) -> &'static str {
        match self {
            DetailKind::Error => "error",
            DetailKind::Info => "info",
            DetailKind::Note => "note",
        }
    }
}

/// The content of a message or detail item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageContent {
    /// Plain text content
    Plain(String),
    /// Markdown content; backticks mark paths and values
    Markdown(String),
}

impl MessageContent {
    pub fn as_str(&self) -> &str {
        match self {
            MessageContent::Plain(s) => s,
            MessageContent::Markdown(s) => s,
        }
    }

    /// Convert to JSON value with type information
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            MessageContent::Plain(s) => json!({
                "type": "plain",
                "content": s
            }),
            MessageContent::Markdown(s) => json!({
                "type": "markdown",
                "content": s
            }),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Markdown(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Markdown(s.to_string())
    }
}

/// A detail item in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailItem {
    pub kind: DetailKind,
    pub content: MessageContent,
    /// Where in the source this detail applies; rendered as an extra label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A diagnostic message.
///
/// Structure:
/// 1. **Code**: optional error code (e.g., "D-1-1") for searchability
/// 2. **Title**: brief error message
/// 3. **Kind**: Error, Warning, Info
/// 4. **Problem**: what went wrong
/// 5. **Details**: specific information (bulleted)
/// 6. **Hints**: optional guidance for fixing (ends with ?)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    /// Optional error code (e.g., "D-1-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub title: String,

    pub kind: DiagnosticKind,

    pub problem: Option<MessageContent>,

    pub details: Vec<DetailItem>,

    pub hints: Vec<MessageContent>,

    /// Where in the source the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A named source text that located diagnostics are rendered against.
#[derive(Debug, Clone, Copy)]
pub struct SourceText<'a> {
    /// Display name, usually the file path
    pub name: &'a str,
    pub text: &'a str,
}

impl<'a> SourceText<'a> {
    pub fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }
}

/// Options for text rendering.
#[derive(Debug, Clone, Default)]
pub struct TextRenderOptions {
    /// Emit ANSI colors in source snippets.
    pub color: bool,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    ///
    /// Consider [`DiagnosticMessageBuilder`](crate::DiagnosticMessageBuilder)
    /// for anything with a problem statement or details.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    /// Set the error code.
    ///
    /// # Example
    ///
    /// ```
    /// use docforge_report::DiagnosticMessage;
    ///
    /// let msg = DiagnosticMessage::error("YAML Syntax Error").with_code("D-1-1");
    /// assert!(msg.docs_url().is_some());
    /// ```
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Documentation URL for this message's code, if any.
    pub fn docs_url(&self) -> Option<&str> {
        self.code
            .as_ref()
            .and_then(|code| crate::catalog::get_docs_url(code))
    }

    /// Render this message as text, without colors.
    ///
    /// Without a located source the format is:
    /// ```text
    /// Error [D-1-1]: title
    /// Problem statement here
    /// ✖ Error detail
    /// ℹ Info detail
    /// ? Hint
    /// ```
    /// With one, an `ariadne` snippet replaces the title, problem and located
    /// details; unlocated details and hints follow it.
    ///
    /// # Example
    ///
    /// ```
    /// use docforge_report::DiagnosticMessageBuilder;
    ///
    /// let msg = DiagnosticMessageBuilder::error("Invalid input")
    ///     .problem("Values must be numeric")
    ///     .add_hint("Convert to numbers first?")
    ///     .build();
    /// let text = msg.to_text(None);
    /// assert!(text.starts_with("Error: Invalid input\n"));
    /// ```
    pub fn to_text(&self, source: Option<&SourceText<'_>>) -> String {
        self.to_text_with_options(source, &TextRenderOptions::default())
    }

    pub fn to_text_with_options(
        &self,
        source: Option<&SourceText<'_>>,
        options: &TextRenderOptions,
    ) -> String {
        let mut result = String::new();

        let location = self
            .location
            .or_else(|| self.details.iter().find_map(|d| d.location));
        let snippet = match (location, source) {
            (Some(location), Some(source)) => {
                self.render_source_snippet(location, source, options)
            }
            _ => None,
        };

        match snippet {
            Some(snippet) => {
                result.push_str(&snippet);
                for detail in self.details.iter().filter(|d| d.location.is_none()) {
                    let _ = writeln!(result, "{} {}", detail.kind.bullet(), detail.content.as_str());
                }
            }
            None => {
                match &self.code {
                    Some(code) => {
                        let _ = writeln!(result, "{} [{}]: {}", self.kind.label(), code, self.title);
                    }
                    None => {
                        let _ = writeln!(result, "{}: {}", self.kind.label(), self.title);
                    }
                }
                if let Some(problem) = &self.problem {
                    let _ = writeln!(result, "{}", problem.as_str());
                }
                for detail in &self.details {
                    let _ = writeln!(result, "{} {}", detail.kind.bullet(), detail.content.as_str());
                }
            }
        }

        for hint in &self.hints {
            let _ = writeln!(result, "? {}", hint.as_str());
        }

        result
    }

    /// Render this message as a JSON value.
    ///
    /// # Example
    ///
    /// ```
    /// use docforge_report::DiagnosticMessage;
    ///
    /// let json = DiagnosticMessage::error("Something went wrong").to_json();
    /// assert_eq!(json["kind"], "error");
    /// assert_eq!(json["title"], "Something went wrong");
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut obj = json!({
            "kind": self.kind.label().to_lowercase(),
            "title": self.title,
        });

        if let Some(code) = &self.code {
            obj["code"] = json!(code);
            if let Some(url) = self.docs_url() {
                obj["docs_url"] = json!(url);
            }
            if let Some(subsystem) = crate::catalog::get_subsystem(code) {
                obj["subsystem"] = json!(subsystem);
            }
        }

        if let Some(problem) = &self.problem {
            obj["problem"] = problem.to_json();
        }

        if !self.details.is_empty() {
            let details: Vec<_> = self
                .details
                .iter()
                .map(|d| {
                    let mut detail_obj = json!({
                        "kind": d.kind.name(),
                        "content": d.content.to_json()
                    });
                    if let Some(location) = &d.location {
                        detail_obj["location"] = json!(location);
                    }
                    detail_obj
                })
                .collect();
            obj["details"] = json!(details);
        }

        if !self.hints.is_empty() {
            let hints: Vec<_> = self.hints.iter().map(MessageContent::to_json).collect();
            obj["hints"] = json!(hints);
        }

        if let Some(location) = &self.location {
            obj["location"] = json!(location);
        }

        obj
    }

    fn render_source_snippet(
        &self,
        location: Location,
        source: &SourceText<'_>,
        options: &TextRenderOptions,
    ) -> Option<String> {
        use ariadne::{Color, Config, Label, Report, ReportKind, Source};

        if source.text.is_empty() {
            return None;
        }
        let name = source.name.to_string();
        let main_span = char_span(source.text, location);

        let (report_kind, main_color) = match self.kind {
            DiagnosticKind::Error => (ReportKind::Error, Color::Red),
            DiagnosticKind::Warning => (ReportKind::Warning, Color::Yellow),
            DiagnosticKind::Info => (ReportKind::Advice, Color::Cyan),
            DiagnosticKind::Note => (ReportKind::Advice, Color::Blue),
        };

        let mut report = Report::build(report_kind, name.clone(), main_span.start)
            .with_config(Config::default().with_color(options.color));

        report = match &self.code {
            Some(code) => report.with_message(format!("[{}] {}", code, self.title)),
            None => report.with_message(&self.title),
        };

        let main_message = self
            .problem
            .as_ref()
            .map_or(self.title.as_str(), MessageContent::as_str);
        report = report.with_label(
            Label::new((name.clone(), main_span))
                .with_message(main_message)
                .with_color(main_color),
        );

        for detail in &self.details {
            let Some(detail_location) = detail.location else {
                continue;
            };
            let color = match detail.kind {
                DetailKind::Error => Color::Red,
                DetailKind::Info => Color::Cyan,
                DetailKind::Note => Color::Blue,
            };
            report = report.with_label(
                Label::new((name.clone(), char_span(source.text, detail_location)))
                    .with_message(detail.content.as_str())
                    .with_color(color),
            );
        }

        let mut output = Vec::new();
        report
            .finish()
            .write((name, Source::from(source.text)), &mut output)
            .ok()?;

        String::from_utf8(output).ok()
    }
}

/// One-character span at `location`, in characters, clamped to the text.
fn char_span(text: &str, location: Location) -> Range<usize> {
    let total = text.chars().count().max(1);
    let start = byte_to_char_offset(text, location.offset).min(total - 1);
    start..start + 1
}
