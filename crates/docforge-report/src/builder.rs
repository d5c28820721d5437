//! Builder API for diagnostic messages.

use crate::diagnostic::{
    DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, MessageContent,
};
use docforge_yaml::Location;

/// Builds a [`DiagnosticMessage`] one part at a time.
///
/// # Example
///
/// ```
/// use docforge_report::DiagnosticMessageBuilder;
///
/// let msg = DiagnosticMessageBuilder::error("Nesting Too Deep")
///     .with_code("D-2-1")
///     .problem("Nesting exceeds the maximum depth of 50")
///     .add_detail("The existing document nests 80 levels deep")
///     .add_hint("Flatten the structure?")
///     .build();
/// assert_eq!(msg.details.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::new(kind, title),
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

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    /// The problem statement: what went wrong.
    pub fn problem(mut self, problem: impl Into<MessageContent>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    pub fn add_detail(self, content: impl Into<MessageContent>) -> Self {
        self.push_detail(DetailKind::Error, content.into(), None)
    }

    pub fn add_info(self, content: impl Into<MessageContent>) -> Self {
        self.push_detail(DetailKind::Info, content.into(), None)
    }

    pub fn add_note(self, content: impl Into<MessageContent>) -> Self {
        self.push_detail(DetailKind::Note, content.into(), None)
    }

    /// An error detail that labels a second place in the source.
    pub fn add_detail_at(self, content: impl Into<MessageContent>, location: Location) -> Self {
        self.push_detail(DetailKind::Error, content.into(), Some(location))
    }

    pub fn add_info_at(self, content: impl Into<MessageContent>, location: Location) -> Self {
        self.push_detail(DetailKind::Info, content.into(), Some(location))
    }

    /// A hint for fixing the problem; phrase it as a question.
    pub fn add_hint(mut self, hint: impl Into<MessageContent>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.message.location = Some(location);
        self
    }

    /// Like [`with_location`](Self::with_location), for optional locations.
    pub fn with_location_opt(mut self, location: Option<Location>) -> Self {
        if location.is_some() {
            self.message.location = location;
        }
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }

    fn push_detail(
        mut self,
        kind: DetailKind,
        content: MessageContent,
        location: Option<Location>,
    ) -> Self {
        self.message.details.push(DetailItem {
            kind,
            content,
            location,
        });
        self
    }
}
