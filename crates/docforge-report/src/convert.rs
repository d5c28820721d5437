//! Diagnostics for codec and merge failures.
//!
//! Every diagnostic produced here carries a catalog code and, where the
//! failure points into one of the inputs, the location in that input. The
//! caller picks the source text to render against from the document role.

use crate::builder::DiagnosticMessageBuilder;
use crate::catalog::title_or;
use crate::diagnostic::DiagnosticMessage;
use docforge_merge::{ChangeRecord, DocumentRole, MergeError, MergeWarning};
use docforge_yaml::ParseWarning;

/// Catalog code of a codec error.
pub fn yaml_error_code(error: &docforge_yaml::Error) -> &'static str {
    match error {
        docforge_yaml::Error::Syntax { .. } | docforge_yaml::Error::InvalidPath { .. } => "D-1-1",
        docforge_yaml::Error::Unsupported { .. } => "D-1-2",
        docforge_yaml::Error::NestingTooDeep { .. } => "D-2-1",
    }
}

/// Diagnostic for a fatal merge error.
pub fn merge_error_diagnostic(error: &MergeError) -> DiagnosticMessage {
    match error {
        MergeError::Parse { role, source } => {
            let code = yaml_error_code(source);
            let mut builder = DiagnosticMessageBuilder::error(title_or(code, "YAML Error"))
                .with_code(code)
                .problem(capitalize(&source.reason()))
                .add_info(format!("In the {role} document"))
                .with_location_opt(source.location());
            if matches!(source, docforge_yaml::Error::Unsupported { .. }) {
                builder = builder.add_hint("Rewrite the construct in plain block or flow style?");
            }
            builder.build()
        }
        MergeError::DepthExceeded {
            max_depth,
            path,
            location,
            role,
        } => {
            let mut builder = DiagnosticMessageBuilder::error(title_or("D-2-1", "Nesting Too Deep"))
                .with_code("D-2-1")
                .problem(format!(
                    "The {role} document nests deeper than {max_depth} levels"
                ));
            if let Some(path) = path {
                builder = builder.add_detail(format!("`{path}` is past the limit"));
            }
            builder
                .add_hint("Is the file generated by another tool?")
                .with_location_opt(*location)
                .build()
        }
    }
}

/// Diagnostic for a duplicate key or other parse warning.
pub fn parse_warning_diagnostic(role: DocumentRole, warning: &ParseWarning) -> DiagnosticMessage {
    match warning {
        ParseWarning::DuplicateKey { .. } => {
            DiagnosticMessageBuilder::warning(title_or("D-1-3", "Duplicate Key"))
                .with_code("D-1-3")
                .problem(capitalize(&warning.message()))
                .add_info(format!("In the {role} document"))
                .with_location(warning.location())
                .build()
        }
    }
}

/// Diagnostic for a warning attached to a change record.
///
/// The location is the overwritten value in the existing document, when
/// the record has one.
pub fn merge_warning_diagnostic(record: &ChangeRecord, warning: &MergeWarning) -> DiagnosticMessage {
    let location = record.previous.as_ref().and_then(|previous| previous.location);
    match warning {
        MergeWarning::TypeMismatch { .. } => {
            DiagnosticMessageBuilder::warning(title_or(warning.code(), "Type Mismatch"))
                .with_code(warning.code())
                .problem(format!("`{}`: {warning}", record.path))
                .add_info("The template's value replaced the existing one")
                .with_location_opt(location)
                .build()
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
