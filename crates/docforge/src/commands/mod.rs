//! Command implementations for the docforge CLI
//!
//! Each command gathers its template text and hands it to [`apply`], which
//! owns the read-merge-write cycle for the target file.

pub mod merge;
pub mod render;
pub mod sync;

use anyhow::{Context, Result};
use clap::ValueEnum;
use docforge_merge::{DocumentRole, MergeOptions, merge_texts, mkdocs_table};
use docforge_report::{
    DiagnosticMessage, ReportOptions, SourceText, merge_error_diagnostic,
    merge_warning_diagnostic, parse_warning_diagnostic, render_json, render_summary,
};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// How the change summary is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Options shared by the commands that write the target.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Report what would change without writing.
    pub dry_run: bool,
    pub format: OutputFormat,
}

/// Name used for the template in diagnostics.
const TEMPLATE_NAME: &str = "<template>";

/// Merge `template` into the file at `target` and report the result.
///
/// The summary goes to `out`; diagnostics go to `err`. Returns `Ok(false)`
/// after reporting a merge error, in which case the target is untouched.
pub fn apply(
    template: &str,
    target: &Path,
    options: &ApplyOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<bool> {
    let target_name = target.display().to_string();
    let existing = read_existing(target)?;
    debug!(target = %target_name, exists = existing.is_some(), "merging template");

    let outcome = match merge_texts(
        template,
        existing.as_deref(),
        mkdocs_table(),
        &MergeOptions::default(),
    ) {
        Ok(outcome) => outcome,
        Err(error) => {
            let source = match error.role() {
                DocumentRole::Template => SourceText::new(TEMPLATE_NAME, template),
                DocumentRole::Existing => {
                    SourceText::new(&target_name, existing.as_deref().unwrap_or_default())
                }
            };
            emit(&merge_error_diagnostic(&error), &source, options.format, err)?;
            return Ok(false);
        }
    };

    let existing_source = SourceText::new(&target_name, existing.as_deref().unwrap_or_default());
    for (role, warning) in &outcome.warnings {
        let source = match role {
            DocumentRole::Template => SourceText::new(TEMPLATE_NAME, template),
            DocumentRole::Existing => existing_source,
        };
        emit(&parse_warning_diagnostic(*role, warning), &source, options.format, err)?;
    }
    for (record, warning) in outcome.changes.warnings() {
        let diagnostic = merge_warning_diagnostic(record, warning);
        emit(&diagnostic, &existing_source, options.format, err)?;
    }

    let unchanged = existing.as_deref() == Some(outcome.text.as_str());
    if !options.dry_run && !unchanged {
        std::fs::write(target, &outcome.text)
            .with_context(|| format!("Failed to write {target_name}"))?;
        info!(target = %target_name, changes = outcome.changes.len(), "wrote configuration");
    }

    match options.format {
        OutputFormat::Json => {
            writeln!(out, "{}", render_json(&outcome.changes, &target_name)?)?;
        }
        OutputFormat::Text if existing.is_none() => {
            let verb = if options.dry_run { "Would create" } else { "Created" };
            writeln!(out, "{verb} {target_name}")?;
        }
        OutputFormat::Text => {
            let summary =
                render_summary(&outcome.changes, &target_name, &ReportOptions::default());
            write!(out, "{summary}")?;
        }
    }

    Ok(true)
}

/// Write a diagnostic: a source snippet for text output, one JSON object
/// per line otherwise.
fn emit(
    diagnostic: &DiagnosticMessage,
    source: &SourceText<'_>,
    format: OutputFormat,
    err: &mut dyn Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => write!(err, "{}", diagnostic.to_text(Some(source))),
        OutputFormat::Json => writeln!(err, "{}", diagnostic.to_json()),
    }
}

/// The target's text, or `None` when it does not exist yet.
fn read_existing(target: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(target) {
        Ok(text) => Ok(Some(text)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => {
            Err(error).with_context(|| format!("Failed to read {}", target.display()))
        }
    }
}
