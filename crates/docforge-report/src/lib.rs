//! Reporting for docforge: change summaries and diagnostic messages.
//!
//! - [`render_summary`] / [`render_json`]: a merge's [`ChangeLog`] as text
//!   or JSON, in the order the engine produced it
//! - [`DiagnosticMessage`]: structured errors and warnings with stable codes
//!   from an embedded catalog; located messages render a source snippet
//! - [`merge_error_diagnostic`] and friends: diagnostics for codec and merge
//!   failures
//!
//! # Example
//!
//! ```
//! use docforge_merge::{merge_texts, mkdocs_table, MergeOptions};
//! use docforge_report::{render_summary, ReportOptions};
//!
//! let outcome = merge_texts(
//!     "site_name: X\n",
//!     Some("site_name: Old\n"),
//!     mkdocs_table(),
//!     &MergeOptions::default(),
//! )?;
//! let text = render_summary(&outcome.changes, "mkdocs.yml", &ReportOptions::default());
//! assert_eq!(text, "Changes to mkdocs.yml\nUpdated:\n  ~ site_name: Old -> X\n");
//! # Ok::<(), docforge_merge::MergeError>(())
//! ```
//!
//! [`ChangeLog`]: docforge_merge::ChangeLog

pub mod builder;
pub mod catalog;
pub mod convert;
pub mod diagnostic;
pub mod json;
pub mod summary;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_docs_url, get_error_info, get_subsystem};
pub use convert::{
    merge_error_diagnostic, merge_warning_diagnostic, parse_warning_diagnostic, yaml_error_code,
};
pub use diagnostic::{
    DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, MessageContent, SourceText,
    TextRenderOptions,
};
pub use json::{ChangeReport, render_json};
pub use summary::{ReportOptions, preview, render_summary, truncate};
