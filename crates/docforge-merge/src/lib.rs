//! Ownership-aware merging of a generated configuration into a hand-edited one.
//!
//! The tool regenerates `mkdocs.yml` from detected project features on every
//! run. This crate folds that fresh *template* into the *existing* file
//! without losing user customization, while the tool keeps control of the
//! fields it owns.
//!
//! # Architecture
//!
//! - [`OwnershipTable`]: explicit rules mapping key paths to a [`MergePolicy`];
//!   [`mkdocs_table`] is the built-in table for `mkdocs.yml`
//! - [`merge_documents`] / [`merge_texts`]: the depth-first merge engine
//! - [`ChangeLog`]: what the engine added, updated or preserved, in order
//!
//! # Example
//!
//! ```rust
//! use docforge_merge::{merge_texts, mkdocs_table, ChangeKind, MergeOptions};
//!
//! let template = "site_name: Demo\nplugins:\n  - search\n  - mkdocstrings\n";
//! let existing = "site_name: Old\nplugins:\n  - search\n  - my-plugin\n";
//!
//! let outcome = merge_texts(template, Some(existing), mkdocs_table(), &MergeOptions::default())?;
//! assert_eq!(
//!     outcome.text,
//!     "site_name: Demo\nplugins:\n  - search\n  - mkdocstrings\n  - my-plugin\n"
//! );
//! assert_eq!(outcome.changes.of_kind(ChangeKind::Updated).count(), 1);
//! # Ok::<(), docforge_merge::MergeError>(())
//! ```

mod list;
mod merge;
mod ownership;
mod table;
mod types;

pub use types::{
    ChangeKind,
    ChangeLog,
    ChangeRecord,
    DocumentRole,
    MergeError,
    MergeOptions,
    MergePolicy,
    MergeWarning,
};

pub use ownership::{
    Condition,
    ManagedPath,
    ManagedRule,
    ManagedSegment,
    OwnershipTable,
};

pub use table::{MKDOCS_TABLE_VERSION, mkdocs_table};

pub use merge::{MergeOutcome, merge_documents, merge_texts};
