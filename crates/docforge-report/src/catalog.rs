//! Error code catalog and lookup.
//!
//! Maps stable codes (like "D-1-1") to their metadata. Codes never change
//! once published, even when the wording of a message improves.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for an error code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name ("yaml" or "merge")
    pub subsystem: String,

    /// Short title for the error
    pub title: String,

    /// Default message
    pub message_template: String,

    /// URL to documentation (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,

    /// When this code was introduced (version)
    pub since_version: String,
}

/// Global error catalog, embedded at compile time.
///
/// # Panics
///
/// Panics on first access if the embedded JSON is invalid.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    let json_data = include_str!("../error_catalog.json");
    serde_json::from_str(json_data).expect("Invalid error catalog JSON - this is a bug in docforge")
});

/// Look up error code information.
///
/// # Example
///
/// ```
/// use docforge_report::catalog::get_error_info;
///
/// let info = get_error_info("D-1-1").unwrap();
/// assert_eq!(info.subsystem, "yaml");
/// ```
pub fn get_error_info(code: &str) -> Option<&ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

/// Documentation URL for an error code.
pub fn get_docs_url(code: &str) -> Option<&str> {
    ERROR_CATALOG
        .get(code)
        .and_then(|info| info.docs_url.as_deref())
}

/// Subsystem name for an error code.
pub fn get_subsystem(code: &str) -> Option<&str> {
    ERROR_CATALOG.get(code).map(|info| info.subsystem.as_str())
}

/// Catalog title for `code`, or `fallback` for unknown codes.
pub(crate) fn title_or<'a>(code: &str, fallback: &'a str) -> std::borrow::Cow<'a, str> {
    match get_error_info(code) {
        Some(info) => std::borrow::Cow::Owned(info.title.clone()),
        None => std::borrow::Cow::Borrowed(fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        assert!(!ERROR_CATALOG.is_empty());
    }

    #[test]
    fn test_every_code_is_documented() {
        for (code, info) in ERROR_CATALOG.iter() {
            assert!(code.starts_with("D-"), "{code}");
            let url = info.docs_url.as_deref().unwrap_or_default();
            assert!(url.ends_with(code.as_str()), "{code}: {url}");
            assert!(!info.title.is_empty());
        }
    }

    #[test]
    fn test_subsystems() {
        assert_eq!(get_subsystem("D-1-3"), Some("yaml"));
        assert_eq!(get_subsystem("D-2-2"), Some("merge"));
        assert_eq!(get_subsystem("D-9-9"), None);
    }

    #[test]
    fn test_docs_url_lookup() {
        assert!(get_docs_url("D-2-1").is_some_and(|url| url.contains("D-2-1")));
        assert!(get_docs_url("Q-0-1").is_none());
    }

    #[test]
    fn test_title_fallback() {
        assert_eq!(title_or("D-1-1", "x"), "YAML Syntax Error");
        assert_eq!(title_or("D-0-0", "Unknown"), "Unknown");
    }
}
