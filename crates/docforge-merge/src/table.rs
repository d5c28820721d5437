//! The managed-path table for `mkdocs.yml`.
//!
//! Bump [`MKDOCS_TABLE_VERSION`] whenever the rules change together with the
//! template the `docforge` binary renders.

use crate::ownership::{Condition, ManagedRule, OwnershipTable};
use crate::types::MergePolicy;
use once_cell::sync::Lazy;

pub const MKDOCS_TABLE_VERSION: u32 = 1;

const MKDOCS_RULES: &[(&str, MergePolicy, Condition)] = &[
    ("site_name", MergePolicy::Replace, Condition::Always),
    ("site_url", MergePolicy::Replace, Condition::TemplateNonEmpty),
    ("repo_url", MergePolicy::Replace, Condition::TemplateNonEmpty),
    ("repo_name", MergePolicy::Replace, Condition::TemplateNonEmpty),
    ("edit_uri", MergePolicy::Replace, Condition::TemplateNonEmpty),
    ("theme.name", MergePolicy::Replace, Condition::Always),
    ("theme.palette", MergePolicy::Replace, Condition::Always),
    ("theme.features", MergePolicy::Replace, Condition::Always),
    ("plugins", MergePolicy::ListMerge, Condition::Always),
    ("plugins[gen-files].scripts", MergePolicy::Replace, Condition::Always),
    (
        "plugins[mkdocstrings].handlers.python.paths",
        MergePolicy::Replace,
        Condition::Always,
    ),
    ("plugins[mkdoxy].projects", MergePolicy::Replace, Condition::Always),
    ("markdown_extensions", MergePolicy::ListMerge, Condition::Always),
];

/// The table, parsed once.
///
/// # Panics
///
/// Panics if a built-in pattern fails to parse, which is a bug in the rule
/// list above.
static MKDOCS_TABLE: Lazy<OwnershipTable> = Lazy::new(|| {
    let rules = MKDOCS_RULES
        .iter()
        .map(|&(pattern, policy, condition)| {
            ManagedRule::new(pattern, policy)
                .expect("Invalid built-in managed path - this is a bug in docforge")
                .with_condition(condition)
        })
        .collect();
    OwnershipTable::new(MKDOCS_TABLE_VERSION, rules)
});

/// The ownership table for `mkdocs.yml`.
pub fn mkdocs_table() -> &'static OwnershipTable {
    &MKDOCS_TABLE
}

#[cfg(test)]
mod tests {
    use super::*;
    use docforge_yaml::{KeyPath, Node};

    fn resolve(text: &str, template: Option<&Node>) -> MergePolicy {
        mkdocs_table().resolve(&KeyPath::parse(text).unwrap(), template)
    }

    #[test]
    fn test_table_parses() {
        assert_eq!(mkdocs_table().version, MKDOCS_TABLE_VERSION);
        assert_eq!(mkdocs_table().rules().len(), MKDOCS_RULES.len());
    }

    #[test]
    fn test_mkdocs_policies() {
        let url = Node::string("https://example.com");
        assert_eq!(resolve("site_name", None), MergePolicy::Replace);
        assert_eq!(resolve("repo_url", Some(&url)), MergePolicy::Replace);
        assert_eq!(resolve("repo_url", Some(&Node::null())), MergePolicy::Preserve);
        assert_eq!(resolve("theme", None), MergePolicy::Preserve);
        assert_eq!(resolve("theme.palette", None), MergePolicy::Replace);
        assert_eq!(resolve("theme.logo", None), MergePolicy::Preserve);
        assert_eq!(resolve("plugins", None), MergePolicy::ListMerge);
        assert_eq!(
            resolve("plugins[mkdocstrings].handlers.python.paths", None),
            MergePolicy::Replace
        );
        assert_eq!(
            resolve("plugins[mkdocstrings].handlers.python.options", None),
            MergePolicy::Preserve
        );
        assert_eq!(resolve("markdown_extensions", None), MergePolicy::ListMerge);
        assert_eq!(resolve("nav", None), MergePolicy::Preserve);
        assert_eq!(resolve("extra", None), MergePolicy::Preserve);
    }

    #[test]
    fn test_descendants_reach_nested_rules() {
        let table = mkdocs_table();
        for text in [
            "theme",
            "plugins[mkdocstrings]",
            "plugins[mkdocstrings].handlers",
            "plugins[gen-files]",
        ] {
            assert!(
                table.has_managed_descendants(&KeyPath::parse(text).unwrap()),
                "{text}"
            );
        }
        assert!(!table.has_managed_descendants(&KeyPath::parse("nav").unwrap()));
        assert!(!table.has_managed_descendants(&KeyPath::parse("plugins[search]").unwrap()));
    }
}
