//! The ownership classifier: which merge policy applies at a key path.
//!
//! Rules are written in the same dotted/bracket notation as [`KeyPath`],
//! with `[*]` matching any identity-keyed list entry:
//!
//! ```text
//! site_name                                    replace
//! plugins                                      list-merge
//! plugins[mkdocstrings].handlers.python.paths  replace
//! plugins[*].enabled                           preserve
//! ```
//!
//! A path only matches a rule of the same length; the match with the most
//! literal segments wins and ties go to the earlier rule. Paths without a
//! rule are [`MergePolicy::Preserve`].

use crate::types::MergePolicy;
use docforge_yaml::{DEFAULT_IDENTITY_FIELD, KeyPath, Node, PathSegment, PathToken, split_path};
use std::fmt;

/// One step of a [`ManagedPath`] pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ManagedSegment {
    Key(String),
    Index(usize),
    /// The list entry with this identity.
    Entry(String),
    /// Any identity-keyed list entry (`[*]`).
    AnyEntry,
}

impl ManagedSegment {
    fn matches(&self, segment: &PathSegment) -> bool {
        match (self, segment) {
            (ManagedSegment::Key(a), PathSegment::Key(b)) => a == b,
            (ManagedSegment::Index(a), PathSegment::Index(b)) => a == b,
            (ManagedSegment::Entry(a), PathSegment::Entry(b)) => a == b,
            (ManagedSegment::AnyEntry, PathSegment::Entry(_)) => true,
            _ => false,
        }
    }

    fn is_literal(&self) -> bool {
        !matches!(self, ManagedSegment::AnyEntry)
    }
}

/// A key-path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManagedPath(Vec<ManagedSegment>);

impl ManagedPath {
    /// Parse pattern text such as `plugins[*].handlers` or `nav[0]`.
    pub fn parse(text: &str) -> docforge_yaml::Result<Self> {
        let segments = split_path(text)?
            .into_iter()
            .map(|token| match token {
                PathToken::Key(key) => ManagedSegment::Key(key),
                PathToken::Bracket(inner) if inner == "*" => ManagedSegment::AnyEntry,
                PathToken::Bracket(inner) => match inner.parse::<usize>() {
                    Ok(index) => ManagedSegment::Index(index),
                    Err(_) => ManagedSegment::Entry(inner),
                },
            })
            .collect();
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[ManagedSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact-length match against a concrete path.
    pub fn matches(&self, path: &KeyPath) -> bool {
        self.0.len() == path.len() && self.matches_prefix_of(path.segments())
    }

    /// True when the pattern continues below `path`.
    pub fn extends(&self, path: &KeyPath) -> bool {
        self.0.len() > path.len() && self.matches_prefix_of(path.segments())
    }

    /// Number of literal segments; higher is more specific.
    pub fn specificity(&self) -> usize {
        self.0.iter().filter(|segment| segment.is_literal()).count()
    }

    fn matches_prefix_of(&self, segments: &[PathSegment]) -> bool {
        self.0
            .iter()
            .zip(segments)
            .all(|(pattern, segment)| pattern.matches(segment))
    }
}

impl fmt::Display for ManagedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                ManagedSegment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                ManagedSegment::Index(index) => write!(f, "[{index}]")?,
                ManagedSegment::Entry(id) => write!(f, "[{id}]")?,
                ManagedSegment::AnyEntry => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}

/// When a rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    Always,
    /// Only when the template supplies a value that is neither null nor
    /// empty; otherwise the path is preserved.
    TemplateNonEmpty,
}

/// A pattern and the policy it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedRule {
    pub path: ManagedPath,
    pub policy: MergePolicy,
    pub condition: Condition,
    /// Field identifying entries of a LIST_MERGE sequence.
    pub identity_field: String,
}

impl ManagedRule {
    pub fn new(pattern: &str, policy: MergePolicy) -> docforge_yaml::Result<Self> {
        Ok(Self {
            path: ManagedPath::parse(pattern)?,
            policy,
            condition: Condition::Always,
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
        })
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }
}

/// An explicit, versioned list of managed paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipTable {
    pub version: u32,
    rules: Vec<ManagedRule>,
}

impl OwnershipTable {
    pub fn new(version: u32, rules: Vec<ManagedRule>) -> Self {
        Self { version, rules }
    }

    pub fn rules(&self) -> &[ManagedRule] {
        &self.rules
    }

    /// The rule governing `path`, if any.
    pub fn rule_for(&self, path: &KeyPath) -> Option<&ManagedRule> {
        // `max_by_key` keeps the last maximum; reversing keeps table order
        // for ties.
        self.rules
            .iter()
            .filter(|rule| rule.path.matches(path))
            .rev()
            .max_by_key(|rule| rule.path.specificity())
    }

    /// The policy at `path` given the template's value there.
    pub fn resolve(&self, path: &KeyPath, template: Option<&Node>) -> MergePolicy {
        let Some(rule) = self.rule_for(path) else {
            return MergePolicy::Preserve;
        };
        match rule.condition {
            Condition::Always => rule.policy,
            Condition::TemplateNonEmpty => match template {
                Some(value) if !value.is_empty_value() => rule.policy,
                _ => MergePolicy::Preserve,
            },
        }
    }

    /// True when some rule addresses a path below `path`.
    pub fn has_managed_descendants(&self, path: &KeyPath) -> bool {
        self.rules.iter().any(|rule| rule.path.extends(path))
    }

    /// Identity field for entries of the sequence at `path`.
    pub fn identity_field(&self, path: &KeyPath) -> &str {
        self.rule_for(path)
            .map_or(DEFAULT_IDENTITY_FIELD, |rule| rule.identity_field.as_str())
    }
}
