//! Validation issues and relevance filtering.
//!
//! Issues are surfaced by the backend (or local validation) on every
//! round trip and are never persisted beyond the current page lifecycle.
//! An issue is scoped by exactly one of a field path or a business-rule
//! name; the tagged variants make that invariant structural.

use serde::{Deserialize, Serialize};

use crate::fieldpath::{is_field_relevant, is_rule_relevant};
use crate::graph::Page;

/// A single validation problem reported against a field or a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Issue {
    Field {
        field: String,
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        namespace: String,
    },
    Rule {
        rule: String,
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        namespace: String,
    },
}

impl Issue {
    pub fn field(path: &str, kind: &str) -> Self {
        Issue::Field {
            field: path.to_string(),
            kind: kind.to_string(),
            message: String::new(),
            namespace: String::new(),
        }
    }

    pub fn rule(name: &str, kind: &str) -> Self {
        Issue::Rule {
            rule: name.to_string(),
            kind: kind.to_string(),
            message: String::new(),
            namespace: String::new(),
        }
    }

    pub fn field_path(&self) -> Option<&str> {
        match self {
            Issue::Field { field, .. } => Some(field),
            Issue::Rule { .. } => None,
        }
    }

    pub fn rule_name(&self) -> Option<&str> {
        match self {
            Issue::Field { .. } => None,
            Issue::Rule { rule, .. } => Some(rule),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Issue::Field { kind, .. } | Issue::Rule { kind, .. } => kind,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Issue::Field { message, .. } | Issue::Rule { message, .. } => message,
        }
    }
}

// ──────────────────────────────────────────────
// Relevance filtering
// ──────────────────────────────────────────────

/// Rule names that report a cross-field leave-period conflict. When one of
/// these is present, the per-field issues on the conflicting period types
/// are noise; the single rule-level issue carries the real problem.
pub const CONFLICTING_LEAVE_RULES: &[&str] = &["disallow_hybrid_intermittent_leave"];

/// Field-path prefixes subsumed by a conflicting-leave rule issue.
const LEAVE_PERIOD_FIELD_PREFIXES: &[&str] = &[
    "leave_details.continuous_leave_periods",
    "leave_details.intermittent_leave_periods",
    "leave_details.reduced_schedule_leave_periods",
];

/// Select the issues relevant to a set of pages.
///
/// Errors are operation-blocking and always included. Warnings are kept
/// only when they reference a field or rule declared by one of `pages`;
/// with no page context (`None`) every warning is considered relevant.
/// When a conflicting-leave rule issue is present, field-level issues on
/// the leave-period-type fields it subsumes are dropped.
pub fn filter_relevant_issues(
    errors: &[Issue],
    warnings: &[Issue],
    pages: Option<&[&Page]>,
) -> Vec<Issue> {
    let mut issues: Vec<Issue> = errors.to_vec();

    match pages {
        None => issues.extend_from_slice(warnings),
        Some(pages) => {
            let mut fields: Vec<String> = Vec::new();
            let mut rules: Vec<String> = Vec::new();
            for page in pages {
                fields.extend(page.meta.fields.iter().cloned());
                rules.extend(page.meta.applicable_rules.iter().cloned());
            }
            issues.extend(
                warnings
                    .iter()
                    .filter(|issue| match issue {
                        Issue::Field { field, .. } => is_field_relevant(field, &fields),
                        Issue::Rule { rule, .. } => is_rule_relevant(rule, &rules),
                    })
                    .cloned(),
            );
        }
    }

    let has_conflict_rule = issues.iter().any(|issue| {
        issue
            .rule_name()
            .is_some_and(|rule| CONFLICTING_LEAVE_RULES.contains(&rule))
    });
    if has_conflict_rule {
        issues.retain(|issue| match issue.field_path() {
            Some(path) => !is_leave_period_field(path),
            None => true,
        });
    }

    issues
}

fn is_leave_period_field(path: &str) -> bool {
    LEAVE_PERIOD_FIELD_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
    })
}
