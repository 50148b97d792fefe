//! Introspection contract and the text heuristics shared by implementations.
//!
//! An [`Introspector`] answers narrow questions about the application's
//! middleware handlers and policies. Source-text scanning is best-effort:
//! results are hints for test authors, not guarantees.

use crate::error::DiscoveryError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Subject type (model) registered against a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyAssociation {
    pub subject: String,
    pub policy: String,
}

/// What introspection knows about one policy method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMethodArtifact {
    #[serde(default)]
    pub description: Option<String>,
    /// Permission names and `role:<name>` tokens the method checks.
    #[serde(default)]
    pub permissions: Vec<String>,
}

pub trait Introspector {
    /// Fully-qualified handler registered under a middleware alias.
    fn middleware_alias(&self, alias: &str) -> Result<Option<String>, DiscoveryError>;

    /// Every known middleware handler, fully qualified.
    fn middleware_handlers(&self) -> Result<Vec<String>, DiscoveryError>;

    /// Leading doc-comment summary of a handler.
    fn handler_description(&self, handler: &str) -> Result<Option<String>, DiscoveryError>;

    /// Whether a policy with this short name exists.
    fn has_policy(&self, policy: &str) -> Result<bool, DiscoveryError>;

    /// Registered subject -> policy associations, in registration order.
    fn policy_associations(&self) -> Result<Vec<PolicyAssociation>, DiscoveryError>;

    /// The named method of a policy, if the policy defines it.
    fn policy_method(
        &self,
        policy: &str,
        method: &str,
    ) -> Result<Option<PolicyMethodArtifact>, DiscoveryError>;
}

fn doc_summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)/\*\*\s*\n\s*\*\s*(.+?)(?:\n|\*/)")
            .expect("doc-summary regex must compile")
    })
}

fn permission_call_res() -> &'static [(Regex, Option<&'static str>); 3] {
    static RES: OnceLock<[(Regex, Option<&'static str>); 3]> = OnceLock::new();
    RES.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("permission regex must compile");
        [
            (compile(r#"hasPermissionTo\(['"]([^'"]+)['"]\)"#), None),
            (compile(r#"can\(['"]([^'"]+)['"]\)"#), None),
            (compile(r#"hasRole\(['"]([^'"]+)['"]\)"#), Some("role:")),
        ]
    })
}

/// First line of the first `/** ... */` block in `text`, trimmed.
pub fn doc_summary(text: &str) -> Option<String> {
    let captured = doc_summary_re().captures(text)?.get(1)?.as_str().trim();
    let captured = captured.trim_end_matches("*/").trim();
    (!captured.is_empty() && !captured.starts_with('@')).then(|| captured.to_string())
}

/// Permission and role checks referenced in a method body.
///
/// Grouped by call kind (`hasPermissionTo`, `can`, `hasRole`), roles prefixed
/// with `role:`, duplicates dropped keeping the first occurrence.
pub fn scan_permission_checks(source: &str) -> Vec<String> {
    let mut found = Vec::new();
    for (re, prefix) in permission_call_res() {
        for caps in re.captures_iter(source) {
            if let Some(m) = caps.get(1) {
                found.push(format!("{}{}", prefix.unwrap_or(""), m.as_str()));
            }
        }
    }
    dedupe_preserving_order(found)
}

pub fn dedupe_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_summary_takes_first_line() {
        let source = "<?php\n\n/**\n * Ensure the user belongs to the current team.\n *\n * @param Request $request\n */\nclass EnsureTeam {}";
        assert_eq!(
            doc_summary(source).as_deref(),
            Some("Ensure the user belongs to the current team.")
        );
    }

    #[test]
    fn doc_summary_ignores_tag_only_blocks() {
        assert!(doc_summary("/**\n * @return bool\n */").is_none());
        assert!(doc_summary("// plain comment").is_none());
    }

    #[test]
    fn permission_scan_groups_kinds_and_dedupes() {
        let body = r#"
            if ($user->hasRole('auditor')) { return true; }
            return $user->can("view-posts")
                || $user->hasPermissionTo('manage-posts')
                || $user->can('view-posts');
        "#;
        assert_eq!(
            scan_permission_checks(body),
            vec!["manage-posts", "view-posts", "role:auditor"]
        );
    }
}
