//! Rules and prerequisites.
//!
//! A [`Rule`] is a configured template (four strings, `{placeholder}` allowed
//! in pattern rules). A [`Prerequisite`] is what a route actually requires
//! after resolution, optionally annotated with policy or handler details.

use serde::{Deserialize, Serialize};

/// Token substituted with the wildcard suffix of a pattern match.
pub const PLACEHOLDER_TOKEN: &str = "{placeholder}";

/// Prerequisite `type` values produced by this crate.
pub mod rule_type {
    pub const AUTHENTICATION: &str = "authentication";
    pub const UNAUTHENTICATED: &str = "unauthenticated";
    pub const EMAIL_VERIFICATION: &str = "email_verification";
    pub const GATE_AUTHORIZATION: &str = "gate_authorization";
    pub const ROLE_AUTHORIZATION: &str = "role_authorization";
    pub const PERMISSION_AUTHORIZATION: &str = "permission_authorization";
    pub const RATE_LIMITING: &str = "rate_limiting";
    pub const POLICY_AUTHORIZATION: &str = "policy_authorization";
    pub const CLOSURE_MIDDLEWARE: &str = "closure_middleware";
    pub const OBJECT_MIDDLEWARE: &str = "object_middleware";
    pub const CUSTOM_MIDDLEWARE: &str = "custom_middleware";
    pub const UNKNOWN_BUILTIN: &str = "unknown_builtin";
    pub const UNKNOWN_MIDDLEWARE: &str = "unknown_middleware";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "type")]
    pub rule_type: String,
    pub description: String,
    pub action: String,
    pub validation: String,
}

impl Rule {
    pub fn new(
        rule_type: impl Into<String>,
        description: impl Into<String>,
        action: impl Into<String>,
        validation: impl Into<String>,
    ) -> Self {
        Self {
            rule_type: rule_type.into(),
            description: description.into(),
            action: action.into(),
            validation: validation.into(),
        }
    }

    /// Replace every `{placeholder}` in every field with `value`.
    pub fn substitute(&self, value: &str) -> Self {
        let fill = |field: &str| field.replace(PLACEHOLDER_TOKEN, value);
        Self {
            rule_type: fill(&self.rule_type),
            description: fill(&self.description),
            action: fill(&self.action),
            validation: fill(&self.validation),
        }
    }
}

/// Policy details attached to `policy_authorization` prerequisites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRequirement {
    pub policy: String,
    pub method: String,
    #[serde(default)]
    pub permissions_required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisite {
    #[serde(flatten)]
    pub rule: Rule,
    #[serde(flatten)]
    pub policy: Option<PolicyRequirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middleware_class: Option<String>,
}

impl Prerequisite {
    pub fn rule_type(&self) -> &str {
        &self.rule.rule_type
    }

    pub fn description(&self) -> &str {
        &self.rule.description
    }

    pub fn is_policy(&self) -> bool {
        self.rule.rule_type == rule_type::POLICY_AUTHORIZATION && self.policy.is_some()
    }

    pub fn with_middleware_class(mut self, class: impl Into<String>) -> Self {
        self.middleware_class = Some(class.into());
        self
    }

    pub fn policy_authorization(
        description: impl Into<String>,
        action: impl Into<String>,
        validation: impl Into<String>,
        requirement: PolicyRequirement,
    ) -> Self {
        Self {
            rule: Rule::new(
                rule_type::POLICY_AUTHORIZATION,
                description,
                action,
                validation,
            ),
            policy: Some(requirement),
            middleware_class: None,
        }
    }
}

impl From<Rule> for Prerequisite {
    fn from(rule: Rule) -> Self {
        Self {
            rule,
            policy: None,
            middleware_class: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_replaces_every_occurrence_in_every_field() {
        let rule = Rule::new(
            "role_authorization",
            "User must have '{placeholder}' role",
            "Login as {placeholder} ({placeholder})",
            "Verify {placeholder}",
        );
        let filled = rule.substitute("editor");
        assert_eq!(filled.description, "User must have 'editor' role");
        assert_eq!(filled.action, "Login as editor (editor)");
        assert_eq!(filled.validation, "Verify editor");
        assert_eq!(filled.rule_type, "role_authorization");
    }

    #[test]
    fn policy_prerequisite_serializes_flat() {
        let prereq = Prerequisite::policy_authorization(
            "Must pass view policy check",
            "Login",
            "Verify",
            PolicyRequirement {
                policy: "PostPolicy".to_string(),
                method: "view".to_string(),
                permissions_required: vec!["view-posts".to_string()],
            },
        );
        let value = serde_json::to_value(&prereq).expect("serialize prerequisite");
        assert_eq!(value["type"], "policy_authorization");
        assert_eq!(value["policy"], "PostPolicy");
        assert_eq!(value["permissions_required"][0], "view-posts");
        assert!(value.get("middleware_class").is_none());
        assert!(prereq.is_policy());
    }

    #[test]
    fn prerequisite_round_trips_policy_annotation() {
        let raw = r#"{
            "type": "policy_authorization",
            "description": "d",
            "action": "a",
            "validation": "v",
            "policy": "UserPolicy",
            "method": "viewAny"
        }"#;
        let prereq: Prerequisite = serde_json::from_str(raw).expect("parse prerequisite");
        let policy = prereq.policy.expect("policy annotation");
        assert_eq!(policy.method, "viewAny");
        assert!(policy.permissions_required.is_empty());
    }
}
