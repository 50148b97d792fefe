//! Rule discovery by introspecting middleware handlers and policies.
//!
//! ```text
//! middleware entry ─┬─ opaque handler ─────────────> closure/object rule
//!                   ├─ group name (web, api) ──────> nothing
//!                   ├─ role:/permission:/throttle: > parameterized rule
//!                   ├─ can:<ability> ──────────────> gate rule
//!                   ├─ built-in base name ─────────> fixed template
//!                   └─ custom name ─ Introspector ─> custom / unknown rule
//!
//! Controller@method ─ policy by convention or registry ─ Introspector ─> policy rule
//! ```

pub mod introspect;
pub mod registry;
pub mod source_tree;

pub use introspect::{
    Introspector, PolicyAssociation, PolicyMethodArtifact, dedupe_preserving_order, doc_summary,
    scan_permission_checks,
};
pub use registry::RegistryIntrospector;
pub use source_tree::SourceTreeIntrospector;

use crate::config::UatConfig;
use crate::error::DiscoveryError;
use crate::naming::{kebab_case, singularize, snake_case};
use crate::pattern::classify_opaque;
use crate::route::{ControllerAction, MiddlewareRef, Route, class_basename};
use crate::rule::{PolicyRequirement, Prerequisite, Rule, rule_type};
use std::collections::BTreeMap;

/// Base names handled by fixed templates (bare or with `:<param>`).
const BUILT_IN_MIDDLEWARE: &[&str] = &[
    "auth",
    "guest",
    "verified",
    "throttle",
    "can",
    "signed",
    "password.confirm",
];

/// Primary prerequisite source, consulted before the static rule tables.
pub trait RuleDiscovery {
    fn discover_middleware_rules(
        &self,
        middleware: &[MiddlewareRef],
    ) -> Result<Vec<Prerequisite>, DiscoveryError>;

    fn discover_policy_rules(&self, route: &Route) -> Result<Vec<Prerequisite>, DiscoveryError>;
}

/// [`RuleDiscovery`] backed by an [`Introspector`].
#[derive(Debug, Clone)]
pub struct ReflectiveDiscovery<I> {
    introspector: I,
    methods_mapping: BTreeMap<String, String>,
    middleware_groups: Vec<String>,
}

impl<I: Introspector> ReflectiveDiscovery<I> {
    pub fn new(introspector: I, config: &UatConfig) -> Self {
        Self {
            introspector,
            methods_mapping: config.methods_mapping.clone(),
            middleware_groups: config.middleware_groups.clone(),
        }
    }

    pub fn introspector(&self) -> &I {
        &self.introspector
    }

    fn analyze_middleware(&self, entry: &MiddlewareRef) -> Option<Prerequisite> {
        let name = match entry {
            MiddlewareRef::Opaque(handler) => return Some(classify_opaque(handler)),
            MiddlewareRef::Named(name) => name.as_str(),
        };

        if self.middleware_groups.iter().any(|group| group == name) {
            return None;
        }
        if let Some(rule) = parameterized_rule(name) {
            return Some(rule.into());
        }
        if let Some(ability) = name.strip_prefix("can:") {
            return Some(gate_rule(ability).into());
        }
        if let Some(base) = built_in_base(name) {
            return Some(built_in_rule(base, name).into());
        }
        Some(self.analyze_custom_middleware(name))
    }

    fn analyze_custom_middleware(&self, name: &str) -> Prerequisite {
        let handler = match self.locate_handler(name) {
            Ok(Some(handler)) => handler,
            Ok(None) => return unknown_middleware(name),
            Err(err) => {
                tracing::warn!(middleware = %name, error = %err, "middleware lookup failed");
                return unknown_middleware(name);
            }
        };

        let description = match self.introspector.handler_description(&handler) {
            Ok(description) => description,
            Err(err) => {
                tracing::warn!(handler = %handler, error = %err, "middleware introspection failed");
                return unknown_middleware(name);
            }
        };

        Prerequisite::from(Rule::new(
            rule_type::CUSTOM_MIDDLEWARE,
            description.unwrap_or_else(|| format!("Custom middleware: {name}")),
            format!("Ensure requirements for {name} are met"),
            format!("Verify {name} middleware passes"),
        ))
        .with_middleware_class(handler)
    }

    /// Alias registry first, then naming-convention match on handler short names.
    fn locate_handler(&self, name: &str) -> Result<Option<String>, DiscoveryError> {
        let alias = name.split(':').next().unwrap_or(name);
        if let Some(handler) = self.introspector.middleware_alias(alias)? {
            return Ok(Some(handler));
        }

        let wanted = alias.to_lowercase();
        Ok(self
            .introspector
            .middleware_handlers()?
            .into_iter()
            .find(|handler| {
                let short = class_basename(handler);
                snake_case(short) == alias
                    || kebab_case(short) == alias
                    || short.to_lowercase() == wanted
            }))
    }

    fn policy_prerequisite(
        &self,
        action: &ControllerAction<'_>,
    ) -> Result<Option<Prerequisite>, DiscoveryError> {
        let Some(policy) = self.find_policy(action.controller_name())? else {
            return Ok(None);
        };

        let policy_method = self
            .methods_mapping
            .get(action.method)
            .map(String::as_str)
            .unwrap_or(action.method);

        let Some(artifact) = self.introspector.policy_method(&policy, policy_method)? else {
            return Ok(None);
        };

        Ok(Some(Prerequisite::policy_authorization(
            artifact
                .description
                .unwrap_or_else(|| format!("Must pass {policy_method} policy check")),
            format!("Login with user authorized for {policy_method} action"),
            format!("Verify {policy_method} policy check passes"),
            PolicyRequirement {
                policy: class_basename(&policy).to_string(),
                method: policy_method.to_string(),
                permissions_required: dedupe_preserving_order(artifact.permissions),
            },
        )))
    }

    /// `{Model}Policy`, `{Controller}Policy`, `{SingularModel}Policy`, then the
    /// first registered subject whose short name appears in the controller name.
    fn find_policy(&self, controller: &str) -> Result<Option<String>, DiscoveryError> {
        let model = controller.strip_suffix("Controller").unwrap_or(controller);
        let candidates = [
            format!("{model}Policy"),
            format!("{controller}Policy"),
            format!("{}Policy", singularize(model)),
        ];
        for candidate in candidates {
            if self.introspector.has_policy(&candidate)? {
                return Ok(Some(candidate));
            }
        }

        Ok(self
            .introspector
            .policy_associations()?
            .into_iter()
            .find(|association| {
                let subject = class_basename(&association.subject);
                !subject.is_empty() && controller.contains(subject)
            })
            .map(|association| association.policy))
    }
}

impl<I: Introspector> RuleDiscovery for ReflectiveDiscovery<I> {
    fn discover_middleware_rules(
        &self,
        middleware: &[MiddlewareRef],
    ) -> Result<Vec<Prerequisite>, DiscoveryError> {
        Ok(middleware
            .iter()
            .filter_map(|entry| self.analyze_middleware(entry))
            .collect())
    }

    fn discover_policy_rules(&self, route: &Route) -> Result<Vec<Prerequisite>, DiscoveryError> {
        let Some(action) = route.controller_action() else {
            return Ok(Vec::new());
        };
        match self.policy_prerequisite(&action) {
            Ok(found) => Ok(found.into_iter().collect()),
            Err(err) => {
                tracing::warn!(
                    action = %route.action,
                    error = %err,
                    "policy introspection failed; no policy prerequisite for route"
                );
                Ok(Vec::new())
            }
        }
    }
}

fn parameterized_rule(name: &str) -> Option<Rule> {
    let (base, param) = name.split_once(':')?;
    if param.is_empty() {
        return None;
    }
    match base {
        "role" => Some(Rule::new(
            rule_type::ROLE_AUTHORIZATION,
            format!("User must have '{param}' role"),
            format!("Login with user assigned to '{param}' role"),
            format!("Verify user has '{param}' role"),
        )),
        "permission" => Some(Rule::new(
            rule_type::PERMISSION_AUTHORIZATION,
            format!("User must have '{param}' permission"),
            format!("Login with user having '{param}' permission"),
            format!("Verify user has '{param}' permission"),
        )),
        "throttle" => Some(Rule::new(
            rule_type::RATE_LIMITING,
            "Request rate limiting applies",
            "Ensure requests do not exceed rate limits",
            "Verify rate limiting behavior",
        )),
        _ => None,
    }
}

fn gate_rule(ability: &str) -> Rule {
    Rule::new(
        rule_type::GATE_AUTHORIZATION,
        format!("User must pass '{ability}' gate check"),
        format!("Login with user authorized for '{ability}'"),
        format!("Verify gate check passes for '{ability}'"),
    )
}

fn built_in_base(name: &str) -> Option<&'static str> {
    BUILT_IN_MIDDLEWARE.iter().copied().find(|base| {
        name == *base
            || name
                .strip_prefix(base)
                .is_some_and(|rest| rest.starts_with(':'))
    })
}

fn built_in_rule(base: &str, name: &str) -> Rule {
    match base {
        "auth" => Rule::new(
            rule_type::AUTHENTICATION,
            "User must be authenticated",
            "Login with valid credentials",
            "Verify user session exists",
        ),
        "guest" => Rule::new(
            rule_type::UNAUTHENTICATED,
            "User must not be authenticated",
            "Ensure no active user session",
            "Verify no user session exists",
        ),
        "verified" => Rule::new(
            rule_type::EMAIL_VERIFICATION,
            "User email must be verified",
            "Ensure user email is verified",
            "Check email_verified_at is not null",
        ),
        _ => Rule::new(
            rule_type::UNKNOWN_BUILTIN,
            format!("Built-in middleware: {name}"),
            format!("Ensure requirements for {name} are met"),
            format!("Verify {name} middleware passes"),
        ),
    }
}

fn unknown_middleware(name: &str) -> Prerequisite {
    Rule::new(
        rule_type::UNKNOWN_MIDDLEWARE,
        format!("Unknown middleware: {name}"),
        format!("Investigate requirements for {name}"),
        format!("Manually verify {name} behavior"),
    )
    .into()
}
