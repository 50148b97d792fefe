//! Per-route prerequisite resolution: discovery first, static tables as fallback.
//!
//! The two paths are exclusive for a given route. Discovery results are used
//! whenever they are non-empty; otherwise (no discovery configured, a discovery
//! error, or nothing found) the static tables answer alone.

use crate::config::UatConfig;
use crate::discovery::{RuleDiscovery, dedupe_preserving_order};
use crate::error::DiscoveryError;
use crate::pattern::middleware_prerequisites;
use crate::route::{MiddlewareRef, Route};
use crate::rule::{PolicyRequirement, Prerequisite};
use serde::Serialize;

/// Which path produced a route's prerequisites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrerequisiteSource {
    Discovery,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub source: PrerequisiteSource,
    pub prerequisites: Vec<Prerequisite>,
}

pub struct PrerequisiteResolver<'a> {
    config: &'a UatConfig,
    discovery: Option<Box<dyn RuleDiscovery + 'a>>,
}

impl<'a> PrerequisiteResolver<'a> {
    pub fn new(config: &'a UatConfig, discovery: Option<Box<dyn RuleDiscovery + 'a>>) -> Self {
        Self { config, discovery }
    }

    /// Static tables only.
    pub fn static_only(config: &'a UatConfig) -> Self {
        Self::new(config, None)
    }

    pub fn has_discovery(&self) -> bool {
        self.discovery.is_some()
    }

    pub fn resolve_prerequisites(
        &self,
        route: &Route,
        middleware: &[MiddlewareRef],
    ) -> Vec<Prerequisite> {
        self.resolve(route, middleware).prerequisites
    }

    pub fn resolve(&self, route: &Route, middleware: &[MiddlewareRef]) -> Resolution {
        if let Some(discovery) = &self.discovery {
            match discover(discovery.as_ref(), route, middleware) {
                Ok(found) if !found.is_empty() => {
                    return Resolution {
                        source: PrerequisiteSource::Discovery,
                        prerequisites: found,
                    };
                }
                Ok(_) => {
                    tracing::debug!(uri = %route.uri, "discovery found nothing; using static rules");
                }
                Err(err) => {
                    tracing::warn!(
                        uri = %route.uri,
                        error = %err,
                        "dynamic rule discovery failed; using static rules"
                    );
                }
            }
        }

        let mut prerequisites = middleware_prerequisites(middleware, &self.config.rules);
        prerequisites.extend(policy_prerequisites(route, self.config));
        Resolution {
            source: PrerequisiteSource::Fallback,
            prerequisites,
        }
    }
}

fn discover(
    discovery: &dyn RuleDiscovery,
    route: &Route,
    middleware: &[MiddlewareRef],
) -> Result<Vec<Prerequisite>, DiscoveryError> {
    let mut found = discovery.discover_middleware_rules(middleware)?;
    found.extend(discovery.discover_policy_rules(route)?);
    Ok(found)
}

/// Static policy-table prerequisite for a `Controller@method` route.
///
/// Methods are looked up by mapped policy method first, then by the raw
/// controller method name. Allowed roles follow the permissions as
/// `role:<name>` tokens, the same shape discovery reports for role checks.
pub fn policy_prerequisites(route: &Route, config: &UatConfig) -> Vec<Prerequisite> {
    let Some(action) = route.controller_action() else {
        return Vec::new();
    };
    let Some(mapping) = config.policy_mappings.get(action.controller_name()) else {
        return Vec::new();
    };

    let policy_method = config.policy_method_for(action.method);
    let Some(info) = mapping
        .methods
        .get(policy_method)
        .or_else(|| mapping.methods.get(action.method))
    else {
        return Vec::new();
    };

    vec![Prerequisite::policy_authorization(
        info.description.clone(),
        info.action.clone(),
        info.validation.clone(),
        PolicyRequirement {
            policy: mapping.policy.clone(),
            method: policy_method.to_string(),
            permissions_required: dedupe_preserving_order(
                info.permissions
                    .iter()
                    .cloned()
                    .chain(info.roles.iter().map(|role| format!("role:{role}")))
                    .collect(),
            ),
        },
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{ReflectiveDiscovery, RegistryIntrospector};

    struct FailingDiscovery;

    impl RuleDiscovery for FailingDiscovery {
        fn discover_middleware_rules(
            &self,
            _middleware: &[MiddlewareRef],
        ) -> Result<Vec<Prerequisite>, DiscoveryError> {
            Err(DiscoveryError::Unavailable("kernel offline".to_string()))
        }

        fn discover_policy_rules(&self, _route: &Route) -> Result<Vec<Prerequisite>, DiscoveryError> {
            Err(DiscoveryError::Unavailable("gate offline".to_string()))
        }
    }

    struct EmptyDiscovery;

    impl RuleDiscovery for EmptyDiscovery {
        fn discover_middleware_rules(
            &self,
            _middleware: &[MiddlewareRef],
        ) -> Result<Vec<Prerequisite>, DiscoveryError> {
            Ok(Vec::new())
        }

        fn discover_policy_rules(&self, _route: &Route) -> Result<Vec<Prerequisite>, DiscoveryError> {
            Ok(Vec::new())
        }
    }

    fn user_index() -> Route {
        Route::new("users", &["GET"])
            .with_name("users.index")
            .with_action("App\\Http\\Controllers\\UserController@index")
            .with_middleware(["web", "auth", "role:admin"])
    }

    #[test]
    fn fallback_combines_pattern_rules_and_policy_table() {
        let config = UatConfig::default();
        let resolver = PrerequisiteResolver::static_only(&config);
        let route = user_index();

        let resolution = resolver.resolve(&route, &route.middleware);
        assert_eq!(resolution.source, PrerequisiteSource::Fallback);
        let types: Vec<&str> = resolution
            .prerequisites
            .iter()
            .map(Prerequisite::rule_type)
            .collect();
        assert_eq!(
            types,
            vec!["authentication", "role_authorization", "policy_authorization"]
        );
        let policy = resolution.prerequisites[2].policy.as_ref().expect("policy");
        assert_eq!(policy.policy, "UserPolicy");
        assert_eq!(policy.method, "viewAny");
        assert_eq!(
            policy.permissions_required,
            vec!["view-user-security", "role:superadmin", "role:administrator"]
        );
    }

    #[test]
    fn static_policy_roles_become_role_tokens() {
        let mut config = UatConfig::default();
        let set_view_any = |config: &mut UatConfig, permissions: &[&str], roles: &[&str]| {
            let info = config
                .policy_mappings
                .get_mut("UserController")
                .and_then(|mapping| mapping.methods.get_mut("viewAny"))
                .expect("default viewAny entry");
            info.permissions = permissions.iter().map(|p| p.to_string()).collect();
            info.roles = roles.iter().map(|r| r.to_string()).collect();
        };

        set_view_any(&mut config, &["list-users"], &["auditor", "auditor"]);
        let found = policy_prerequisites(&user_index(), &config);
        let policy = found[0].policy.as_ref().expect("policy");
        assert_eq!(policy.permissions_required, vec!["list-users", "role:auditor"]);

        set_view_any(&mut config, &[], &[]);
        let found = policy_prerequisites(&user_index(), &config);
        assert!(found[0].policy.as_ref().expect("policy").permissions_required.is_empty());
    }

    #[test]
    fn failing_discovery_matches_static_only_result() {
        let config = UatConfig::default();
        let route = user_index();

        let failing = PrerequisiteResolver::new(&config, Some(Box::new(FailingDiscovery)));
        let static_only = PrerequisiteResolver::static_only(&config);
        assert_eq!(
            failing.resolve_prerequisites(&route, &route.middleware),
            static_only.resolve_prerequisites(&route, &route.middleware)
        );
    }

    #[test]
    fn empty_discovery_falls_back() {
        let config = UatConfig::default();
        let route = user_index();
        let resolver = PrerequisiteResolver::new(&config, Some(Box::new(EmptyDiscovery)));
        assert_eq!(
            resolver.resolve(&route, &route.middleware).source,
            PrerequisiteSource::Fallback
        );
    }

    #[test]
    fn discovery_results_are_never_merged_with_fallback() {
        let config = UatConfig::default();
        let route = user_index();
        let discovery = ReflectiveDiscovery::new(RegistryIntrospector::default(), &config);
        let resolver = PrerequisiteResolver::new(&config, Some(Box::new(discovery)));

        let resolution = resolver.resolve(&route, &route.middleware);
        assert_eq!(resolution.source, PrerequisiteSource::Discovery);
        assert!(
            resolution
                .prerequisites
                .iter()
                .all(|p| p.rule_type() != "policy_authorization"),
            "static policy table must not leak into discovery results"
        );
        assert_eq!(resolution.prerequisites[0].description(), "User must be authenticated");
    }

    #[test]
    fn malformed_action_skips_policy_table() {
        let config = UatConfig::default();
        let route = Route::new("users", &["GET"]).with_action("UserController");
        assert!(policy_prerequisites(&route, &config).is_empty());
    }
}
