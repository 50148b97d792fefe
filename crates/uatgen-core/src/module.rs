//! Modules: selected routes grouped under a name, each with its resolved
//! prerequisites.

use crate::classify::group_by_module;
use crate::resolve::{PrerequisiteResolver, PrerequisiteSource};
use crate::route::Route;
use crate::rule::Prerequisite;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRoute {
    pub route: Route,
    pub prerequisites: Vec<Prerequisite>,
    pub source: PrerequisiteSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    pub routes: Vec<ModuleRoute>,
}

impl Module {
    pub fn prefix(&self) -> String {
        module_prefix(&self.name)
    }
}

/// First three characters of the module name, uppercased.
pub fn module_prefix(name: &str) -> String {
    name.chars().take(3).collect::<String>().to_uppercase()
}

/// Group selected routes into modules and resolve each route's prerequisites.
pub fn build_modules(selected: &[&Route], resolver: &PrerequisiteResolver<'_>) -> Vec<Module> {
    group_by_module(selected)
        .into_iter()
        .map(|(name, routes)| Module {
            name,
            routes: routes
                .into_iter()
                .map(|route| {
                    let resolution = resolver.resolve(route, &route.middleware);
                    ModuleRoute {
                        route: route.clone(),
                        prerequisites: resolution.prerequisites,
                        source: resolution.source,
                    }
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UatConfig;

    #[test]
    fn prefix_counts_characters_not_bytes() {
        assert_eq!(module_prefix("Users"), "USE");
        assert_eq!(module_prefix("Ui"), "UI");
        assert_eq!(module_prefix("Über"), "ÜBE");
    }

    #[test]
    fn modules_carry_resolved_prerequisites() {
        let config = UatConfig::default();
        let resolver = PrerequisiteResolver::static_only(&config);
        let routes = vec![
            Route::new("users", &["GET"]).with_middleware(["web", "auth"]),
            Route::new("about", &["GET"]),
        ];
        let selected: Vec<&Route> = routes.iter().collect();

        let modules = build_modules(&selected, &resolver);
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "Users");
        assert_eq!(modules[0].routes[0].prerequisites.len(), 1);
        assert!(modules[1].routes[0].prerequisites.is_empty());
        assert_eq!(modules[1].routes[0].source, PrerequisiteSource::Fallback);
    }
}
