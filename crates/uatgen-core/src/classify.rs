//! Route selection and module grouping.

use crate::naming::ucfirst;
use crate::route::Route;

/// Module name for routes with neither a dotted name nor a path segment.
pub const ROOT_MODULE: &str = "Dashboard";

/// Routes eligible for UAT documentation, in route-table order.
///
/// A route is kept when it answers GET, is not under an excluded prefix,
/// has no path parameters, and is a web (not API) route.
pub fn select_routes<'a>(all_routes: &'a [Route], excluded_prefixes: &[String]) -> Vec<&'a Route> {
    all_routes
        .iter()
        .filter(|route| {
            route.accepts_get()
                && !is_excluded(route, excluded_prefixes)
                && !route.uri.contains('{')
                && is_web_route(route)
        })
        .collect()
}

pub fn is_excluded(route: &Route, excluded_prefixes: &[String]) -> bool {
    excluded_prefixes
        .iter()
        .any(|prefix| route.uri.starts_with(prefix.as_str()))
}

pub fn is_web_route(route: &Route) -> bool {
    route.has_middleware("web") || (!route.uri.starts_with("api/") && !route.has_middleware("api"))
}

/// Module a route is documented under.
///
/// `billing.invoices.show` -> `Billing`; unnamed `reports` -> `Reports`;
/// unnamed `/` -> `Dashboard`.
pub fn module_for_route(route: &Route) -> String {
    if let Some(name) = route.name.as_deref()
        && let Some((first, _)) = name.split_once('.')
        && !first.is_empty()
    {
        return ucfirst(first);
    }

    route
        .uri
        .trim_matches('/')
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(ucfirst)
        .unwrap_or_else(|| ROOT_MODULE.to_string())
}

/// Group routes by module, keeping first-seen order of modules and routes.
pub fn group_by_module<'a>(routes: &[&'a Route]) -> Vec<(String, Vec<&'a Route>)> {
    let mut groups: Vec<(String, Vec<&'a Route>)> = Vec::new();
    for route in routes {
        let module = module_for_route(route);
        match groups.iter_mut().find(|(name, _)| *name == module) {
            Some((_, members)) => members.push(route),
            None => groups.push((module, vec![route])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn module_derivation_examples() {
        let named = Route::new("billing/invoices/1", &["GET"]).with_name("billing.invoices.show");
        assert_eq!(module_for_route(&named), "Billing");

        assert_eq!(module_for_route(&Route::new("/", &["GET"])), "Dashboard");
        assert_eq!(module_for_route(&Route::new("", &["GET"])), "Dashboard");
        assert_eq!(module_for_route(&Route::new("reports", &["GET"])), "Reports");

        let undotted = Route::new("settings/profile", &["GET"]).with_name("profile");
        assert_eq!(module_for_route(&undotted), "Settings");
    }

    #[test]
    fn selection_applies_every_filter() {
        let routes = vec![
            Route::new("users", &["GET", "HEAD"]).with_middleware(["web", "auth"]),
            Route::new("users", &["POST"]).with_middleware(["web"]),
            Route::new("telescope/requests", &["GET"]),
            Route::new("users/{user}", &["GET"]).with_middleware(["web"]),
            Route::new("api/users", &["GET"]).with_middleware(["api"]),
            Route::new("reports", &["GET"]).with_middleware(["api"]),
            Route::new("api/legacy", &["GET"]).with_middleware(["web"]),
            Route::new("about", &["GET"]),
        ];
        let kept: Vec<&str> = select_routes(&routes, &prefixes(&["telescope"]))
            .into_iter()
            .map(|r| r.uri.as_str())
            .collect();
        assert_eq!(kept, vec!["users", "api/legacy", "about"]);
    }

    #[test]
    fn excluded_prefix_match_is_literal_and_case_sensitive() {
        let routes = vec![
            Route::new("Admin/panel", &["GET"]),
            Route::new("admin/panel", &["GET"]),
            Route::new("administrators", &["GET"]),
        ];
        let kept: Vec<&str> = select_routes(&routes, &prefixes(&["admin"]))
            .into_iter()
            .map(|r| r.uri.as_str())
            .collect();
        assert_eq!(kept, vec!["Admin/panel"]);
    }

    #[test]
    fn grouping_preserves_first_seen_order() {
        let routes = vec![
            Route::new("users", &["GET"]).with_name("users.index"),
            Route::new("/", &["GET"]),
            Route::new("users/create", &["GET"]).with_name("users.create"),
            Route::new("reports", &["GET"]),
        ];
        let selected: Vec<&Route> = routes.iter().collect();
        let groups = group_by_module(&selected);
        let shape: Vec<(&str, Vec<&str>)> = groups
            .iter()
            .map(|(name, members)| {
                (
                    name.as_str(),
                    members.iter().map(|r| r.uri.as_str()).collect(),
                )
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                ("Users", vec!["users", "users/create"]),
                ("Dashboard", vec!["/"]),
                ("Reports", vec!["reports"]),
            ]
        );
    }
}
