//! Route-table snapshot: the read-only view of the application's router.
//!
//! The snapshot is a JSON array of route objects (or `{ "routes": [...] }`).
//! HTTP methods may be listed as an array or as the pipe-joined string that
//! framework route listings print (`"GET|HEAD"`).

use crate::error::SnapshotError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Label used for routes whose handler is not a controller method.
pub const ANONYMOUS_ACTION: &str = "Closure";

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(
        alias = "method",
        alias = "methods",
        deserialize_with = "deserialize_methods"
    )]
    pub http_methods: BTreeSet<String>,
    #[serde(default)]
    pub middleware: Vec<MiddlewareRef>,
}

/// A middleware stack entry: a registered name or an opaque handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MiddlewareRef {
    Named(String),
    Opaque(OpaqueHandler),
}

/// Middleware attached as a value rather than by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpaqueHandler {
    Closure,
    Object { class: String },
}

/// Controller and method parsed out of a `Controller@method` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerAction<'a> {
    pub controller: &'a str,
    pub method: &'a str,
}

fn default_action() -> String {
    ANONYMOUS_ACTION.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MethodsRepr {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_methods<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match MethodsRepr::deserialize(deserializer)? {
        MethodsRepr::Joined(joined) => joined.split('|').map(str::to_string).collect(),
        MethodsRepr::List(list) => list,
    };
    Ok(raw
        .iter()
        .map(|m| m.trim().to_ascii_uppercase())
        .filter(|m| !m.is_empty())
        .collect())
}

impl Route {
    pub fn new(uri: impl Into<String>, methods: &[&str]) -> Self {
        Self {
            uri: uri.into(),
            name: None,
            action: default_action(),
            http_methods: methods.iter().map(|m| m.to_ascii_uppercase()).collect(),
            middleware: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware
            .extend(names.into_iter().map(|n| MiddlewareRef::Named(n.into())));
        self
    }

    pub fn accepts_get(&self) -> bool {
        self.http_methods.contains("GET")
    }

    /// Names of the string middleware entries, in stack order.
    pub fn named_middleware(&self) -> impl Iterator<Item = &str> {
        self.middleware.iter().filter_map(MiddlewareRef::as_name)
    }

    pub fn has_middleware(&self, name: &str) -> bool {
        self.named_middleware().any(|m| m == name)
    }

    /// `Controller@method` split, when the action has exactly one separator.
    pub fn controller_action(&self) -> Option<ControllerAction<'_>> {
        ControllerAction::parse(&self.action)
    }

    /// Short action label: the class basename of the action identifier.
    pub fn action_label(&self) -> &str {
        class_basename(&self.action)
    }

    /// URI with a leading `/`, as a tester would type it.
    pub fn path(&self) -> String {
        if self.uri.starts_with('/') {
            self.uri.clone()
        } else {
            format!("/{}", self.uri)
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("_unnamed_")
    }

    pub fn middleware_display(&self) -> Vec<String> {
        self.middleware.iter().map(ToString::to_string).collect()
    }
}

impl MiddlewareRef {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            MiddlewareRef::Named(name) => Some(name),
            MiddlewareRef::Opaque(_) => None,
        }
    }
}

impl fmt::Display for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareRef::Named(name) => f.write_str(name),
            MiddlewareRef::Opaque(OpaqueHandler::Closure) => f.write_str("Closure"),
            MiddlewareRef::Opaque(OpaqueHandler::Object { class }) => {
                f.write_str(class_basename(class))
            }
        }
    }
}

impl<'a> ControllerAction<'a> {
    pub fn parse(action: &'a str) -> Option<Self> {
        let (controller, method) = action.split_once('@')?;
        if controller.is_empty() || method.is_empty() || method.contains('@') {
            return None;
        }
        Some(Self { controller, method })
    }

    pub fn controller_name(&self) -> &'a str {
        class_basename(self.controller)
    }
}

/// Final segment of a namespaced class identifier.
pub fn class_basename(class: &str) -> &str {
    class
        .rsplit(['\\', '/'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(class)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RouteTableRepr {
    Bare(Vec<Route>),
    Wrapped { routes: Vec<Route> },
}

/// Parse a route-table snapshot from JSON text.
pub fn parse_route_table(text: &str) -> Result<Vec<Route>, serde_json::Error> {
    let repr: RouteTableRepr = serde_json::from_str(text)?;
    Ok(match repr {
        RouteTableRepr::Bare(routes) | RouteTableRepr::Wrapped { routes } => routes,
    })
}

/// Load a route-table snapshot from disk.
pub fn load_route_table(path: impl AsRef<Path>) -> Result<Vec<Route>, SnapshotError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SnapshotError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_route_table(&text).map_err(|source| SnapshotError::ParseJson {
        path: path.display().to_string(),
        source,
    })
}
