//! Typed `uat.toml` configuration.
//!
//! Every table has a default mirroring the stock rule set, so an empty file
//! (or no file at all) yields a working configuration. Tables that are present
//! are validated at load: rules missing a field, or wildcard patterns that are
//! not `prefix*`, are rejected before any route is processed.

use crate::error::ConfigError;
use crate::rule::Rule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "uat.toml";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "uat";
pub const WILDCARD: char = '*';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UatConfig {
    /// Base directory for generated documents; a dated subdirectory is used.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Literal URI prefixes never documented.
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,
    /// Middleware group names that carry no precondition of their own.
    #[serde(default = "default_middleware_groups")]
    pub middleware_groups: Vec<String>,
    /// Controller method -> policy method.
    #[serde(default = "default_methods_mapping")]
    pub methods_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub rules: RuleTables,
    /// Controller short name -> policy table.
    #[serde(default = "default_policy_mappings")]
    pub policy_mappings: BTreeMap<String, PolicyMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_project_name")]
    pub name: String,
    #[serde(default = "default_project_name")]
    pub description: String,
    #[serde(default = "default_project_version")]
    pub version: String,
    #[serde(default = "default_project_environment")]
    pub environment: String,
    /// Technical stack rows for the project document, e.g. `"PHP Version" = "8.3"`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stack: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTables {
    /// Exact middleware name -> rule.
    #[serde(default)]
    pub middleware: BTreeMap<String, Rule>,
    /// Wildcard rules, matched in declared order.
    #[serde(default)]
    pub pattern: Vec<PatternRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    pub pattern: String,
    #[serde(flatten)]
    pub rule: Rule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMapping {
    pub policy: String,
    #[serde(default)]
    pub methods: BTreeMap<String, PolicyMethodInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMethodInfo {
    pub description: String,
    pub action: String,
    pub validation: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl PatternRule {
    pub fn new(pattern: impl Into<String>, rule: Rule) -> Self {
        Self {
            pattern: pattern.into(),
            rule,
        }
    }

    /// Literal prefix of a `prefix*` pattern; `None` for any other shape.
    pub fn prefix(&self) -> Option<&str> {
        let prefix = self.pattern.strip_suffix(WILDCARD)?;
        (!prefix.is_empty() && !prefix.contains(WILDCARD)).then_some(prefix)
    }
}

impl UatConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Load `path` when given, otherwise `uat.toml` if it exists, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, rule) in &self.rules.middleware {
            require_rule_fields(&format!("rules.middleware.\"{name}\""), rule)?;
        }

        for (index, pattern) in self.rules.pattern.iter().enumerate() {
            let label = format!("rules.pattern[{index}] (`{}`)", pattern.pattern);
            if pattern.prefix().is_none() {
                return Err(ConfigError::Invalid(format!(
                    "{label}: pattern must be a non-empty literal prefix followed by a single trailing `*`"
                )));
            }
            require_rule_fields(&label, &pattern.rule)?;
        }

        for (earlier, later) in shadowed_patterns(&self.rules.pattern) {
            tracing::warn!(
                earlier = %earlier,
                later = %later,
                "pattern rule is shadowed by an earlier pattern with a shorter prefix; first match wins"
            );
        }

        for (controller, mapping) in &self.policy_mappings {
            if mapping.policy.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "policy_mappings.{controller}: `policy` must not be empty"
                )));
            }
        }

        Ok(())
    }

    /// Policy method for a controller method, passing unmapped names through.
    pub fn policy_method_for<'a>(&'a self, controller_method: &'a str) -> &'a str {
        self.methods_mapping
            .get(controller_method)
            .map(String::as_str)
            .unwrap_or(controller_method)
    }

    pub fn is_middleware_group(&self, name: &str) -> bool {
        self.middleware_groups.iter().any(|group| group == name)
    }
}

fn require_rule_fields(label: &str, rule: &Rule) -> Result<(), ConfigError> {
    let fields = [
        ("type", &rule.rule_type),
        ("description", &rule.description),
        ("action", &rule.action),
        ("validation", &rule.validation),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{label}: `{field}` must not be empty"
            )));
        }
    }
    Ok(())
}

/// Pairs `(earlier, later)` where the earlier pattern matches everything the later one does.
pub fn shadowed_patterns(patterns: &[PatternRule]) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (i, earlier) in patterns.iter().enumerate() {
        let Some(earlier_prefix) = earlier.prefix() else {
            continue;
        };
        for later in &patterns[i + 1..] {
            if later
                .prefix()
                .is_some_and(|later_prefix| later_prefix.starts_with(earlier_prefix))
            {
                out.push((earlier.pattern.clone(), later.pattern.clone()));
            }
        }
    }
    out
}

impl Default for UatConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            excluded_prefixes: default_excluded_prefixes(),
            middleware_groups: default_middleware_groups(),
            methods_mapping: default_methods_mapping(),
            project: ProjectConfig::default(),
            rules: RuleTables::default(),
            policy_mappings: default_policy_mappings(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project_name(),
            description: default_project_name(),
            version: default_project_version(),
            environment: default_project_environment(),
            stack: BTreeMap::new(),
        }
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        let mut middleware = BTreeMap::new();
        middleware.insert(
            "auth".to_string(),
            Rule::new(
                "authentication",
                "User must be logged in",
                "Navigate to /login and authenticate with valid credentials",
                "Verify user session is active",
            ),
        );
        middleware.insert(
            "auth:sanctum".to_string(),
            Rule::new(
                "sanctum_authentication",
                "User must be authenticated via Laravel Sanctum",
                "Login or provide valid Sanctum token",
                "Verify Sanctum authentication guard is active",
            ),
        );
        middleware.insert(
            "verified".to_string(),
            Rule::new(
                "email_verification",
                "User email must be verified",
                "Ensure test user has verified email address",
                "Check email_verified_at timestamp is not null",
            ),
        );

        let pattern = vec![
            PatternRule::new(
                "role:*",
                Rule::new(
                    "role_authorization",
                    "User must have '{placeholder}' role",
                    "Login with user assigned to '{placeholder}' role",
                    "Verify user has '{placeholder}' role in database (use Spatie role system)",
                ),
            ),
            PatternRule::new(
                "permission:*",
                Rule::new(
                    "permission_authorization",
                    "User must have '{placeholder}' permission",
                    "Login with user having '{placeholder}' permission",
                    "Verify user has '{placeholder}' permission directly or via role (use Spatie permission system)",
                ),
            ),
            PatternRule::new(
                "can:*",
                Rule::new(
                    "gate_authorization",
                    "User must pass '{placeholder}' gate check",
                    "Login with user authorized for '{placeholder}' gate",
                    "Verify gate check passes for current user",
                ),
            ),
            PatternRule::new(
                "throttle:*",
                Rule::new(
                    "rate_limiting",
                    "Request must not exceed rate limit for '{placeholder}' limiter",
                    "Ensure test requests stay within rate limit bounds",
                    "Verify rate limiting headers and 429 responses when exceeded",
                ),
            ),
            PatternRule::new(
                "auth:*",
                Rule::new(
                    "guard_authentication",
                    "User must be authenticated with '{placeholder}' guard",
                    "Authenticate using the specified guard (web, sanctum, api)",
                    "Verify authentication state for the specified guard",
                ),
            ),
        ];

        Self {
            middleware,
            pattern,
        }
    }
}

fn default_directory() -> String {
    DEFAULT_OUTPUT_DIRECTORY.to_string()
}

fn default_project_name() -> String {
    "Web Application".to_string()
}

fn default_project_version() -> String {
    "1.0.0".to_string()
}

fn default_project_environment() -> String {
    "local".to_string()
}

fn default_excluded_prefixes() -> Vec<String> {
    [
        "telescope",
        "horizon",
        "sanctum",
        "api/",
        "_ignition",
        "livewire",
        "_debugbar",
        "impersonate",
        "doc",
        "errors",
        "up",
        "test",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_middleware_groups() -> Vec<String> {
    vec!["web".to_string(), "api".to_string()]
}

fn default_methods_mapping() -> BTreeMap<String, String> {
    [
        ("index", "viewAny"),
        ("show", "view"),
        ("create", "create"),
        ("store", "create"),
        ("edit", "update"),
        ("update", "update"),
        ("destroy", "delete"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

fn default_policy_mappings() -> BTreeMap<String, PolicyMapping> {
    let view_user_security = |validation: &str| PolicyMethodInfo {
        description: "User must have user security view permissions".to_string(),
        action: "Login with user having user security permissions".to_string(),
        validation: validation.to_string(),
        permissions: vec!["view-user-security".to_string()],
        roles: vec!["superadmin".to_string(), "administrator".to_string()],
    };

    let mut methods = BTreeMap::new();
    methods.insert(
        "viewAny".to_string(),
        view_user_security("Verify user can view user listings"),
    );
    methods.insert(
        "view".to_string(),
        view_user_security("Verify user can view user details"),
    );

    let mut mappings = BTreeMap::new();
    mappings.insert(
        "UserController".to_string(),
        PolicyMapping {
            policy: "UserPolicy".to_string(),
            methods,
        },
    );
    mappings
}
