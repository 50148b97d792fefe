//! Static introspection registry.
//!
//! A JSON document describing middleware handlers and policies up front, for
//! applications whose sources are not available to scan:
//!
//! ```json
//! {
//!   "middleware_aliases": { "team": "App\\Http\\Middleware\\EnsureTeamMember" },
//!   "middleware": { "App\\Http\\Middleware\\EnsureTeamMember": { "description": "..." } },
//!   "policies": {
//!     "PostPolicy": { "methods": { "view": { "description": "...", "permissions": ["view-posts"] } } }
//!   },
//!   "policy_associations": [ { "subject": "App\\Models\\Post", "policy": "PostPolicy" } ]
//! }
//! ```

use super::introspect::{Introspector, PolicyAssociation, PolicyMethodArtifact};
use crate::error::DiscoveryError;
use crate::route::class_basename;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryIntrospector {
    #[serde(default)]
    pub middleware_aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub middleware: BTreeMap<String, HandlerEntry>,
    #[serde(default)]
    pub policies: BTreeMap<String, PolicyEntry>,
    #[serde(default)]
    pub policy_associations: Vec<PolicyAssociation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerEntry {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    #[serde(default)]
    pub methods: BTreeMap<String, PolicyMethodArtifact>,
}

impl RegistryIntrospector {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DiscoveryError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| DiscoveryError::Registry {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn with_handler(mut self, handler: &str, description: Option<&str>) -> Self {
        self.middleware.insert(
            handler.to_string(),
            HandlerEntry {
                description: description.map(str::to_string),
            },
        );
        self
    }

    pub fn with_alias(mut self, alias: &str, handler: &str) -> Self {
        self.middleware_aliases
            .insert(alias.to_string(), handler.to_string());
        self
    }

    pub fn with_policy_method(
        mut self,
        policy: &str,
        method: &str,
        artifact: PolicyMethodArtifact,
    ) -> Self {
        self.policies
            .entry(policy.to_string())
            .or_default()
            .methods
            .insert(method.to_string(), artifact);
        self
    }

    pub fn with_association(mut self, subject: &str, policy: &str) -> Self {
        self.policy_associations.push(PolicyAssociation {
            subject: subject.to_string(),
            policy: policy.to_string(),
        });
        self
    }

    fn policy(&self, policy: &str) -> Option<&PolicyEntry> {
        self.policies
            .get(policy)
            .or_else(|| self.policies.get(class_basename(policy)))
    }
}

impl Introspector for RegistryIntrospector {
    fn middleware_alias(&self, alias: &str) -> Result<Option<String>, DiscoveryError> {
        Ok(self.middleware_aliases.get(alias).cloned())
    }

    fn middleware_handlers(&self) -> Result<Vec<String>, DiscoveryError> {
        Ok(self.middleware.keys().cloned().collect())
    }

    fn handler_description(&self, handler: &str) -> Result<Option<String>, DiscoveryError> {
        Ok(self
            .middleware
            .get(handler)
            .and_then(|entry| entry.description.clone()))
    }

    fn has_policy(&self, policy: &str) -> Result<bool, DiscoveryError> {
        Ok(self.policy(policy).is_some())
    }

    fn policy_associations(&self) -> Result<Vec<PolicyAssociation>, DiscoveryError> {
        Ok(self.policy_associations.clone())
    }

    fn policy_method(
        &self,
        policy: &str,
        method: &str,
    ) -> Result<Option<PolicyMethodArtifact>, DiscoveryError> {
        Ok(self
            .policy(policy)
            .and_then(|entry| entry.methods.get(method).cloned()))
    }
}
