//! Error types for snapshot loading, configuration, and discovery.

use thiserror::Error;

/// Failure loading a route-table or users snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure loading or validating `uat.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render config toml: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure raised by an introspector or a discovery strategy.
///
/// These never escape the prerequisite resolver: they are logged and the
/// route falls back to static rule tables.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("introspection i/o failure at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid introspection registry at {path}: {source}")]
    Registry {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rule discovery unavailable: {0}")]
    Unavailable(String),
}
