use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize {document}: {source}")]
    Serialize {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown output format `{0}` (expected markdown or json)")]
    UnknownFormat(String),
}
