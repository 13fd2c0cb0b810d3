use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GonfikError {
    #[error("Failed to determine the current working directory: {source}")]
    WorkingDirectoryUnavailable { source: std::io::Error },

    #[error("Failed to list override files matching '{pattern}': {reason}")]
    OverrideGlob { pattern: String, reason: String },

    #[error("Failed to read override file {path}: {source}")]
    OverrideRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Only the byte index is reported, never the offending line, since
    /// override files routinely hold secrets.
    #[error("Failed to parse override file {path} at position {index}")]
    OverrideParse { path: PathBuf, index: usize },

    #[error("Failed to open {path}: {source}")]
    DocumentOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    DocumentRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    DocumentParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    DocumentParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Document root in {path} is not a mapping")]
    DocumentNotTable { path: PathBuf },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),

    /// A registry load failed. Every caller that waited on the same attempt
    /// receives a clone of this value.
    #[error(transparent)]
    InitFailed(Arc<GonfikError>),
}

impl GonfikError {
    /// True when the document could not be opened because it does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            GonfikError::DocumentOpen { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            GonfikError::InitFailed(inner) => inner.is_not_found(),
            _ => false,
        }
    }
}
