use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading a creature catalog.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid creature data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate creature id '{0}'")]
    DuplicateId(String),

    #[error("creature not found: {0}")]
    NotFound(String),
}

impl DataError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }
}
