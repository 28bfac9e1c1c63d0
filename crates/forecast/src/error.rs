use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading or writing the trained model artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact io at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact at {path} could not be decoded: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact at {path} is incompatible: {reason}")]
    Incompatible { path: PathBuf, reason: String },

    #[error("artifact could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("artifact storage error: {0}")]
    Storage(String),
}

/// Failure of a read/write against inventory or forecast storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors surfaced by training and forecast runs.
///
/// "Not enough data" is never an error: training reports `None` and runs
/// report zero rows written.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("invalid forecast configuration: {0}")]
    InvalidConfig(String),

    #[error("model error: {0}")]
    Model(String),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}
