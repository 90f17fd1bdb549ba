//! Error types for dailyspend
//!
//! Three families, each with its own recovery policy:
//! - `StorageError` is always surfaced to the caller
//! - `BackendError` is caught by the insight pipeline and answered with rule-based output
//! - `ParseError` never leaves the language-model backend (it degrades to a single insight)

use thiserror::Error;

/// Failure reading or writing a ledger snapshot
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Ledger I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Ledger document {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Ledger store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of an insight backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Completion endpoint returned HTTP {code}: {body}")]
    HttpStatus { code: u16, body: String },

    #[error("Completion endpoint returned an unexpected response shape: {0}")]
    InvalidResponseShape(String),

    #[error("Remote backend requires an API key")]
    MissingCredential,

    #[error("Backend call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Prompt unavailable: {0}")]
    Prompt(String),
}

/// Failure to read the structured insight schema from a model reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No JSON object found in model reply")]
    NoJson,

    #[error("Model reply does not match the insight schema: {0}")]
    Schema(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
