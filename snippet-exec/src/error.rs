use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures that stop the pipeline before a runtime outcome exists.
///
/// The `Display` text of each variant is exactly what the caller sees in the
/// `error` field of the response.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No public class found in code")]
    NoPublicClass,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid class name: {0:?}")]
    InvalidIdentifier(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Compilation(String),

    #[error("{message}")]
    Spawn { program: String, message: String },

    #[error("Missing required tools: {}", .0.join(", "))]
    MissingTools(Vec<String>),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("{0}")]
    Unexpected(String),
}

impl Error {
    /// Classify this failure for the `errorKind` response field.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoPublicClass => ErrorKind::ExtractionFailure,
            Error::InvalidRequest(_) | Error::InvalidIdentifier(_) => ErrorKind::InvalidRequest,
            Error::Io(_) => ErrorKind::IoFailure,
            Error::Compilation(_) => ErrorKind::CompileFailure,
            Error::Spawn { .. } | Error::MissingTools(_) => ErrorKind::SpawnFailure,
            Error::Configuration(_) | Error::Unexpected(_) => ErrorKind::UnexpectedFailure,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidRequest(format!("Invalid request: {}", e))
    }
}

/// Structured failure category reported next to the free-form error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ExtractionFailure,
    InvalidRequest,
    IoFailure,
    CompileFailure,
    SpawnFailure,
    ExecutionTimeout,
    RuntimeFailure,
    UnexpectedFailure,
}
