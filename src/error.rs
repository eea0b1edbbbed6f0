//! Crate-wide error type

use crate::rdf::RdfError;
use thiserror::Error;

/// Errors that can occur in traceability operations
#[derive(Debug, Error)]
pub enum TraceError {
    #[error(transparent)]
    Rdf(#[from] RdfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("identity oracle error: {0}")]
    Oracle(String),

    #[error("config error: {0}")]
    Config(String),
}

impl TraceError {
    /// HTTP status carried by the error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for traceability operations
pub type TraceResult<T> = Result<T, TraceError>;
