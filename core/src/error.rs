//! Error types for the WorkWave client.
//!
//! # Design
//! Variants are grouped by the stage that produced them: request
//! construction, transport, status check, body decoding, and failures the
//! API reports inside an otherwise successful response. Status errors carry
//! only the numeric code; the API's error bodies are not surfaced.

use crate::types::Callback;

/// Errors returned by `Client` and the resource services.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The method string is not a valid HTTP token.
    #[error("invalid method {0:?}")]
    InvalidMethod(String),

    /// The method is a valid token but the transport cannot send it.
    #[error("unsupported method {0}")]
    UnsupportedMethod(String),

    /// The path could not be resolved against the base URL.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(#[source] serde_json::Error),

    /// DNS, connect, TLS or timeout failure from the underlying agent.
    #[error(transparent)]
    Transport(#[from] ureq::Error),

    /// The caller's deadline passed before the request was dispatched.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The server answered with a status outside the accepted band.
    #[error("HTTP {status} error")]
    HttpStatus { status: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(#[source] serde_json::Error),

    /// Copying the raw body into a caller-supplied sink failed.
    #[error("writing response body: {0}")]
    Io(#[from] std::io::Error),

    /// The callback test requested on set failed. The echoed record,
    /// including `error_code` and `error_message`, is kept intact.
    #[error("failed to set callback: {}", .0.error_message.as_deref().unwrap_or_default())]
    CallbackRejected(Box<Callback>),
}

impl ApiError {
    /// The status code, if this is a status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
