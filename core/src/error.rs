//! Error type for the T.LY client.
//!
//! # Design
//! The taxonomy is flat. A non-2xx response is a single `Api` variant whose
//! message is the response body exactly as the service sent it; there is no
//! separate "not found" or "unauthorized" case. Callers that need finer
//! handling inspect `status` or parse `body` themselves.

use crate::http::BoxError;

/// Errors returned by every `TlyClient` operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The transport failed before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The service answered with a status outside `200..300`.
    #[error("API error: {body}")]
    Api { status: u16, body: String },

    /// A 2xx body did not match the expected result shape.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl ApiError {
    /// HTTP status of an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
