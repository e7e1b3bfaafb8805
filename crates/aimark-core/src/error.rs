//! Model request error types.
//!
//! Defined here rather than in the client crate so the grading engine can
//! match on variants instead of sniffing error strings.

use thiserror::Error;

/// Errors that can occur when asking a language model for a reply.
///
/// These cover the transport and the endpoint; a reply that arrives but
/// cannot be interpreted is not an error (see
/// [`ChatModel::ask_json`](crate::traits::ChatModel::ask_json)).
#[derive(Debug, Error)]
pub enum AskError {
    /// The endpoint returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid or missing API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found at the endpoint.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The endpoint returned an error response.
    #[error("endpoint error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response parsed but carried no assistant message.
    #[error("reply envelope carried no assistant message")]
    EmptyReply,
}
