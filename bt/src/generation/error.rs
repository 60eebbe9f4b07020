//! Generation service errors

use std::time::Duration;
use thiserror::Error;

/// Errors from the content-generation backend
///
/// All of these are retryable from the user's point of view: the
/// session that triggered the call is left untouched.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Invalid response from generation backend: {0}")]
    InvalidResponse(String),
}
