//! Auth-gate-specific errors, convertible into [`CoreError`].

use stratum_core::CoreError;
use thiserror::Error;

/// Errors raised while authenticating, authorizing, or rate-limiting a
/// request.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials are missing, malformed, or expired.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials are valid but lack a required scope.
    #[error("forbidden: missing scope {0}")]
    Forbidden(String),

    /// The caller has exceeded its quota for this principal/function pair.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the caller should wait before retrying.
        retry_after_secs: u64,
    },

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<AuthError> for CoreError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthorized(message) => CoreError::Unauthorized(message),
            AuthError::Forbidden(scope) => CoreError::Forbidden(scope),
            AuthError::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            AuthError::Other(e) => CoreError::Other(e),
        }
    }
}
