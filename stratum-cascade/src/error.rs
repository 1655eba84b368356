//! Cascade-executor-specific errors, convertible into [`CoreError`].

use stratum_core::CoreError;
use thiserror::Error;

/// Errors from a single cascade invocation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CascadeError {
    /// No tier in the cascade is configured to handle the request.
    #[error("no tiers configured for this cascade")]
    NoTiersConfigured,

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<CascadeError> for CoreError {
    fn from(e: CascadeError) -> Self {
        match e {
            CascadeError::NoTiersConfigured => {
                CoreError::Other(Box::new(std::io::Error::other(e.to_string())))
            }
            CascadeError::Other(e) => CoreError::Other(e),
        }
    }
}
