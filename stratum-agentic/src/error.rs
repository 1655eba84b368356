//! Agentic-executor-specific errors, convertible into [`CoreError`].

use stratum_core::CoreError;
use stratum_llm::ProviderError;
use thiserror::Error;

/// Errors from a single agentic-function invocation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AgenticError {
    /// The LLM adapter failed after retries, with no recoverable path.
    #[error("upstream error: {0}")]
    Upstream(#[from] ProviderError),

    /// A final answer failed schema validation on every remaining attempt.
    #[error("schema validation failed: {0}")]
    SchemaValidationError(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<AgenticError> for CoreError {
    fn from(e: AgenticError) -> Self {
        match e {
            AgenticError::Upstream(e) => CoreError::UpstreamError(e.to_string()),
            AgenticError::SchemaValidationError(m) => CoreError::SchemaValidationError(m),
            AgenticError::Other(e) => CoreError::Other(e),
        }
    }
}
