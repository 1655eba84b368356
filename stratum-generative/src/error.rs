//! Generative-executor-specific errors, convertible into [`CoreError`].

use stratum_core::CoreError;
use stratum_llm::ProviderError;
use thiserror::Error;

/// Errors from a single generative-function invocation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GenerativeError {
    /// A `{{name}}` placeholder in the prompt template has no binding.
    #[error("missing variable: {0}")]
    MissingVariable(String),

    /// The declared output schema has conflicting constraints.
    #[error("impossible schema: {0}")]
    ImpossibleSchema(String),

    /// The model's response failed validation against the output schema.
    #[error("schema validation failed: {0}")]
    SchemaValidationError(String),

    /// The rate limiter rejected this call.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the caller should wait before retrying.
        retry_after_secs: u64,
    },

    /// The LLM adapter failed after retries.
    #[error("upstream error: {0}")]
    Upstream(#[from] ProviderError),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<GenerativeError> for CoreError {
    fn from(e: GenerativeError) -> Self {
        match e {
            GenerativeError::MissingVariable(m) => CoreError::MissingVariable(m),
            GenerativeError::ImpossibleSchema(m) => CoreError::ImpossibleSchema(m),
            GenerativeError::SchemaValidationError(m) => CoreError::SchemaValidationError(m),
            GenerativeError::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            GenerativeError::Upstream(e) => CoreError::UpstreamError(e.to_string()),
            GenerativeError::Other(e) => CoreError::Other(e),
        }
    }
}
