//! The shared error taxonomy surfaced across every component.
//!
//! Each component crate defines its own domain-specific error enum (see
//! `stratum-registry::RegistryError`, `stratum-sandbox::SandboxError`, etc.)
//! and provides `From<ComponentError> for CoreError` so the cascade
//! executor — and any future router — can normalize heterogeneous
//! component failures into one wire-level vocabulary.

use thiserror::Error;

/// The error kinds named in the platform's error taxonomy.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CoreError {
    /// Function id violates the required format.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A request or LLM output fails schema validation.
    #[error("schema validation failed: {0}")]
    SchemaValidationError(String),

    /// A referenced template variable has no binding.
    #[error("missing variable: {0}")]
    MissingVariable(String),

    /// A declared schema has conflicting constraints (e.g. min > max).
    #[error("impossible schema: {0}")]
    ImpossibleSchema(String),

    /// The requested version already exists for this function.
    #[error("duplicate version: {0}")]
    DuplicateVersion(String),

    /// The rollback target version does not exist.
    #[error("version not found: {0}")]
    VersionNotFound(String),

    /// The function id is unknown to the registry.
    #[error("function not found: {0}")]
    FunctionNotFound(String),

    /// Missing or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credentials, insufficient scope.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Rate limit quota exceeded. `retry_after_secs` is always positive.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the caller should wait before retrying.
        retry_after_secs: u64,
    },

    /// A deadline elapsed before the operation completed.
    #[error("timeout after {elapsed_ms}ms")]
    Timeout {
        /// Elapsed time, equal to the configured budget.
        elapsed_ms: u64,
    },

    /// User code threw during execution.
    #[error("runtime error: {message}")]
    RuntimeError {
        /// The error message from user code.
        message: String,
        /// Captured stack trace, if any.
        stack: Option<String>,
        /// Source-map-remapped stack trace, if a source map was available.
        mapped_stack: Option<String>,
    },

    /// An upstream collaborator (LLM provider, external API, builtin tool)
    /// failed. Recoverable in a cascade.
    #[error("upstream error: {0}")]
    UpstreamError(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    /// Whether this error kind is expected to be locally recoverable by a
    /// cascade tier escalation (matches spec.md §7's propagation policy:
    /// invalid inputs and auth/rate failures are surfaced without
    /// recovery, everything tier-local is retried by escalating).
    pub fn is_cascade_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::Timeout { .. } | CoreError::RuntimeError { .. } | CoreError::UpstreamError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_upstream_are_cascade_recoverable() {
        assert!(CoreError::Timeout { elapsed_ms: 5000 }.is_cascade_recoverable());
        assert!(CoreError::UpstreamError("boom".into()).is_cascade_recoverable());
    }

    #[test]
    fn auth_errors_are_not_cascade_recoverable() {
        assert!(!CoreError::Unauthorized("no token".into()).is_cascade_recoverable());
        assert!(!CoreError::Forbidden("missing scope".into()).is_cascade_recoverable());
    }
}
