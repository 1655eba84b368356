//! Sandbox-specific errors, convertible into the shared [`CoreError`] taxonomy.

use stratum_core::CoreError;
use stratum_registry::RegistryError;
use thiserror::Error;

/// Errors from code execution.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SandboxError {
    /// Neither a pre-compiled artifact nor a compiler/transformer
    /// collaborator was available to produce an executable form.
    #[error("no compiler or transformer available for language {0}")]
    CompilationUnavailable(String),

    /// The compiler collaborator rejected the source.
    #[error("compilation failed: {0}")]
    CompilationFailed(String),

    /// The per-call budget elapsed before the sandbox returned.
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

    /// Lookup of the function's metadata or artifact failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<SandboxError> for CoreError {
    fn from(e: SandboxError) -> Self {
        match e {
            SandboxError::CompilationUnavailable(m) => {
                CoreError::RuntimeError { message: m, stack: None, mapped_stack: None }
            }
            SandboxError::CompilationFailed(m) => {
                CoreError::RuntimeError { message: m, stack: None, mapped_stack: None }
            }
            SandboxError::Timeout { elapsed_ms } => CoreError::Timeout { elapsed_ms },
            SandboxError::RuntimeError { message, stack, mapped_stack } => {
                CoreError::RuntimeError { message, stack, mapped_stack }
            }
            SandboxError::Registry(e) => e.into(),
            SandboxError::Other(e) => CoreError::Other(e),
        }
    }
}
