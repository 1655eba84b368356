//! Tool-dispatch-specific errors.
//!
//! Per spec.md §4.5 the dispatcher never raises these to the agent loop;
//! every outcome, success or failure, is folded into a
//! [`ToolCallOutcome`](crate::ToolCallOutcome). `ToolError` exists for
//! the narrower [`ToolDyn`](crate::ToolDyn) (builtin) interface, which
//! mirrors the teacher's object-safe tool trait.

use thiserror::Error;

/// Errors surfaced by an individual [`ToolDyn`](crate::ToolDyn)
/// implementation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found in the registry.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Tool execution failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The input provided to the tool was invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
