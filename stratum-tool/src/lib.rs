#![deny(missing_docs)]
//! # stratum-tool — tool dispatcher for agentic functions
//!
//! Executes a single tool call per spec.md §4.5: `inline` (sandboxed
//! code), `function-ref` (another deployed function), `api` (an HTTP
//! request), or `builtin` (a registered implementation from the closed
//! set). Never raises to the caller; every outcome is folded into a
//! [`ToolCallOutcome`].

mod dispatcher;
mod error;
mod registry;

pub use dispatcher::{default_inline_timeout, ToolCallOutcome, ToolDispatcher};
pub use error::ToolError;
pub use registry::{ToolDyn, ToolRegistry};
