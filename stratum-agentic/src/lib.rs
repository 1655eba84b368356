#![deny(missing_docs)]
//! # stratum-agentic — the agentic-tier executor
//!
//! Implements the bounded think-act loop (spec.md §4.4): an LLM adapter
//! call per iteration, tool calls dispatched in parallel through
//! `stratum-tool`, and a trace that is always returned, complete on
//! success and partial on timeout or failure.

mod error;
mod executor;
mod types;

pub use error::AgenticError;
pub use executor::AgenticExecutor;
pub use types::{AgenticOutcome, Iteration, Termination, ToolCallRecord};
