#![deny(missing_docs)]
//! # stratum-sandbox — code executor & runtime sandbox
//!
//! Executes a versioned [`CodeArtifact`](stratum_registry::CodeArtifact)
//! for one invocation with artifact selection (pre-compiled preferred,
//! on-demand compilation or type-stripping fallback otherwise), a fresh
//! per-call sandbox, and a bounded wall-clock budget (spec.md §4.2).
//!
//! The actual compilation toolchain and code-execution runtime are
//! external collaborators per spec.md §1; this crate only defines the
//! [`Compiler`], [`Transformer`], and [`Runtime`] contracts they must
//! satisfy and the orchestration around them.

mod error;
mod executor;
mod runtime;

pub use error::SandboxError;
pub use executor::{ExecutionMetadata, SandboxExecutor};
pub use runtime::{Compiler, Runtime, Transformer};
