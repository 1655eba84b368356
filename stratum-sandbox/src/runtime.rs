//! External execution collaborators.
//!
//! The compilation toolchain and the actual code-execution runtime are
//! out of scope per spec.md §1 ("the compilation toolchain that produces
//! executable artifacts from source"); this module only defines the
//! contracts a concrete toolchain/runtime must satisfy to plug into
//! [`crate::SandboxExecutor`], grounded on `layer0::environment::Environment`'s
//! "protocol takes data, not a function reference" shape.

use crate::error::SandboxError;
use async_trait::async_trait;
use serde_json::Value;

/// Produces an executable artifact from source, on demand, when no
/// pre-compiled artifact is stored.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile `source` written in `language` into an executable form.
    async fn compile(&self, language: &str, source: &[u8]) -> Result<Vec<u8>, SandboxError>;
}

/// Strips type annotations (or otherwise transforms) source for
/// languages that permit running without full compilation, used as a
/// fallback when no [`Compiler`] is configured or it is unavailable.
pub trait Transformer: Send + Sync {
    /// Transform `source` written in `language` into an executable form.
    fn transform(&self, language: &str, source: &[u8]) -> Result<Vec<u8>, SandboxError>;
}

/// The per-invocation execution sandbox. Implementations own whatever
/// isolation mechanism they provide (Wasm, container, subprocess, VM
/// isolate); each call to [`Runtime::execute`] MUST behave as a fresh
/// sandbox — no state may carry over from a previous invocation.
#[async_trait]
pub trait Runtime: Send + Sync {
    /// Execute `entry_point` from `executable` against `payload`,
    /// returning the function's JSON result.
    async fn execute(
        &self,
        executable: &[u8],
        entry_point: &str,
        payload: Value,
    ) -> Result<Value, SandboxError>;
}
