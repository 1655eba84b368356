#![deny(missing_docs)]
//! # stratum — umbrella crate
//!
//! Single import surface for the multi-tier serverless function
//! platform. Re-exports each component behind a feature flag, plus a
//! `prelude` for the common path, and the wire-level response envelopes
//! from spec.md §6.

#[cfg(feature = "agentic")]
pub use stratum_agentic;
#[cfg(feature = "auth")]
pub use stratum_auth;
#[cfg(feature = "cascade")]
pub use stratum_cascade;
#[cfg(feature = "core")]
pub use stratum_core;
#[cfg(feature = "generative")]
pub use stratum_generative;
#[cfg(feature = "core")]
pub use stratum_llm;
#[cfg(feature = "core")]
pub use stratum_registry;
#[cfg(feature = "core")]
pub use stratum_sandbox;
#[cfg(feature = "secret")]
pub use stratum_secret;
#[cfg(feature = "secret-env")]
pub use stratum_secret_env;
#[cfg(feature = "core")]
pub use stratum_tool;

pub mod envelope;

/// Happy-path imports for composing a Stratum deployment.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use stratum_core::{CoreError, DurationMs, ExecutionId, FunctionId, TokenUsage, Version};

    #[cfg(feature = "core")]
    pub use stratum_registry::{FunctionType, Registry, Tier};

    #[cfg(feature = "core")]
    pub use stratum_sandbox::SandboxExecutor;

    #[cfg(feature = "core")]
    pub use stratum_llm::Provider;

    #[cfg(feature = "core")]
    pub use stratum_tool::ToolDispatcher;

    #[cfg(feature = "generative")]
    pub use stratum_generative::GenerativeExecutor;

    #[cfg(feature = "agentic")]
    pub use stratum_agentic::{AgenticExecutor, AgenticOutcome};

    #[cfg(feature = "cascade")]
    pub use stratum_cascade::{CascadeExecutor, CascadeOutcome, TierExecutor};

    #[cfg(feature = "auth")]
    pub use stratum_auth::{AuthGate, Principal, RateLimiter};

    pub use crate::envelope::{
        AgenticInvocationEnvelope, CascadeInvocationEnvelope, CodeInvocationEnvelope,
        ErrorEnvelope, GenerativeInvocationEnvelope, PendingEnvelope,
    };
}
