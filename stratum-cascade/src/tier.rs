//! Per-tier dispatch (spec.md §4.6 step 3c), grounded on
//! `neuron-orch-local::LocalOrch`'s `HashMap<AgentId, Arc<dyn Operator>>`
//! dispatch-by-lookup, generalized from a dynamic agent id to the fixed
//! `Tier` enum and from one trait object shape to one adapter per
//! component's own executor type.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use stratum_agentic::{AgenticExecutor, Termination};
use stratum_core::{CoreError, FunctionId, Version};
use stratum_generative::GenerativeExecutor;
use stratum_llm::Provider;
use stratum_registry::{AgenticConfig, GenerativeConfig};
use stratum_sandbox::SandboxExecutor;

/// One tier's invocation contract, object-safe so a cascade can hold a
/// heterogeneous mix of tier implementations.
#[async_trait]
pub trait TierExecutor: Send + Sync {
    /// Invoke this tier with the (already context-augmented) invocation
    /// variables, returning its output or a normalized failure.
    async fn invoke(&self, variables: Map<String, Value>) -> Result<Value, CoreError>;
}

/// Adapts the code tier: a deployed [`SandboxExecutor`] target.
pub struct CodeTier {
    sandbox: Arc<SandboxExecutor>,
    id: FunctionId,
    version: Option<Version>,
}

impl CodeTier {
    /// Construct a code-tier adapter for `id`@`version` (active version
    /// if `None`).
    pub fn new(sandbox: Arc<SandboxExecutor>, id: FunctionId, version: Option<Version>) -> Self {
        Self { sandbox, id, version }
    }
}

#[async_trait]
impl TierExecutor for CodeTier {
    async fn invoke(&self, variables: Map<String, Value>) -> Result<Value, CoreError> {
        let (output, _metadata) = self
            .sandbox
            .execute(&self.id, self.version.as_ref(), Value::Object(variables))
            .await?;
        Ok(output)
    }
}

/// Adapts the generative tier: one templated LLM call.
pub struct GenerativeTier<P: Provider> {
    executor: Arc<GenerativeExecutor<P>>,
    id: FunctionId,
    version: Version,
    config: GenerativeConfig,
}

impl<P: Provider> GenerativeTier<P> {
    /// Construct a generative-tier adapter.
    pub fn new(
        executor: Arc<GenerativeExecutor<P>>,
        id: FunctionId,
        version: Version,
        config: GenerativeConfig,
    ) -> Self {
        Self { executor, id, version, config }
    }
}

#[async_trait]
impl<P: Provider> TierExecutor for GenerativeTier<P> {
    async fn invoke(&self, variables: Map<String, Value>) -> Result<Value, CoreError> {
        let (output, _metadata) = self
            .executor
            .execute(&self.id, &self.version, &self.config, &variables)
            .await?;
        Ok(output)
    }
}

/// Adapts the agentic tier: a bounded think-act loop.
pub struct AgenticTier<P: Provider> {
    executor: Arc<AgenticExecutor<P>>,
    config: AgenticConfig,
}

impl<P: Provider> AgenticTier<P> {
    /// Construct an agentic-tier adapter.
    pub fn new(executor: Arc<AgenticExecutor<P>>, config: AgenticConfig) -> Self {
        Self { executor, config }
    }
}

#[async_trait]
impl<P: Provider> TierExecutor for AgenticTier<P> {
    async fn invoke(&self, variables: Map<String, Value>) -> Result<Value, CoreError> {
        let outcome = self.executor.execute(&self.config, Value::Object(variables)).await;
        match outcome.termination {
            Termination::Completed { goal_achieved: true } => {
                Ok(outcome.output.unwrap_or(Value::Null))
            }
            Termination::Completed { goal_achieved: false } => Err(CoreError::UpstreamError(
                "agent exhausted its iteration budget without achieving its goal".into(),
            )),
            Termination::Failed { error } => Err(CoreError::UpstreamError(error)),
            Termination::Timeout => {
                Err(CoreError::Timeout { elapsed_ms: self.config.timeout.as_millis() })
            }
            Termination::Cancelled => {
                Err(CoreError::Other(Box::new(std::io::Error::other("agentic tier cancelled"))))
            }
        }
    }
}
