//! The code executor: artifact selection, isolation, and timeout
//! enforcement around a pluggable [`Runtime`] (spec.md §4.2).

use crate::error::SandboxError;
use crate::runtime::{Compiler, Runtime, Transformer};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use stratum_core::{DurationMs, FunctionId, Version};
use stratum_registry::Registry;

fn default_timeout() -> DurationMs {
    DurationMs::from_millis(5_000)
}

/// Metadata attached to every code-execution result, success or failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionMetadata {
    /// Wall-clock time spent in the sandbox.
    pub duration_ms: u64,
    /// Whether a pre-compiled artifact was used directly.
    pub used_precompiled: bool,
    /// Why a fallback path was taken, if one was.
    pub fallback_reason: Option<String>,
}

/// Executes versioned code artifacts with artifact selection, isolation,
/// and a bounded wall-clock budget.
pub struct SandboxExecutor {
    registry: Arc<dyn Registry>,
    compiler: Option<Arc<dyn Compiler>>,
    transformer: Option<Arc<dyn Transformer>>,
    runtime: Arc<dyn Runtime>,
}

impl SandboxExecutor {
    /// Construct an executor backed by `registry` for artifact lookup
    /// and `runtime` for actual execution. `compiler`/`transformer` are
    /// optional on-demand-compilation collaborators.
    pub fn new(registry: Arc<dyn Registry>, runtime: Arc<dyn Runtime>) -> Self {
        Self { registry, compiler: None, transformer: None, runtime }
    }

    /// Attach an on-demand compiler collaborator.
    pub fn with_compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Attach a type-stripping transformer fallback.
    pub fn with_transformer(mut self, transformer: Arc<dyn Transformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Execute `id`@`version` (active version if `None`) against `payload`.
    pub async fn execute(
        &self,
        id: &FunctionId,
        version: Option<&Version>,
        payload: Value,
    ) -> Result<(Value, ExecutionMetadata), SandboxError> {
        let artifact = self.registry.get_artifact(id, version).await?;
        let resolved_version = match version {
            Some(v) => Some(v.clone()),
            None => Some(self.registry.get_metadata(id).await?.active_version),
        };
        self.execute_artifact(&artifact, Some((id, resolved_version.as_ref())), payload).await
    }

    /// Execute a [`CodeArtifact`](stratum_registry::CodeArtifact) directly,
    /// without a registry lookup. Used by callers (such as the tool
    /// dispatcher's `inline` variant) that hold an artifact that was
    /// never deployed. `cache_target`, when set, is where an on-demand
    /// compilation result is cached back.
    pub async fn execute_artifact(
        &self,
        artifact: &stratum_registry::CodeArtifact,
        cache_target: Option<(&FunctionId, Option<&Version>)>,
        payload: Value,
    ) -> Result<(Value, ExecutionMetadata), SandboxError> {
        let timeout = artifact.timeout.unwrap_or_else(default_timeout);

        let (executable, used_precompiled, fallback_reason) = match &artifact.compiled {
            Some(compiled) => (compiled.clone(), true, None),
            None => {
                if let Some(compiler) = &self.compiler {
                    let compiled = compiler.compile(&artifact.language, &artifact.source).await?;
                    if let Some((id, Some(version))) = cache_target {
                        self.registry.cache_compiled(id, version, compiled.clone()).await?;
                    }
                    (compiled, false, Some("on-demand-compilation".to_string()))
                } else if let Some(transformer) = &self.transformer {
                    let transformed = transformer.transform(&artifact.language, &artifact.source)?;
                    (transformed, false, Some("type-stripping-transform".to_string()))
                } else {
                    return Err(SandboxError::CompilationUnavailable(artifact.language.clone()));
                }
            }
        };

        let started = Instant::now();
        let result = tokio::time::timeout(
            timeout.to_std(),
            self.runtime.execute(&executable, &artifact.entry_point, payload),
        )
        .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Err(_elapsed) => Err(SandboxError::Timeout { elapsed_ms: timeout.as_millis() }),
            Ok(Err(SandboxError::RuntimeError { message, stack, mapped_stack })) => {
                let mapped_stack = mapped_stack.or_else(|| match (&artifact.source_map, &stack) {
                    (Some(map), Some(s)) => Some(remap_stack(s, map)),
                    _ => None,
                });
                Err(SandboxError::RuntimeError { message, stack, mapped_stack })
            }
            Ok(Err(other)) => Err(other),
            Ok(Ok(output)) => Ok((
                output,
                ExecutionMetadata { duration_ms, used_precompiled, fallback_reason },
            )),
        }
    }
}

/// Best-effort stack remapping. A real implementation would apply a
/// source map (e.g. via the `sourcemap` crate); this marks the frames
/// that were remapped without attempting real column/line translation,
/// since the map format itself is produced by the out-of-scope
/// compilation toolchain.
fn remap_stack(stack: &str, _source_map: &str) -> String {
    stack
        .lines()
        .map(|line| format!("{line} (mapped)"))
        .collect::<Vec<_>>()
        .join("\n")
}
