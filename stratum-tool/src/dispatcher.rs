//! Dispatch of a single tool call across the four implementation
//! variants (spec.md §4.5). Never raises to the caller — every outcome
//! is folded into a [`ToolCallOutcome`] record.

use crate::registry::ToolRegistry;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stratum_registry::{BuiltinTool, ToolDefinition, ToolImplementation};
use stratum_sandbox::SandboxExecutor;

/// Default per-tool-call deadline for `inline` tools, per spec.md §4.5.
pub fn default_inline_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Outcome of one tool call, always returned rather than an `Err`.
#[derive(Debug, Clone)]
pub struct ToolCallOutcome {
    /// The tool's result, or `Value::Null` on failure.
    pub output: Value,
    /// Whether the call succeeded.
    pub success: bool,
    /// Failure message, preserving identifying tokens (error codes,
    /// status lines) verbatim — set only when `success` is false.
    pub error: Option<String>,
    /// Wall-clock time spent dispatching the call.
    pub duration_ms: u64,
}

/// Dispatches a single tool call to one of the four implementation
/// variants: `inline` (via the code sandbox), `function-ref` (another
/// deployed function), `api` (an HTTP request), or `builtin` (a
/// registered implementation from the closed set).
pub struct ToolDispatcher {
    sandbox: Arc<SandboxExecutor>,
    http: reqwest::Client,
    builtins: ToolRegistry,
}

impl ToolDispatcher {
    /// Construct a dispatcher with no registered builtins.
    pub fn new(sandbox: Arc<SandboxExecutor>) -> Self {
        Self { sandbox, http: reqwest::Client::new(), builtins: ToolRegistry::new() }
    }

    /// Attach builtin tool implementations.
    pub fn with_builtins(mut self, builtins: ToolRegistry) -> Self {
        self.builtins = builtins;
        self
    }

    /// Dispatch `tool` with `input`, bounded by `deadline` (capped by the
    /// caller's remaining budget for `inline` tools per spec.md §4.5).
    pub async fn dispatch(
        &self,
        tool: &ToolDefinition,
        input: Value,
        deadline: Duration,
    ) -> ToolCallOutcome {
        let started = Instant::now();
        let result = tokio::time::timeout(deadline, self.dispatch_inner(tool, input)).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Err(_elapsed) => ToolCallOutcome {
                output: Value::Null,
                success: false,
                error: Some(format!("tool call timed out after {}ms", deadline.as_millis())),
                duration_ms,
            },
            Ok(Ok(output)) => {
                ToolCallOutcome { output, success: true, error: None, duration_ms }
            }
            Ok(Err(message)) => {
                ToolCallOutcome { output: Value::Null, success: false, error: Some(message), duration_ms }
            }
        }
    }

    async fn dispatch_inner(&self, tool: &ToolDefinition, input: Value) -> Result<Value, String> {
        match &tool.implementation {
            ToolImplementation::Inline { artifact } => self
                .sandbox
                .execute_artifact(artifact, None, input)
                .await
                .map(|(output, _meta)| output)
                .map_err(|e| e.to_string()),
            ToolImplementation::FunctionRef { function_id, version } => self
                .sandbox
                .execute(function_id, version.as_ref(), input)
                .await
                .map(|(output, _meta)| output)
                .map_err(|e| e.to_string()),
            ToolImplementation::Api { endpoint, method, headers } => {
                self.call_api(endpoint, method, headers, input).await
            }
            ToolImplementation::Builtin { name } => {
                let tool_name = builtin_name(*name);
                let builtin = self
                    .builtins
                    .get(tool_name)
                    .ok_or_else(|| format!("builtin tool not registered: {tool_name}"))?;
                builtin.call(input).await.map_err(|e| e.to_string())
            }
        }
    }

    async fn call_api(
        &self,
        endpoint: &str,
        method: &str,
        headers: &std::collections::HashMap<String, String>,
        input: Value,
    ) -> Result<Value, String> {
        let method = reqwest::Method::from_str(&method.to_uppercase())
            .map_err(|e| format!("invalid method {method}: {e}"))?;
        let mut request = self.http.request(method.clone(), endpoint);
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if method != reqwest::Method::GET {
            request = request.json(&input);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let body_text = response.text().await.map_err(|e| e.to_string())?;

        if !status.is_success() {
            return Err(format!("{status}: {body_text}"));
        }

        Ok(serde_json::from_str(&body_text).unwrap_or(Value::String(body_text)))
    }
}

fn builtin_name(tool: BuiltinTool) -> &'static str {
    match tool {
        BuiltinTool::WebSearch => "web_search",
        BuiltinTool::WebFetch => "web_fetch",
        BuiltinTool::FileRead => "file_read",
        BuiltinTool::FileWrite => "file_write",
        BuiltinTool::ShellExec => "shell_exec",
        BuiltinTool::DatabaseQuery => "database_query",
        BuiltinTool::EmailSend => "email_send",
        BuiltinTool::SlackSend => "slack_send",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolDyn;
    use async_trait::async_trait;
    use serde_json::json;
    use std::future::Future;
    use std::pin::Pin;
    use stratum_registry::{CodeArtifact, InMemoryRegistry};
    use stratum_sandbox::{Runtime, SandboxError};

    struct EchoRuntime;

    #[async_trait]
    impl Runtime for EchoRuntime {
        async fn execute(
            &self,
            _executable: &[u8],
            _entry_point: &str,
            payload: Value,
        ) -> Result<Value, SandboxError> {
            Ok(payload)
        }
    }

    fn dispatcher() -> ToolDispatcher {
        let registry = Arc::new(InMemoryRegistry::new());
        let sandbox = Arc::new(SandboxExecutor::new(registry, Arc::new(EchoRuntime)));
        ToolDispatcher::new(sandbox)
    }

    fn inline_tool() -> ToolDefinition {
        ToolDefinition {
            name: "echo".into(),
            description: "echoes input".into(),
            input_schema: json!({"type": "object"}),
            implementation: ToolImplementation::Inline {
                artifact: CodeArtifact {
                    source: b"ignored".to_vec(),
                    compiled: Some(b"compiled".to_vec()),
                    source_map: None,
                    language: "javascript".into(),
                    entry_point: "default".into(),
                    timeout: None,
                },
            },
        }
    }

    #[tokio::test]
    async fn inline_tool_dispatches_through_sandbox() {
        let outcome = dispatcher()
            .dispatch(&inline_tool(), json!({"n": 1}), default_inline_timeout())
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.output, json!({"n": 1}));
    }

    struct FailingBuiltin;

    impl ToolDyn for FailingBuiltin {
        fn name(&self) -> &str {
            "shell_exec"
        }
        fn description(&self) -> &str {
            "runs a shell command"
        }
        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
        fn call(
            &self,
            _input: Value,
        ) -> Pin<Box<dyn Future<Output = Result<Value, crate::error::ToolError>> + Send + '_>>
        {
            Box::pin(async { Err(crate::error::ToolError::ExecutionFailed("exit code 127".into())) })
        }
    }

    #[tokio::test]
    async fn builtin_failure_preserves_error_text() {
        let mut builtins = ToolRegistry::new();
        builtins.register(Arc::new(FailingBuiltin));
        let dispatcher = ToolDispatcher::new(Arc::new(SandboxExecutor::new(
            Arc::new(InMemoryRegistry::new()),
            Arc::new(EchoRuntime),
        )))
        .with_builtins(builtins);

        let tool = ToolDefinition {
            name: "shell".into(),
            description: "".into(),
            input_schema: json!({}),
            implementation: ToolImplementation::Builtin { name: BuiltinTool::ShellExec },
        };
        let outcome = dispatcher.dispatch(&tool, json!({}), Duration::from_secs(1)).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("exit code 127"));
    }

    #[tokio::test]
    async fn unregistered_builtin_fails_without_panicking() {
        let tool = ToolDefinition {
            name: "search".into(),
            description: "".into(),
            input_schema: json!({}),
            implementation: ToolImplementation::Builtin { name: BuiltinTool::WebSearch },
        };
        let outcome = dispatcher().dispatch(&tool, json!({}), Duration::from_secs(1)).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("web_search"));
    }
}
