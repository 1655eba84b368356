//! Wire-level response envelopes (spec.md §6). Plain serde-derived
//! shapes only: the HTTP transport that would serialize these is out of
//! scope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope for a successful code-tier invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeInvocationEnvelope {
    /// The function's return value.
    pub output: Value,
    /// Execution metadata.
    #[serde(rename = "_meta")]
    pub meta: CodeInvocationMeta,
}

/// `_meta` block of a [`CodeInvocationEnvelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeInvocationMeta {
    /// Wall-clock execution time in milliseconds.
    pub duration: u64,
    /// Runtime the code actually executed under, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    /// Whether a pre-compiled artifact was used instead of compiling on
    /// the fly.
    pub used_precompiled: bool,
    /// Why a pre-compiled artifact could not be used, if it couldn't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    /// The version actually executed.
    pub version: String,
}

/// Response envelope for a generative-tier invocation, returned when
/// the caller passes `includeMetadata=true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerativeInvocationEnvelope {
    /// The model's (schema-validated) output.
    pub output: Value,
    /// Call metadata.
    pub metadata: GenerativeInvocationMetadata,
}

/// `metadata` block of a [`GenerativeInvocationEnvelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerativeInvocationMetadata {
    /// Model identifier used for the call.
    pub model: String,
    /// Token accounting for the call.
    pub tokens: GenerativeTokenBreakdown,
    /// Whether this output was served from the response cache.
    pub cached: bool,
    /// Call latency in milliseconds.
    pub latency_ms: u64,
    /// Why the model stopped generating.
    pub stop_reason: String,
}

/// Token breakdown inside [`GenerativeInvocationMetadata`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerativeTokenBreakdown {
    /// Prompt tokens.
    pub input: u64,
    /// Completion tokens.
    pub output: u64,
    /// `input + output`.
    pub total: u64,
}

/// Response envelope for an agentic-tier invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgenticInvocationEnvelope {
    /// Unique identifier for this invocation.
    pub execution_id: String,
    /// The function id invoked.
    pub function_id: String,
    /// The function version invoked.
    pub function_version: String,
    /// Terminal status: `completed`, `failed`, `timeout`, or `cancelled`.
    pub status: String,
    /// The agent's final answer, when it produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Failure message, when `status != "completed"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Invocation-level metrics.
    pub metrics: InvocationMetrics,
    /// The agent loop's own trace and summary.
    pub agentic_execution: AgenticExecutionSummary,
}

/// `metrics` block shared by the agentic and cascade envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationMetrics {
    /// Total wall-clock time in milliseconds.
    pub duration_ms: u64,
    /// Size of the request payload in bytes.
    pub input_size_bytes: u64,
    /// Size of the response payload in bytes.
    pub output_size_bytes: u64,
    /// Number of retried upstream calls across the invocation.
    pub retry_count: u32,
    /// Aggregated token usage, if any AI tier was involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<GenerativeTokenBreakdown>,
}

/// `agenticExecution` block of an [`AgenticInvocationEnvelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgenticExecutionSummary {
    /// Model identifier used across the loop.
    pub model: String,
    /// Tokens aggregated across every iteration.
    pub total_tokens: GenerativeTokenBreakdown,
    /// One entry per think-act cycle, in order.
    pub iterations: Vec<Value>,
    /// Distinct tool names invoked, in first-use order.
    pub tools_used: Vec<String>,
    /// Whether the agent's final answer satisfied its output schema.
    pub goal_achieved: bool,
    /// A short, human-readable summary of the agent's reasoning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_summary: Option<String>,
}

/// Response envelope for a cascade invocation that produced a final
/// result (as opposed to escalating to a human).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeInvocationEnvelope {
    /// The winning tier's output.
    pub output: Value,
    /// The tier that produced `output`.
    pub success_tier: String,
    /// Full attempt history, in tier evaluation order.
    pub history: Vec<Value>,
    /// Tiers skipped before or during evaluation.
    pub skipped_tiers: Vec<String>,
    /// Aggregated metrics.
    pub metrics: CascadeInvocationMetrics,
}

/// `metrics` block of a [`CascadeInvocationEnvelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeInvocationMetrics {
    /// Total wall-clock time across all attempts.
    pub total_duration_ms: u64,
    /// Wall-clock time per tier actually attempted.
    pub tier_durations: Value,
    /// Count of failed or timed-out attempts preceding the terminal
    /// outcome.
    pub escalations: u32,
    /// Retries performed by individual tiers.
    pub total_retries: u32,
    /// Tokens aggregated across any AI tiers invoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<GenerativeTokenBreakdown>,
}

/// Response envelope for a cascade invocation that escalated all the
/// way to the human tier and is awaiting external resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEnvelope {
    /// Always `"pending"`.
    pub status: String,
    /// Identifier of the created human task.
    pub task_id: String,
    /// URL where the task can be reviewed.
    pub task_url: String,
    /// Always `"human"`.
    pub tier: String,
    /// Operators assigned to the task.
    pub assignees: Vec<String>,
    /// Epoch milliseconds after which the task expires.
    pub expires_at: u64,
}

/// Uniform error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Short error kind or name.
    pub error: String,
    /// Human-readable message, when distinct from `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Raw stack trace, if the failure originated in user code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Source-map-remapped stack trace, if a source map was available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_stack: Option<String>,
}
