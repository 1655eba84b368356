//! Trace record shapes for the agentic executor (spec.md §4.4).

use serde::{Deserialize, Serialize};
use stratum_core::TokenUsage;

/// Record of one tool call attempted during an iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool name.
    pub name: String,
    /// Whether the call succeeded.
    pub success: bool,
    /// Wall-clock time spent dispatching the call.
    pub duration_ms: u64,
    /// The tool's output, when `success` is true.
    pub output: Option<serde_json::Value>,
    /// The failure message, when `success` is false.
    pub error: Option<String>,
}

/// One iteration of the think-act loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iteration {
    /// 1-based index within this invocation.
    pub index: u32,
    /// Milliseconds since the UNIX epoch when this iteration began.
    pub timestamp_start_ms: u64,
    /// Tool calls made during this iteration, in model emission order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Free-text reasoning, only ever populated when `enableReasoning`.
    pub reasoning: Option<String>,
    /// Tokens consumed by this iteration's model call.
    pub tokens: TokenUsage,
    /// Wall-clock duration of this iteration.
    pub duration_ms: u64,
}

/// How an agentic invocation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Termination {
    /// The loop ran to a final answer or exhausted `maxIterations`.
    Completed {
        /// Whether a valid final answer satisfying the output schema was produced.
        goal_achieved: bool,
    },
    /// An unrecoverable model error occurred.
    Failed {
        /// Description of the failure.
        error: String,
    },
    /// The wall-clock budget was consumed before a final answer.
    Timeout,
    /// The caller's abort signal was observed.
    Cancelled,
}

/// Full record of one agentic invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgenticOutcome {
    /// How the invocation ended.
    pub termination: Termination,
    /// The final answer, when termination produced one.
    pub output: Option<serde_json::Value>,
    /// Ordered iteration trace, complete on success, partial otherwise.
    pub trace: Vec<Iteration>,
    /// Distinct tool names invoked, in first-use order.
    pub tools_used: Vec<String>,
    /// Tokens accumulated across the whole trace.
    pub total_tokens: TokenUsage,
    /// Concatenation of per-iteration reasoning, built only when
    /// `enableReasoning` and the loop terminated.
    pub reasoning_summary: Option<String>,
}
