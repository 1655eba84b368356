//! Data model for deployed functions (spec.md §3).

use serde::{Deserialize, Serialize};
use stratum_core::{DurationMs, FunctionId, OwnerId, Version};
use std::time::SystemTime;

/// The four escalation tiers / function capability classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionType {
    /// A sandboxed code artifact.
    Code,
    /// A single templated LLM call.
    Generative,
    /// A bounded think-act agent loop.
    Agentic,
    /// An ordered composition of tiers behind one function id.
    Cascade,
}

/// One escalation tier within a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// The code tier.
    Code,
    /// The generative tier.
    Generative,
    /// The agentic tier.
    Agentic,
    /// The human tier.
    Human,
}

/// Versioned, immutable source (and optional compiled form) for a code
/// function. One per `(id, version)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeArtifact {
    /// Raw source bytes.
    pub source: Vec<u8>,
    /// Pre-compiled artifact, if one was supplied or produced on-demand.
    pub compiled: Option<Vec<u8>>,
    /// Optional source map for stack-trace remapping.
    pub source_map: Option<String>,
    /// Source language identifier (e.g. `"javascript"`, `"python"`).
    pub language: String,
    /// Name of the exported entry point to invoke.
    pub entry_point: String,
    /// Per-call timeout override; falls back to the sandbox default (5s).
    pub timeout: Option<DurationMs>,
}

/// Configuration for a generative (single-LLM-call) function version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerativeConfig {
    /// Model identifier.
    pub model: String,
    /// Base system prompt.
    pub system_prompt: String,
    /// User prompt template with `{{name}}` placeholders.
    pub user_prompt_template: String,
    /// JSON Schema the output must validate against, if any.
    pub output_schema: Option<serde_json::Value>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Maximum output tokens.
    pub max_tokens: Option<u32>,
    /// Few-shot examples passed through to the provider.
    #[serde(default)]
    pub examples: Vec<serde_json::Value>,
    /// Whether successful responses are cached by prompt digest.
    #[serde(default)]
    pub cache_enabled: bool,
    /// Cache entry time-to-live.
    pub cache_ttl: Option<DurationMs>,
}

/// How a tool is implemented (spec.md §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ToolImplementation {
    /// User-provided code executed in the sandbox.
    Inline {
        /// The code artifact to run for this tool.
        artifact: CodeArtifact,
    },
    /// Invoke another deployed function by id.
    FunctionRef {
        /// The target function id.
        function_id: FunctionId,
        /// Optional pinned version; defaults to active version.
        version: Option<Version>,
    },
    /// An HTTP request.
    Api {
        /// The request URL.
        endpoint: String,
        /// HTTP method.
        method: String,
        /// Request headers.
        #[serde(default)]
        headers: std::collections::HashMap<String, String>,
    },
    /// A registered built-in from the closed set.
    Builtin {
        /// Which built-in to dispatch to.
        name: BuiltinTool,
    },
}

/// The closed set of built-in tools (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinTool {
    /// Web search.
    WebSearch,
    /// Fetch a URL.
    WebFetch,
    /// Read a file.
    FileRead,
    /// Write a file.
    FileWrite,
    /// Execute a shell command.
    ShellExec,
    /// Query a database.
    DatabaseQuery,
    /// Send an email.
    EmailSend,
    /// Post a Slack message.
    SlackSend,
}

/// One tool available to an agentic function, part of [`AgenticConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, unique within the owning function.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema for the tool's input.
    pub input_schema: serde_json::Value,
    /// How the tool is actually executed.
    pub implementation: ToolImplementation,
}

/// Configuration for an agentic (bounded think-act loop) function version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgenticConfig {
    /// Model identifier.
    pub model: String,
    /// Base system prompt.
    pub system_prompt: String,
    /// The goal the agent is driving toward.
    pub goal: String,
    /// Tools available to the agent.
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    /// Maximum iterations before giving up. Defaults to 10.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Maximum tool calls accepted from a single model response.
    /// Defaults to 5.
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls_per_iteration: u32,
    /// Whether to request and record reasoning text per iteration.
    #[serde(default)]
    pub enable_reasoning: bool,
    /// Whether the agent may read/write cross-invocation memory.
    #[serde(default)]
    pub enable_memory: bool,
    /// JSON Schema the final answer must validate against, if any.
    pub output_schema: Option<serde_json::Value>,
    /// Overall wall-clock budget. Defaults to 5 minutes.
    #[serde(default = "default_agentic_timeout")]
    pub timeout: DurationMs,
}

fn default_max_iterations() -> u32 {
    10
}

fn default_max_tool_calls() -> u32 {
    5
}

fn default_agentic_timeout() -> DurationMs {
    DurationMs::from_secs(300)
}

impl Default for AgenticConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            system_prompt: String::new(),
            goal: String::new(),
            tools: Vec::new(),
            max_iterations: default_max_iterations(),
            max_tool_calls_per_iteration: default_max_tool_calls(),
            enable_reasoning: false,
            enable_memory: false,
            output_schema: None,
            timeout: default_agentic_timeout(),
        }
    }
}

/// Configuration for a cascade function version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Ordered tier list, e.g. `[Code, Generative, Agentic, Human]`.
    pub tiers: Vec<Tier>,
    /// The first tier to attempt.
    pub start_tier: Tier,
    /// Tiers to skip even though present in `tiers`.
    #[serde(default)]
    pub skip_tiers: Vec<Tier>,
    /// Global deadline across the whole cascade.
    pub total_timeout: DurationMs,
    /// Per-tier timeout, capped by the remaining global budget.
    pub tier_timeout: DurationMs,
    /// Assignees for the `HumanTask` created when escalation reaches
    /// the human tier.
    #[serde(default)]
    pub human_assignees: Vec<String>,
    /// How long a created `HumanTask` remains open before expiring.
    #[serde(default = "default_human_task_ttl")]
    pub human_task_ttl: DurationMs,
}

fn default_human_task_ttl() -> DurationMs {
    DurationMs::from_secs(86_400)
}

/// Per-function-type configuration, stored as part of [`FunctionMetadata`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FunctionConfig {
    /// Code functions carry no top-level config beyond their artifact.
    Code,
    /// Generative function configuration.
    Generative(GenerativeConfig),
    /// Agentic function configuration.
    Agentic(AgenticConfig),
    /// Cascade function configuration.
    Cascade(CascadeConfig),
}

/// Durable metadata for one deployed function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionMetadata {
    /// The function's immutable id.
    pub id: FunctionId,
    /// Function capability class.
    pub function_type: FunctionType,
    /// The version currently serving invocations.
    pub active_version: Version,
    /// All versions ever deployed, in deploy order.
    pub versions: Vec<Version>,
    /// When this function was first deployed.
    pub created_at: SystemTime,
    /// When metadata was last mutated (deploy/rollback).
    pub updated_at: SystemTime,
    /// Owning principal.
    pub owner: OwnerId,
    /// Scopes a caller must hold to invoke this function.
    pub scopes_required: Vec<String>,
    /// Type-specific configuration for the active version.
    pub config: FunctionConfig,
    /// Set by `rollback`; the version rolled back from, for audit.
    pub rolled_back_from: Option<Version>,
}

impl FunctionMetadata {
    /// `activeVersion ∈ versions` — the global invariant from spec.md §3.
    pub fn invariant_active_version_in_versions(&self) -> bool {
        self.versions.contains(&self.active_version)
    }
}
