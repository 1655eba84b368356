//! Record shapes for one cascade invocation (spec.md §4.6).

use serde::{Deserialize, Serialize};
use stratum_core::TokenUsage;
use stratum_registry::Tier;
use std::collections::HashMap;

/// Outcome of one attempt at one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// The tier produced a usable result.
    Completed,
    /// The tier failed for a reason other than timeout.
    Failed,
    /// The tier's deadline elapsed before it produced a result.
    Timeout,
    /// The tier was never attempted, either before `startTier` or named
    /// in `skipTiers`.
    Skipped,
}

/// One entry in the cascade's attempt history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeAttempt {
    /// Tier this attempt targeted.
    pub tier: Tier,
    /// 1-based attempt index within this tier (always 1: tiers are not
    /// internally retried, they escalate instead).
    pub attempt: u32,
    /// How the attempt ended.
    pub status: AttemptStatus,
    /// Wall-clock time spent on this attempt.
    pub duration_ms: u64,
    /// Failure message, set when `status` is `Failed` or `Timeout`.
    pub error: Option<String>,
}

/// The previous tier's failure, threaded into the next tier's context.
#[derive(Debug, Clone)]
pub struct PreviousError {
    /// The tier that failed.
    pub tier: Tier,
    /// Its failure message.
    pub message: String,
}

/// A task created for a human operator when escalation reaches the
/// human tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanTask {
    /// Unique task identifier.
    pub task_id: String,
    /// URL where the task can be reviewed.
    pub task_url: String,
    /// Operators assigned to this task.
    pub assignees: Vec<String>,
    /// Epoch milliseconds after which the task expires.
    pub expires_at_ms: u64,
}

/// Aggregated metrics across a cascade invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CascadeMetrics {
    /// Total wall-clock time across all attempts.
    pub total_duration_ms: u64,
    /// Wall-clock time per tier actually attempted.
    pub tier_durations: HashMap<Tier, u64>,
    /// Count of failed or timed-out attempts preceding the terminal outcome.
    pub escalations: u32,
    /// Retries performed by individual tiers (always 0: tiers escalate
    /// rather than retry internally; reserved for a future per-tier
    /// retry policy).
    pub total_retries: u32,
    /// Tokens aggregated across any AI tiers invoked.
    pub tokens: Option<TokenUsage>,
}

/// Final result of a cascade invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CascadeOutcome {
    /// A tier produced a usable result.
    Completed {
        /// The winning tier's output.
        output: serde_json::Value,
        /// The tier that succeeded.
        success_tier: Tier,
        /// Full attempt history, in tier evaluation order.
        history: Vec<CascadeAttempt>,
        /// Tiers skipped before or during evaluation.
        skipped_tiers: Vec<Tier>,
        /// Aggregated metrics.
        metrics: CascadeMetrics,
    },
    /// Every tier failed and the last tier was not `Human`.
    Failed {
        /// The last tier's failure message.
        error: String,
        /// Full attempt history.
        history: Vec<CascadeAttempt>,
        /// Tiers skipped before or during evaluation.
        skipped_tiers: Vec<Tier>,
        /// Aggregated metrics.
        metrics: CascadeMetrics,
    },
    /// Every AI/code tier failed and escalation reached the human tier.
    Pending {
        /// The created task.
        task: HumanTask,
        /// Full attempt history.
        history: Vec<CascadeAttempt>,
        /// Tiers skipped before or during evaluation.
        skipped_tiers: Vec<Tier>,
        /// Aggregated metrics.
        metrics: CascadeMetrics,
    },
}
