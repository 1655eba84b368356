//! Ordered tier escalation (spec.md §4.6), grounded on
//! `neuron-orch-local::LocalOrch::dispatch`'s lookup-then-invoke shape,
//! generalized into a loop that escalates on failure instead of
//! returning the first error.

use crate::tier::TierExecutor;
use crate::types::{
    AttemptStatus, CascadeAttempt, CascadeMetrics, CascadeOutcome, HumanTask, PreviousError,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use stratum_core::DurationMs;
use stratum_registry::{CascadeConfig, Tier};
use uuid::Uuid;

/// Drives one invocation through `config`'s ordered tier list.
pub struct CascadeExecutor {
    config: CascadeConfig,
    tiers: HashMap<Tier, Arc<dyn TierExecutor>>,
}

impl CascadeExecutor {
    /// Construct an executor for `config`, with `tiers` mapping each
    /// non-human tier named in `config.tiers` to its adapter. The human
    /// tier, if present, needs no entry: it never invokes an executor.
    pub fn new(config: CascadeConfig, tiers: HashMap<Tier, Arc<dyn TierExecutor>>) -> Self {
        Self { config, tiers }
    }

    /// Run the cascade against `input`, the original invocation payload
    /// (also used as generative/agentic template variables).
    pub async fn execute(&self, input: Map<String, Value>) -> CascadeOutcome {
        let started = Instant::now();
        let (mut skipped_tiers, active) = self.active_sequence();
        let mut remaining_global = self.config.total_timeout;
        let mut history = Vec::new();
        let mut tier_durations: HashMap<Tier, u64> = HashMap::new();
        let mut escalations = 0u32;
        let mut previous_error: Option<PreviousError> = None;

        for (idx, tier) in active.iter().enumerate() {
            if *tier == Tier::Human {
                tracing::info!("cascade escalated to human tier");
                let task = self.create_human_task();
                skipped_tiers.extend(active[idx + 1..].iter().copied());
                let metrics = Self::metrics(started, tier_durations, escalations);
                return CascadeOutcome::Pending { task, history, skipped_tiers, metrics };
            }

            if remaining_global.is_exhausted() {
                skipped_tiers.extend(active[idx..].iter().copied());
                let metrics = Self::metrics(started, tier_durations, escalations);
                return CascadeOutcome::Failed {
                    error: "cascade global timeout exhausted before any tier completed".into(),
                    history,
                    skipped_tiers,
                    metrics,
                };
            }

            let deadline_ms = std::cmp::min(self.config.tier_timeout.as_millis(), remaining_global.as_millis());
            let variables = self.augment(&input, previous_error.as_ref());
            let attempt_start = Instant::now();

            let outcome = match self.tiers.get(tier) {
                Some(executor) => {
                    tokio::time::timeout(Duration::from_millis(deadline_ms), executor.invoke(variables)).await
                }
                None => Ok(Err(stratum_core::CoreError::UpstreamError(format!(
                    "no executor configured for tier {tier:?}"
                )))),
            };

            let duration_ms = attempt_start.elapsed().as_millis() as u64;
            *tier_durations.entry(*tier).or_insert(0) += duration_ms;
            remaining_global = remaining_global.saturating_sub(DurationMs::from_millis(duration_ms));

            match outcome {
                Ok(Ok(output)) => {
                    history.push(CascadeAttempt {
                        tier: *tier,
                        attempt: 1,
                        status: AttemptStatus::Completed,
                        duration_ms,
                        error: None,
                    });
                    skipped_tiers.extend(active[idx + 1..].iter().copied());
                    let metrics = Self::metrics(started, tier_durations, escalations);
                    return CascadeOutcome::Completed {
                        output,
                        success_tier: *tier,
                        history,
                        skipped_tiers,
                        metrics,
                    };
                }
                Ok(Err(e)) => {
                    tracing::debug!(tier = ?tier, error = %e, "cascade tier failed, escalating");
                    history.push(CascadeAttempt {
                        tier: *tier,
                        attempt: 1,
                        status: AttemptStatus::Failed,
                        duration_ms,
                        error: Some(e.to_string()),
                    });
                    escalations += 1;
                    previous_error = Some(PreviousError { tier: *tier, message: e.to_string() });
                }
                Err(_elapsed) => {
                    let message = format!("tier {tier:?} timeout after {duration_ms}ms");
                    tracing::warn!(tier = ?tier, "cascade tier timed out, escalating");
                    history.push(CascadeAttempt {
                        tier: *tier,
                        attempt: 1,
                        status: AttemptStatus::Timeout,
                        duration_ms,
                        error: Some(message.clone()),
                    });
                    escalations += 1;
                    previous_error = Some(PreviousError { tier: *tier, message });
                }
            }
        }

        let metrics = Self::metrics(started, tier_durations, escalations);
        let error = previous_error
            .map(|e| e.message)
            .unwrap_or_else(|| "cascade exhausted all tiers".into());
        CascadeOutcome::Failed { error, history, skipped_tiers, metrics }
    }

    fn active_sequence(&self) -> (Vec<Tier>, Vec<Tier>) {
        let start_idx = self
            .config
            .tiers
            .iter()
            .position(|t| *t == self.config.start_tier)
            .unwrap_or(0);
        let mut skipped: Vec<Tier> = self.config.tiers[..start_idx].to_vec();
        let mut active = Vec::new();
        for tier in &self.config.tiers[start_idx..] {
            if self.config.skip_tiers.contains(tier) {
                skipped.push(*tier);
            } else {
                active.push(*tier);
            }
        }
        (skipped, active)
    }

    fn create_human_task(&self) -> HumanTask {
        let task_id = Uuid::new_v4().to_string();
        let task_url = format!("https://tasks.stratum.internal/{task_id}");
        HumanTask {
            task_id,
            task_url,
            assignees: self.config.human_assignees.clone(),
            expires_at_ms: now_ms() + self.config.human_task_ttl.as_millis(),
        }
    }

    fn augment(&self, input: &Map<String, Value>, previous_error: Option<&PreviousError>) -> Map<String, Value> {
        let mut variables = input.clone();
        if let Some(prev) = previous_error {
            let tier_name = tier_name(prev.tier);
            variables.insert("context.previousTier".into(), Value::String(tier_name.clone()));
            variables.insert("context.previousError.tier".into(), Value::String(tier_name));
            variables.insert(
                "context.previousError.message".into(),
                Value::String(prev.message.clone()),
            );
        }
        variables
    }

    fn metrics(started: Instant, tier_durations: HashMap<Tier, u64>, escalations: u32) -> CascadeMetrics {
        CascadeMetrics {
            total_duration_ms: started.elapsed().as_millis() as u64,
            tier_durations,
            escalations,
            total_retries: 0,
            tokens: None,
        }
    }
}

fn tier_name(tier: Tier) -> String {
    match tier {
        Tier::Code => "code",
        Tier::Generative => "generative",
        Tier::Agentic => "agentic",
        Tier::Human => "human",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use stratum_core::CoreError;
    use tokio::time::sleep;

    struct FixedTier(Result<Value, String>);

    #[async_trait]
    impl TierExecutor for FixedTier {
        async fn invoke(&self, _variables: Map<String, Value>) -> Result<Value, CoreError> {
            match &self.0 {
                Ok(v) => Ok(v.clone()),
                Err(message) => Err(CoreError::UpstreamError(message.clone())),
            }
        }
    }

    struct SlowTier(Duration);

    #[async_trait]
    impl TierExecutor for SlowTier {
        async fn invoke(&self, _variables: Map<String, Value>) -> Result<Value, CoreError> {
            sleep(self.0).await;
            Ok(Value::Null)
        }
    }

    fn base_config(tiers: Vec<Tier>) -> CascadeConfig {
        CascadeConfig {
            tiers,
            start_tier: Tier::Code,
            skip_tiers: vec![],
            total_timeout: DurationMs::from_secs(5),
            tier_timeout: DurationMs::from_secs(2),
            human_assignees: vec!["oncall@example.com".into()],
            human_task_ttl: DurationMs::from_secs(3600),
        }
    }

    #[tokio::test]
    async fn code_tier_success_short_circuits() {
        let config = base_config(vec![Tier::Code, Tier::Generative]);
        let mut tiers: HashMap<Tier, Arc<dyn TierExecutor>> = HashMap::new();
        tiers.insert(Tier::Code, Arc::new(FixedTier(Ok(json!({"sum": 3})))));
        tiers.insert(Tier::Generative, Arc::new(FixedTier(Ok(json!("unused")))));
        let executor = CascadeExecutor::new(config, tiers);
        let outcome = executor.execute(Map::new()).await;
        match outcome {
            CascadeOutcome::Completed { output, success_tier, history, skipped_tiers, metrics } => {
                assert_eq!(output, json!({"sum": 3}));
                assert_eq!(success_tier, Tier::Code);
                assert_eq!(history.len(), 1);
                assert_eq!(skipped_tiers, vec![Tier::Generative]);
                assert_eq!(metrics.escalations, 0);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn escalates_through_failing_tiers_to_success() {
        let config = base_config(vec![Tier::Code, Tier::Generative, Tier::Agentic]);
        let mut tiers: HashMap<Tier, Arc<dyn TierExecutor>> = HashMap::new();
        tiers.insert(Tier::Code, Arc::new(FixedTier(Err("code blew up".into()))));
        tiers.insert(Tier::Generative, Arc::new(FixedTier(Err("model refused".into()))));
        tiers.insert(Tier::Agentic, Arc::new(FixedTier(Ok(json!("recovered")))));
        let executor = CascadeExecutor::new(config, tiers);
        let outcome = executor.execute(Map::new()).await;
        match outcome {
            CascadeOutcome::Completed { success_tier, history, metrics, .. } => {
                assert_eq!(success_tier, Tier::Agentic);
                assert_eq!(history.len(), 3);
                assert_eq!(metrics.escalations, 2);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_tiers_fail_without_human_returns_failed() {
        let config = base_config(vec![Tier::Code, Tier::Generative]);
        let mut tiers: HashMap<Tier, Arc<dyn TierExecutor>> = HashMap::new();
        tiers.insert(Tier::Code, Arc::new(FixedTier(Err("a".into()))));
        tiers.insert(Tier::Generative, Arc::new(FixedTier(Err("b".into()))));
        let executor = CascadeExecutor::new(config, tiers);
        let outcome = executor.execute(Map::new()).await;
        match outcome {
            CascadeOutcome::Failed { error, .. } => assert_eq!(error, "b"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reaching_human_tier_creates_pending_task() {
        let config = base_config(vec![Tier::Code, Tier::Human]);
        let mut tiers: HashMap<Tier, Arc<dyn TierExecutor>> = HashMap::new();
        tiers.insert(Tier::Code, Arc::new(FixedTier(Err("nope".into()))));
        let executor = CascadeExecutor::new(config, tiers);
        let outcome = executor.execute(Map::new()).await;
        match outcome {
            CascadeOutcome::Pending { task, history, .. } => {
                assert_eq!(task.assignees, vec!["oncall@example.com".to_string()]);
                assert_eq!(history.len(), 1);
            }
            other => panic!("expected Pending, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tier_timeout_message_matches_timeout_pattern() {
        let mut config = base_config(vec![Tier::Code, Tier::Generative]);
        config.tier_timeout = DurationMs::from_millis(10);
        let mut tiers: HashMap<Tier, Arc<dyn TierExecutor>> = HashMap::new();
        tiers.insert(Tier::Code, Arc::new(SlowTier(Duration::from_millis(200))));
        tiers.insert(Tier::Generative, Arc::new(FixedTier(Ok(json!("ok")))));
        let executor = CascadeExecutor::new(config, tiers);
        let outcome = executor.execute(Map::new()).await;
        match outcome {
            CascadeOutcome::Completed { history, .. } => {
                assert_eq!(history[0].status, AttemptStatus::Timeout);
                assert!(history[0].error.as_ref().unwrap().to_lowercase().contains("timeout"));
            }
            other => panic!("expected Completed (after escalation), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn previous_error_is_threaded_into_next_tier_context() {
        struct CaptureTier(std::sync::Mutex<Option<Map<String, Value>>>);

        #[async_trait]
        impl TierExecutor for CaptureTier {
            async fn invoke(&self, variables: Map<String, Value>) -> Result<Value, CoreError> {
                *self.0.lock().unwrap() = Some(variables);
                Ok(Value::Null)
            }
        }

        let config = base_config(vec![Tier::Code, Tier::Generative]);
        let capture = Arc::new(CaptureTier(std::sync::Mutex::new(None)));
        let mut tiers: HashMap<Tier, Arc<dyn TierExecutor>> = HashMap::new();
        tiers.insert(Tier::Code, Arc::new(FixedTier(Err("boom".into()))));
        tiers.insert(Tier::Generative, capture.clone());
        let executor = CascadeExecutor::new(config, tiers);
        executor.execute(Map::new()).await;

        let captured = capture.0.lock().unwrap().clone().unwrap();
        assert_eq!(captured.get("context.previousTier"), Some(&json!("code")));
        assert_eq!(captured.get("context.previousError.message"), Some(&json!("boom")));
    }
}
