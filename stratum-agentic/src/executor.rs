//! The bounded think-act loop (spec.md §4.4), grounded on
//! `neuron-op-react`'s `ReactOperator::execute` main loop, generalized
//! to a fixed iteration/wall-clock budget and a typed trace instead of
//! an open-ended turn count.

use crate::error::AgenticError;
use crate::types::{AgenticOutcome, Iteration, Termination, ToolCallRecord};
use futures_util::future::join_all;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use stratum_core::{DurationMs, TokenUsage};
use stratum_llm::{
    ContentPart, Provider, ProviderError, ProviderMessage, ProviderRequest, Role, StopReason,
    ToolSchema,
};
use stratum_registry::{AgenticConfig, ToolDefinition};
use stratum_tool::ToolDispatcher;

/// Executes a single agentic-function invocation.
pub struct AgenticExecutor<P: Provider> {
    provider: P,
    dispatcher: Arc<ToolDispatcher>,
}

impl<P: Provider> AgenticExecutor<P> {
    /// Construct an executor around `provider` and `dispatcher`.
    pub fn new(provider: P, dispatcher: Arc<ToolDispatcher>) -> Self {
        Self { provider, dispatcher }
    }

    /// Drive the think-act loop for `config` against `input`, the
    /// invocation payload appended to the configured goal.
    pub async fn execute(&self, config: &AgenticConfig, input: Value) -> AgenticOutcome {
        let started = Instant::now();
        let mut remaining = config.timeout;

        let tool_schemas = build_tool_schemas(&config.tools);
        let mut messages = vec![ProviderMessage {
            role: Role::User,
            content: vec![ContentPart::Text { text: initial_message(config, &input) }],
        }];

        let mut trace: Vec<Iteration> = Vec::new();
        let mut tools_used_order: Vec<String> = Vec::new();
        let mut tools_used_set: HashSet<String> = HashSet::new();
        let mut total_tokens = TokenUsage::new(0, 0);
        let mut reasoning_parts: Vec<String> = Vec::new();
        let mut index: u32 = 1;

        loop {
            if remaining.is_exhausted() {
                tracing::warn!(iteration = index, "agentic budget exhausted");
                return finish(
                    Termination::Timeout,
                    None,
                    trace,
                    tools_used_order,
                    total_tokens,
                    reasoning_parts,
                    config.enable_reasoning,
                );
            }
            if index > config.max_iterations {
                tracing::debug!(max_iterations = config.max_iterations, "agentic loop exhausted iterations without a final answer");
                return finish(
                    Termination::Completed { goal_achieved: false },
                    None,
                    trace,
                    tools_used_order,
                    total_tokens,
                    reasoning_parts,
                    config.enable_reasoning,
                );
            }

            let timestamp_start_ms = now_ms();
            let iteration_started = Instant::now();

            let request = ProviderRequest {
                model: Some(config.model.clone()),
                messages: messages.clone(),
                tools: tool_schemas.clone(),
                max_tokens: None,
                temperature: None,
                system: Some(config.system_prompt.clone()),
                output_schema: config.output_schema.clone(),
                extra: Value::Null,
            };

            let response = match call_with_retries(&self.provider, request, remaining.to_std()).await {
                Ok(response) => response,
                Err(CallOutcome::Elapsed) => {
                    tracing::warn!(iteration = index, "agentic model call exceeded remaining budget");
                    return finish(
                        Termination::Timeout,
                        None,
                        trace,
                        tools_used_order,
                        total_tokens,
                        reasoning_parts,
                        config.enable_reasoning,
                    );
                }
                Err(CallOutcome::Provider(e)) => {
                    tracing::error!(iteration = index, error = %e, "agentic model call failed");
                    return finish(
                        Termination::Failed { error: e.to_string() },
                        None,
                        trace,
                        tools_used_order,
                        total_tokens,
                        reasoning_parts,
                        config.enable_reasoning,
                    );
                }
            };

            total_tokens = TokenUsage::new(
                total_tokens.input_tokens + response.usage.input_tokens,
                total_tokens.output_tokens + response.usage.output_tokens,
            );
            let iteration_tokens =
                TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens);

            match response.stop_reason {
                StopReason::MaxTokens => {
                    let reasoning = reasoning_for(config.enable_reasoning, &text_of(&response.content));
                    if let Some(r) = &reasoning {
                        reasoning_parts.push(r.clone());
                    }
                    trace.push(Iteration {
                        index,
                        timestamp_start_ms,
                        tool_calls: vec![],
                        reasoning,
                        tokens: iteration_tokens,
                        duration_ms: iteration_started.elapsed().as_millis() as u64,
                    });
                    return finish(
                        Termination::Failed { error: "output truncated (max_tokens)".into() },
                        None,
                        trace,
                        tools_used_order,
                        total_tokens,
                        reasoning_parts,
                        config.enable_reasoning,
                    );
                }
                StopReason::ContentFilter => {
                    let reasoning = reasoning_for(config.enable_reasoning, &text_of(&response.content));
                    if let Some(r) = &reasoning {
                        reasoning_parts.push(r.clone());
                    }
                    trace.push(Iteration {
                        index,
                        timestamp_start_ms,
                        tool_calls: vec![],
                        reasoning,
                        tokens: iteration_tokens,
                        duration_ms: iteration_started.elapsed().as_millis() as u64,
                    });
                    return finish(
                        Termination::Failed { error: "content filtered".into() },
                        None,
                        trace,
                        tools_used_order,
                        total_tokens,
                        reasoning_parts,
                        config.enable_reasoning,
                    );
                }
                StopReason::EndTurn => {
                    let text = text_of(&response.content);
                    let candidate: Value =
                        serde_json::from_str(&text).unwrap_or(Value::String(text.clone()));

                    let valid = match &config.output_schema {
                        Some(schema) => {
                            stratum_validate(schema, &candidate).is_ok()
                        }
                        None => true,
                    };

                    let reasoning = reasoning_for(config.enable_reasoning, &text);
                    if let Some(r) = &reasoning {
                        reasoning_parts.push(r.clone());
                    }

                    if valid {
                        trace.push(Iteration {
                            index,
                            timestamp_start_ms,
                            tool_calls: vec![],
                            reasoning,
                            tokens: iteration_tokens,
                            duration_ms: iteration_started.elapsed().as_millis() as u64,
                        });
                        return finish(
                            Termination::Completed { goal_achieved: true },
                            Some(candidate),
                            trace,
                            tools_used_order,
                            total_tokens,
                            reasoning_parts,
                            config.enable_reasoning,
                        );
                    }

                    // Invalid final answer: feed back as a tool-style
                    // error and let the model retry.
                    messages.push(ProviderMessage { role: Role::Assistant, content: response.content.clone() });
                    messages.push(ProviderMessage {
                        role: Role::User,
                        content: vec![ContentPart::Text {
                            text: "Your answer did not satisfy the required output schema. Please try again.".into(),
                        }],
                    });
                    trace.push(Iteration {
                        index,
                        timestamp_start_ms,
                        tool_calls: vec![],
                        reasoning,
                        tokens: iteration_tokens,
                        duration_ms: iteration_started.elapsed().as_millis() as u64,
                    });
                }
                StopReason::ToolUse => {
                    messages.push(ProviderMessage { role: Role::Assistant, content: response.content.clone() });

                    let tool_uses: Vec<(String, String, Value)> = response
                        .content
                        .iter()
                        .filter_map(|part| match part {
                            ContentPart::ToolUse { id, name, input } => {
                                Some((id.clone(), name.clone(), input.clone()))
                            }
                            _ => None,
                        })
                        .take(config.max_tool_calls_per_iteration as usize)
                        .collect();

                    let deadline = remaining.to_std();
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let calls: Vec<_> = tool_uses
                        .iter()
                        .map(|(id, name, input)| {
                            let dispatcher = Arc::clone(&dispatcher);
                            let id = id.clone();
                            let name = name.clone();
                            let input = input.clone();
                            let definition = config.tools.iter().find(|t| t.name == name).cloned();
                            async move {
                                match definition {
                                    Some(definition) => {
                                        let outcome = dispatcher.dispatch(&definition, input, deadline).await;
                                        (id, name, outcome)
                                    }
                                    None => {
                                        let outcome = stratum_tool::ToolCallOutcome {
                                            output: Value::Null,
                                            success: false,
                                            error: Some(format!("unknown tool: {name}")),
                                            duration_ms: 0,
                                        };
                                        (id, name, outcome)
                                    }
                                }
                            }
                        })
                        .collect();

                    let results = join_all(calls).await;

                    let reasoning = reasoning_for(config.enable_reasoning, &text_of(&response.content));
                    if let Some(r) = &reasoning {
                        reasoning_parts.push(r.clone());
                    }

                    let mut tool_call_records = Vec::with_capacity(results.len());
                    let mut tool_result_parts = Vec::with_capacity(results.len());
                    for (id, name, outcome) in results {
                        if tools_used_set.insert(name.clone()) {
                            tools_used_order.push(name.clone());
                        }
                        tool_result_parts.push(ContentPart::ToolResult {
                            tool_use_id: id,
                            content: outcome
                                .error
                                .clone()
                                .unwrap_or_else(|| outcome.output.to_string()),
                            is_error: !outcome.success,
                        });
                        tool_call_records.push(ToolCallRecord {
                            name,
                            success: outcome.success,
                            duration_ms: outcome.duration_ms,
                            output: outcome.success.then_some(outcome.output),
                            error: outcome.error,
                        });
                    }

                    messages.push(ProviderMessage { role: Role::User, content: tool_result_parts });

                    trace.push(Iteration {
                        index,
                        timestamp_start_ms,
                        tool_calls: tool_call_records,
                        reasoning,
                        tokens: iteration_tokens,
                        duration_ms: iteration_started.elapsed().as_millis() as u64,
                    });
                }
            }

            remaining = remaining.saturating_sub(DurationMs::from_millis(
                iteration_started.elapsed().as_millis() as u64,
            ));
            index += 1;
        }
    }
}

enum CallOutcome {
    Elapsed,
    Provider(ProviderError),
}

/// 2 additional retries, no backoff, then surfaces the provider error
/// (Open Question 1, shared with `stratum-generative`).
async fn call_with_retries<P: Provider>(
    provider: &P,
    request: ProviderRequest,
    deadline: std::time::Duration,
) -> Result<stratum_llm::ProviderResponse, CallOutcome> {
    let mut attempts = 0;
    loop {
        match tokio::time::timeout(deadline, provider.complete(request.clone())).await {
            Err(_elapsed) => return Err(CallOutcome::Elapsed),
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(e)) if e.is_retryable() && attempts < 2 => {
                attempts += 1;
                continue;
            }
            Ok(Err(e)) => return Err(CallOutcome::Provider(e)),
        }
    }
}

fn build_tool_schemas(tools: &[ToolDefinition]) -> Vec<ToolSchema> {
    tools
        .iter()
        .map(|t| ToolSchema {
            name: t.name.clone(),
            description: t.description.clone(),
            input_schema: t.input_schema.clone(),
        })
        .collect()
}

fn initial_message(config: &AgenticConfig, input: &Value) -> String {
    if input.is_null() {
        config.goal.clone()
    } else {
        format!("{}\n\nInput: {input}", config.goal)
    }
}

fn text_of(content: &[ContentPart]) -> String {
    content
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

fn reasoning_for(enabled: bool, text: &str) -> Option<String> {
    if enabled && !text.is_empty() {
        Some(text.to_string())
    } else {
        None
    }
}

fn stratum_validate(schema: &Value, instance: &Value) -> Result<(), AgenticError> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| AgenticError::SchemaValidationError(e.to_string()))?;
    if let Some(err) = validator.iter_errors(instance).next() {
        return Err(AgenticError::SchemaValidationError(err.to_string()));
    }
    Ok(())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[allow(clippy::too_many_arguments)]
fn finish(
    termination: Termination,
    output: Option<Value>,
    trace: Vec<Iteration>,
    tools_used: Vec<String>,
    total_tokens: TokenUsage,
    reasoning_parts: Vec<String>,
    enable_reasoning: bool,
) -> AgenticOutcome {
    let reasoning_summary = if enable_reasoning && !reasoning_parts.is_empty() {
        Some(reasoning_parts.join("\n"))
    } else {
        None
    };
    AgenticOutcome { termination, output, trace, tools_used, total_tokens, reasoning_summary }
}
