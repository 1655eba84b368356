//! The generative executor: one templated LLM round-trip per invocation
//! (spec.md §4.3), grounded on `neuron-op-single-shot`'s "one model
//! call, no tools" shape, generalized with templating, schema
//! validation, and caching.

use crate::cache::{cache_key, CacheKeyInputs, CachedResponse, ResponseCache};
use crate::error::GenerativeError;
use crate::schema;
use crate::template::render_template;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use stratum_core::{DurationMs, FunctionId, TokenUsage, Version};
use stratum_llm::{ContentPart, Provider, ProviderMessage, ProviderRequest, Role, StopReason};
use stratum_registry::GenerativeConfig;

/// Metadata attached to every generative-call result.
#[derive(Debug, Clone)]
pub struct GenerativeMetadata {
    /// Model that produced the response.
    pub model: String,
    /// Token accounting for this call (zeroed on a cache hit).
    pub tokens: TokenUsage,
    /// Whether the response was served from cache.
    pub cached: bool,
    /// Wall-clock time spent in this call.
    pub latency_ms: u64,
    /// The provider's stop reason, when not served from cache.
    pub stop_reason: Option<StopReason>,
}

/// Executes a single generative-function invocation.
pub struct GenerativeExecutor<P: Provider> {
    provider: P,
    cache: Arc<ResponseCache>,
}

impl<P: Provider> GenerativeExecutor<P> {
    /// Construct an executor around `provider`, backed by a fresh cache.
    pub fn new(provider: P) -> Self {
        Self { provider, cache: Arc::new(ResponseCache::new()) }
    }

    /// Construct an executor sharing `cache` with other executors (e.g.
    /// across invocations of the same function version).
    pub fn with_cache(provider: P, cache: Arc<ResponseCache>) -> Self {
        Self { provider, cache }
    }

    /// Invoke `config` for function `id`@`version` with the given
    /// template `variables`.
    pub async fn execute(
        &self,
        id: &FunctionId,
        version: &Version,
        config: &GenerativeConfig,
        variables: &Map<String, Value>,
    ) -> Result<(Value, GenerativeMetadata), GenerativeError> {
        let started = Instant::now();

        let user_prompt = render_template(&config.user_prompt_template, variables)?;

        if let Some(schema) = &config.output_schema {
            schema::check_satisfiable(schema)?;
        }

        let model = config.model.clone();

        if config.cache_enabled {
            let key = cache_key(&CacheKeyInputs {
                id,
                version,
                resolved_prompt: &user_prompt,
                model: &model,
                temperature: config.temperature,
                output_schema: config.output_schema.as_ref(),
            });
            if let Some(cached) = self.cache.get(&key).await {
                return Ok((
                    cached.output,
                    GenerativeMetadata {
                        model: cached.model,
                        tokens: TokenUsage::new(0, 0),
                        cached: true,
                        latency_ms: started.elapsed().as_millis() as u64,
                        stop_reason: None,
                    },
                ));
            }

            let (output, tokens, stop_reason) =
                self.call_and_validate(config, &user_prompt, &model).await?;

            self.cache
                .put(
                    key,
                    CachedResponse { output: output.clone(), tokens: tokens.clone(), model: model.clone() },
                    config.cache_ttl.unwrap_or(default_cache_ttl()).to_std(),
                )
                .await;

            return Ok((
                output,
                GenerativeMetadata {
                    model,
                    tokens,
                    cached: false,
                    latency_ms: started.elapsed().as_millis() as u64,
                    stop_reason: Some(stop_reason),
                },
            ));
        }

        let (output, tokens, stop_reason) =
            self.call_and_validate(config, &user_prompt, &model).await?;
        Ok((
            output,
            GenerativeMetadata {
                model,
                tokens,
                cached: false,
                latency_ms: started.elapsed().as_millis() as u64,
                stop_reason: Some(stop_reason),
            },
        ))
    }

    async fn call_and_validate(
        &self,
        config: &GenerativeConfig,
        user_prompt: &str,
        model: &str,
    ) -> Result<(Value, TokenUsage, StopReason), GenerativeError> {
        let request = ProviderRequest {
            model: Some(model.to_string()),
            messages: vec![ProviderMessage {
                role: Role::User,
                content: vec![ContentPart::Text { text: user_prompt.to_string() }],
            }],
            tools: vec![],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system: Some(config.system_prompt.clone()),
            output_schema: config.output_schema.clone(),
            extra: Value::Null,
        };

        let response = retry_complete(&self.provider, request).await?;

        let text = response
            .content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let output: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if let Some(schema) = &config.output_schema {
            schema::validate_against(schema, &output)?;
        }

        let tokens = TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens);
        Ok((output, tokens, response.stop_reason))
    }
}

/// 2 additional retries, no backoff, then surfaces as an upstream error
/// (Open Question 1: chosen for deterministic test behavior).
async fn retry_complete<P: Provider>(
    provider: &P,
    request: ProviderRequest,
) -> Result<stratum_llm::ProviderResponse, GenerativeError> {
    let mut attempts = 0;
    loop {
        match provider.complete(request.clone()).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_retryable() && attempts < 2 => {
                attempts += 1;
                continue;
            }
            Err(e) => return Err(GenerativeError::Upstream(e)),
        }
    }
}

fn default_cache_ttl() -> DurationMs {
    DurationMs::from_secs(300)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stratum_llm::MockProvider;
    use stratum_llm::{ProviderResponse, TokenUsage as LlmTokenUsage};

    fn text_response(text: &str) -> ProviderResponse {
        ProviderResponse {
            content: vec![ContentPart::Text { text: text.to_string() }],
            stop_reason: StopReason::EndTurn,
            usage: LlmTokenUsage { input_tokens: 10, output_tokens: 5 },
            model: "mock-model".into(),
            cost: None,
        }
    }

    fn config() -> GenerativeConfig {
        GenerativeConfig {
            model: "mock-model".into(),
            system_prompt: "You are terse.".into(),
            user_prompt_template: "Summarize: {{text}}".into(),
            output_schema: None,
            temperature: Some(0.0),
            max_tokens: Some(100),
            examples: vec![],
            cache_enabled: false,
            cache_ttl: None,
        }
    }

    fn vars(text: &str) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("text".into(), json!(text));
        m
    }

    #[tokio::test]
    async fn executes_and_populates_metadata() {
        let provider = MockProvider::new(vec![Ok(text_response("a short summary"))]);
        let executor = GenerativeExecutor::new(provider);
        let (output, meta) = executor
            .execute(&FunctionId::new("f1"), &Version::new("v1"), &config(), &vars("long text"))
            .await
            .unwrap();
        assert_eq!(output, json!("a short summary"));
        assert_eq!(meta.tokens.total_tokens, 15);
        assert!(!meta.cached);
    }

    #[tokio::test]
    async fn missing_variable_fails_before_any_call() {
        let provider = MockProvider::new(vec![Ok(text_response("unused"))]);
        let executor = GenerativeExecutor::new(provider);
        let err = executor
            .execute(&FunctionId::new("f1"), &Version::new("v1"), &config(), &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerativeError::MissingVariable(_)));
        assert_eq!(executor.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn cache_hit_skips_second_call() {
        let provider = MockProvider::new(vec![Ok(text_response("cached result"))]);
        let executor = GenerativeExecutor::new(provider);
        let mut cfg = config();
        cfg.cache_enabled = true;

        let (first, meta1) = executor
            .execute(&FunctionId::new("f1"), &Version::new("v1"), &cfg, &vars("same input"))
            .await
            .unwrap();
        let (second, meta2) = executor
            .execute(&FunctionId::new("f1"), &Version::new("v1"), &cfg, &vars("same input"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert!(!meta1.cached);
        assert!(meta2.cached);
        assert_eq!(executor.provider.call_count(), 1);
    }

    #[tokio::test]
    async fn schema_validation_failure_surfaces() {
        let provider = MockProvider::new(vec![Ok(text_response("not json"))]);
        let executor = GenerativeExecutor::new(provider);
        let mut cfg = config();
        cfg.output_schema = Some(json!({"type": "object", "required": ["sum"]}));
        let err = executor
            .execute(&FunctionId::new("f1"), &Version::new("v1"), &cfg, &vars("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerativeError::SchemaValidationError(_)));
    }

    #[tokio::test]
    async fn impossible_schema_fails_before_any_call() {
        let provider = MockProvider::new(vec![Ok(text_response("unused"))]);
        let executor = GenerativeExecutor::new(provider);
        let mut cfg = config();
        cfg.output_schema = Some(json!({"type": "integer", "minimum": 10, "maximum": 1}));
        let err = executor
            .execute(&FunctionId::new("f1"), &Version::new("v1"), &cfg, &vars("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerativeError::ImpossibleSchema(_)));
        assert_eq!(executor.provider.call_count(), 0);
    }
}
