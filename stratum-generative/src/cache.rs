//! Content-addressed response cache (spec.md §4.3 step 4, Open Question
//! 3: the digest is SHA-256 over canonical JSON of the call's identity).

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use stratum_core::{FunctionId, Version};
use tokio::sync::Mutex;

/// Inputs that make a generative call deterministic-cacheable.
pub struct CacheKeyInputs<'a> {
    /// The function id.
    pub id: &'a FunctionId,
    /// The version.
    pub version: &'a Version,
    /// The fully rendered prompt (after template substitution).
    pub resolved_prompt: &'a str,
    /// Model identifier.
    pub model: &'a str,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Output schema, if any.
    pub output_schema: Option<&'a Value>,
}

/// Compute the cache key: a hex-encoded SHA-256 digest over canonical
/// JSON of `(id, version, resolved_prompt, model, temperature, output_schema)`.
pub fn cache_key(inputs: &CacheKeyInputs<'_>) -> String {
    let canonical = serde_json::json!({
        "id": inputs.id.as_str(),
        "version": inputs.version.as_str(),
        "resolved_prompt": inputs.resolved_prompt,
        "model": inputs.model,
        "temperature": inputs.temperature,
        "output_schema": inputs.output_schema,
    });
    sha256_hex(canonical.to_string().as_bytes())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// A cached generative response, keyed by [`cache_key`].
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// The validated model output.
    pub output: Value,
    /// Tokens consumed on the original (uncached) call.
    pub tokens: stratum_core::TokenUsage,
    /// Model that produced the cached response.
    pub model: String,
}

/// In-process, TTL-bounded response cache.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, (CachedResponse, Instant, Duration)>>,
}

impl ResponseCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    /// Fetch a cached entry if present and not past its TTL.
    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, inserted_at, ttl)) if inserted_at.elapsed() < *ttl => {
                Some(value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a response under `key` with the given TTL.
    pub async fn put(&self, key: String, value: CachedResponse, ttl: Duration) {
        self.entries.lock().await.insert(key, (value, Instant::now(), ttl));
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stratum_core::TokenUsage;

    #[test]
    fn same_inputs_produce_same_key() {
        let id = FunctionId::new("f1");
        let version = Version::new("v1");
        let schema = json!({"type": "object"});
        let inputs = CacheKeyInputs {
            id: &id,
            version: &version,
            resolved_prompt: "hello",
            model: "gpt-test",
            temperature: Some(0.0),
            output_schema: Some(&schema),
        };
        assert_eq!(cache_key(&inputs), cache_key(&inputs));
    }

    #[test]
    fn different_prompt_produces_different_key() {
        let id = FunctionId::new("f1");
        let version = Version::new("v1");
        let a = CacheKeyInputs {
            id: &id,
            version: &version,
            resolved_prompt: "hello",
            model: "gpt-test",
            temperature: None,
            output_schema: None,
        };
        let b = CacheKeyInputs { resolved_prompt: "goodbye", ..a_clone(&a) };
        assert_ne!(cache_key(&a), cache_key(&b));
    }

    fn a_clone<'a>(inputs: &CacheKeyInputs<'a>) -> CacheKeyInputs<'a> {
        CacheKeyInputs {
            id: inputs.id,
            version: inputs.version,
            resolved_prompt: inputs.resolved_prompt,
            model: inputs.model,
            temperature: inputs.temperature,
            output_schema: inputs.output_schema,
        }
    }

    #[tokio::test]
    async fn put_then_get_within_ttl_hits() {
        let cache = ResponseCache::new();
        cache
            .put(
                "key1".into(),
                CachedResponse {
                    output: json!({"sum": 15}),
                    tokens: TokenUsage::new(10, 5),
                    model: "gpt-test".into(),
                },
                Duration::from_secs(60),
            )
            .await;
        let hit = cache.get("key1").await;
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn expired_entry_misses() {
        let cache = ResponseCache::new();
        cache
            .put(
                "key1".into(),
                CachedResponse {
                    output: json!({}),
                    tokens: TokenUsage::new(0, 0),
                    model: "gpt-test".into(),
                },
                Duration::from_millis(1),
            )
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.get("key1").await.is_none());
    }
}
