#![deny(missing_docs)]
//! Secret resolution for stratum.
//!
//! Defines the [`SecretResolver`] trait, the [`SecretValue`] zeroizing
//! wrapper (no Serialize, no Display, no Clone), and a minimal
//! [`SecretSource`] — just enough backend vocabulary for the LLM adapter
//! credentials this platform actually needs (environment variables, plus
//! an escape hatch for anything else). Multi-cloud secret-manager
//! backends are not part of this platform; see DESIGN.md.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use zeroize::Zeroizing;

/// Where a secret is stored. This describes the backend, not the
/// delivery mechanism.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretSource {
    /// A process environment variable.
    Env {
        /// The variable name to read.
        var_name: String,
    },
    /// Anything else, identified by a provider tag and opaque config.
    Custom {
        /// The resolver provider tag, matched by [`SourceMatcher::Custom`].
        provider: String,
        /// Provider-specific configuration.
        config: serde_json::Value,
    },
}

impl SecretSource {
    /// A short tag describing the source kind, for error messages.
    pub fn kind(&self) -> &str {
        match self {
            SecretSource::Env { .. } => "env",
            SecretSource::Custom { provider, .. } => provider,
        }
    }
}

/// Errors from secret resolution.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SecretError {
    /// The secret was not found in the backend.
    #[error("secret not found: {0}")]
    NotFound(String),

    /// No resolver registered for this source kind.
    #[error("no resolver for source: {0}")]
    NoResolver(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// An opaque secret value. Cannot be logged, serialized, or cloned.
/// Memory is zeroed on drop via [`Zeroizing`].
///
/// The only way to access the bytes is through [`SecretValue::with_bytes`],
/// which enforces scoped exposure.
pub struct SecretValue {
    inner: Zeroizing<Vec<u8>>,
}

impl SecretValue {
    /// Create a new secret value. The input vector is moved, not copied.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: Zeroizing::new(bytes),
        }
    }

    /// Scoped exposure. The secret bytes are only accessible inside the closure.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.inner)
    }

    /// Returns the length of the secret in bytes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// A resolved secret with optional expiry.
pub struct SecretLease {
    /// The resolved secret value.
    pub value: SecretValue,
    /// When this lease expires (`None` means no expiry).
    pub expires_at: Option<SystemTime>,
}

impl SecretLease {
    /// Create a new lease with no expiry.
    pub fn permanent(value: SecretValue) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Check if this lease has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| SystemTime::now() > exp)
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for SecretLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretLease")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Resolve a secret from a specific backend.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolve a secret from the given source.
    async fn resolve(&self, source: &SecretSource) -> Result<SecretLease, SecretError>;
}

/// How to match a [`SecretSource`] variant to a resolver.
#[derive(Debug, Clone)]
pub enum SourceMatcher {
    /// Match all `SecretSource::Env` variants.
    Env,
    /// Match a specific `SecretSource::Custom` provider name.
    Custom(String),
}

impl SourceMatcher {
    /// Check if this matcher matches the given source.
    pub fn matches(&self, source: &SecretSource) -> bool {
        match (self, source) {
            (SourceMatcher::Env, SecretSource::Env { .. }) => true,
            (SourceMatcher::Custom(name), SecretSource::Custom { provider, .. }) => {
                name == provider
            }
            _ => false,
        }
    }
}

/// Composes multiple resolvers, routing by [`SecretSource`] variant.
pub struct SecretRegistry {
    resolvers: Vec<(SourceMatcher, Arc<dyn SecretResolver>)>,
}

impl SecretRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Register a resolver for sources matching the given pattern.
    pub fn with_resolver(mut self, matcher: SourceMatcher, resolver: Arc<dyn SecretResolver>) -> Self {
        self.resolvers.push((matcher, resolver));
        self
    }
}

impl Default for SecretRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretResolver for SecretRegistry {
    async fn resolve(&self, source: &SecretSource) -> Result<SecretLease, SecretError> {
        for (matcher, resolver) in &self.resolvers {
            if matcher.matches(source) {
                return resolver.resolve(source).await;
            }
        }
        Err(SecretError::NoResolver(source.kind().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_value_debug_is_redacted() {
        let secret = SecretValue::new(b"super-secret-key".to_vec());
        let debug = format!("{:?}", secret);
        assert_eq!(debug, "[REDACTED]");
    }

    #[test]
    fn secret_value_with_bytes_exposes_content() {
        let secret = SecretValue::new(b"my-api-key".to_vec());
        secret.with_bytes(|bytes| assert_eq!(bytes, b"my-api-key"));
    }

    #[test]
    fn secret_lease_permanent_never_expires() {
        let lease = SecretLease::permanent(SecretValue::new(b"key".to_vec()));
        assert!(!lease.is_expired());
    }

    fn _assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn secret_resolver_is_object_safe_send_sync() {
        _assert_send_sync::<Box<dyn SecretResolver>>();
        _assert_send_sync::<Arc<dyn SecretResolver>>();
    }

    struct StubResolver {
        value: &'static [u8],
    }

    #[async_trait]
    impl SecretResolver for StubResolver {
        async fn resolve(&self, _source: &SecretSource) -> Result<SecretLease, SecretError> {
            Ok(SecretLease::permanent(SecretValue::new(self.value.to_vec())))
        }
    }

    #[tokio::test]
    async fn registry_dispatches_to_matching_resolver() {
        let registry = SecretRegistry::new().with_resolver(
            SourceMatcher::Env,
            Arc::new(StubResolver { value: b"env-secret" }),
        );
        let lease = registry
            .resolve(&SecretSource::Env { var_name: "X".into() })
            .await
            .unwrap();
        lease.value.with_bytes(|b| assert_eq!(b, b"env-secret"));
    }

    #[tokio::test]
    async fn registry_no_resolver_returns_error() {
        let registry = SecretRegistry::new();
        let result = registry
            .resolve(&SecretSource::Custom {
                provider: "1password".into(),
                config: serde_json::json!({}),
            })
            .await;
        assert!(matches!(result.unwrap_err(), SecretError::NoResolver(_)));
    }
}
