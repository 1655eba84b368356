#![deny(missing_docs)]
//! Secret resolver that reads from process environment variables.
//!
//! Used for `SecretSource::Env { var_name }`.

use async_trait::async_trait;
use stratum_secret::{SecretError, SecretLease, SecretResolver, SecretSource, SecretValue};

/// Resolves secrets from process environment variables.
pub struct EnvResolver;

#[async_trait]
impl SecretResolver for EnvResolver {
    async fn resolve(&self, source: &SecretSource) -> Result<SecretLease, SecretError> {
        match source {
            SecretSource::Env { var_name } => match std::env::var(var_name) {
                Ok(val) => Ok(SecretLease::permanent(SecretValue::new(val.into_bytes()))),
                Err(_) => Err(SecretError::NotFound(format!("env var {var_name} not set"))),
            },
            _ => Err(SecretError::NoResolver("env".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn _assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn object_safety() {
        _assert_send_sync::<Box<dyn SecretResolver>>();
        _assert_send_sync::<Arc<dyn SecretResolver>>();
    }

    #[tokio::test]
    async fn resolves_set_env_var() {
        std::env::set_var("STRATUM_TEST_SECRET_ENV", "test-value-42");
        let resolver = EnvResolver;
        let source = SecretSource::Env {
            var_name: "STRATUM_TEST_SECRET_ENV".into(),
        };
        let lease = resolver.resolve(&source).await.unwrap();
        lease.value.with_bytes(|b| assert_eq!(b, b"test-value-42"));
        std::env::remove_var("STRATUM_TEST_SECRET_ENV");
    }

    #[tokio::test]
    async fn rejects_missing_env_var() {
        std::env::remove_var("STRATUM_TEST_MISSING_VAR");
        let resolver = EnvResolver;
        let source = SecretSource::Env {
            var_name: "STRATUM_TEST_MISSING_VAR".into(),
        };
        let err = resolver.resolve(&source).await.unwrap_err();
        assert!(matches!(err, SecretError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_non_env_source() {
        let resolver = EnvResolver;
        let source = SecretSource::Custom {
            provider: "1password".into(),
            config: serde_json::json!({}),
        };
        let err = resolver.resolve(&source).await.unwrap_err();
        assert!(matches!(err, SecretError::NoResolver(_)));
    }
}
