//! Credential extraction and scope enforcement, grounded on
//! `neuron-auth::AuthProviderChain` (try-in-order provider composition),
//! turned around to validate inbound request credentials instead of
//! provisioning outbound ones.

use crate::error::AuthError;
use crate::principal::Principal;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::HashSet;

/// Resolves a raw bearer/API-key token into an authenticated [`Principal`].
///
/// Implementations decide what "recognizable expiry" means for their
/// token format and return [`AuthError::Unauthorized`] once it has
/// passed.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate `raw_token`, returning the principal it resolves to.
    async fn validate(&self, raw_token: &str) -> Result<Principal, AuthError>;
}

/// Extracts the caller's raw token, preferring `X-API-Key` over
/// `Authorization: Bearer` when both are present. Header *name* matching
/// is the responsibility of the caller's (case-insensitive) header map;
/// this function only interprets already-extracted header values.
pub fn extract_token(authorization: Option<&str>, api_key: Option<&str>) -> Option<String> {
    if let Some(key) = api_key {
        let trimmed = key.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    let header = authorization?.trim();
    let (scheme, rest) = header.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Guards protected routes: extracts credentials, resolves a principal,
/// and checks declared scopes. Public routes bypass it entirely.
pub struct AuthGate<V> {
    validator: V,
    public_paths: HashSet<String>,
}

impl<V: TokenValidator> AuthGate<V> {
    /// Construct a gate backed by `validator`, with the health/root/status
    /// routes pre-registered as public.
    pub fn new(validator: V) -> Self {
        Self { validator, public_paths: default_public_paths() }
    }

    /// Register an additional path that bypasses authentication.
    pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
        self.public_paths.insert(path.into());
        self
    }

    /// Whether `path` may be accessed without credentials.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }

    /// Authenticate a request, failing with [`AuthError::Unauthorized`]
    /// when credentials are absent, malformed, or expired.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Principal, AuthError> {
        let raw = extract_token(authorization, api_key)
            .ok_or_else(|| AuthError::Unauthorized("missing credentials".into()))?;
        self.validator.validate(&raw).await
    }

    /// Enforce that `principal` carries `required_scope`.
    pub fn authorize(principal: &Principal, required_scope: &str) -> Result<(), AuthError> {
        if principal.has_scope(required_scope) {
            Ok(())
        } else {
            Err(AuthError::Forbidden(required_scope.to_string()))
        }
    }
}

fn default_public_paths() -> HashSet<String> {
    ["/health", "/", "/api/status"].into_iter().map(str::to_string).collect()
}

/// Caches resolved principals so repeated requests bearing the same raw
/// token don't re-run the wrapped validator. Concurrent lookups for an
/// uncached token serialize on the cache lock, so the token is resolved
/// exactly once and every concurrent caller observes the same
/// [`Principal`].
pub struct CachingTokenValidator<V> {
    inner: V,
    cache: tokio::sync::Mutex<HashMap<String, Principal>>,
}

impl<V: TokenValidator> CachingTokenValidator<V> {
    /// Wrap `inner` with a resolved-principal cache.
    pub fn new(inner: V) -> Self {
        Self { inner, cache: tokio::sync::Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl<V: TokenValidator> TokenValidator for CachingTokenValidator<V> {
    async fn validate(&self, raw_token: &str) -> Result<Principal, AuthError> {
        let mut cache = self.cache.lock().await;
        if let Some(principal) = cache.get(raw_token) {
            return Ok(principal.clone());
        }
        let principal = self.inner.validate(raw_token).await?;
        cache.insert(raw_token.to_string(), principal.clone());
        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_validator::StaticTokenValidator;

    #[test]
    fn prefers_api_key_over_bearer() {
        let token = extract_token(Some("Bearer abc"), Some("xyz"));
        assert_eq!(token.as_deref(), Some("xyz"));
    }

    #[test]
    fn falls_back_to_bearer_when_no_api_key() {
        let token = extract_token(Some("Bearer   abc  "), None);
        assert_eq!(token.as_deref(), Some("abc"));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let token = extract_token(Some("bearer abc"), None);
        assert_eq!(token.as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        assert!(extract_token(Some("Basic abc"), None).is_none());
    }

    #[test]
    fn blank_api_key_falls_through_to_bearer() {
        let token = extract_token(Some("Bearer abc"), Some("   "));
        assert_eq!(token.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn missing_credentials_are_unauthorized() {
        let gate = AuthGate::new(StaticTokenValidator::new());
        let err = gate.authenticate(None, None).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn scope_check_distinguishes_forbidden_from_unauthorized() {
        let principal = Principal::new("user-1", vec!["functions:read".into()]);
        let err = AuthGate::<StaticTokenValidator>::authorize(&principal, "functions:deploy")
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
        assert!(AuthGate::<StaticTokenValidator>::authorize(&principal, "functions:read").is_ok());
    }

    #[test]
    fn health_root_and_status_are_public_by_default() {
        let gate = AuthGate::new(StaticTokenValidator::new());
        assert!(gate.is_public("/health"));
        assert!(gate.is_public("/"));
        assert!(gate.is_public("/api/status"));
        assert!(!gate.is_public("/functions/my-fn/invoke"));
    }

    #[tokio::test]
    async fn concurrent_lookups_of_the_same_token_are_identical() {
        use std::sync::Arc;

        let validator = Arc::new(CachingTokenValidator::new(
            StaticTokenValidator::new().with_token(
                "tok",
                Principal::new("user-1", vec!["functions:read".into()]),
                None,
            ),
        ));
        let mut handles = Vec::new();
        for _ in 0..20 {
            let validator = validator.clone();
            handles.push(tokio::spawn(async move { validator.validate("tok").await.unwrap() }));
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        assert!(results.iter().all(|p| *p == results[0]));
    }
}
