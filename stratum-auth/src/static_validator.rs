//! A fixed-table token validator. Dev/test only, mirrored on
//! `neuron-auth-static::StaticAuthProvider`'s "always the same
//! credential" shape, turned into a lookup table since inbound tokens
//! must resolve to distinct principals.

use crate::error::AuthError;
use crate::principal::Principal;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::SystemTime;

use crate::gate::TokenValidator;

/// Validates tokens against a fixed, in-memory table. Not suitable for
/// production: tokens are compared directly, with no hashing.
pub struct StaticTokenValidator {
    tokens: HashMap<String, (Principal, Option<SystemTime>)>,
}

impl StaticTokenValidator {
    /// Construct an empty table.
    pub fn new() -> Self {
        Self { tokens: HashMap::new() }
    }

    /// Register `token` as resolving to `principal`, expiring at
    /// `expires_at` if given.
    pub fn with_token(
        mut self,
        token: impl Into<String>,
        principal: Principal,
        expires_at: Option<SystemTime>,
    ) -> Self {
        self.tokens.insert(token.into(), (principal, expires_at));
        self
    }
}

impl Default for StaticTokenValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, raw_token: &str) -> Result<Principal, AuthError> {
        let (principal, expires_at) = self
            .tokens
            .get(raw_token)
            .ok_or_else(|| AuthError::Unauthorized("unrecognized token".into()))?;
        if let Some(expiry) = expires_at {
            if SystemTime::now() > *expiry {
                return Err(AuthError::Unauthorized("token expired".into()));
            }
        }
        Ok(principal.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let validator = StaticTokenValidator::new();
        assert!(matches!(
            validator.validate("nope").await.unwrap_err(),
            AuthError::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn known_token_resolves_to_its_principal() {
        let validator = StaticTokenValidator::new().with_token(
            "tok",
            Principal::new("user-1", vec!["functions:read".into()]),
            None,
        );
        let principal = validator.validate("tok").await.unwrap();
        assert_eq!(principal.id, "user-1");
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let past = SystemTime::now() - Duration::from_secs(60);
        let validator = StaticTokenValidator::new().with_token(
            "tok",
            Principal::new("user-1", vec![]),
            Some(past),
        );
        assert!(matches!(
            validator.validate("tok").await.unwrap_err(),
            AuthError::Unauthorized(_)
        ));
    }
}
