//! Typed ID wrappers for functions, versions, and invocations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers prevent mixing up function ids, versions, and
/// execution ids. These are strings underneath; format constraints
/// (where the spec imposes any) are enforced by the owning component,
/// not by the wrapper itself.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(FunctionId, "Client-chosen, immutable identifier for a deployed function.");
typed_id!(Version, "Semver-like version string, immutable once stored.");
typed_id!(ExecutionId, "Unique identifier for one invocation.");
typed_id!(OwnerId, "Identifier of the principal that owns a function or key.");
typed_id!(KeyId, "Identifier of an API key.");

/// Validate a [`FunctionId`] against the format the registry requires:
/// 1-128 characters drawn from `[a-zA-Z0-9_-]`.
///
/// This lives alongside the id type (not buried in the registry) because
/// every component that accepts a raw function id string from a caller
/// — registry deploy, cascade dispatch, tool dispatcher's `function-ref`
/// variant — needs the same check.
pub fn validate_function_id(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= 128
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
