//! Registry-specific errors, convertible into the shared [`CoreError`] taxonomy.

use stratum_core::CoreError;
use thiserror::Error;

/// Errors from registry/code-store operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The function id failed format validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The version being deployed already exists for this function.
    #[error("duplicate version: {0}")]
    DuplicateVersion(String),

    /// The requested rollback/get target version does not exist.
    #[error("version not found: {0}")]
    VersionNotFound(String),

    /// The function id is unknown to the registry.
    #[error("function not found: {0}")]
    FunctionNotFound(String),

    /// A write to the store failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<RegistryError> for CoreError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::InvalidIdentifier(m) => CoreError::InvalidIdentifier(m),
            RegistryError::DuplicateVersion(m) => CoreError::DuplicateVersion(m),
            RegistryError::VersionNotFound(m) => CoreError::VersionNotFound(m),
            RegistryError::FunctionNotFound(m) => CoreError::FunctionNotFound(m),
            RegistryError::WriteFailed(m) => CoreError::Other(m.into()),
            RegistryError::Other(e) => CoreError::Other(e),
        }
    }
}
