#![deny(missing_docs)]
//! # stratum-registry — function registry & versioned code store
//!
//! Durable mapping from [`FunctionId`](stratum_core::FunctionId) to
//! [`FunctionMetadata`], plus per-`(id, version)` storage of
//! [`CodeArtifact`]. Implements spec.md §4.1: atomic deploy, rollback,
//! and delete, write-then-publish ordering, and per-id serialization of
//! mutations.
//!
//! The concrete backend here ([`InMemoryRegistry`]) is grounded on the
//! teacher's `RwLock<HashMap<..>>` state-store idiom. A durable KV/object
//! store backend is an external collaborator per spec.md §1 and is not
//! implemented — any backend need only satisfy the [`Registry`] trait.

mod error;
mod memory;
mod types;

pub use error::RegistryError;
pub use memory::InMemoryRegistry;
pub use types::{
    AgenticConfig, BuiltinTool, CascadeConfig, CodeArtifact, FunctionConfig, FunctionMetadata,
    FunctionType, GenerativeConfig, Tier, ToolDefinition, ToolImplementation,
};

use async_trait::async_trait;
use stratum_core::{FunctionId, Version};

/// Request body for [`Registry::deploy`].
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// The function id being deployed.
    pub id: FunctionId,
    /// The version to publish.
    pub version: Version,
    /// Type-specific configuration.
    pub config: FunctionConfig,
    /// Source artifact, required for code functions.
    pub artifact: Option<CodeArtifact>,
    /// Owning principal, set on first deploy only.
    pub owner: stratum_core::OwnerId,
    /// Scopes required to invoke this function.
    pub scopes_required: Vec<String>,
}

/// Durable mapping from function id to metadata, and per-version code
/// artifact storage.
///
/// Deploy/rollback/delete are sequenced per `id`; reads are lock-free
/// with respect to other reads (spec.md §4.1 "Consistency").
#[async_trait]
pub trait Registry: Send + Sync {
    /// Deploy a new version. Creates the function on first deploy,
    /// otherwise appends to `versions` and republishes `active_version`.
    async fn deploy(&self, req: DeployRequest) -> Result<FunctionMetadata, RegistryError>;

    /// Roll the active version back to a previously deployed version.
    /// Does not mutate the `versions` list.
    async fn rollback(
        &self,
        id: &FunctionId,
        to_version: &Version,
    ) -> Result<FunctionMetadata, RegistryError>;

    /// Fetch metadata for a function.
    async fn get_metadata(&self, id: &FunctionId) -> Result<FunctionMetadata, RegistryError>;

    /// Fetch the code artifact for a function, resolving to the active
    /// version when `version` is `None`.
    async fn get_artifact(
        &self,
        id: &FunctionId,
        version: Option<&Version>,
    ) -> Result<CodeArtifact, RegistryError>;

    /// Cache a compiled artifact produced by an on-demand compilation.
    async fn cache_compiled(
        &self,
        id: &FunctionId,
        version: &Version,
        compiled: Vec<u8>,
    ) -> Result<(), RegistryError>;

    /// Remove a function's metadata and artifacts. Metadata is removed
    /// first, making the function immediately unreachable even if
    /// artifact cleanup below is best-effort.
    async fn delete(&self, id: &FunctionId) -> Result<(), RegistryError>;
}
