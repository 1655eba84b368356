//! In-memory [`Registry`] backend.
//!
//! Grounded on the teacher's `RwLock<HashMap<..>>` state-store idiom
//! (`neuron-state-memory::MemoryStore`), extended with a per-id
//! `tokio::sync::Mutex` so deploy/rollback/delete are serialized per
//! function id while reads stay lock-free (spec.md §4.1 "Consistency").

use crate::error::RegistryError;
use crate::types::FunctionMetadata;
use crate::{CodeArtifact, DeployRequest, Registry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use stratum_core::{validate_function_id, FunctionId, Version};
use tokio::sync::Mutex as AsyncMutex;

/// An in-process, non-durable [`Registry`]. Suitable for tests and
/// single-process deployments; a production backend would implement
/// [`Registry`] against a real KV/object store (out of scope here).
pub struct InMemoryRegistry {
    metadata: RwLock<HashMap<FunctionId, FunctionMetadata>>,
    artifacts: RwLock<HashMap<(FunctionId, Version), CodeArtifact>>,
    locks: RwLock<HashMap<FunctionId, Arc<AsyncMutex<()>>>>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            metadata: RwLock::new(HashMap::new()),
            artifacts: RwLock::new(HashMap::new()),
            locks: RwLock::new(HashMap::new()),
        }
    }

    fn lock_for(&self, id: &FunctionId) -> Arc<AsyncMutex<()>> {
        if let Some(lock) = self.locks.read().unwrap().get(id) {
            return lock.clone();
        }
        let mut locks = self.locks.write().unwrap();
        locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn deploy(&self, req: DeployRequest) -> Result<FunctionMetadata, RegistryError> {
        if !validate_function_id(req.id.as_str()) {
            return Err(RegistryError::InvalidIdentifier(req.id.to_string()));
        }

        let lock = self.lock_for(&req.id);
        let _guard = lock.lock().await;

        let existing = self.metadata.read().unwrap().get(&req.id).cloned();

        let now = SystemTime::now();
        let mut meta = match existing {
            Some(mut meta) => {
                if meta.versions.contains(&req.version) {
                    return Err(RegistryError::DuplicateVersion(req.version.to_string()));
                }
                meta.versions.push(req.version.clone());
                meta.active_version = req.version.clone();
                meta.config = req.config.clone();
                meta.updated_at = now;
                meta
            }
            None => FunctionMetadata {
                id: req.id.clone(),
                function_type: function_type_of(&req.config),
                active_version: req.version.clone(),
                versions: vec![req.version.clone()],
                created_at: now,
                updated_at: now,
                owner: req.owner.clone(),
                scopes_required: req.scopes_required.clone(),
                config: req.config.clone(),
                rolled_back_from: None,
            },
        };
        meta.updated_at = now;

        // Write-then-publish ordering: artifacts land before the metadata
        // pointer update that makes them reachable as the active version.
        if let Some(artifact) = req.artifact {
            self.artifacts
                .write()
                .unwrap()
                .insert((req.id.clone(), req.version.clone()), artifact);
        }

        self.metadata.write().unwrap().insert(req.id.clone(), meta.clone());
        Ok(meta)
    }

    async fn rollback(
        &self,
        id: &FunctionId,
        to_version: &Version,
    ) -> Result<FunctionMetadata, RegistryError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let mut store = self.metadata.write().unwrap();
        let meta = store
            .get_mut(id)
            .ok_or_else(|| RegistryError::FunctionNotFound(id.to_string()))?;

        if !meta.versions.contains(to_version) {
            return Err(RegistryError::VersionNotFound(to_version.to_string()));
        }

        meta.rolled_back_from = Some(meta.active_version.clone());
        meta.active_version = to_version.clone();
        meta.updated_at = SystemTime::now();
        Ok(meta.clone())
    }

    async fn get_metadata(&self, id: &FunctionId) -> Result<FunctionMetadata, RegistryError> {
        self.metadata
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::FunctionNotFound(id.to_string()))
    }

    async fn get_artifact(
        &self,
        id: &FunctionId,
        version: Option<&Version>,
    ) -> Result<CodeArtifact, RegistryError> {
        let resolved_version = match version {
            Some(v) => v.clone(),
            None => self.get_metadata(id).await?.active_version,
        };
        self.artifacts
            .read()
            .unwrap()
            .get(&(id.clone(), resolved_version.clone()))
            .cloned()
            .ok_or_else(|| RegistryError::VersionNotFound(resolved_version.to_string()))
    }

    async fn cache_compiled(
        &self,
        id: &FunctionId,
        version: &Version,
        compiled: Vec<u8>,
    ) -> Result<(), RegistryError> {
        let mut artifacts = self.artifacts.write().unwrap();
        let artifact = artifacts
            .get_mut(&(id.clone(), version.clone()))
            .ok_or_else(|| RegistryError::VersionNotFound(version.to_string()))?;
        artifact.compiled = Some(compiled);
        Ok(())
    }

    async fn delete(&self, id: &FunctionId) -> Result<(), RegistryError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let removed = self.metadata.write().unwrap().remove(id);
        if removed.is_none() {
            return Err(RegistryError::FunctionNotFound(id.to_string()));
        }
        // Best-effort artifact cleanup, after metadata is already gone.
        self.artifacts
            .write()
            .unwrap()
            .retain(|(fid, _), _| fid != id);
        Ok(())
    }
}

fn function_type_of(config: &crate::types::FunctionConfig) -> crate::types::FunctionType {
    use crate::types::{FunctionConfig, FunctionType};
    match config {
        FunctionConfig::Code => FunctionType::Code,
        FunctionConfig::Generative(_) => FunctionType::Generative,
        FunctionConfig::Agentic(_) => FunctionType::Agentic,
        FunctionConfig::Cascade(_) => FunctionType::Cascade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FunctionConfig;
    use stratum_core::OwnerId;

    fn deploy_req(id: &str, version: &str) -> DeployRequest {
        DeployRequest {
            id: FunctionId::new(id),
            version: Version::new(version),
            config: FunctionConfig::Code,
            artifact: Some(CodeArtifact {
                source: b"export default () => 1".to_vec(),
                compiled: None,
                source_map: None,
                language: "javascript".into(),
                entry_point: "default".into(),
                timeout: None,
            }),
            owner: OwnerId::new("owner-1"),
            scopes_required: vec![],
        }
    }

    #[tokio::test]
    async fn deploy_creates_function_with_active_version() {
        let reg = InMemoryRegistry::new();
        let meta = reg.deploy(deploy_req("sum", "v1")).await.unwrap();
        assert_eq!(meta.active_version, Version::new("v1"));
        assert!(meta.invariant_active_version_in_versions());
    }

    #[tokio::test]
    async fn deploy_rejects_invalid_identifier() {
        let reg = InMemoryRegistry::new();
        let err = reg.deploy(deploy_req("has spaces", "v1")).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn deploy_rejects_duplicate_version() {
        let reg = InMemoryRegistry::new();
        reg.deploy(deploy_req("sum", "v1")).await.unwrap();
        let err = reg.deploy(deploy_req("sum", "v1")).await.unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateVersion(_)));
    }

    #[tokio::test]
    async fn second_deploy_appends_version_and_republishes_active() {
        let reg = InMemoryRegistry::new();
        reg.deploy(deploy_req("sum", "v1")).await.unwrap();
        let meta = reg.deploy(deploy_req("sum", "v2")).await.unwrap();
        assert_eq!(meta.versions, vec![Version::new("v1"), Version::new("v2")]);
        assert_eq!(meta.active_version, Version::new("v2"));
    }

    #[tokio::test]
    async fn rollback_sets_active_without_mutating_versions() {
        let reg = InMemoryRegistry::new();
        reg.deploy(deploy_req("sum", "v1")).await.unwrap();
        reg.deploy(deploy_req("sum", "v2")).await.unwrap();
        let meta = reg.rollback(&FunctionId::new("sum"), &Version::new("v1")).await.unwrap();
        assert_eq!(meta.active_version, Version::new("v1"));
        assert_eq!(meta.versions.len(), 2);
        assert_eq!(meta.rolled_back_from, Some(Version::new("v2")));
    }

    #[tokio::test]
    async fn rollback_rejects_unknown_version() {
        let reg = InMemoryRegistry::new();
        reg.deploy(deploy_req("sum", "v1")).await.unwrap();
        let err = reg
            .rollback(&FunctionId::new("sum"), &Version::new("v9"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::VersionNotFound(_)));
    }

    #[tokio::test]
    async fn get_artifact_resolves_active_version_by_default() {
        let reg = InMemoryRegistry::new();
        reg.deploy(deploy_req("sum", "v1")).await.unwrap();
        let artifact = reg.get_artifact(&FunctionId::new("sum"), None).await.unwrap();
        assert_eq!(artifact.language, "javascript");
    }

    #[tokio::test]
    async fn delete_removes_metadata_and_artifacts() {
        let reg = InMemoryRegistry::new();
        reg.deploy(deploy_req("sum", "v1")).await.unwrap();
        reg.delete(&FunctionId::new("sum")).await.unwrap();
        assert!(matches!(
            reg.get_metadata(&FunctionId::new("sum")).await.unwrap_err(),
            RegistryError::FunctionNotFound(_)
        ));
        assert!(matches!(
            reg.get_artifact(&FunctionId::new("sum"), Some(&Version::new("v1")))
                .await
                .unwrap_err(),
            RegistryError::VersionNotFound(_)
        ));
    }

    #[tokio::test]
    async fn cache_compiled_updates_stored_artifact() {
        let reg = InMemoryRegistry::new();
        reg.deploy(deploy_req("sum", "v1")).await.unwrap();
        reg.cache_compiled(&FunctionId::new("sum"), &Version::new("v1"), vec![1, 2, 3])
            .await
            .unwrap();
        let artifact = reg.get_artifact(&FunctionId::new("sum"), None).await.unwrap();
        assert_eq!(artifact.compiled, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn concurrent_deploys_to_same_id_are_serialized() {
        let reg = Arc::new(InMemoryRegistry::new());
        reg.deploy(deploy_req("sum", "v0")).await.unwrap();

        let mut handles = Vec::new();
        for i in 1..=10 {
            let reg = reg.clone();
            handles.push(tokio::spawn(async move {
                reg.deploy(deploy_req("sum", &format!("v{i}"))).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let meta = reg.get_metadata(&FunctionId::new("sum")).await.unwrap();
        assert_eq!(meta.versions.len(), 11);
    }
}
