//! Hierarchy store seam
//!
//! Read-only accessor for membership and container records. The core never
//! caches inside the adapter; caching lives in [`crate::cache`] where it can
//! be invalidated.

use async_trait::async_trait;
use atrium_core::{
    AtriumError, ContainerInfo, ContainerRef, Membership, PrincipalId, ResourceRef, Result,
    WorkspaceId,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Read-only access to membership and hierarchy records
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    /// Membership held by `principal` in `container`, if any
    async fn membership(
        &self,
        principal: PrincipalId,
        container: ContainerRef,
    ) -> Result<Option<Membership>>;

    /// Denormalized container pointers for a resource, if it exists
    async fn container_of(&self, resource: ResourceRef) -> Result<Option<ContainerInfo>>;

    /// Owning principal of a workspace
    ///
    /// Ownership lives on the workspace record itself, not on a
    /// membership: the owner resolves allow even with zero memberships.
    async fn workspace_owner(&self, workspace: WorkspaceId) -> Result<Option<PrincipalId>>;
}

/// In-memory hierarchy store
///
/// Serves as the test fixture and as a reference implementation of the
/// adapter contract. `set_unavailable` makes every read fail, for
/// exercising the fail-closed paths.
#[derive(Debug, Default)]
pub struct InMemoryHierarchy {
    memberships: RwLock<HashMap<(PrincipalId, ContainerRef), Membership>>,
    containers: RwLock<HashMap<ResourceRef, ContainerInfo>>,
    owners: RwLock<HashMap<WorkspaceId, PrincipalId>>,
    unavailable: AtomicBool,
}

impl InMemoryHierarchy {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workspace and its owning principal
    pub fn insert_workspace(&self, workspace: WorkspaceId, owner: PrincipalId) {
        self.containers
            .write()
            .insert(workspace.into(), ContainerInfo::workspace_only(workspace));
        self.owners.write().insert(workspace, owner);
    }

    /// Register a resource with its container pointers
    pub fn insert_resource(&self, resource: ResourceRef, info: ContainerInfo) {
        self.containers.write().insert(resource, info);
    }

    /// Add or replace a membership record
    pub fn upsert_membership(&self, membership: Membership) {
        self.memberships
            .write()
            .insert((membership.principal, membership.container), membership);
    }

    /// Hard-delete a membership record
    pub fn remove_membership(&self, principal: PrincipalId, container: ContainerRef) {
        self.memberships.write().remove(&(principal, container));
    }

    /// Toggle simulated backing-store failure
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AtriumError::storage("hierarchy store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl HierarchyStore for InMemoryHierarchy {
    async fn membership(
        &self,
        principal: PrincipalId,
        container: ContainerRef,
    ) -> Result<Option<Membership>> {
        self.check_available()?;
        Ok(self.memberships.read().get(&(principal, container)).cloned())
    }

    async fn container_of(&self, resource: ResourceRef) -> Result<Option<ContainerInfo>> {
        self.check_available()?;
        Ok(self.containers.read().get(&resource).copied())
    }

    async fn workspace_owner(&self, workspace: WorkspaceId) -> Result<Option<PrincipalId>> {
        self.check_available()?;
        Ok(self.owners.read().get(&workspace).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::{Role, SpaceId, SpaceRole, WorkspaceId};

    #[tokio::test]
    async fn membership_removal_is_immediate() {
        let store = InMemoryHierarchy::new();
        let principal = PrincipalId::new();
        let container = ContainerRef::space(SpaceId::new());

        store.upsert_membership(
            Membership::new(principal, container, Role::Space(SpaceRole::Member)).unwrap(),
        );
        assert!(store
            .membership(principal, container)
            .await
            .unwrap()
            .is_some());

        store.remove_membership(principal, container);
        assert!(store
            .membership(principal, container)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unavailable_store_errors_every_read() {
        let store = InMemoryHierarchy::new();
        let ws = WorkspaceId::new();
        store.insert_resource(ws.into(), ContainerInfo::workspace_only(ws));

        store.set_unavailable(true);
        assert!(store.container_of(ws.into()).await.is_err());

        store.set_unavailable(false);
        assert!(store.container_of(ws.into()).await.unwrap().is_some());
    }
}
