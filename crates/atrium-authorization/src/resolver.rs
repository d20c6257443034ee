//! Hierarchy-walking permission resolution
//!
//! Resolution order, per request:
//! 1. Workspace owner: allow everything, never shadowed by lower levels.
//! 2. Nearest hierarchy level holding an explicit membership wins
//!    (Task → List → Space; List → Space; Space → Workspace). Workspace-level
//!    role is only consulted when no more specific membership exists.
//! 3. Private containers deny principals without a membership regardless
//!    of workspace role.
//! 4. Otherwise a workspace role granting `canViewAllSpaces` yields the
//!    minimal view-only fallback.
//!
//! Every store read is time-bounded; a timeout or store error propagates
//! as an error the caller resolves to deny (fail-closed).

use crate::defaults::role_defaults;
use crate::merge::{apply_overrides, effective_capabilities};
use crate::store::HierarchyStore;
use atrium_core::{
    AtriumError, AuthorizationConfig, Capability, CapabilitySet, ContainerInfo, ContainerRef,
    ListId, Membership, PrincipalId, ResourceKind, ResourceRef, Result, SpaceId,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Resolves (principal, resource) pairs to capability sets
pub struct PermissionResolver {
    store: Arc<dyn HierarchyStore>,
    store_timeout: Duration,
}

impl PermissionResolver {
    /// Create a resolver over a hierarchy store
    pub fn new(store: Arc<dyn HierarchyStore>, config: &AuthorizationConfig) -> Self {
        Self {
            store,
            store_timeout: config.store_timeout,
        }
    }

    /// Resolve the full capability set for a principal on a resource.
    ///
    /// Errors (missing resource, store failure, timeout) are returned to
    /// the caller, which must treat them as deny.
    pub async fn resolve_set(
        &self,
        principal: PrincipalId,
        resource: ResourceRef,
    ) -> Result<CapabilitySet> {
        let container = self
            .timed("container lookup", self.store.container_of(resource))
            .await?
            .ok_or_else(|| AtriumError::not_found(format!("resource {resource}")))?;

        // Owner capability is total and checked before anything else.
        let owner = self
            .timed(
                "owner lookup",
                self.store.workspace_owner(container.workspace_id),
            )
            .await?;
        if owner == Some(principal) {
            return Ok(CapabilitySet::all());
        }

        let workspace_membership = self
            .membership(principal, ContainerRef::workspace(container.workspace_id))
            .await?;

        if resource.kind == ResourceKind::Workspace {
            // The workspace itself: its own membership decides, with no
            // cross-workspace fallback.
            return Ok(effective_capabilities(
                false,
                workspace_membership.as_ref(),
                false,
                false,
            ));
        }

        let nearest = self
            .nearest_membership(principal, resource, &container)
            .await?;

        let workspace_visible = workspace_membership
            .as_ref()
            .map(|m| {
                apply_overrides(role_defaults(&m.role), &m.overrides)
                    .contains(Capability::CanViewAllSpaces)
            })
            .unwrap_or(false);

        let container_private = match resource.kind {
            // Channels are membership-gated: no membership means no access.
            ResourceKind::Channel => true,
            ResourceKind::Team => false,
            _ => container.space_is_private,
        };

        // The Space → Workspace hop: a non-private space with no membership
        // of its own is governed by the workspace membership. Resources
        // inside the space (lists, tasks, folders) never take this hop;
        // they get at most the view-only fallback.
        let membership = match nearest {
            Some(membership) => Some(membership),
            None if resource.kind == ResourceKind::Space && !container_private => {
                workspace_membership
            }
            None => None,
        };

        Ok(effective_capabilities(
            false,
            membership.as_ref(),
            workspace_visible,
            container_private,
        ))
    }

    /// Resolve a single capability: allow iff present in the resolved set
    pub async fn resolve(
        &self,
        principal: PrincipalId,
        resource: ResourceRef,
        capability: Capability,
    ) -> Result<bool> {
        Ok(self.resolve_set(principal, resource).await?.contains(capability))
    }

    /// Time-bounded membership read
    pub async fn membership(
        &self,
        principal: PrincipalId,
        container: ContainerRef,
    ) -> Result<Option<Membership>> {
        self.timed(
            "membership lookup",
            self.store.membership(principal, container),
        )
        .await
    }

    /// Walk the membership chain nearest-level-first and return the first
    /// membership found. The tie-break rule lives here: the most specific
    /// level with a record wins.
    async fn nearest_membership(
        &self,
        principal: PrincipalId,
        resource: ResourceRef,
        container: &ContainerInfo,
    ) -> Result<Option<Membership>> {
        for level in membership_chain(resource, container) {
            if let Some(membership) = self.membership(principal, level).await? {
                return Ok(Some(membership));
            }
        }
        Ok(None)
    }

    async fn timed<T, F>(&self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| AtriumError::timeout(format!("{what} exceeded store deadline")))?
    }
}

/// Membership levels to consult for a resource, nearest first.
///
/// At most one level per hierarchy hop, so a full walk is bounded by the
/// hierarchy depth.
fn membership_chain(resource: ResourceRef, container: &ContainerInfo) -> Vec<ContainerRef> {
    let mut chain = Vec::with_capacity(2);
    match resource.kind {
        ResourceKind::Workspace => {}
        ResourceKind::Space => {
            chain.push(ContainerRef::space(SpaceId::from_uuid(resource.id)));
        }
        ResourceKind::Folder => {
            if let Some(space_id) = container.space_id {
                chain.push(ContainerRef::space(space_id));
            }
        }
        ResourceKind::List => {
            chain.push(ContainerRef::list(ListId::from_uuid(resource.id)));
            if let Some(space_id) = container.space_id {
                chain.push(ContainerRef::space(space_id));
            }
        }
        ResourceKind::Task => {
            if let Some(list_id) = container.list_id {
                chain.push(ContainerRef::list(list_id));
            }
            if let Some(space_id) = container.space_id {
                chain.push(ContainerRef::space(space_id));
            }
        }
        ResourceKind::Team => {
            chain.push(ContainerRef::new(
                atrium_core::ContainerKind::Team,
                resource.id,
            ));
        }
        ResourceKind::Channel => {
            chain.push(ContainerRef::new(
                atrium_core::ContainerKind::Channel,
                resource.id,
            ));
        }
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryHierarchy;
    use atrium_core::{
        CapabilityOverrides, ContainerInfo, Role, SpaceRole, TaskId, WorkspaceId, WorkspaceRole,
    };

    struct Fixture {
        store: Arc<InMemoryHierarchy>,
        resolver: PermissionResolver,
        workspace: WorkspaceId,
        owner: PrincipalId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryHierarchy::new());
        let workspace = WorkspaceId::new();
        let owner = PrincipalId::new();
        store.insert_workspace(workspace, owner);

        let resolver = PermissionResolver::new(
            store.clone() as Arc<dyn HierarchyStore>,
            &AuthorizationConfig::default(),
        );
        Fixture {
            store,
            resolver,
            workspace,
            owner,
        }
    }

    #[tokio::test]
    async fn unknown_resource_resolves_to_error_not_panic() {
        let f = fixture();
        let err = f
            .resolver
            .resolve(PrincipalId::new(), TaskId::new().into(), Capability::CanView)
            .await
            .unwrap_err();
        assert!(err.is_denial());
    }

    #[tokio::test]
    async fn owner_with_zero_memberships_gets_everything() {
        let f = fixture();
        let space = SpaceId::new();
        let task = TaskId::new();
        f.store.insert_resource(
            space.into(),
            ContainerInfo::in_space(f.workspace, space, true),
        );
        f.store.insert_resource(
            task.into(),
            ContainerInfo::in_space(f.workspace, space, true),
        );

        for cap in Capability::ALL {
            assert!(f.resolver.resolve(f.owner, task.into(), cap).await.unwrap());
        }
    }

    #[tokio::test]
    async fn nearest_level_shadows_space_membership() {
        let f = fixture();
        let space = SpaceId::new();
        let list = ListId::new();
        let task = TaskId::new();
        f.store.insert_resource(
            task.into(),
            ContainerInfo::in_list(f.workspace, space, list, false),
        );

        let principal = PrincipalId::new();
        // Space admin, but list viewer: list-level record is nearer.
        f.store.upsert_membership(
            Membership::new(
                principal,
                ContainerRef::space(space),
                Role::Space(SpaceRole::Admin),
            )
            .unwrap(),
        );
        f.store.upsert_membership(
            Membership::new(
                principal,
                ContainerRef::list(list),
                Role::List(SpaceRole::Viewer),
            )
            .unwrap(),
        );

        assert!(!f
            .resolver
            .resolve(principal, task.into(), Capability::CanEditTasks)
            .await
            .unwrap());
        assert!(f
            .resolver
            .resolve(principal, task.into(), Capability::CanViewTasks)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_error() {
        let f = fixture();
        let task = TaskId::new();
        let space = SpaceId::new();
        f.store.insert_resource(
            task.into(),
            ContainerInfo::in_space(f.workspace, space, false),
        );

        f.store.set_unavailable(true);
        assert!(f
            .resolver
            .resolve(PrincipalId::new(), task.into(), Capability::CanView)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn override_wins_over_role_default() {
        let f = fixture();
        let space = SpaceId::new();
        let task = TaskId::new();
        f.store.insert_resource(
            task.into(),
            ContainerInfo::in_space(f.workspace, space, false),
        );

        let principal = PrincipalId::new();
        f.store.upsert_membership(
            Membership::new(
                principal,
                ContainerRef::space(space),
                Role::Space(SpaceRole::Member),
            )
            .unwrap()
            .with_overrides(CapabilityOverrides::none().with(Capability::CanDeleteTasks, true)),
        );

        assert!(f
            .resolver
            .resolve(principal, task.into(), Capability::CanDeleteTasks)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn workspace_membership_governs_non_private_spaces() {
        let f = fixture();
        let space = SpaceId::new();
        f.store.insert_resource(
            space.into(),
            ContainerInfo::in_space(f.workspace, space, false),
        );

        let principal = PrincipalId::new();
        f.store.upsert_membership(
            Membership::new(
                principal,
                ContainerRef::workspace(f.workspace),
                Role::Workspace(WorkspaceRole::Member),
            )
            .unwrap(),
        );

        // No space membership: the workspace role decides at the space level.
        assert!(f
            .resolver
            .resolve(principal, space.into(), Capability::CanCreateTasks)
            .await
            .unwrap());

        // A private space never takes the workspace hop.
        let private = SpaceId::new();
        f.store.insert_resource(
            private.into(),
            ContainerInfo::in_space(f.workspace, private, true),
        );
        assert!(!f
            .resolver
            .resolve(principal, private.into(), Capability::CanView)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn workspace_member_without_visibility_gets_nothing_elsewhere() {
        let f = fixture();
        let space = SpaceId::new();
        let list = ListId::new();
        f.store.insert_resource(
            list.into(),
            ContainerInfo::in_space(f.workspace, space, false),
        );

        let guest = PrincipalId::new();
        f.store.upsert_membership(
            Membership::new(
                guest,
                ContainerRef::workspace(f.workspace),
                Role::Workspace(WorkspaceRole::Guest),
            )
            .unwrap(),
        );

        // Guests lack canViewAllSpaces, so no fallback applies.
        assert!(!f
            .resolver
            .resolve(guest, list.into(), Capability::CanView)
            .await
            .unwrap());
    }
}
