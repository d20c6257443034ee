//! End-to-end resolution properties over the service facade

use atrium_authorization::{AuthorizationService, HierarchyStore, InMemoryHierarchy};
use atrium_core::{
    AuthorizationConfig, Capability, CapabilityOverrides, ContainerInfo, ContainerRef, ListId,
    Membership, PrincipalId, Role, SpaceId, SpaceRole, TaskId, WorkspaceId, WorkspaceRole,
};
use std::sync::Arc;

struct World {
    store: Arc<InMemoryHierarchy>,
    service: AuthorizationService,
    workspace: WorkspaceId,
    owner: PrincipalId,
    space: SpaceId,
    list: ListId,
    task: TaskId,
}

fn world(space_private: bool) -> World {
    let store = Arc::new(InMemoryHierarchy::new());
    let workspace = WorkspaceId::new();
    let owner = PrincipalId::new();
    let space = SpaceId::new();
    let list = ListId::new();
    let task = TaskId::new();

    store.insert_workspace(workspace, owner);
    store.insert_resource(
        space.into(),
        ContainerInfo::in_space(workspace, space, space_private),
    );
    store.insert_resource(
        list.into(),
        ContainerInfo::in_space(workspace, space, space_private),
    );
    store.insert_resource(
        task.into(),
        ContainerInfo::in_list(workspace, space, list, space_private),
    );

    let service = AuthorizationService::new(
        store.clone() as Arc<dyn HierarchyStore>,
        AuthorizationConfig::default(),
    );

    World {
        store,
        service,
        workspace,
        owner,
        space,
        list,
        task,
    }
}

#[tokio::test]
async fn resolution_is_deterministic_without_mutation() {
    let w = world(false);
    let principal = PrincipalId::new();
    w.store.upsert_membership(
        Membership::new(
            principal,
            ContainerRef::space(w.space),
            Role::Space(SpaceRole::Member),
        )
        .unwrap(),
    );

    let first = w
        .service
        .resolved_set(principal, w.task.into())
        .await
        .unwrap();
    for _ in 0..5 {
        let again = w
            .service
            .resolved_set(principal, w.task.into())
            .await
            .unwrap();
        assert_eq!(first, again);
    }
}

#[tokio::test]
async fn invalidation_exposes_downgrade_immediately() {
    let w = world(false);
    let principal = PrincipalId::new();
    w.store.upsert_membership(
        Membership::new(
            principal,
            ContainerRef::space(w.space),
            Role::Space(SpaceRole::Admin),
        )
        .unwrap(),
    );

    // Warm the cache with the admin-level set.
    assert!(
        w.service
            .check_capability(principal, w.task, Capability::CanDeleteTasks)
            .await
    );

    // Downgrade, then invalidate before the mutation is considered done.
    w.store.upsert_membership(
        Membership::new(
            principal,
            ContainerRef::space(w.space),
            Role::Space(SpaceRole::Viewer),
        )
        .unwrap(),
    );
    w.service.invalidate(principal).unwrap();

    // The very next check must see the downgrade; TTL expiry plays no part.
    assert!(
        !w.service
            .check_capability(principal, w.task, Capability::CanDeleteTasks)
            .await
    );
}

#[tokio::test]
async fn stale_allow_without_invalidation_is_the_cached_value() {
    // Companion to the invalidation test: without the eviction the cache
    // would keep answering from the old set, which is exactly why the
    // mutation path must call invalidate synchronously.
    let w = world(false);
    let principal = PrincipalId::new();
    w.store.upsert_membership(
        Membership::new(
            principal,
            ContainerRef::space(w.space),
            Role::Space(SpaceRole::Admin),
        )
        .unwrap(),
    );
    assert!(
        w.service
            .check_capability(principal, w.task, Capability::CanDeleteTasks)
            .await
    );

    w.store
        .remove_membership(principal, ContainerRef::space(w.space));

    // No invalidate call: the cached allow is still served.
    assert!(
        w.service
            .check_capability(principal, w.task, Capability::CanDeleteTasks)
            .await
    );

    w.service.invalidate(principal).unwrap();
    assert!(
        !w.service
            .check_capability(principal, w.task, Capability::CanDeleteTasks)
            .await
    );
}

#[tokio::test]
async fn space_membership_governs_contained_tasks() {
    let w = world(false);
    let principal = PrincipalId::new();
    w.store.upsert_membership(
        Membership::new(
            principal,
            ContainerRef::space(w.space),
            Role::Space(SpaceRole::Member),
        )
        .unwrap(),
    );

    let space_set = w
        .service
        .resolved_set(principal, w.space.into())
        .await
        .unwrap();
    let task_set = w
        .service
        .resolved_set(principal, w.task.into())
        .await
        .unwrap();

    // No task-level membership: tasks inherit exactly the space-resolved set.
    assert_eq!(space_set, task_set);
}

#[tokio::test]
async fn private_space_denies_all_task_capabilities() {
    let w = world(true);
    let outsider = PrincipalId::new();
    w.store.upsert_membership(
        Membership::new(
            outsider,
            ContainerRef::workspace(w.workspace),
            Role::Workspace(WorkspaceRole::Member),
        )
        .unwrap(),
    );

    for cap in Capability::ALL {
        assert!(
            !w.service.check_capability(outsider, w.task, cap).await,
            "expected deny for {cap}"
        );
    }
}

#[tokio::test]
async fn private_space_denies_list_view_despite_workspace_visibility() {
    let w = world(true);
    let guest = PrincipalId::new();
    // Workspace member: canViewAllSpaces is in their defaults.
    w.store.upsert_membership(
        Membership::new(
            guest,
            ContainerRef::workspace(w.workspace),
            Role::Workspace(WorkspaceRole::Member),
        )
        .unwrap(),
    );

    assert!(
        w.service
            .check_capability(guest, w.workspace, Capability::CanView)
            .await
    );
    assert!(
        !w.service
            .check_capability(guest, w.list, Capability::CanView)
            .await
    );
}

#[tokio::test]
async fn non_private_space_grants_view_only_fallback() {
    let w = world(false);
    let member = PrincipalId::new();
    w.store.upsert_membership(
        Membership::new(
            member,
            ContainerRef::workspace(w.workspace),
            Role::Workspace(WorkspaceRole::Member),
        )
        .unwrap(),
    );

    assert!(
        w.service
            .check_capability(member, w.list, Capability::CanView)
            .await
    );
    assert!(
        w.service
            .check_capability(member, w.task, Capability::CanViewTasks)
            .await
    );
    // Fallback is view-only: nothing beyond the minimal pair.
    assert!(
        !w.service
            .check_capability(member, w.task, Capability::CanEditTasks)
            .await
    );
}

#[tokio::test]
async fn owner_allows_every_capability_everywhere() {
    let w = world(true);
    for cap in Capability::ALL {
        assert!(w.service.check_capability(w.owner, w.task, cap).await);
        assert!(w.service.check_capability(w.owner, w.space, cap).await);
        assert!(w.service.check_capability(w.owner, w.workspace, cap).await);
    }
}

#[tokio::test]
async fn member_override_enables_task_deletion() {
    let w = world(false);
    let principal = PrincipalId::new();
    w.store.upsert_membership(
        Membership::new(
            principal,
            ContainerRef::space(w.space),
            Role::Space(SpaceRole::Member),
        )
        .unwrap()
        .with_overrides(CapabilityOverrides::none().with(Capability::CanDeleteTasks, true)),
    );

    assert!(
        w.service
            .check_capability(principal, w.task, Capability::CanDeleteTasks)
            .await
    );
}

#[tokio::test]
async fn explicit_list_grant_reaches_into_private_space() {
    // An explicit membership on a list inside a private space is a
    // deliberate grant and admits the principal to that list's tasks.
    let w = world(true);
    let contractor = PrincipalId::new();
    w.store.upsert_membership(
        Membership::new(
            contractor,
            ContainerRef::list(w.list),
            Role::List(SpaceRole::Member),
        )
        .unwrap(),
    );

    assert!(
        w.service
            .check_capability(contractor, w.task, Capability::CanEditTasks)
            .await
    );
    // The space itself stays closed.
    assert!(
        !w.service
            .check_capability(contractor, w.space, Capability::CanView)
            .await
    );
}
