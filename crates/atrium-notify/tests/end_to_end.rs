//! The full mutation path: capability check, watcher fan-out, dispatch,
//! live push to connected recipients, durable inbox for everyone else.

use atrium_authorization::{AuthorizationService, HierarchyStore, InMemoryHierarchy};
use atrium_core::{
    AuthorizationConfig, Capability, ContainerInfo, ContainerRef, DispatchConfig, HubConfig,
    ManualClock, Membership, PrincipalId, Role, SpaceId, SpaceRole, TaskId, WorkspaceId,
};
use atrium_notify::{
    ChannelKind, EventClass, InMemoryNotificationStore, Inbox, InboxFilter,
    NotificationDispatcher, NotificationEvent, RecordingEmailSender, RecordingPushSender,
    WatchScope, WatcherRegistry,
};
use atrium_presence::{ConnectionHub, RoomId, StaticTokenVerifier};
use std::sync::Arc;

#[tokio::test]
async fn status_change_flows_from_check_to_inbox_and_live_push() {
    // --- world setup ------------------------------------------------------
    let hierarchy = Arc::new(InMemoryHierarchy::new());
    let workspace = WorkspaceId::new();
    let owner = PrincipalId::new();
    let space = SpaceId::new();
    let task = TaskId::new();
    hierarchy.insert_workspace(workspace, owner);
    hierarchy.insert_resource(space.into(), ContainerInfo::in_space(workspace, space, false));
    hierarchy.insert_resource(task.into(), ContainerInfo::in_space(workspace, space, false));

    let editor = PrincipalId::new();
    let online_watcher = PrincipalId::new();
    let offline_watcher = PrincipalId::new();
    for principal in [editor, online_watcher, offline_watcher] {
        hierarchy.upsert_membership(
            Membership::new(
                principal,
                ContainerRef::space(space),
                Role::Space(SpaceRole::Member),
            )
            .unwrap(),
        );
    }

    let authz = AuthorizationService::new(
        hierarchy.clone() as Arc<dyn HierarchyStore>,
        AuthorizationConfig::default(),
    );

    let clock = Arc::new(ManualClock::starting_at(1_000_000));
    let verifier = Arc::new(StaticTokenVerifier::new());
    verifier.issue("watcher-token", online_watcher);
    let hub = Arc::new(ConnectionHub::new(
        verifier,
        clock.clone(),
        HubConfig::default(),
    ));

    let store = Arc::new(InMemoryNotificationStore::new());
    let registry = Arc::new(WatcherRegistry::new());
    let dispatcher = NotificationDispatcher::new(
        store.clone(),
        registry.clone(),
        Arc::new(RecordingEmailSender::new()),
        Arc::new(RecordingPushSender::new()),
        hub.clone(),
        clock.clone(),
        DispatchConfig::default(),
    );
    let inbox = Inbox::new(store.clone());

    // Watchers: one online with a live task-room connection, one offline.
    registry.watch(online_watcher, task.into(), WatchScope::All);
    registry.watch(offline_watcher, task.into(), WatchScope::StatusChanges);
    registry.watch(editor, task.into(), WatchScope::All);

    let mut watcher_conn = hub.connect("watcher-token").await.unwrap();
    hub.join(watcher_conn.id, RoomId::task(task)).unwrap();

    // --- the mutation path ------------------------------------------------
    // 1. Authorization gate before the state change.
    assert!(
        authz
            .check_capability(editor, task, Capability::CanEditTasks)
            .await
    );

    // 2. The mutation happens outside the core; then the interested set is
    //    computed and dispatched.
    let recipients = registry.watchers_for(task.into(), EventClass::StatusChange);
    assert_eq!(recipients.len(), 3);

    let report = dispatcher
        .dispatch(
            NotificationEvent::new("task.statusChanged")
                .from_actor(editor)
                .to(recipients)
                .with_copy("Status changed", "Task moved to In Review")
                .with_payload(serde_json::json!({ "task": task.to_string(), "status": "inReview" }))
                .about(task.into())
                .via(vec![ChannelKind::InApp]),
        )
        .await
        .unwrap();

    // The acting editor is excluded from their own notification.
    assert_eq!(report.created(), 2);

    // 3. The online watcher got the live push.
    let pushed = watcher_conn.events.recv().await.unwrap();
    assert_eq!(pushed.event, "task.statusChanged");
    assert_eq!(pushed.payload["status"].as_str().unwrap(), "inReview");

    // 4. Durable records for both watchers, online or not.
    for watcher in [online_watcher, offline_watcher] {
        assert_eq!(inbox.unread_count(watcher).await.unwrap(), 1);
    }
    assert_eq!(inbox.unread_count(editor).await.unwrap(), 0);

    // 5. The offline watcher reads the record on next fetch.
    let fetched = inbox
        .get_notifications(offline_watcher, InboxFilter::default())
        .await
        .unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].kind, "task.statusChanged");
    let id = fetched[0].id;
    inbox.mark_read(offline_watcher, &[id]).await.unwrap();
    assert_eq!(inbox.unread_count(offline_watcher).await.unwrap(), 0);
}

#[tokio::test]
async fn denied_editor_never_reaches_dispatch() {
    let hierarchy = Arc::new(InMemoryHierarchy::new());
    let workspace = WorkspaceId::new();
    let space = SpaceId::new();
    let task = TaskId::new();
    hierarchy.insert_workspace(workspace, PrincipalId::new());
    hierarchy.insert_resource(task.into(), ContainerInfo::in_space(workspace, space, true));

    let authz = AuthorizationService::new(
        hierarchy.clone() as Arc<dyn HierarchyStore>,
        AuthorizationConfig::default(),
    );

    // The mutation layer checks first; a deny means no mutation and no
    // dispatch call at all.
    let outsider = PrincipalId::new();
    assert!(
        !authz
            .check_capability(outsider, task, Capability::CanEditTasks)
            .await
    );
}
