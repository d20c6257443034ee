//! Inbox query surface
//!
//! Read-mostly facade over the notification store: paginated fetch, read
//! and archive state changes, unread counts. No side effects beyond
//! read-state mutation.

use crate::record::NotificationRecord;
use crate::store::{InboxFilter, NotificationStore};
use atrium_core::{NotificationId, PrincipalId, Result};
use std::sync::Arc;

/// Per-recipient notification inbox
#[derive(Clone)]
pub struct Inbox {
    store: Arc<dyn NotificationStore>,
}

impl Inbox {
    /// Create an inbox over a notification store
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Fetch a page of notifications, newest first
    pub async fn get_notifications(
        &self,
        principal: PrincipalId,
        filter: InboxFilter,
    ) -> Result<Vec<NotificationRecord>> {
        self.store.query(principal, filter).await
    }

    /// Mark specific notifications read; returns how many changed
    pub async fn mark_read(
        &self,
        principal: PrincipalId,
        ids: &[NotificationId],
    ) -> Result<usize> {
        self.store.mark_read(principal, ids).await
    }

    /// Mark every unread notification read; returns how many changed
    pub async fn mark_all_read(&self, principal: PrincipalId) -> Result<usize> {
        self.store.mark_all_read(principal).await
    }

    /// Archive specific notifications; returns how many changed
    pub async fn archive(&self, principal: PrincipalId, ids: &[NotificationId]) -> Result<usize> {
        self.store.archive(principal, ids).await
    }

    /// Count of unread, unarchived notifications
    pub async fn unread_count(&self, principal: PrincipalId) -> Result<usize> {
        self.store.unread_count(principal).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ChannelKind, DeliveryState};
    use crate::store::InMemoryNotificationStore;
    use std::collections::BTreeMap;

    fn record(recipient: PrincipalId, kind: &str, created_at_ms: u64) -> NotificationRecord {
        let mut delivery = BTreeMap::new();
        delivery.insert(ChannelKind::InApp, DeliveryState::Sent);
        NotificationRecord {
            id: NotificationId::new(),
            recipient,
            kind: kind.to_string(),
            title: String::new(),
            body: String::new(),
            payload: serde_json::Value::Null,
            resource: None,
            delivery,
            read: false,
            archived: false,
            created_at_ms,
        }
    }

    #[tokio::test]
    async fn unread_only_filter_and_mark_all_read() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let inbox = Inbox::new(store.clone());
        let principal = PrincipalId::new();

        store
            .insert_batch(vec![
                record(principal, "task.assigned", 1),
                record(principal, "task.statusChanged", 2),
            ])
            .await
            .unwrap();

        assert_eq!(inbox.unread_count(principal).await.unwrap(), 2);

        let unread = inbox
            .get_notifications(
                principal,
                InboxFilter {
                    unread_only: true,
                    ..InboxFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unread.len(), 2);

        assert_eq!(inbox.mark_all_read(principal).await.unwrap(), 2);
        assert_eq!(inbox.unread_count(principal).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn archived_records_leave_the_default_view() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let inbox = Inbox::new(store.clone());
        let principal = PrincipalId::new();

        let r = record(principal, "task.assigned", 1);
        let id = r.id;
        store.insert_batch(vec![r]).await.unwrap();

        assert_eq!(inbox.archive(principal, &[id]).await.unwrap(), 1);
        let visible = inbox
            .get_notifications(principal, InboxFilter::default())
            .await
            .unwrap();
        assert!(visible.is_empty());

        let with_archived = inbox
            .get_notifications(
                principal,
                InboxFilter {
                    include_archived: true,
                    ..InboxFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(with_archived.len(), 1);
    }

    #[tokio::test]
    async fn kind_filter_matches_type_tag() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let inbox = Inbox::new(store.clone());
        let principal = PrincipalId::new();

        store
            .insert_batch(vec![
                record(principal, "task.assigned", 1),
                record(principal, "chat.mention", 2),
            ])
            .await
            .unwrap();

        let mentions = inbox
            .get_notifications(
                principal,
                InboxFilter {
                    kind: Some("chat.mention".to_string()),
                    ..InboxFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].kind, "chat.mention");
    }
}
