//! Notification store seam
//!
//! Durable persistence for notification records. The dispatcher writes
//! records here before attempting any channel delivery; the inbox reads
//! through it. The in-memory implementation doubles as the test fixture.

use crate::record::{ChannelKind, DeliveryState, NotificationRecord};
use async_trait::async_trait;
use atrium_core::{AtriumError, NotificationId, PrincipalId, ResourceRef, Result};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Pagination and filtering for inbox queries
#[derive(Debug, Clone)]
pub struct InboxFilter {
    /// Only unread records
    pub unread_only: bool,
    /// Only records with this type tag
    pub kind: Option<String>,
    /// Include archived records
    pub include_archived: bool,
    /// Page size
    pub limit: usize,
    /// Records to skip (offset pagination)
    pub skip: usize,
}

impl Default for InboxFilter {
    fn default() -> Self {
        Self {
            unread_only: false,
            kind: None,
            include_archived: false,
            limit: 50,
            skip: 0,
        }
    }
}

/// Durable store for notification records
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a batch of records; all-or-nothing per call
    async fn insert_batch(&self, records: Vec<NotificationRecord>) -> Result<()>;

    /// Whether a record with the same (recipient, kind, resource) exists
    /// at or after `since_ms`. The reminder dedup probe: must run before
    /// insert, not after.
    async fn recent_exists(
        &self,
        recipient: PrincipalId,
        kind: &str,
        resource: Option<ResourceRef>,
        since_ms: u64,
    ) -> Result<bool>;

    /// Update one channel's delivery state on a record
    async fn update_delivery(
        &self,
        id: NotificationId,
        channel: ChannelKind,
        state: DeliveryState,
    ) -> Result<()>;

    /// Query a recipient's inbox, newest first
    async fn query(
        &self,
        recipient: PrincipalId,
        filter: InboxFilter,
    ) -> Result<Vec<NotificationRecord>>;

    /// Mark specific records read; returns how many changed
    async fn mark_read(&self, recipient: PrincipalId, ids: &[NotificationId]) -> Result<usize>;

    /// Mark every unread record read; returns how many changed
    async fn mark_all_read(&self, recipient: PrincipalId) -> Result<usize>;

    /// Archive specific records; returns how many changed
    async fn archive(&self, recipient: PrincipalId, ids: &[NotificationId]) -> Result<usize>;

    /// Count of unread, unarchived records
    async fn unread_count(&self, recipient: PrincipalId) -> Result<usize>;
}

/// In-memory notification store
///
/// Reference implementation and test fixture. `set_fail_inserts` makes
/// `insert_batch` fail, for exercising the hard-error path of dispatch.
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    records: RwLock<Vec<NotificationRecord>>,
    fail_inserts: AtomicBool,
}

impl InMemoryNotificationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated insert failure
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Total stored records (diagnostics)
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Fetch a record by id (test inspection)
    pub fn get(&self, id: NotificationId) -> Option<NotificationRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert_batch(&self, records: Vec<NotificationRecord>) -> Result<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AtriumError::storage("notification store unavailable"));
        }
        self.records.write().extend(records);
        Ok(())
    }

    async fn recent_exists(
        &self,
        recipient: PrincipalId,
        kind: &str,
        resource: Option<ResourceRef>,
        since_ms: u64,
    ) -> Result<bool> {
        Ok(self.records.read().iter().any(|record| {
            record.recipient == recipient
                && record.kind == kind
                && record.resource == resource
                && record.created_at_ms >= since_ms
        }))
    }

    async fn update_delivery(
        &self,
        id: NotificationId,
        channel: ChannelKind,
        state: DeliveryState,
    ) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| AtriumError::not_found(format!("notification {id}")))?;
        record.delivery.insert(channel, state);
        Ok(())
    }

    async fn query(
        &self,
        recipient: PrincipalId,
        filter: InboxFilter,
    ) -> Result<Vec<NotificationRecord>> {
        let records = self.records.read();
        let mut matched: Vec<NotificationRecord> = records
            .iter()
            .filter(|record| record.recipient == recipient)
            .filter(|record| !filter.unread_only || !record.read)
            .filter(|record| filter.include_archived || !record.archived)
            .filter(|record| {
                filter
                    .kind
                    .as_ref()
                    .map(|kind| &record.kind == kind)
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        Ok(matched
            .into_iter()
            .skip(filter.skip)
            .take(filter.limit)
            .collect())
    }

    async fn mark_read(&self, recipient: PrincipalId, ids: &[NotificationId]) -> Result<usize> {
        let mut records = self.records.write();
        let mut changed = 0;
        for record in records.iter_mut() {
            if record.recipient == recipient && ids.contains(&record.id) && !record.read {
                record.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn mark_all_read(&self, recipient: PrincipalId) -> Result<usize> {
        let mut records = self.records.write();
        let mut changed = 0;
        for record in records.iter_mut() {
            if record.recipient == recipient && !record.read {
                record.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn archive(&self, recipient: PrincipalId, ids: &[NotificationId]) -> Result<usize> {
        let mut records = self.records.write();
        let mut changed = 0;
        for record in records.iter_mut() {
            if record.recipient == recipient && ids.contains(&record.id) && !record.archived {
                record.archived = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn unread_count(&self, recipient: PrincipalId) -> Result<usize> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|record| record.recipient == recipient && !record.read && !record.archived)
            .count())
    }
}
