//! Notification dispatcher
//!
//! Turns a domain event plus recipient list into durable per-recipient
//! records, then fans delivery out across channels with bounded
//! concurrency. Durability precedes best-effort delivery: the only hard
//! error is failing to persist the records at all. A channel failure is
//! recorded in that recipient's delivery-status vector and never fails the
//! batch; retry belongs to an external scheduler.

use crate::channels::{EmailSender, PushSender};
use crate::event::{NotificationClass, NotificationEvent};
use crate::record::{ChannelKind, DeliveryState, NotificationRecord};
use crate::store::NotificationStore;
use crate::watcher::WatcherRegistry;
use atrium_core::{Clock, DispatchConfig, LivePush, NotificationId, PrincipalId, Result};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of dispatch for one recipient
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// The recipient this outcome describes
    pub recipient: PrincipalId,
    /// Persisted record id; `None` when the event was suppressed
    pub record_id: Option<NotificationId>,
    /// Suppressed by the reminder dedup window
    pub suppressed: bool,
    /// Final per-channel delivery states
    pub channels: Vec<(ChannelKind, DeliveryState)>,
    /// Live connections the in-app push reached (best-effort)
    pub live_connections: usize,
}

/// Aggregated result of one dispatch call
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// One outcome per deduplicated recipient
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchReport {
    /// Recipients for whom a record was created
    pub fn created(&self) -> usize {
        self.outcomes.iter().filter(|o| o.record_id.is_some()).count()
    }

    /// Recipients suppressed by the dedup window
    pub fn suppressed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.suppressed).count()
    }

    /// (recipient, channel) pairs with a recorded failure
    pub fn failures(&self) -> Vec<(PrincipalId, ChannelKind)> {
        self.outcomes
            .iter()
            .flat_map(|outcome| {
                outcome
                    .channels
                    .iter()
                    .filter(|(_, state)| state.is_failed())
                    .map(|(channel, _)| (outcome.recipient, *channel))
            })
            .collect()
    }
}

/// Dispatches domain events to recipients across delivery channels
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    registry: Arc<WatcherRegistry>,
    email: Arc<dyn EmailSender>,
    push: Arc<dyn PushSender>,
    live: Arc<dyn LivePush>,
    clock: Arc<dyn Clock>,
    config: DispatchConfig,
}

impl NotificationDispatcher {
    /// Wire a dispatcher to its collaborators
    pub fn new(
        store: Arc<dyn NotificationStore>,
        registry: Arc<WatcherRegistry>,
        email: Arc<dyn EmailSender>,
        push: Arc<dyn PushSender>,
        live: Arc<dyn LivePush>,
        clock: Arc<dyn Clock>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            store,
            registry,
            email,
            push,
            live,
            clock,
            config,
        }
    }

    /// Dispatch one event: persist a record per recipient, push to live
    /// connections, then deliver optional channels with bounded
    /// concurrency and a per-channel timeout.
    pub async fn dispatch(&self, event: NotificationEvent) -> Result<DispatchReport> {
        let now = self.clock.now_ms();
        let recipients = self.effective_recipients(&event);

        let mut outcomes: Vec<DispatchOutcome> = Vec::with_capacity(recipients.len());
        let mut records: Vec<NotificationRecord> = Vec::with_capacity(recipients.len());
        let mut pending: Vec<(NotificationId, PrincipalId, ChannelKind)> = Vec::new();

        for recipient in recipients {
            if self.is_duplicate_reminder(&event, recipient, now).await {
                debug!(%recipient, kind = %event.kind, "reminder suppressed by dedup window");
                outcomes.push(DispatchOutcome {
                    recipient,
                    record_id: None,
                    suppressed: true,
                    channels: Vec::new(),
                    live_connections: 0,
                });
                continue;
            }

            let channels = self.effective_channels(&event, recipient);
            let mut delivery = BTreeMap::new();
            for channel in &channels {
                // The durable record is the in-app delivery; the optional
                // channels start pending.
                let state = match channel {
                    ChannelKind::InApp => DeliveryState::Sent,
                    _ => DeliveryState::Pending,
                };
                delivery.insert(*channel, state);
            }

            let record = NotificationRecord {
                id: NotificationId::new(),
                recipient,
                kind: event.kind.clone(),
                title: event.title.clone(),
                body: event.body.clone(),
                payload: event.payload.clone(),
                resource: event.resource,
                delivery,
                read: false,
                archived: false,
                created_at_ms: now,
            };

            for channel in channels {
                if channel != ChannelKind::InApp {
                    pending.push((record.id, recipient, channel));
                }
            }
            outcomes.push(DispatchOutcome {
                recipient,
                record_id: Some(record.id),
                suppressed: false,
                channels: vec![(ChannelKind::InApp, DeliveryState::Sent)],
                live_connections: 0,
            });
            records.push(record);
        }

        // Durability first: failing to persist any record fails the whole
        // dispatch; everything after is best-effort.
        self.store.insert_batch(records).await?;

        // Fire-and-forget live push; zero connections is not an error.
        for outcome in outcomes.iter_mut().filter(|o| !o.suppressed) {
            outcome.live_connections =
                self.live
                    .push(outcome.recipient, &event.kind, event.payload.clone());
        }

        // Bounded-concurrency channel fan-out: one slow recipient/channel
        // cannot stall the rest of the batch.
        let results: Vec<(NotificationId, ChannelKind, DeliveryState)> = stream::iter(pending)
            .map(|(id, recipient, channel)| self.deliver_one(id, recipient, channel, &event))
            .buffer_unordered(self.config.max_in_flight.max(1))
            .collect()
            .await;

        let mut by_record: HashMap<NotificationId, usize> = HashMap::new();
        for (index, outcome) in outcomes.iter().enumerate() {
            if let Some(id) = outcome.record_id {
                by_record.insert(id, index);
            }
        }
        for (id, channel, state) in results {
            if let Some(&index) = by_record.get(&id) {
                outcomes[index].channels.push((channel, state));
            }
        }

        Ok(DispatchReport { outcomes })
    }

    /// Delivery-status callback for the external retry scheduler
    pub async fn record_delivery_result(
        &self,
        id: NotificationId,
        channel: ChannelKind,
        state: DeliveryState,
    ) -> Result<()> {
        self.store.update_delivery(id, channel, state).await
    }

    /// Deduplicate recipients preserving order and exclude the actor
    /// unless the event asked to keep it.
    fn effective_recipients(&self, event: &NotificationEvent) -> Vec<PrincipalId> {
        let mut seen = HashSet::new();
        event
            .recipients
            .iter()
            .copied()
            .filter(|recipient| {
                if !event.include_actor && event.actor == Some(*recipient) {
                    return false;
                }
                seen.insert(*recipient)
            })
            .collect()
    }

    /// Suggested channels intersected with the recipient's preferences;
    /// in-app is always present and cannot be disabled.
    fn effective_channels(
        &self,
        event: &NotificationEvent,
        recipient: PrincipalId,
    ) -> Vec<ChannelKind> {
        let prefs = event
            .resource
            .map(|resource| self.registry.preferences(recipient, resource))
            .unwrap_or_default();

        let mut channels = vec![ChannelKind::InApp];
        for channel in &event.suggested_channels {
            if *channel != ChannelKind::InApp
                && prefs.allows(*channel)
                && !channels.contains(channel)
            {
                channels.push(*channel);
            }
        }
        channels
    }

    async fn is_duplicate_reminder(
        &self,
        event: &NotificationEvent,
        recipient: PrincipalId,
        now: u64,
    ) -> bool {
        if event.class != NotificationClass::Reminder {
            return false;
        }
        let since = now.saturating_sub(self.config.dedup_window.as_millis() as u64);
        match self
            .store
            .recent_exists(recipient, &event.kind, event.resource, since)
            .await
        {
            Ok(exists) => exists,
            Err(err) => {
                // Prefer a duplicate reminder over a silently dropped one.
                warn!(%recipient, kind = %event.kind, "dedup probe failed: {err}");
                false
            }
        }
    }

    async fn deliver_one(
        &self,
        id: NotificationId,
        recipient: PrincipalId,
        channel: ChannelKind,
        event: &NotificationEvent,
    ) -> (NotificationId, ChannelKind, DeliveryState) {
        if let Err(err) = self
            .store
            .update_delivery(id, channel, DeliveryState::Attempted)
            .await
        {
            warn!(%id, %channel, "failed to mark delivery attempted: {err}");
        }

        let attempt = tokio::time::timeout(self.config.delivery_timeout, async {
            match channel {
                ChannelKind::Email => {
                    self.email
                        .send_email(recipient, &event.title, &event.body)
                        .await
                }
                ChannelKind::Push => {
                    self.push
                        .send_push(recipient, &event.title, &event.payload)
                        .await
                }
                // In-app never reaches here; its record is the delivery.
                ChannelKind::InApp => Ok(()),
            }
        })
        .await;

        let state = match attempt {
            Ok(Ok(())) => DeliveryState::Sent,
            Ok(Err(err)) => {
                warn!(%recipient, %channel, "channel delivery failed: {err}");
                DeliveryState::Failed(err.to_string())
            }
            Err(_) => {
                warn!(%recipient, %channel, "channel delivery timed out");
                DeliveryState::Failed("delivery timed out".to_string())
            }
        };

        if let Err(err) = self.store.update_delivery(id, channel, state.clone()).await {
            warn!(%id, %channel, "failed to record delivery state: {err}");
        }
        (id, channel, state)
    }
}
