//! Notification records and delivery state
//!
//! A record is addressed to exactly one recipient and carries a per-channel
//! delivery-status vector. It is created by the dispatcher before any
//! delivery attempt (durability precedes best-effort delivery) and mutated
//! only by read/archive actions and delivery-status callbacks.

use atrium_core::{NotificationId, PrincipalId, ResourceRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Delivery channel for a notification
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Durable in-app inbox; the only channel that cannot be disabled
    InApp,
    /// Transactional email
    Email,
    /// Push notification (mobile/desktop)
    Push,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelKind::InApp => "in-app",
            ChannelKind::Email => "email",
            ChannelKind::Push => "push",
        };
        f.write_str(name)
    }
}

/// Per-channel delivery state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "reason")]
pub enum DeliveryState {
    /// Not yet attempted
    Pending,
    /// Handed to the channel, outcome unknown
    Attempted,
    /// Channel accepted the delivery
    Sent,
    /// Channel failed; reason recorded for the external retry scheduler
    Failed(String),
}

impl DeliveryState {
    /// Whether this state represents a recorded failure
    pub fn is_failed(&self) -> bool {
        matches!(self, DeliveryState::Failed(_))
    }
}

/// Durable notification addressed to one recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Record identifier
    pub id: NotificationId,
    /// The one recipient of this record
    pub recipient: PrincipalId,
    /// Opaque type tag supplied by the event producer (e.g. `task.statusChanged`)
    pub kind: String,
    /// Rendered title; the core does not render business copy
    pub title: String,
    /// Rendered body
    pub body: String,
    /// Structured payload, passed through untouched
    pub payload: serde_json::Value,
    /// Resource the notification is about, when there is one
    pub resource: Option<ResourceRef>,
    /// Delivery state per effective channel
    pub delivery: BTreeMap<ChannelKind, DeliveryState>,
    /// Read marker, mutated by inbox actions only
    pub read: bool,
    /// Archive marker, mutated by inbox actions only
    pub archived: bool,
    /// Creation time, epoch milliseconds
    pub created_at_ms: u64,
}

impl NotificationRecord {
    /// Delivery state for one channel, if that channel applies
    pub fn channel_state(&self, channel: ChannelKind) -> Option<&DeliveryState> {
        self.delivery.get(&channel)
    }

    /// Channels with a recorded failure, for the external retry scheduler
    pub fn failed_channels(&self) -> Vec<ChannelKind> {
        self.delivery
            .iter()
            .filter(|(_, state)| state.is_failed())
            .map(|(channel, _)| *channel)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_channels_are_reported() {
        let mut delivery = BTreeMap::new();
        delivery.insert(ChannelKind::InApp, DeliveryState::Sent);
        delivery.insert(
            ChannelKind::Email,
            DeliveryState::Failed("provider 502".to_string()),
        );

        let record = NotificationRecord {
            id: NotificationId::new(),
            recipient: PrincipalId::new(),
            kind: "task.assigned".to_string(),
            title: "Assigned".to_string(),
            body: String::new(),
            payload: serde_json::Value::Null,
            resource: None,
            delivery,
            read: false,
            archived: false,
            created_at_ms: 0,
        };

        assert_eq!(record.failed_channels(), vec![ChannelKind::Email]);
        assert_eq!(
            record.channel_state(ChannelKind::InApp),
            Some(&DeliveryState::Sent)
        );
    }
}
