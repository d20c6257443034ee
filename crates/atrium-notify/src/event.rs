//! Notification events
//!
//! The envelope a producer hands to the dispatcher: recipients, an opaque
//! type tag, rendered copy, a structured payload, and suggested channels.
//! Event names carry no business semantics inside the core; they are
//! delivered as-is.

use crate::record::ChannelKind;
use atrium_core::{PrincipalId, ResourceRef};
use serde::{Deserialize, Serialize};

/// Delivery class of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationClass {
    /// Regular one-shot notification
    Standard,
    /// Scheduler-driven reminder; subject to the dedup window
    Reminder,
}

/// A domain event ready for dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Opaque type tag (e.g. `task.statusChanged`, `reminder.dueSoon`)
    pub kind: String,
    /// Standard or reminder; reminders are deduplicated
    pub class: NotificationClass,
    /// Acting principal, excluded from recipients unless requested
    pub actor: Option<PrincipalId>,
    /// Interested parties, as produced by the watcher registry
    pub recipients: Vec<PrincipalId>,
    /// Rendered title
    pub title: String,
    /// Rendered body
    pub body: String,
    /// Structured payload, passed through untouched
    pub payload: serde_json::Value,
    /// Resource the event concerns, used for reminder dedup
    pub resource: Option<ResourceRef>,
    /// Channels the producer suggests; intersected with recipient prefs
    pub suggested_channels: Vec<ChannelKind>,
    /// Include the actor in the recipient set (audit-trail use)
    pub include_actor: bool,
}

impl NotificationEvent {
    /// Start building an event with the given type tag
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            class: NotificationClass::Standard,
            actor: None,
            recipients: Vec::new(),
            title: String::new(),
            body: String::new(),
            payload: serde_json::Value::Null,
            resource: None,
            suggested_channels: vec![ChannelKind::InApp],
            include_actor: false,
        }
    }

    /// Mark as a reminder-class event
    pub fn reminder(mut self) -> Self {
        self.class = NotificationClass::Reminder;
        self
    }

    /// Set the acting principal
    pub fn from_actor(mut self, actor: PrincipalId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set the recipient list
    pub fn to(mut self, recipients: Vec<PrincipalId>) -> Self {
        self.recipients = recipients;
        self
    }

    /// Set the rendered title and body
    pub fn with_copy(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.title = title.into();
        self.body = body.into();
        self
    }

    /// Attach the structured payload
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Attach the resource the event concerns
    pub fn about(mut self, resource: ResourceRef) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Suggest delivery channels
    pub fn via(mut self, channels: Vec<ChannelKind>) -> Self {
        self.suggested_channels = channels;
        self
    }

    /// Keep the actor in the recipient set
    pub fn including_actor(mut self) -> Self {
        self.include_actor = true;
        self
    }
}
