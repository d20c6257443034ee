//! # Atrium Notify
//!
//! Notification fan-out for the Atrium platform: the watcher registry
//! (who is interested in a resource), the dispatcher (durable records
//! first, then bounded-concurrency multi-channel delivery with
//! partial-failure isolation), and the inbox query surface.
//!
//! Live push goes through the [`atrium_core::LivePush`] seam so this crate
//! never depends on the connection hub directly.

pub mod channels;
pub mod dispatcher;
pub mod event;
pub mod inbox;
pub mod record;
pub mod store;
pub mod watcher;

pub use channels::{EmailSender, PushSender, RecordingEmailSender, RecordingPushSender};
pub use dispatcher::{DispatchOutcome, DispatchReport, NotificationDispatcher};
pub use event::{NotificationClass, NotificationEvent};
pub use inbox::Inbox;
pub use record::{ChannelKind, DeliveryState, NotificationRecord};
pub use store::{InMemoryNotificationStore, InboxFilter, NotificationStore};
pub use watcher::{ChannelPrefs, EventClass, WatchScope, WatcherRecord, WatcherRegistry};
