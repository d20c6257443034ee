//! Connection lifecycle and outbound events
//!
//! Each connection is an ephemeral (principal, session) pair created on
//! connect and destroyed on disconnect, never persisted. A connection owns
//! a bounded outbound queue; the hub writes events into the queue rather
//! than invoking callbacks, which makes backpressure and disconnect
//! cleanup explicit.

use atrium_core::{ConnectionId, PrincipalId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Lifecycle of a connection
///
/// `Connecting → Authenticated → Disconnected`; the handshake must present
/// a valid token to move past `Connecting`, and a rejected connection is
/// never promoted (the hub creates no state for it). Room membership only
/// exists while `Authenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionPhase {
    /// Handshake in progress; no room state exists
    Connecting,
    /// Token verified; the connection may join rooms and receive pushes
    Authenticated,
    /// Terminal; all room state has been released
    Disconnected,
}

/// Event delivered to a connection's outbound queue
///
/// Event names are opaque strings passed through from the producer; the
/// hub defines only the `presence.*` names it emits itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEvent {
    /// Event name (e.g. `task.statusChanged`, `presence.joined`)
    pub event: String,
    /// Structured payload
    pub payload: serde_json::Value,
}

impl OutboundEvent {
    /// Build an event
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

impl fmt::Display for OutboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.event)
    }
}

/// Client half of an authenticated connection
///
/// Returned by the hub's connect handshake. Dropping the receiver (or the
/// whole struct) without calling disconnect leaves cleanup to the next
/// failed push; polite clients call `ConnectionHub::disconnect`.
pub struct ClientConnection {
    /// Connection identifier, used for join/leave/signal calls
    pub id: ConnectionId,
    /// Principal the token resolved to
    pub principal: PrincipalId,
    /// Outbound event stream for this connection
    pub events: mpsc::Receiver<OutboundEvent>,
}

impl fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("principal", &self.principal)
            .finish_non_exhaustive()
    }
}

/// Ephemeral collaboration signals broadcast to room peers
///
/// At-most-once, last-write-wins: never persisted, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// The sender started typing
    TypingStart,
    /// The sender stopped typing
    TypingStop,
    /// Cursor moved (payload carries position)
    CursorMove,
    /// Selection changed (payload carries range)
    Selection,
}

impl SignalKind {
    /// Wire name of the signal event
    pub fn event_name(&self) -> &'static str {
        match self {
            SignalKind::TypingStart => "signal.typingStart",
            SignalKind::TypingStop => "signal.typingStop",
            SignalKind::CursorMove => "signal.cursorMove",
            SignalKind::Selection => "signal.selection",
        }
    }
}
