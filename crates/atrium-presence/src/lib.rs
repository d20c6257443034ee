//! # Atrium Presence
//!
//! The connection hub: authenticated connect handshake, N connections per
//! principal, per-room presence rosters, ephemeral signal broadcast, and
//! best-effort live push. Each connection owns a bounded outbound queue
//! the hub writes into; nothing here is ever persisted.
//!
//! The hub implements [`atrium_core::LivePush`], which is how the
//! notification dispatcher reaches live recipients.

pub mod auth;
pub mod connection;
pub mod hub;
pub mod room;

pub use auth::{IdentityVerifier, StaticTokenVerifier};
pub use connection::{ClientConnection, ConnectionPhase, OutboundEvent, SignalKind};
pub use hub::{ConnectionHub, HubStats, PresenceEntry, PresenceStatus};
pub use room::{RoomId, RoomScope};
