//! Connection hub
//!
//! Tracks live connections per principal and per-room presence, and
//! provides best-effort push. Delivery to a single connection preserves
//! push order (each connection owns one queue); no ordering is guaranteed
//! across connections. Push to a principal with zero connections is a
//! silent no-op: durable delivery is the dispatcher's job.
//!
//! Lock discipline: roster mutexes serialize join/leave per room. A roster
//! mutex may be taken while holding the rooms-map lock (GC path), but the
//! map and connection locks are never acquired while a roster mutex is
//! held. Queue writes use `try_send`, so no lock is ever held across an
//! await point.

use crate::auth::IdentityVerifier;
use crate::connection::{ClientConnection, ConnectionPhase, OutboundEvent, SignalKind};
use crate::room::RoomId;
use atrium_core::{
    AtriumError, Clock, ConnectionId, HubConfig, LivePush, PrincipalId, Result,
};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Presence status of a room member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// Actively interacting
    Active,
    /// Connected but quiet
    Idle,
}

/// Roster snapshot entry for one principal in one room
#[derive(Debug, Clone, Serialize)]
pub struct PresenceEntry {
    /// The present principal
    pub principal: PrincipalId,
    /// Current status
    pub status: PresenceStatus,
    /// Last observed activity, epoch milliseconds
    pub last_seen_ms: u64,
}

/// Hub statistics for operational introspection
#[derive(Debug, Clone, Serialize)]
pub struct HubStats {
    /// Distinct principals with at least one live connection
    pub principals: usize,
    /// Total live connections
    pub connections: usize,
    /// Rooms with at least one member
    pub rooms: usize,
}

struct MemberPresence {
    status: PresenceStatus,
    last_seen_ms: u64,
    /// Live connections of this principal inside this room, with their
    /// queues so broadcast never needs the connection table.
    connections: HashMap<ConnectionId, mpsc::Sender<OutboundEvent>>,
}

impl MemberPresence {
    fn new(now_ms: u64) -> Self {
        Self {
            status: PresenceStatus::Active,
            last_seen_ms: now_ms,
            connections: HashMap::new(),
        }
    }
}

#[derive(Default)]
struct RoomRoster {
    members: HashMap<PrincipalId, MemberPresence>,
}

impl RoomRoster {
    fn snapshot(&self) -> Vec<PresenceEntry> {
        let mut entries: Vec<PresenceEntry> = self
            .members
            .iter()
            .map(|(principal, member)| PresenceEntry {
                principal: *principal,
                status: member.status,
                last_seen_ms: member.last_seen_ms,
            })
            .collect();
        entries.sort_by_key(|entry| entry.principal);
        entries
    }

    /// Queue an event on every member connection, skipping one principal
    /// (a principal never needs its own presence echo). Returns how many
    /// queues accepted the event.
    fn broadcast(&self, event: &OutboundEvent, exclude: Option<PrincipalId>) -> usize {
        let mut delivered = 0;
        for (principal, member) in &self.members {
            if exclude == Some(*principal) {
                continue;
            }
            for (connection, sender) in &member.connections {
                match sender.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(%connection, event = %event.event, "outbound queue full; dropping");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        debug!(%connection, "outbound queue closed; connection is gone");
                    }
                }
            }
        }
        delivered
    }
}

struct ConnectionEntry {
    principal: PrincipalId,
    sender: mpsc::Sender<OutboundEvent>,
    rooms: HashSet<RoomId>,
}

/// Live connection and presence hub
pub struct ConnectionHub {
    config: HubConfig,
    verifier: Arc<dyn IdentityVerifier>,
    clock: Arc<dyn Clock>,
    connections: RwLock<HashMap<ConnectionId, ConnectionEntry>>,
    rooms: RwLock<HashMap<RoomId, Arc<Mutex<RoomRoster>>>>,
}

impl ConnectionHub {
    /// Create a hub with the given verifier and clock
    pub fn new(verifier: Arc<dyn IdentityVerifier>, clock: Arc<dyn Clock>, config: HubConfig) -> Self {
        Self {
            config,
            verifier,
            clock,
            connections: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Authenticated connect handshake.
    ///
    /// Any verification failure terminates the handshake with
    /// `ConnectionRejected` and creates no connection or room state.
    pub async fn connect(&self, token: &str) -> Result<ClientConnection> {
        let principal = self
            .verifier
            .verify(token)
            .await
            .map_err(|err| AtriumError::connection_rejected(err.to_string()))?;

        let (sender, events) = mpsc::channel(self.config.queue_capacity.max(1));
        let id = ConnectionId::new();
        self.connections.write().insert(
            id,
            ConnectionEntry {
                principal,
                sender,
                rooms: HashSet::new(),
            },
        );
        info!(connection = %id, %principal, "connection authenticated");

        Ok(ClientConnection {
            id,
            principal,
            events,
        })
    }

    /// Join a room: idempotent, announces presence to the other members,
    /// and returns a roster snapshot reflecting every join/leave ordered
    /// before this call (the joiner misses nothing in between).
    pub fn join(&self, connection: ConnectionId, room: RoomId) -> Result<Vec<PresenceEntry>> {
        let now = self.clock.now_ms();
        let (principal, sender) = {
            let mut connections = self.connections.write();
            let entry = connections
                .get_mut(&connection)
                .ok_or_else(|| AtriumError::not_found(format!("connection {connection}")))?;
            entry.rooms.insert(room);
            (entry.principal, entry.sender.clone())
        };

        let roster = self.room_entry(room);
        let mut roster = roster.lock();

        let newly_present = !roster.members.contains_key(&principal);
        let member = roster
            .members
            .entry(principal)
            .or_insert_with(|| MemberPresence::new(now));
        member.connections.insert(connection, sender);
        member.status = PresenceStatus::Active;
        member.last_seen_ms = now;

        if newly_present {
            let event = OutboundEvent::new(
                "presence.joined",
                serde_json::json!({
                    "principal": principal.to_string(),
                    "room": room.to_string(),
                }),
            );
            roster.broadcast(&event, Some(principal));
            debug!(%principal, %room, "presence joined");
        }

        Ok(roster.snapshot())
    }

    /// Leave a room. The principal disappears from the roster only when
    /// this was their last live connection in it.
    pub fn leave(&self, connection: ConnectionId, room: RoomId) -> Result<()> {
        let principal = {
            let mut connections = self.connections.write();
            let entry = connections
                .get_mut(&connection)
                .ok_or_else(|| AtriumError::not_found(format!("connection {connection}")))?;
            entry.rooms.remove(&room);
            entry.principal
        };
        self.remove_from_room(connection, principal, room);
        Ok(())
    }

    /// Tear down a connection: leaves every joined room and drops the
    /// outbound queue. Idempotent.
    pub fn disconnect(&self, connection: ConnectionId) {
        let entry = self.connections.write().remove(&connection);
        let Some(entry) = entry else {
            return;
        };
        for room in &entry.rooms {
            self.remove_from_room(connection, entry.principal, *room);
        }
        info!(connection = %connection, principal = %entry.principal, "connection closed");
    }

    /// Push an opaque event to every live connection of a principal.
    ///
    /// Order is preserved per connection; nothing is guaranteed across
    /// connections. Returns the number of queues that accepted the event.
    pub fn push_to_principal(
        &self,
        principal: PrincipalId,
        event: &str,
        payload: serde_json::Value,
    ) -> usize {
        let connections = self.connections.read();
        let mut delivered = 0;
        for (connection, entry) in connections.iter() {
            if entry.principal != principal {
                continue;
            }
            let event = OutboundEvent::new(event, payload.clone());
            match entry.sender.try_send(event) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(%connection, "outbound queue full; dropping push");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(%connection, "push to closed connection skipped");
                }
            }
        }
        delivered
    }

    /// Broadcast an opaque event to every member of a room
    pub fn broadcast_to_room(
        &self,
        room: RoomId,
        event: &str,
        payload: serde_json::Value,
    ) -> usize {
        let Some(roster) = self.rooms.read().get(&room).cloned() else {
            return 0;
        };
        let roster = roster.lock();
        roster.broadcast(&OutboundEvent::new(event, payload), None)
    }

    /// Broadcast an ephemeral signal to room peers: at-most-once, no
    /// persistence, no retry. The sender's own connections are skipped.
    pub fn signal(
        &self,
        connection: ConnectionId,
        room: RoomId,
        kind: SignalKind,
        payload: serde_json::Value,
    ) -> Result<usize> {
        let principal = {
            let connections = self.connections.read();
            let entry = connections
                .get(&connection)
                .ok_or_else(|| AtriumError::not_found(format!("connection {connection}")))?;
            if !entry.rooms.contains(&room) {
                return Err(AtriumError::invalid(format!(
                    "connection {connection} has not joined {room}"
                )));
            }
            entry.principal
        };

        let Some(roster) = self.rooms.read().get(&room).cloned() else {
            return Ok(0);
        };
        let mut roster = roster.lock();
        if let Some(member) = roster.members.get_mut(&principal) {
            member.status = PresenceStatus::Active;
            member.last_seen_ms = self.clock.now_ms();
        }
        let event = OutboundEvent::new(kind.event_name(), payload);
        Ok(roster.broadcast(&event, Some(principal)))
    }

    /// Update a member's presence status in one room and tell the peers
    pub fn set_status(
        &self,
        connection: ConnectionId,
        room: RoomId,
        status: PresenceStatus,
    ) -> Result<()> {
        let principal = {
            let connections = self.connections.read();
            connections
                .get(&connection)
                .map(|entry| entry.principal)
                .ok_or_else(|| AtriumError::not_found(format!("connection {connection}")))?
        };

        let Some(roster) = self.rooms.read().get(&room).cloned() else {
            return Ok(());
        };
        let mut roster = roster.lock();
        if let Some(member) = roster.members.get_mut(&principal) {
            member.status = status;
            member.last_seen_ms = self.clock.now_ms();
            let event = OutboundEvent::new(
                "presence.statusChanged",
                serde_json::json!({
                    "principal": principal.to_string(),
                    "room": room.to_string(),
                    "status": status,
                }),
            );
            roster.broadcast(&event, Some(principal));
        }
        Ok(())
    }

    /// Lifecycle phase of a connection id.
    ///
    /// A connection only exists in the table once its handshake succeeded,
    /// so an unknown or torn-down id reads as `Disconnected`; `Connecting`
    /// is observable only inside the handshake itself.
    pub fn phase(&self, connection: ConnectionId) -> ConnectionPhase {
        if self.connections.read().contains_key(&connection) {
            ConnectionPhase::Authenticated
        } else {
            ConnectionPhase::Disconnected
        }
    }

    /// Current roster snapshot for a room; empty when the room has no members
    pub fn roster(&self, room: RoomId) -> Vec<PresenceEntry> {
        match self.rooms.read().get(&room) {
            Some(roster) => roster.lock().snapshot(),
            None => Vec::new(),
        }
    }

    /// Operational statistics
    pub fn stats(&self) -> HubStats {
        let connections = self.connections.read();
        let principals: HashSet<PrincipalId> =
            connections.values().map(|entry| entry.principal).collect();
        HubStats {
            principals: principals.len(),
            connections: connections.len(),
            rooms: self.rooms.read().len(),
        }
    }

    fn room_entry(&self, room: RoomId) -> Arc<Mutex<RoomRoster>> {
        self.rooms
            .write()
            .entry(room)
            .or_insert_with(|| Arc::new(Mutex::new(RoomRoster::default())))
            .clone()
    }

    /// Drop one connection from a room roster, removing the member when it
    /// was their last connection there and the room when it empties.
    fn remove_from_room(&self, connection: ConnectionId, principal: PrincipalId, room: RoomId) {
        let Some(roster_arc) = self.rooms.read().get(&room).cloned() else {
            return;
        };

        let emptied = {
            let mut roster = roster_arc.lock();
            let last_connection = match roster.members.get_mut(&principal) {
                Some(member) => {
                    member.connections.remove(&connection);
                    member.connections.is_empty()
                }
                None => false,
            };
            if last_connection {
                roster.members.remove(&principal);
                let event = OutboundEvent::new(
                    "presence.left",
                    serde_json::json!({
                        "principal": principal.to_string(),
                        "room": room.to_string(),
                    }),
                );
                roster.broadcast(&event, None);
                debug!(%principal, %room, "presence left");
            }
            roster.members.is_empty()
        };

        if emptied {
            // GC under the map write lock; re-check emptiness in case a
            // join raced in between.
            let mut rooms = self.rooms.write();
            if let Some(arc) = rooms.get(&room) {
                if arc.lock().members.is_empty() {
                    rooms.remove(&room);
                }
            }
        }
    }
}

impl LivePush for ConnectionHub {
    fn push(&self, principal: PrincipalId, event: &str, payload: serde_json::Value) -> usize {
        self.push_to_principal(principal, event, payload)
    }
}
