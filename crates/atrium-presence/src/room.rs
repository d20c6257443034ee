//! Room identifiers
//!
//! A room is an ephemeral broadcast scope keyed by a resource's hierarchy
//! path, written `{scope}:{id}` on the wire. Rooms are used for presence
//! and live push, never for authorization.

use atrium_core::{
    AtriumError, ChannelId, ListId, SpaceId, TaskId, WorkspaceId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Resource scope a room is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomScope {
    /// Workspace-wide room
    Workspace,
    /// Space room
    Space,
    /// List room
    List,
    /// Task room (task detail view)
    Task,
    /// Chat channel room
    Channel,
}

impl RoomScope {
    fn as_str(&self) -> &'static str {
        match self {
            RoomScope::Workspace => "workspace",
            RoomScope::Space => "space",
            RoomScope::List => "list",
            RoomScope::Task => "task",
            RoomScope::Channel => "channel",
        }
    }
}

impl fmt::Display for RoomScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomScope {
    type Err = AtriumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workspace" => Ok(RoomScope::Workspace),
            "space" => Ok(RoomScope::Space),
            "list" => Ok(RoomScope::List),
            "task" => Ok(RoomScope::Task),
            "channel" => Ok(RoomScope::Channel),
            other => Err(AtriumError::invalid(format!("unknown room scope: {other}"))),
        }
    }
}

/// Identifier of one broadcast room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId {
    /// Scope of the room
    pub scope: RoomScope,
    /// Raw resource identifier
    pub id: Uuid,
}

impl RoomId {
    /// Build a room id from scope and raw id
    pub fn new(scope: RoomScope, id: Uuid) -> Self {
        Self { scope, id }
    }

    /// Workspace room
    pub fn workspace(id: WorkspaceId) -> Self {
        Self::new(RoomScope::Workspace, id.uuid())
    }

    /// Space room
    pub fn space(id: SpaceId) -> Self {
        Self::new(RoomScope::Space, id.uuid())
    }

    /// List room
    pub fn list(id: ListId) -> Self {
        Self::new(RoomScope::List, id.uuid())
    }

    /// Task room
    pub fn task(id: TaskId) -> Self {
        Self::new(RoomScope::Task, id.uuid())
    }

    /// Channel room
    pub fn channel(id: ChannelId) -> Self {
        Self::new(RoomScope::Channel, id.uuid())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.id)
    }
}

impl FromStr for RoomId {
    type Err = AtriumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scope, id) = s
            .split_once(':')
            .ok_or_else(|| AtriumError::invalid(format!("malformed room id: {s}")))?;
        let scope = RoomScope::from_str(scope)?;
        let id = Uuid::parse_str(id)
            .map_err(|_| AtriumError::invalid(format!("malformed room id: {s}")))?;
        Ok(Self { scope, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_round_trips_through_string() {
        let room = RoomId::task(TaskId::new());
        let parsed: RoomId = room.to_string().parse().unwrap();
        assert_eq!(parsed, room);
    }

    #[test]
    fn malformed_room_ids_are_rejected() {
        assert!("task".parse::<RoomId>().is_err());
        assert!("task:not-a-uuid".parse::<RoomId>().is_err());
        assert!(format!("galaxy:{}", Uuid::new_v4()).parse::<RoomId>().is_err());
    }
}
