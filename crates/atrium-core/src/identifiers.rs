//! Core identifier types used across the Atrium platform
//!
//! Uuid-backed newtypes for every entity the core touches. Keeping these
//! distinct prevents a task id from being handed to a workspace lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifies an actor (user) across all containers
    ///
    /// A principal has no global role; roles live on memberships.
    PrincipalId,
    "principal"
);

define_id!(
    /// Identifies a workspace, the root of the resource hierarchy
    WorkspaceId,
    "workspace"
);

define_id!(
    /// Identifies a space within a workspace
    SpaceId,
    "space"
);

define_id!(
    /// Identifies a folder within a space
    FolderId,
    "folder"
);

define_id!(
    /// Identifies a list within a space or folder
    ListId,
    "list"
);

define_id!(
    /// Identifies a task within a list
    TaskId,
    "task"
);

define_id!(
    /// Identifies a team within a workspace
    TeamId,
    "team"
);

define_id!(
    /// Identifies a chat channel within a workspace
    ChannelId,
    "channel"
);

define_id!(
    /// Identifies a single live connection (one device/tab)
    ///
    /// A principal may own zero or many simultaneous connections.
    ConnectionId,
    "connection"
);

define_id!(
    /// Identifies a persisted notification record
    NotificationId,
    "notification"
);
