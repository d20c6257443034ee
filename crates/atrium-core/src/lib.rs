//! # Atrium Core
//!
//! Shared vocabulary for the Atrium work-management core: identifier
//! newtypes, roles and capability flags, membership records, the resource
//! hierarchy model, the unified error type, and the effect seams the other
//! crates are built against.
//!
//! The crates layered on top:
//! - `atrium-authorization`: permission resolution and caching
//! - `atrium-notify`: watcher registry, dispatcher, inbox
//! - `atrium-presence`: connection hub, rooms, live push

pub mod capability;
pub mod config;
pub mod effects;
pub mod errors;
pub mod identifiers;
pub mod membership;
pub mod resource;
pub mod roles;

pub use capability::{Capability, CapabilityOverrides, CapabilitySet};
pub use config::{AuthorizationConfig, DispatchConfig, HubConfig};
pub use effects::{Clock, LivePush, ManualClock, NoopLivePush, SystemClock};
pub use errors::{AtriumError, Result};
pub use identifiers::{
    ChannelId, ConnectionId, FolderId, ListId, NotificationId, PrincipalId, SpaceId, TaskId,
    TeamId, WorkspaceId,
};
pub use membership::Membership;
pub use resource::{ContainerInfo, ContainerKind, ContainerRef, ResourceKind, ResourceRef};
pub use roles::{ChannelRole, Role, SpaceRole, TeamRole, WorkspaceRole};
