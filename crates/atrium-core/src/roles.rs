//! Role enums per container kind
//!
//! Roles are attributes of a membership, never of a principal globally.
//! Each enum carries an explicit `seniority` ordering used only by
//! promotion/demotion guards; authorization decisions go through capability
//! flags exclusively.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Workspace-scoped role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    /// Workspace owner; capability is total and never shadowed
    Owner,
    /// Administers members, spaces, and settings
    Admin,
    /// Regular collaborator
    Member,
    /// Restricted external collaborator
    Guest,
}

/// Space-scoped role, also used for list-level memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceRole {
    /// Administers the space and its membership
    Admin,
    /// Regular collaborator within the space
    Member,
    /// Read-only access
    Viewer,
}

/// Team-scoped role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Leads the team; manages team membership
    Lead,
    /// Regular team member
    Member,
    /// Read-only visibility into the team
    Viewer,
}

/// Channel-scoped role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    /// Administers the channel
    Admin,
    /// Regular channel participant
    Member,
}

/// Role held by a membership, tagged by container kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "container", content = "role")]
pub enum Role {
    /// Role within a workspace
    Workspace(WorkspaceRole),
    /// Role within a space
    Space(SpaceRole),
    /// Role on a list (lists reuse the space role ladder)
    List(SpaceRole),
    /// Role within a team
    Team(TeamRole),
    /// Role within a chat channel
    Channel(ChannelRole),
}

impl Role {
    /// Explicit seniority ordering within one container kind.
    ///
    /// Higher means more senior. Only promotion/demotion guards consult
    /// this; authorization never does. Comparing across container kinds is
    /// meaningless and returns `None`.
    pub fn seniority(&self) -> u8 {
        match self {
            Role::Workspace(WorkspaceRole::Owner) => 4,
            Role::Workspace(WorkspaceRole::Admin) => 3,
            Role::Workspace(WorkspaceRole::Member) => 2,
            Role::Workspace(WorkspaceRole::Guest) => 1,
            Role::Space(SpaceRole::Admin) | Role::List(SpaceRole::Admin) => 3,
            Role::Space(SpaceRole::Member) | Role::List(SpaceRole::Member) => 2,
            Role::Space(SpaceRole::Viewer) | Role::List(SpaceRole::Viewer) => 1,
            Role::Team(TeamRole::Lead) => 3,
            Role::Team(TeamRole::Member) => 2,
            Role::Team(TeamRole::Viewer) => 1,
            Role::Channel(ChannelRole::Admin) => 3,
            Role::Channel(ChannelRole::Member) => 2,
        }
    }

    /// Whether two roles belong to the same container kind
    pub fn same_kind(&self, other: &Role) -> bool {
        matches!(
            (self, other),
            (Role::Workspace(_), Role::Workspace(_))
                | (Role::Space(_), Role::Space(_))
                | (Role::List(_), Role::List(_))
                | (Role::Team(_), Role::Team(_))
                | (Role::Channel(_), Role::Channel(_))
        )
    }

    /// Promotion/demotion guard: may an actor holding `self` assign
    /// `target` to someone else?
    ///
    /// An actor may only grant roles at or below their own seniority, and
    /// only within the same container kind.
    pub fn can_assign(&self, target: &Role) -> bool {
        self.same_kind(target) && self.seniority() >= target.seniority()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Wire names match the membership documents the platform stores.
        let name = match self {
            Role::Workspace(WorkspaceRole::Owner) => "workspace/owner",
            Role::Workspace(WorkspaceRole::Admin) => "workspace/admin",
            Role::Workspace(WorkspaceRole::Member) => "workspace/member",
            Role::Workspace(WorkspaceRole::Guest) => "workspace/guest",
            Role::Space(SpaceRole::Admin) => "space/admin",
            Role::Space(SpaceRole::Member) => "space/member",
            Role::Space(SpaceRole::Viewer) => "space/viewer",
            Role::List(SpaceRole::Admin) => "list/admin",
            Role::List(SpaceRole::Member) => "list/member",
            Role::List(SpaceRole::Viewer) => "list/viewer",
            Role::Team(TeamRole::Lead) => "team/lead",
            Role::Team(TeamRole::Member) => "team/member",
            Role::Team(TeamRole::Viewer) => "team/viewer",
            Role::Channel(ChannelRole::Admin) => "channel/admin",
            Role::Channel(ChannelRole::Member) => "channel/member",
        };
        f.write_str(name)
    }
}
