//! Role-default capability tables
//!
//! One table per role ladder. These are the *defaults*: a membership's
//! explicit override map wins per flag, and the workspace owner bypasses
//! the tables entirely.

use atrium_core::{Capability, CapabilitySet, ChannelRole, Role, SpaceRole, TeamRole, WorkspaceRole};

/// Default capability set granted by a role, before overrides
pub fn role_defaults(role: &Role) -> CapabilitySet {
    match role {
        Role::Workspace(role) => workspace_defaults(*role),
        Role::Space(role) | Role::List(role) => space_defaults(*role),
        Role::Team(role) => team_defaults(*role),
        Role::Channel(role) => channel_defaults(*role),
    }
}

/// Minimal fallback for principals with workspace visibility but no
/// membership at any hierarchy level: view and nothing else.
pub fn no_membership_fallback() -> CapabilitySet {
    CapabilitySet::of(&[Capability::CanView, Capability::CanViewTasks])
}

fn workspace_defaults(role: WorkspaceRole) -> CapabilitySet {
    match role {
        WorkspaceRole::Owner | WorkspaceRole::Admin => CapabilitySet::all(),
        WorkspaceRole::Member => CapabilitySet::of(&[
            Capability::CanView,
            Capability::CanViewTasks,
            Capability::CanViewAllSpaces,
            Capability::CanCreateTasks,
            Capability::CanEditTasks,
            Capability::CanComment,
        ]),
        WorkspaceRole::Guest => CapabilitySet::of(&[
            Capability::CanView,
            Capability::CanViewTasks,
            Capability::CanComment,
        ]),
    }
}

fn space_defaults(role: SpaceRole) -> CapabilitySet {
    match role {
        SpaceRole::Admin => CapabilitySet::of(&[
            Capability::CanView,
            Capability::CanViewTasks,
            Capability::CanEdit,
            Capability::CanCreateTasks,
            Capability::CanEditTasks,
            Capability::CanDeleteTasks,
            Capability::CanComment,
            Capability::CanManageMembers,
        ]),
        SpaceRole::Member => CapabilitySet::of(&[
            Capability::CanView,
            Capability::CanViewTasks,
            Capability::CanCreateTasks,
            Capability::CanEditTasks,
            Capability::CanComment,
        ]),
        SpaceRole::Viewer => {
            CapabilitySet::of(&[Capability::CanView, Capability::CanViewTasks])
        }
    }
}

fn team_defaults(role: TeamRole) -> CapabilitySet {
    match role {
        TeamRole::Lead => CapabilitySet::of(&[
            Capability::CanView,
            Capability::CanViewTasks,
            Capability::CanEdit,
            Capability::CanCreateTasks,
            Capability::CanEditTasks,
            Capability::CanComment,
            Capability::CanManageMembers,
        ]),
        TeamRole::Member => CapabilitySet::of(&[
            Capability::CanView,
            Capability::CanViewTasks,
            Capability::CanComment,
        ]),
        TeamRole::Viewer => {
            CapabilitySet::of(&[Capability::CanView, Capability::CanViewTasks])
        }
    }
}

fn channel_defaults(role: ChannelRole) -> CapabilitySet {
    match role {
        ChannelRole::Admin => CapabilitySet::of(&[
            Capability::CanView,
            Capability::CanEdit,
            Capability::CanComment,
            Capability::CanManageMembers,
        ]),
        ChannelRole::Member => {
            CapabilitySet::of(&[Capability::CanView, Capability::CanComment])
        }
    }
}
