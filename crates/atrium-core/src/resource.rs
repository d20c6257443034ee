//! Resource hierarchy model
//!
//! Workspace owns Spaces; Space owns Folders and Lists (Folder optional);
//! List owns Tasks. Every resource carries denormalized container pointers
//! so permission resolution never needs more than one hierarchy hop per
//! level. Container pointers are immutable after creation except through an
//! explicit move operation re-validated at both ends.

use crate::identifiers::{
    ChannelId, FolderId, ListId, SpaceId, TaskId, TeamId, WorkspaceId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of an addressable resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Root of the hierarchy
    Workspace,
    /// Space within a workspace
    Space,
    /// Folder within a space
    Folder,
    /// List within a space or folder
    List,
    /// Task within a list
    Task,
    /// Team within a workspace
    Team,
    /// Chat channel within a workspace
    Channel,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Workspace => "workspace",
            ResourceKind::Space => "space",
            ResourceKind::Folder => "folder",
            ResourceKind::List => "list",
            ResourceKind::Task => "task",
            ResourceKind::Team => "team",
            ResourceKind::Channel => "channel",
        };
        f.write_str(name)
    }
}

/// Untyped reference to a resource: kind + raw id
///
/// Cache keys, watcher records, and notification payloads address resources
/// this way; the typed ids convert into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Kind of the referenced resource
    pub kind: ResourceKind,
    /// Raw identifier of the resource
    pub id: Uuid,
}

impl ResourceRef {
    /// Build a reference from a kind and raw id
    pub fn new(kind: ResourceKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl From<WorkspaceId> for ResourceRef {
    fn from(id: WorkspaceId) -> Self {
        Self::new(ResourceKind::Workspace, id.uuid())
    }
}

impl From<SpaceId> for ResourceRef {
    fn from(id: SpaceId) -> Self {
        Self::new(ResourceKind::Space, id.uuid())
    }
}

impl From<FolderId> for ResourceRef {
    fn from(id: FolderId) -> Self {
        Self::new(ResourceKind::Folder, id.uuid())
    }
}

impl From<ListId> for ResourceRef {
    fn from(id: ListId) -> Self {
        Self::new(ResourceKind::List, id.uuid())
    }
}

impl From<TaskId> for ResourceRef {
    fn from(id: TaskId) -> Self {
        Self::new(ResourceKind::Task, id.uuid())
    }
}

impl From<TeamId> for ResourceRef {
    fn from(id: TeamId) -> Self {
        Self::new(ResourceKind::Team, id.uuid())
    }
}

impl From<ChannelId> for ResourceRef {
    fn from(id: ChannelId) -> Self {
        Self::new(ResourceKind::Channel, id.uuid())
    }
}

/// Kind of a container that can hold memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Workspace-level membership
    Workspace,
    /// Space-level membership
    Space,
    /// List-level membership (list sharing)
    List,
    /// Team membership
    Team,
    /// Channel membership
    Channel,
}

/// Untyped reference to a membership container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    /// Kind of the container
    pub kind: ContainerKind,
    /// Raw identifier of the container
    pub id: Uuid,
}

impl ContainerRef {
    /// Build a reference from a kind and raw id
    pub fn new(kind: ContainerKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    /// Workspace container reference
    pub fn workspace(id: WorkspaceId) -> Self {
        Self::new(ContainerKind::Workspace, id.uuid())
    }

    /// Space container reference
    pub fn space(id: SpaceId) -> Self {
        Self::new(ContainerKind::Space, id.uuid())
    }

    /// List container reference
    pub fn list(id: ListId) -> Self {
        Self::new(ContainerKind::List, id.uuid())
    }

    /// Team container reference
    pub fn team(id: TeamId) -> Self {
        Self::new(ContainerKind::Team, id.uuid())
    }

    /// Channel container reference
    pub fn channel(id: ChannelId) -> Self {
        Self::new(ContainerKind::Channel, id.uuid())
    }
}

impl From<ContainerRef> for ResourceRef {
    fn from(container: ContainerRef) -> Self {
        let kind = match container.kind {
            ContainerKind::Workspace => ResourceKind::Workspace,
            ContainerKind::Space => ResourceKind::Space,
            ContainerKind::List => ResourceKind::List,
            ContainerKind::Team => ResourceKind::Team,
            ContainerKind::Channel => ResourceKind::Channel,
        };
        ResourceRef::new(kind, container.id)
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ContainerKind::Workspace => "workspace",
            ContainerKind::Space => "space",
            ContainerKind::List => "list",
            ContainerKind::Team => "team",
            ContainerKind::Channel => "channel",
        };
        write!(f, "{}:{}", kind, self.id)
    }
}

/// Denormalized container pointers for one resource
///
/// Returned by the hierarchy store; gives resolution everything it needs to
/// walk Task → List → Space → Workspace without re-reading the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Owning workspace (always present)
    pub workspace_id: WorkspaceId,
    /// Owning space, where applicable
    pub space_id: Option<SpaceId>,
    /// Owning list, for tasks
    pub list_id: Option<ListId>,
    /// Whether the owning space is private-scoped
    ///
    /// `false` when the resource has no owning space.
    pub space_is_private: bool,
}

impl ContainerInfo {
    /// Container info for a workspace-rooted resource with no space
    pub fn workspace_only(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            space_id: None,
            list_id: None,
            space_is_private: false,
        }
    }

    /// Container info for a resource directly under a space
    pub fn in_space(workspace_id: WorkspaceId, space_id: SpaceId, private: bool) -> Self {
        Self {
            workspace_id,
            space_id: Some(space_id),
            list_id: None,
            space_is_private: private,
        }
    }

    /// Container info for a task under a list
    pub fn in_list(
        workspace_id: WorkspaceId,
        space_id: SpaceId,
        list_id: ListId,
        private: bool,
    ) -> Self {
        Self {
            workspace_id,
            space_id: Some(space_id),
            list_id: Some(list_id),
            space_is_private: private,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::TaskId;

    #[test]
    fn resource_ref_display_is_scope_colon_id() {
        let id = TaskId::new();
        let r: ResourceRef = id.into();
        assert_eq!(r.to_string(), format!("task:{}", id.uuid()));
    }

    #[test]
    fn container_info_constructors_set_pointers() {
        let ws = WorkspaceId::new();
        let space = SpaceId::new();
        let list = ListId::new();

        let info = ContainerInfo::in_list(ws, space, list, true);
        assert_eq!(info.workspace_id, ws);
        assert_eq!(info.space_id, Some(space));
        assert_eq!(info.list_id, Some(list));
        assert!(info.space_is_private);

        let root = ContainerInfo::workspace_only(ws);
        assert!(root.space_id.is_none());
        assert!(!root.space_is_private);
    }
}
