//! Membership records
//!
//! A membership grants a principal a role within exactly one container.
//! Removal is a hard delete: the record disappears from the membership list
//! and the next permission resolution sees its absence immediately (the
//! cache is invalidated by the mutation path).

use crate::capability::CapabilityOverrides;
use crate::errors::{AtriumError, Result};
use crate::identifiers::PrincipalId;
use crate::resource::{ContainerKind, ContainerRef};
use crate::roles::Role;
use serde::{Deserialize, Serialize};

/// Role grant for one (principal, container) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// The principal holding the membership
    pub principal: PrincipalId,
    /// The container the membership belongs to
    pub container: ContainerRef,
    /// Role within the container
    pub role: Role,
    /// Explicit per-capability overrides; win over role defaults
    pub overrides: CapabilityOverrides,
}

impl Membership {
    /// Create a membership, checking that the role variant matches the
    /// container kind.
    pub fn new(principal: PrincipalId, container: ContainerRef, role: Role) -> Result<Self> {
        let matches = matches!(
            (container.kind, &role),
            (ContainerKind::Workspace, Role::Workspace(_))
                | (ContainerKind::Space, Role::Space(_))
                | (ContainerKind::List, Role::List(_))
                | (ContainerKind::Team, Role::Team(_))
                | (ContainerKind::Channel, Role::Channel(_))
        );
        if !matches {
            return Err(AtriumError::invalid(format!(
                "role {role} does not fit container {container}"
            )));
        }
        Ok(Self {
            principal,
            container,
            role,
            overrides: CapabilityOverrides::none(),
        })
    }

    /// Attach explicit capability overrides
    pub fn with_overrides(mut self, overrides: CapabilityOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::{SpaceId, WorkspaceId};
    use crate::roles::{SpaceRole, WorkspaceRole};

    #[test]
    fn role_must_match_container_kind() {
        let principal = PrincipalId::new();
        let space = ContainerRef::space(SpaceId::new());

        assert!(Membership::new(principal, space, Role::Space(SpaceRole::Member)).is_ok());
        assert!(
            Membership::new(principal, space, Role::Workspace(WorkspaceRole::Member)).is_err()
        );
    }

    #[test]
    fn membership_starts_without_overrides() {
        let m = Membership::new(
            PrincipalId::new(),
            ContainerRef::workspace(WorkspaceId::new()),
            Role::Workspace(WorkspaceRole::Member),
        )
        .unwrap();
        assert!(m.overrides.is_empty());
    }
}
