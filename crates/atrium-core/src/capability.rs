//! Capability flags and flag sets
//!
//! A [`Capability`] is the unit of authorization: a named boolean permission.
//! Decisions compare a required capability against a resolved
//! [`CapabilitySet`]; ordinal role comparisons are never used for
//! authorization, so adding a role can never silently escalate privileges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named boolean permission evaluated on every mutating request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// View the resource itself
    CanView,
    /// View tasks contained in the resource
    CanViewTasks,
    /// Edit the resource's own fields
    CanEdit,
    /// Create tasks under the resource
    CanCreateTasks,
    /// Edit tasks under the resource
    CanEditTasks,
    /// Delete tasks under the resource
    CanDeleteTasks,
    /// Comment on the resource or its tasks
    CanComment,
    /// Add or remove members and change their roles
    CanManageMembers,
    /// Create, edit, and delete spaces
    CanManageSpaces,
    /// View all non-private spaces in the workspace
    CanViewAllSpaces,
    /// Invite new principals into the workspace
    CanInvite,
}

impl Capability {
    /// Every capability, in declaration order
    pub const ALL: [Capability; 11] = [
        Capability::CanView,
        Capability::CanViewTasks,
        Capability::CanEdit,
        Capability::CanCreateTasks,
        Capability::CanEditTasks,
        Capability::CanDeleteTasks,
        Capability::CanComment,
        Capability::CanManageMembers,
        Capability::CanManageSpaces,
        Capability::CanViewAllSpaces,
        Capability::CanInvite,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::CanView => "canView",
            Capability::CanViewTasks => "canViewTasks",
            Capability::CanEdit => "canEdit",
            Capability::CanCreateTasks => "canCreateTasks",
            Capability::CanEditTasks => "canEditTasks",
            Capability::CanDeleteTasks => "canDeleteTasks",
            Capability::CanComment => "canComment",
            Capability::CanManageMembers => "canManageMembers",
            Capability::CanManageSpaces => "canManageSpaces",
            Capability::CanViewAllSpaces => "canViewAllSpaces",
            Capability::CanInvite => "canInvite",
        };
        f.write_str(name)
    }
}

/// Resolved set of capability flags for one (principal, resource) pair
///
/// Ephemeral and cache-only: always reconstructible from membership state,
/// never persisted. Resolution is a pure function of current memberships,
/// which is what makes caching the set safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// The empty set (denies everything)
    pub fn empty() -> Self {
        Self(0)
    }

    /// The full set (every capability granted)
    pub fn all() -> Self {
        let mut set = Self::empty();
        for cap in Capability::ALL {
            set.insert(cap);
        }
        set
    }

    /// Build a set from individual capabilities
    pub fn of(caps: &[Capability]) -> Self {
        let mut set = Self::empty();
        for cap in caps {
            set.insert(*cap);
        }
        set
    }

    /// Whether the set grants a capability
    pub fn contains(&self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Grant a capability
    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    /// Revoke a capability
    pub fn remove(&mut self, cap: Capability) {
        self.0 &= !cap.bit();
    }

    /// Apply a single boolean override
    pub fn set(&mut self, cap: Capability, granted: bool) {
        if granted {
            self.insert(cap);
        } else {
            self.remove(cap);
        }
    }

    /// Whether no capability is granted
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate over granted capabilities
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|cap| self.contains(*cap))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Self::empty();
        for cap in iter {
            set.insert(cap);
        }
        set
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        write!(f, "{{")?;
        for cap in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{cap}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

/// Sparse per-membership override map
///
/// Explicit overrides always win over role defaults. Stored on the
/// membership record, so it serializes; absent keys mean "use the default".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilityOverrides {
    overrides: BTreeMap<Capability, bool>,
}

impl CapabilityOverrides {
    /// No overrides; role defaults apply unchanged
    pub fn none() -> Self {
        Self::default()
    }

    /// Set an explicit override for one capability
    pub fn with(mut self, cap: Capability, granted: bool) -> Self {
        self.overrides.insert(cap, granted);
        self
    }

    /// Look up an explicit override, if any
    pub fn get(&self, cap: Capability) -> Option<bool> {
        self.overrides.get(&cap).copied()
    }

    /// Whether any override is present
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Iterate over (capability, granted) overrides
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.overrides.iter().map(|(cap, granted)| (*cap, *granted))
    }
}
