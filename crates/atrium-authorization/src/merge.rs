//! Capability precedence merge
//!
//! The one place where role defaults, explicit overrides, ownership, and
//! the no-membership fallback combine. Precedence, strongest first:
//! owner > explicit override > role default > inherited fallback.
//! Pure functions; unit-testable without any store.

use crate::defaults::{no_membership_fallback, role_defaults};
use atrium_core::{CapabilityOverrides, CapabilitySet, Membership};

/// Apply a membership's explicit overrides on top of a default set
pub fn apply_overrides(defaults: CapabilitySet, overrides: &CapabilityOverrides) -> CapabilitySet {
    let mut effective = defaults;
    for (cap, granted) in overrides.iter() {
        effective.set(cap, granted);
    }
    effective
}

/// Compute the effective capability set for one (principal, resource) pair
/// from already-fetched membership state.
///
/// * `is_workspace_owner`: owner capability is total and never shadowed.
/// * `membership`: the nearest-level membership, if one exists.
/// * `workspace_visible`: whether the principal's workspace role grants
///   `canViewAllSpaces`; only consulted when no membership exists.
/// * `container_private`: private containers deny principals without a
///   membership regardless of workspace role.
pub fn effective_capabilities(
    is_workspace_owner: bool,
    membership: Option<&Membership>,
    workspace_visible: bool,
    container_private: bool,
) -> CapabilitySet {
    if is_workspace_owner {
        return CapabilitySet::all();
    }

    if let Some(membership) = membership {
        return apply_overrides(role_defaults(&membership.role), &membership.overrides);
    }

    if container_private {
        return CapabilitySet::empty();
    }

    if workspace_visible {
        return no_membership_fallback();
    }

    CapabilitySet::empty()
}
