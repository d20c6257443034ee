//! Authorization service facade
//!
//! Wires the resolver and the cache together behind the two calls the
//! mutation layer makes: `check_capability` before every state change and
//! `invalidate` after every membership mutation. Failures at the boundary
//! collapse into a uniform denial so resource existence never leaks.

use crate::cache::PermissionCache;
use crate::resolver::PermissionResolver;
use crate::store::HierarchyStore;
use atrium_core::{
    AtriumError, AuthorizationConfig, Capability, CapabilitySet, ContainerRef, ListId,
    PrincipalId, ResourceRef, Result, Role,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Permission checks and cache maintenance for the mutation layer
pub struct AuthorizationService {
    resolver: PermissionResolver,
    cache: PermissionCache,
}

impl AuthorizationService {
    /// Create a service over a hierarchy store
    pub fn new(store: Arc<dyn HierarchyStore>, config: AuthorizationConfig) -> Self {
        Self {
            resolver: PermissionResolver::new(store, &config),
            cache: PermissionCache::new(&config),
        }
    }

    /// Resolve the capability set for a principal on a resource, consulting
    /// the cache first. Errors are returned for the caller to deny on.
    pub async fn resolved_set(
        &self,
        principal: PrincipalId,
        resource: ResourceRef,
    ) -> Result<CapabilitySet> {
        if let Some(set) = self.cache.get(principal, resource, Instant::now()) {
            return Ok(set);
        }

        let set = self.resolver.resolve_set(principal, resource).await?;
        self.cache.insert(principal, resource, set, Instant::now());
        Ok(set)
    }

    /// Whether the principal holds the capability on the resource.
    ///
    /// Fail-closed: missing resources, store errors, and timeouts all
    /// answer `false`. Must be called before every mutating request.
    pub async fn check_capability(
        &self,
        principal: PrincipalId,
        resource: impl Into<ResourceRef>,
        capability: Capability,
    ) -> bool {
        let resource = resource.into();
        match self.resolved_set(principal, resource).await {
            Ok(set) => set.contains(capability),
            Err(err) if err.is_denial() => {
                debug!(%principal, %resource, %capability, "denied: {err}");
                false
            }
            Err(err) => {
                warn!(%principal, %resource, %capability, "resolution failed, denying: {err}");
                false
            }
        }
    }

    /// Like [`check_capability`](Self::check_capability) but returns the
    /// uniform denial error for the rejection path.
    pub async fn require_capability(
        &self,
        principal: PrincipalId,
        resource: impl Into<ResourceRef>,
        capability: Capability,
    ) -> Result<()> {
        let resource = resource.into();
        if self.check_capability(principal, resource, capability).await {
            Ok(())
        } else {
            Err(AtriumError::permission_denied("permission denied"))
        }
    }

    /// Synchronously evict every cached entry for a principal.
    ///
    /// Must be called, and must return `Ok`, before a membership, role, or
    /// override mutation for that principal is considered complete; an
    /// `Err` here is a cache inconsistency and the mutation must fail.
    pub fn invalidate(&self, principal: PrincipalId) -> Result<usize> {
        let evicted = self.cache.invalidate_principal(principal);
        debug!(%principal, evicted, "permission cache invalidated");
        Ok(evicted)
    }

    /// Re-validate a task move at both ends: edit rights on the source
    /// list, create rights on the destination list.
    pub async fn authorize_task_move(
        &self,
        principal: PrincipalId,
        source: ListId,
        destination: ListId,
    ) -> Result<()> {
        self.require_capability(principal, source, Capability::CanEditTasks)
            .await?;
        self.require_capability(principal, destination, Capability::CanCreateTasks)
            .await?;
        Ok(())
    }

    /// Guard a role grant: the actor needs member-management rights on the
    /// container and may only assign roles at or below their own seniority.
    /// The workspace owner may assign anything.
    pub async fn authorize_role_assignment(
        &self,
        actor: PrincipalId,
        container: ContainerRef,
        target_role: Role,
    ) -> Result<()> {
        let resource = ResourceRef::from(container);
        self.require_capability(actor, resource, Capability::CanManageMembers)
            .await?;

        // Owners pass the capability check with no membership on record;
        // everyone else is bounded by their own role's seniority.
        match self.resolver.membership(actor, container).await {
            Ok(Some(membership)) => {
                if membership.role.can_assign(&target_role) {
                    Ok(())
                } else {
                    Err(AtriumError::permission_denied("permission denied"))
                }
            }
            Ok(None) => Ok(()),
            Err(err) => {
                warn!(%actor, %container, "role assignment check failed, denying: {err}");
                Err(AtriumError::permission_denied("permission denied"))
            }
        }
    }

    /// Cache diagnostics
    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }
}
