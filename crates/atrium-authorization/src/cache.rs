//! Sharded TTL cache for resolved permission sets
//!
//! Keyed (principal, resource); sharded by principal so eviction of one
//! principal's entries is O(1) and never blocks reads for another
//! principal on a different shard. Entries expire on a fixed TTL, but the
//! TTL is a backstop: membership mutations must call
//! [`PermissionCache::invalidate_principal`] synchronously, because a stale
//! allow after a downgrade is a security defect while a stale deny is only
//! an availability defect.
//!
//! Callers supply `Instant::now()` so tests control expiry without
//! sleeping.

use atrium_core::{AuthorizationConfig, CapabilitySet, PrincipalId, ResourceRef};
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct CachedSet {
    set: CapabilitySet,
    expires_at: Instant,
}

impl CachedSet {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

type Shard = RwLock<HashMap<PrincipalId, HashMap<ResourceRef, CachedSet>>>;

/// Concurrent permission cache with principal-scoped eviction
pub struct PermissionCache {
    shards: Vec<Shard>,
    ttl: Duration,
}

impl PermissionCache {
    /// Create a cache from configuration
    pub fn new(config: &AuthorizationConfig) -> Self {
        Self::with(config.cache_ttl, config.cache_shards)
    }

    /// Create a cache with an explicit TTL and shard count
    pub fn with(ttl: Duration, shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| RwLock::new(HashMap::new())).collect(),
            ttl,
        }
    }

    fn shard(&self, principal: PrincipalId) -> &Shard {
        let mut hasher = DefaultHasher::new();
        principal.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.shards.len();
        &self.shards[index]
    }

    /// Look up a cached permission set; expired entries are dropped
    pub fn get(
        &self,
        principal: PrincipalId,
        resource: ResourceRef,
        now: Instant,
    ) -> Option<CapabilitySet> {
        let shard = self.shard(principal);

        {
            let entries = shard.read();
            match entries.get(&principal).and_then(|m| m.get(&resource)) {
                Some(cached) if !cached.is_expired(now) => return Some(cached.set),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: take the write lock and drop the stale entry.
        let mut entries = shard.write();
        if let Some(per_principal) = entries.get_mut(&principal) {
            if let Some(cached) = per_principal.get(&resource) {
                if cached.is_expired(now) {
                    per_principal.remove(&resource);
                } else {
                    return Some(cached.set);
                }
            }
        }
        None
    }

    /// Cache a resolved permission set
    pub fn insert(
        &self,
        principal: PrincipalId,
        resource: ResourceRef,
        set: CapabilitySet,
        now: Instant,
    ) {
        let cached = CachedSet {
            set,
            expires_at: now + self.ttl,
        };
        self.shard(principal)
            .write()
            .entry(principal)
            .or_default()
            .insert(resource, cached);
    }

    /// Evict every entry for one principal; returns the number evicted.
    ///
    /// O(1) on the principal map: the whole per-principal entry is removed.
    pub fn invalidate_principal(&self, principal: PrincipalId) -> usize {
        self.shard(principal)
            .write()
            .remove(&principal)
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Drop every entry in every shard
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.write().clear();
        }
    }

    /// Total cached entries across all shards (diagnostics)
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().values().map(HashMap::len).sum::<usize>())
            .sum()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
