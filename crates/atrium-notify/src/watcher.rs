//! Watcher registry
//!
//! Authoritative list of who is interested in a resource. A watcher record
//! determines notification eligibility only; it is independent of
//! authorization. At most one record exists per (principal, resource) pair.

use crate::record::ChannelKind;
use atrium_core::{PrincipalId, ResourceRef};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a watcher wants to hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchScope {
    /// Every event on the resource
    All,
    /// Only mentions of the watcher
    Mentions,
    /// Only assignment changes
    Assignments,
    /// Only comments
    Comments,
    /// Only status changes
    StatusChanges,
}

/// Classification of an event for scope filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventClass {
    /// The watcher was mentioned
    Mention,
    /// An assignment changed
    Assignment,
    /// A comment was added
    Comment,
    /// The resource's status changed
    StatusChange,
    /// Any other update
    Update,
}

fn scope_matches(scope: WatchScope, class: EventClass) -> bool {
    match scope {
        WatchScope::All => true,
        WatchScope::Mentions => class == EventClass::Mention,
        WatchScope::Assignments => class == EventClass::Assignment,
        WatchScope::Comments => class == EventClass::Comment,
        WatchScope::StatusChanges => class == EventClass::StatusChange,
    }
}

/// Per-watcher delivery preferences for the optional channels
///
/// In-app delivery cannot be disabled; the dispatcher enforces that
/// invariant regardless of what is stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPrefs {
    /// Deliver via transactional email
    pub email: bool,
    /// Deliver via push notification
    pub push: bool,
}

impl Default for ChannelPrefs {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
        }
    }
}

impl ChannelPrefs {
    /// Whether the given channel is enabled; in-app always is
    pub fn allows(&self, channel: ChannelKind) -> bool {
        match channel {
            ChannelKind::InApp => true,
            ChannelKind::Email => self.email,
            ChannelKind::Push => self.push,
        }
    }
}

/// Subscription record for one (principal, resource) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherRecord {
    /// The subscribed principal
    pub principal: PrincipalId,
    /// The watched resource
    pub resource: ResourceRef,
    /// What the watcher wants to hear about
    pub scope: WatchScope,
    /// Per-channel delivery preference
    pub prefs: ChannelPrefs,
}

/// In-memory watcher registry keyed by resource
#[derive(Debug, Default)]
pub struct WatcherRegistry {
    records: RwLock<HashMap<ResourceRef, HashMap<PrincipalId, WatcherRecord>>>,
}

impl WatcherRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicitly subscribe, replacing any existing scope for the pair.
    /// Existing channel preferences are kept.
    pub fn watch(&self, principal: PrincipalId, resource: ResourceRef, scope: WatchScope) {
        let mut records = self.records.write();
        let per_resource = records.entry(resource).or_default();
        per_resource
            .entry(principal)
            .and_modify(|record| record.scope = scope)
            .or_insert(WatcherRecord {
                principal,
                resource,
                scope,
                prefs: ChannelPrefs::default(),
            });
    }

    /// Auto-subscribe on assignment or comment: creates a full-scope
    /// record if none exists, never downgrades an explicit choice.
    pub fn auto_subscribe(&self, principal: PrincipalId, resource: ResourceRef) {
        let mut records = self.records.write();
        records
            .entry(resource)
            .or_default()
            .entry(principal)
            .or_insert(WatcherRecord {
                principal,
                resource,
                scope: WatchScope::All,
                prefs: ChannelPrefs::default(),
            });
    }

    /// Remove the subscription for a pair
    pub fn unwatch(&self, principal: PrincipalId, resource: ResourceRef) {
        let mut records = self.records.write();
        if let Some(per_resource) = records.get_mut(&resource) {
            per_resource.remove(&principal);
            if per_resource.is_empty() {
                records.remove(&resource);
            }
        }
    }

    /// Store channel preferences for a pair, creating the record if needed
    pub fn set_preferences(
        &self,
        principal: PrincipalId,
        resource: ResourceRef,
        prefs: ChannelPrefs,
    ) {
        let mut records = self.records.write();
        records
            .entry(resource)
            .or_default()
            .entry(principal)
            .and_modify(|record| record.prefs = prefs)
            .or_insert(WatcherRecord {
                principal,
                resource,
                scope: WatchScope::All,
                prefs,
            });
    }

    /// Channel preferences for a pair; all-enabled when no record exists
    pub fn preferences(&self, principal: PrincipalId, resource: ResourceRef) -> ChannelPrefs {
        self.records
            .read()
            .get(&resource)
            .and_then(|per_resource| per_resource.get(&principal))
            .map(|record| record.prefs)
            .unwrap_or_default()
    }

    /// Principals whose watch scope matches the event class
    pub fn watchers_for(&self, resource: ResourceRef, class: EventClass) -> Vec<PrincipalId> {
        self.records
            .read()
            .get(&resource)
            .map(|per_resource| {
                let mut watchers: Vec<PrincipalId> = per_resource
                    .values()
                    .filter(|record| scope_matches(record.scope, class))
                    .map(|record| record.principal)
                    .collect();
                watchers.sort();
                watchers
            })
            .unwrap_or_default()
    }

    /// Number of watcher records on a resource (diagnostics)
    pub fn watcher_count(&self, resource: ResourceRef) -> usize {
        self.records
            .read()
            .get(&resource)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::TaskId;

    fn task() -> ResourceRef {
        TaskId::new().into()
    }

    #[test]
    fn at_most_one_record_per_pair() {
        let registry = WatcherRegistry::new();
        let principal = PrincipalId::new();
        let resource = task();

        registry.watch(principal, resource, WatchScope::Comments);
        registry.watch(principal, resource, WatchScope::All);
        registry.auto_subscribe(principal, resource);

        assert_eq!(registry.watcher_count(resource), 1);
    }

    #[test]
    fn auto_subscribe_never_downgrades_explicit_scope() {
        let registry = WatcherRegistry::new();
        let principal = PrincipalId::new();
        let resource = task();

        registry.watch(principal, resource, WatchScope::StatusChanges);
        registry.auto_subscribe(principal, resource);

        // Still filtered to status changes.
        assert!(registry.watchers_for(resource, EventClass::Comment).is_empty());
        assert_eq!(
            registry.watchers_for(resource, EventClass::StatusChange),
            vec![principal]
        );
    }

    #[test]
    fn scope_filters_event_classes() {
        let registry = WatcherRegistry::new();
        let resource = task();
        let everything = PrincipalId::new();
        let mentions_only = PrincipalId::new();

        registry.watch(everything, resource, WatchScope::All);
        registry.watch(mentions_only, resource, WatchScope::Mentions);

        let on_mention = registry.watchers_for(resource, EventClass::Mention);
        assert!(on_mention.contains(&everything));
        assert!(on_mention.contains(&mentions_only));

        let on_update = registry.watchers_for(resource, EventClass::Update);
        assert_eq!(on_update, vec![everything]);
    }

    #[test]
    fn unwatch_removes_the_record() {
        let registry = WatcherRegistry::new();
        let principal = PrincipalId::new();
        let resource = task();

        registry.watch(principal, resource, WatchScope::All);
        registry.unwatch(principal, resource);
        assert_eq!(registry.watcher_count(resource), 0);
    }

    #[test]
    fn preferences_default_to_all_channels() {
        let registry = WatcherRegistry::new();
        let principal = PrincipalId::new();
        let resource = task();

        let prefs = registry.preferences(principal, resource);
        assert!(prefs.allows(ChannelKind::Email));
        assert!(prefs.allows(ChannelKind::Push));

        registry.set_preferences(
            principal,
            resource,
            ChannelPrefs {
                email: false,
                push: true,
            },
        );
        let prefs = registry.preferences(principal, resource);
        assert!(!prefs.allows(ChannelKind::Email));
        // In-app is not a preference; it is always allowed.
        assert!(prefs.allows(ChannelKind::InApp));
    }
}
