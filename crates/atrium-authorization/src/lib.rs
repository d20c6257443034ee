//! # Atrium Authorization
//!
//! Hierarchical permission resolution for the Atrium platform: role-default
//! tables, the precedence merge (owner > explicit override > role default >
//! inherited fallback), a resolver that walks Task → List → Space →
//! Workspace, and a sharded TTL cache with synchronous principal-scoped
//! invalidation.
//!
//! Authorization is decided by named capability flags only; role seniority
//! ordering exists solely for promotion/demotion guards.

pub mod cache;
pub mod defaults;
pub mod merge;
pub mod resolver;
pub mod service;
pub mod store;

pub use cache::PermissionCache;
pub use defaults::{no_membership_fallback, role_defaults};
pub use merge::{apply_overrides, effective_capabilities};
pub use resolver::PermissionResolver;
pub use service::AuthorizationService;
pub use store::{HierarchyStore, InMemoryHierarchy};
