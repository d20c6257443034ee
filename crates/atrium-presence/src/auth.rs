//! Connect handshake authentication
//!
//! A connection must present a valid, unexpired bearer token before it is
//! promoted past `Connecting`; any failure terminates the handshake with a
//! terminal [`AtriumError::ConnectionRejected`] and no state is created.

use async_trait::async_trait;
use atrium_core::{AtriumError, PrincipalId, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Validates bearer tokens presented at connect time
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve a bearer token to a principal, or fail the handshake
    async fn verify(&self, token: &str) -> Result<PrincipalId>;
}

/// Token table verifier
///
/// Reference implementation and test fixture: tokens are issued and
/// revoked explicitly; anything unknown is rejected.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: RwLock<HashMap<String, PrincipalId>>,
}

impl StaticTokenVerifier {
    /// Create a verifier with no valid tokens
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a valid token for a principal
    pub fn issue(&self, token: impl Into<String>, principal: PrincipalId) {
        self.tokens.write().insert(token.into(), principal);
    }

    /// Revoke a token; subsequent handshakes with it are rejected
    pub fn revoke(&self, token: &str) {
        self.tokens.write().remove(token);
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<PrincipalId> {
        self.tokens
            .read()
            .get(token)
            .copied()
            .ok_or_else(|| AtriumError::connection_rejected("invalid or expired token"))
    }
}
