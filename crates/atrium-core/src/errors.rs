//! Unified error system for Atrium core
//!
//! A single error type shared by every crate in the workspace. Callers at the
//! authorization boundary collapse `NotFound` into `PermissionDenied` so that
//! denial never leaks resource existence.

use serde::{Deserialize, Serialize};

/// Unified error type for all Atrium operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AtriumError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource, container, or record not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Required capability absent from the resolved permission set
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Error message describing the denied action
        message: String,
    },

    /// A delivery channel failed for a specific recipient
    #[error("Delivery failed: {message}")]
    Delivery {
        /// Error message describing the channel failure
        message: String,
    },

    /// Cache invalidation could not be applied; the triggering mutation must fail
    #[error("Cache inconsistency: {message}")]
    CacheInconsistency {
        /// Error message describing which eviction failed
        message: String,
    },

    /// Connection handshake or authentication failure
    #[error("Connection rejected: {message}")]
    ConnectionRejected {
        /// Error message describing the rejection
        message: String,
    },

    /// Backing store operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// A time-bounded operation did not complete in its window
    #[error("Timeout: {message}")]
    Timeout {
        /// Error message describing what timed out
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl AtriumError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a delivery failure error
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Create a cache inconsistency error
    pub fn cache_inconsistency(message: impl Into<String>) -> Self {
        Self::CacheInconsistency {
            message: message.into(),
        }
    }

    /// Create a connection rejected error
    pub fn connection_rejected(message: impl Into<String>) -> Self {
        Self::ConnectionRejected {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Collapse into a uniform denial at the authorization boundary.
    ///
    /// `NotFound` and `PermissionDenied` become the same outward-facing
    /// denial; everything else passes through unchanged.
    pub fn into_denial(self) -> Self {
        match self {
            Self::NotFound { .. } | Self::PermissionDenied { .. } => Self::PermissionDenied {
                message: "permission denied".to_string(),
            },
            other => other,
        }
    }

    /// Whether this error is a denial as seen by the caller
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied { .. } | Self::NotFound { .. }
        )
    }
}

/// Result type alias using the unified error
pub type Result<T> = std::result::Result<T, AtriumError>;
