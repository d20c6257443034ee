//! Runtime configuration for the core components
//!
//! Plain structs with serde `Deserialize` and sensible defaults; the host
//! application layers its own file/env loading on top.

use serde::Deserialize;
use std::time::Duration;

/// Configuration for the permission cache and resolver
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Time-to-live for cached permission sets
    #[serde(with = "duration_secs")]
    pub cache_ttl: Duration,
    /// Number of cache shards (hashed by principal)
    pub cache_shards: usize,
    /// Upper bound on a single hierarchy-store read; expiry resolves to deny
    #[serde(with = "duration_millis")]
    pub store_timeout: Duration,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            cache_shards: 16,
            store_timeout: Duration::from_millis(500),
        }
    }
}

/// Configuration for the notification dispatcher
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Per-recipient, per-channel delivery timeout
    #[serde(with = "duration_millis")]
    pub delivery_timeout: Duration,
    /// Maximum concurrently in-flight channel deliveries
    pub max_in_flight: usize,
    /// Suppression window for reminder-class notifications
    #[serde(with = "duration_secs")]
    pub dedup_window: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            delivery_timeout: Duration::from_secs(5),
            max_in_flight: 16,
            dedup_window: Duration::from_secs(600),
        }
    }
}

/// Configuration for the connection hub
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Outbound queue capacity per connection; a full queue drops events
    /// for that connection rather than blocking the hub
    pub queue_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}
