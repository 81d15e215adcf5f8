//! Cache Event Module
//!
//! Payloads the cache publishes on its event bus.

use serde::Serialize;

/// Emitted when `get` finds an unexpired entry.
pub const CACHE_HIT: &str = "cache:hit";

/// Emitted when `get` finds no entry or an expired one.
pub const CACHE_MISS: &str = "cache:miss";

/// Emitted when `set` frees a slot before inserting a new key.
pub const CACHE_EVICT: &str = "cache:evict";

// == Cache Event ==
/// A cache state transition, delivered to listeners of [`CacheEvent::name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum CacheEvent<V> {
    Hit { key: String, value: V },
    Miss { key: String },
    Evict { key: String },
}

impl<V> CacheEvent<V> {
    /// Bus event name this payload is published under.
    pub fn name(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => CACHE_HIT,
            CacheEvent::Miss { .. } => CACHE_MISS,
            CacheEvent::Evict { .. } => CACHE_EVICT,
        }
    }

    /// Key the event refers to.
    pub fn key(&self) -> &str {
        match self {
            CacheEvent::Hit { key, .. } | CacheEvent::Miss { key } | CacheEvent::Evict { key } => {
                key
            }
        }
    }
}
