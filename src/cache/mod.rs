//! Cache Module
//!
//! Provides in-memory caching with lazy TTL expiration, FIFO or LRU eviction,
//! and hit/miss/evict notifications on an event bus.

mod clock;
mod entry;
mod event;
mod order;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use event::{CacheEvent, CACHE_EVICT, CACHE_HIT, CACHE_MISS};
pub use stats::CacheStats;
pub use store::Cache;
