//! evicache - A bounded in-memory cache with an event bus
//!
//! Provides a key-value cache with TTL expiration and FIFO or LRU eviction
//! that reports every hit, miss and eviction through a synchronous event bus.

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod tasks;

pub use cache::{Cache, CacheEvent, CacheStats};
pub use config::{CacheConfig, EvictionStrategy};
pub use error::{CacheError, Result, SubscriberFault};
pub use events::{EventBus, Subscription};
