//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with an eviction order list,
//! lazy TTL expiration and event publication.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::entry::CacheEntry;
use crate::cache::order::{EvictionOrder, NodeId};
use crate::cache::stats::Counters;
use crate::cache::{CacheEvent, CacheStats, Clock, SystemClock, CACHE_EVICT, CACHE_HIT, CACHE_MISS};
use crate::config::{CacheConfig, EvictionStrategy};
use crate::error::Result;
use crate::events::EventBus;

#[derive(Debug)]
struct Slot<V> {
    entry: CacheEntry<V>,
    node: NodeId,
}

// == Cache ==
/// Bounded key-value store with TTL expiry and FIFO or LRU eviction.
///
/// Every `get` publishes `cache:hit` or `cache:miss`, and every eviction
/// publishes `cache:evict`, on the bus supplied at construction. Events are
/// published after the state change they describe, and only built when the
/// event has listeners.
///
/// Operations take `&mut self`; share a cache between tasks behind a lock so
/// each operation and its events stay atomic.
#[derive(Debug)]
pub struct Cache<V> {
    /// Key-value storage
    entries: HashMap<String, Slot<V>>,
    /// Eviction candidates, front first
    order: EvictionOrder,
    /// Lifetime hit/miss/eviction counters
    counters: Counters,
    config: CacheConfig,
    ttl: Duration,
    bus: Arc<EventBus<CacheEvent<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> Cache<V> {
    // == Constructor ==
    /// Creates a cache reading time from the system clock.
    ///
    /// Fails with `InvalidConfig` if `config` does not validate.
    pub fn new(config: CacheConfig, bus: Arc<EventBus<CacheEvent<V>>>) -> Result<Self> {
        Self::with_clock(config, bus, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(
        config: CacheConfig,
        bus: Arc<EventBus<CacheEvent<V>>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        debug!(
            capacity = config.capacity,
            ttl_ms = config.ttl,
            strategy = %config.strategy,
            "cache created"
        );
        Ok(Self {
            entries: HashMap::with_capacity(config.capacity),
            order: EvictionOrder::with_capacity(config.capacity),
            counters: Counters::default(),
            ttl: config.ttl_duration(),
            config,
            bus,
            clock,
        })
    }

    // == Set ==
    /// Stores a key-value pair, resetting its TTL.
    ///
    /// When the cache is full and `key` is new, exactly one entry (the front
    /// of the eviction order) is evicted first. Overwriting a key moves it to
    /// the most-recent position under LRU and keeps its position under FIFO.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now();

        if let Some(slot) = self.entries.get_mut(&key) {
            slot.entry = CacheEntry::new(value, now, self.ttl);
            if self.config.strategy.refreshes_on_overwrite() {
                self.order.move_to_back(slot.node);
            }
            return;
        }

        if self.entries.len() >= self.config.capacity {
            self.evict();
        }

        let node = self.order.push_back(key.clone());
        let entry = CacheEntry::new(value, now, self.ttl);
        self.entries.insert(key, Slot { entry, node });
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed and reported as misses. A hit under LRU
    /// moves the key to the most-recent position.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now();

        let Some(slot) = self.entries.get(key) else {
            self.counters.record_miss();
            self.publish(CACHE_MISS, || CacheEvent::Miss {
                key: key.to_string(),
            });
            return None;
        };

        if self.ttl.is_zero() || slot.entry.is_expired(now) {
            let node = slot.node;
            self.entries.remove(key);
            self.order.remove(node);
            self.counters.record_miss();
            debug!(key, "expired entry removed on read");
            self.publish(CACHE_MISS, || CacheEvent::Miss {
                key: key.to_string(),
            });
            return None;
        }

        let value = slot.entry.value.clone();
        let node = slot.node;
        self.counters.record_hit();
        if self.config.strategy.refreshes_on_hit() {
            self.order.move_to_back(node);
        }
        self.publish(CACHE_HIT, || CacheEvent::Hit {
            key: key.to_string(),
            value: value.clone(),
        });
        Some(value)
    }

    // == Stats ==
    /// Returns a snapshot of counters and keys, next eviction candidate first.
    pub fn stats(&self) -> CacheStats {
        let keys = self.order.iter().map(String::from).collect();
        CacheStats::from_parts(self.counters, keys)
    }

    // == Evict ==
    /// Removes the front of the eviction order and publishes `cache:evict`.
    fn evict(&mut self) {
        let Some(key) = self.order.pop_front() else {
            return;
        };
        self.entries.remove(&key);
        self.counters.record_eviction();
        debug!(key = %key, strategy = %self.config.strategy, "evicted entry");
        self.publish(CACHE_EVICT, move || CacheEvent::Evict { key });
    }

    // == Publish ==
    /// Emits the event built by `event` under `name`, skipping the payload
    /// entirely when nobody listens.
    fn publish(&self, name: &str, event: impl FnOnce() -> CacheEvent<V>) {
        if self.bus.listener_count(name) == 0 {
            return;
        }
        if let Err(err) = self.bus.emit(name, &event()) {
            warn!(event = name, error = %err, "failed to publish cache event");
        }
    }
}

impl<V> Cache<V> {
    // == Length ==
    /// Returns the current number of entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Capacity ==
    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    // == TTL ==
    /// Returns the lifetime given to every write.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Strategy ==
    /// Returns the eviction strategy.
    pub fn strategy(&self) -> EvictionStrategy {
        self.config.strategy
    }

    // == Config ==
    /// Returns the validated configuration this cache was built from.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Bus ==
    /// Bus this cache publishes on.
    pub fn bus(&self) -> &Arc<EventBus<CacheEvent<V>>> {
        &self.bus
    }
}
