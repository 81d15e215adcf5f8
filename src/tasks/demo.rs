//! Demonstration Task
//!
//! Drives a cache through a scripted sequence of reads and writes on timers,
//! logging every event the cache publishes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

use crate::cache::{Cache, CacheEvent, CacheStats, CACHE_EVICT, CACHE_HIT, CACHE_MISS};
use crate::config::{CacheConfig, EvictionStrategy};
use crate::error::Result;
use crate::events::{EventBus, Subscription};

/// Cache shared between the driver and whoever owns it.
pub type SharedCache<V> = Arc<RwLock<Cache<V>>>;

/// Configuration the demonstration is written for.
pub fn demo_config() -> CacheConfig {
    CacheConfig::new(3, 3000, EvictionStrategy::Lru)
}

// == Timings ==
/// Offsets from the start of the demonstration at which each step runs.
#[derive(Debug, Clone, Copy)]
pub struct DemoTimings {
    /// Reads, the evicting write and the first report
    pub access_check: Duration,
    /// Reads of entries whose TTL should have elapsed
    pub ttl_check: Duration,
    /// Final report
    pub final_report: Duration,
}

impl Default for DemoTimings {
    fn default() -> Self {
        Self {
            access_check: Duration::from_millis(1500),
            ttl_check: Duration::from_millis(3500),
            final_report: Duration::from_millis(5000),
        }
    }
}

// == Stats Report ==
/// Stats snapshot labelled with the wall-clock time it was taken.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub label: String,
    pub taken_at: String,
    pub stats: CacheStats,
}

impl StatsReport {
    fn capture(label: &str, stats: CacheStats) -> Self {
        let report = Self {
            label: label.to_string(),
            taken_at: chrono::Utc::now().to_rfc3339(),
            stats,
        };
        match serde_json::to_string(&report) {
            Ok(json) => info!(report = %json, "{}", label),
            Err(e) => warn!(error = %e, "failed to serialize stats report"),
        }
        report
    }
}

/// Subscribes logging listeners for hit, miss and evict events.
///
/// Keep the returned handles to be able to unsubscribe later.
pub fn register_log_listeners(
    bus: &EventBus<CacheEvent<i64>>,
) -> Result<Vec<Subscription<CacheEvent<i64>>>> {
    Ok(vec![
        bus.listen(CACHE_HIT, |event| {
            if let CacheEvent::Hit { key, value } = event {
                info!(key = %key, value, "HIT");
            }
            Ok(())
        })?,
        bus.listen(CACHE_MISS, |event| {
            info!(key = %event.key(), "MISS");
            Ok(())
        })?,
        bus.listen(CACHE_EVICT, |event| {
            info!(key = %event.key(), "EVICT: entry removed by eviction strategy");
            Ok(())
        })?,
    ])
}

/// Spawns the demonstration sequence against `cache`.
///
/// The task writes `a`, `b`, `c` immediately; at `access_check` it reads
/// `a` and `x`, writes `d` and reads `b`; at `ttl_check` it reads `a` and
/// `c`; at `final_report` it stops. Each report is logged as JSON and
/// returned in order.
///
/// # Example
/// ```ignore
/// let handle = spawn_demo_task(cache.clone(), DemoTimings::default());
/// let reports = handle.await?;
/// ```
pub fn spawn_demo_task(
    cache: SharedCache<i64>,
    timings: DemoTimings,
) -> JoinHandle<Vec<StatsReport>> {
    tokio::spawn(async move {
        let start = Instant::now();
        let mut reports = Vec::with_capacity(2);

        {
            let mut cache = cache.write().await;
            info!(
                capacity = cache.capacity(),
                ttl_ms = cache.config().ttl,
                strategy = %cache.strategy(),
                "Starting cache demonstration"
            );
            cache.set("a", 100);
            cache.set("b", 200);
            cache.set("c", 300);
        }

        sleep_until(start + timings.access_check).await;
        {
            let mut cache = cache.write().await;
            cache.get("a");
            cache.get("x");
            cache.set("d", 400);
            cache.get("b");
            reports.push(StatsReport::capture("Current statistics", cache.stats()));
        }

        sleep_until(start + timings.ttl_check).await;
        info!("Checking TTL expiry");
        {
            let mut cache = cache.write().await;
            cache.get("a");
            cache.get("c");
        }

        sleep_until(start + timings.final_report).await;
        let stats = cache.read().await.stats();
        reports.push(StatsReport::capture("Final statistics", stats));

        reports
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_timings() -> DemoTimings {
        DemoTimings {
            access_check: Duration::from_millis(50),
            ttl_check: Duration::from_millis(300),
            final_report: Duration::from_millis(350),
        }
    }

    fn shared_cache(config: CacheConfig) -> (SharedCache<i64>, Arc<EventBus<CacheEvent<i64>>>) {
        let bus = Arc::new(EventBus::new());
        let cache = Cache::new(config, Arc::clone(&bus)).unwrap();
        (Arc::new(RwLock::new(cache)), bus)
    }

    #[test]
    fn test_demo_config() {
        let config = demo_config();
        assert_eq!(config.capacity, 3);
        assert_eq!(config.ttl, 3000);
        assert_eq!(config.strategy, EvictionStrategy::Lru);
    }

    #[test]
    fn test_register_log_listeners() {
        let bus = EventBus::new();
        let subs = register_log_listeners(&bus).unwrap();

        assert_eq!(subs.len(), 3);
        assert_eq!(bus.listener_count(CACHE_HIT), 1);
        assert_eq!(bus.listener_count(CACHE_MISS), 1);
        assert_eq!(bus.listener_count(CACHE_EVICT), 1);

        for sub in &subs {
            sub.unsubscribe();
        }
        assert!(bus.debug().values().all(|count| *count == 0));
    }

    #[tokio::test]
    async fn test_demo_sequence() {
        let (cache, bus) = shared_cache(CacheConfig::new(3, 200, EvictionStrategy::Lru));
        let _subs = register_log_listeners(&bus).unwrap();

        let reports = spawn_demo_task(cache.clone(), fast_timings()).await.unwrap();

        assert_eq!(reports.len(), 2);

        let current = &reports[0].stats;
        assert_eq!(current.hits, 1);
        assert_eq!(current.misses, 2);
        assert_eq!(current.evictions, 1);
        assert_eq!(current.keys, vec!["c", "a", "d"]);

        let last = &reports[1].stats;
        assert_eq!(last.hits, 1);
        assert_eq!(last.misses, 4);
        assert_eq!(last.keys, vec!["d"]);
        assert!(bus.take_faults().is_empty());
    }

    #[tokio::test]
    async fn test_demo_task_can_be_aborted() {
        let (cache, _bus) = shared_cache(demo_config());

        let handle = spawn_demo_task(cache, DemoTimings::default());
        handle.abort();

        let result = handle.await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
