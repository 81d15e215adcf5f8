//! Configuration Module
//!
//! Cache configuration: capacity, entry TTL and eviction strategy. Values can
//! come from code, a JSON object, or environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Default maximum number of entries
pub const DEFAULT_CAPACITY: usize = 5;

/// Default entry TTL in milliseconds
pub const DEFAULT_TTL_MS: u64 = 5000;

// == Eviction Strategy ==
/// Selects which entry `set` evicts when the cache is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvictionStrategy {
    /// Evict the longest-resident entry; reads and overwrites never reorder.
    Fifo,
    /// Evict the least recently read or written entry.
    #[default]
    Lru,
}

impl EvictionStrategy {
    /// Whether a cache hit moves the key to the most-recent position.
    pub fn refreshes_on_hit(self) -> bool {
        matches!(self, EvictionStrategy::Lru)
    }

    /// Whether overwriting an existing key moves it to the most-recent position.
    pub fn refreshes_on_overwrite(self) -> bool {
        matches!(self, EvictionStrategy::Lru)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvictionStrategy::Fifo => "FIFO",
            EvictionStrategy::Lru => "LRU",
        }
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionStrategy {
    type Err = CacheError;

    /// Parses `"FIFO"` or `"LRU"`. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FIFO" => Ok(EvictionStrategy::Fifo),
            "LRU" => Ok(EvictionStrategy::Lru),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown eviction strategy {:?}, expected \"FIFO\" or \"LRU\"",
                other
            ))),
        }
    }
}

// == Cache Config ==
/// Immutable cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold (must be > 0)
    pub capacity: usize,
    /// Entry time-to-live in milliseconds; 0 expires entries on the next read
    pub ttl: u64,
    /// Eviction strategy
    pub strategy: EvictionStrategy,
}

impl CacheConfig {
    pub fn new(capacity: usize, ttl: u64, strategy: EvictionStrategy) -> Self {
        Self {
            capacity,
            ttl,
            strategy,
        }
    }

    /// Entry TTL as a `Duration`.
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_millis(self.ttl)
    }

    /// Rejects configurations the cache cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration object.
    ///
    /// Missing fields take their defaults; unknown fields, negative numbers
    /// and unrecognised strategies are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CacheConfig = serde_json::from_str(json)
            .map_err(|e| CacheError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 5)
    /// - `CACHE_TTL_MS` - Entry TTL in milliseconds (default: 5000)
    /// - `CACHE_STRATEGY` - `FIFO` or `LRU` (default: LRU)
    ///
    /// Unset variables take their default. A variable that is set but cannot
    /// be parsed is an error.
    pub fn from_env() -> Result<Self> {
        Self::from_env_or(Self::default())
    }

    /// Same as [`from_env`](Self::from_env) with caller-supplied defaults.
    pub fn from_env_or(defaults: CacheConfig) -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok(), defaults)
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F, defaults: CacheConfig) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            capacity: parse_var(&lookup, "CACHE_CAPACITY", defaults.capacity)?,
            ttl: parse_var(&lookup, "CACHE_TTL_MS", defaults.ttl)?,
            strategy: parse_var(&lookup, "CACHE_STRATEGY", defaults.strategy)?,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL_MS,
            strategy: EvictionStrategy::default(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| {
            CacheError::InvalidConfig(format!("{}={:?}: {}", name, raw, e))
        }),
    }
}
