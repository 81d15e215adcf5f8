//! Error types for the cache and event bus
//!
//! Provides unified error handling using thiserror.

use std::fmt;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and the event bus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Event name rejected by `on` or `emit`
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cache configuration rejected at construction or while parsing
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Builds the validation error for an empty or blank event name.
    pub(crate) fn blank_event_name(name: &str) -> Self {
        CacheError::Validation(format!(
            "event name must be a non-empty string, got {:?}",
            name
        ))
    }
}

// == Subscriber Fault ==
/// A listener failure caught during `emit`.
///
/// Faults never propagate to the emitter; they are logged and kept on the
/// bus until drained with [`EventBus::take_faults`](crate::events::EventBus::take_faults).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFault {
    /// Event that was being emitted
    pub event: String,
    /// Error message, or panic payload when the listener panicked
    pub message: String,
}

impl fmt::Display for SubscriberFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener for '{}' failed: {}", self.event, self.message)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
