//! Events Module
//!
//! Synchronous event bus used to observe cache state transitions.

mod bus;

pub use bus::{EventBus, Listener, Subscription, MAX_FAULTS};
