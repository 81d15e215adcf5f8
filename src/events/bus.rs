//! Event Bus Module
//!
//! Synchronous publish/subscribe registry mapping event names to ordered
//! listener sets.

use std::any::Any;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, error};

use crate::error::{CacheError, Result, SubscriberFault};

/// Listener invoked with a reference to the emitted payload.
///
/// Identity is the `Arc` allocation: registering the same `Arc` twice for an
/// event stores it once.
pub type Listener<A> = Arc<dyn Fn(&A) -> anyhow::Result<()> + Send + Sync>;

type Registry<A> = HashMap<String, Vec<Listener<A>>>;

/// Most faults kept between two [`EventBus::take_faults`] calls.
pub const MAX_FAULTS: usize = 1024;

#[derive(Debug, Default)]
struct FaultLog {
    entries: VecDeque<SubscriberFault>,
    dropped: u64,
}

impl FaultLog {
    /// Appends `fault`, dropping the oldest entry once the log is full.
    fn push(&mut self, fault: SubscriberFault) {
        if self.entries.len() >= MAX_FAULTS {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(fault);
    }
}

// == Event Bus ==
/// Registry of listeners keyed by event name.
///
/// Listeners for one event run in registration order. A listener that
/// returns an error or panics is isolated: the fault is logged and stored
/// for [`take_faults`](Self::take_faults), and the remaining listeners still
/// run. At most [`MAX_FAULTS`] undrained faults are kept; older ones are
/// dropped and counted.
pub struct EventBus<A> {
    listeners: Arc<Mutex<Registry<A>>>,
    faults: Mutex<FaultLog>,
}

impl<A> EventBus<A> {
    // == Constructor ==
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(HashMap::new())),
            faults: Mutex::new(FaultLog::default()),
        }
    }

    // == On ==
    /// Registers `listener` under `event`.
    ///
    /// Fails with [`CacheError::Validation`] if `event` is empty after
    /// trimming. The returned handle removes this listener again.
    pub fn on(&self, event: &str, listener: Listener<A>) -> Result<Subscription<A>> {
        validate_event_name(event)?;

        {
            let mut registry = lock(&self.listeners);
            let set = registry.entry(event.to_string()).or_default();
            if !set.iter().any(|l| Arc::ptr_eq(l, &listener)) {
                set.push(Arc::clone(&listener));
            }
            debug!(event, listeners = set.len(), "listener registered");
        }

        Ok(Subscription {
            registry: Arc::downgrade(&self.listeners),
            event: event.to_string(),
            listener,
        })
    }

    /// Registers a closure under `event`. Each call creates a distinct listener.
    pub fn listen<F>(&self, event: &str, f: F) -> Result<Subscription<A>>
    where
        F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(event, Arc::new(f))
    }

    // == Emit ==
    /// Invokes every listener registered for `event` with `args`.
    ///
    /// The listener list is snapshotted before the first call, so listeners
    /// added or removed during this emit do not change who runs. Listener
    /// faults never reach the caller; the only error is an invalid name.
    pub fn emit(&self, event: &str, args: &A) -> Result<()> {
        validate_event_name(event)?;

        let snapshot: Vec<Listener<A>> = match lock(&self.listeners).get(event) {
            Some(set) if !set.is_empty() => set.clone(),
            _ => return Ok(()),
        };

        for listener in snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(args)));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{:#}", err),
                Err(payload) => panic_message(payload.as_ref()),
            };
            error!(event, error = %message, "event listener failed");
            lock(&self.faults).push(SubscriberFault {
                event: event.to_string(),
                message,
            });
        }

        Ok(())
    }

    // == Debug ==
    /// Returns a snapshot of listener counts per known event name.
    pub fn debug(&self) -> BTreeMap<String, usize> {
        lock(&self.listeners)
            .iter()
            .map(|(event, set)| (event.clone(), set.len()))
            .collect()
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        lock(&self.listeners).get(event).map_or(0, Vec::len)
    }

    // == Clear ==
    /// Removes every event name and listener.
    pub fn clear(&self) {
        lock(&self.listeners).clear();
    }

    // == Faults ==
    /// Drains the listener faults recorded since the last call, oldest first.
    pub fn take_faults(&self) -> Vec<SubscriberFault> {
        lock(&self.faults).entries.drain(..).collect()
    }

    /// Total faults discarded because the log was full.
    pub fn dropped_faults(&self) -> u64 {
        lock(&self.faults).dropped
    }
}

impl<A> Default for EventBus<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for EventBus<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.debug())
            .finish()
    }
}

// == Subscription ==
/// Handle returned by [`EventBus::on`].
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
pub struct Subscription<A> {
    registry: Weak<Mutex<Registry<A>>>,
    event: String,
    listener: Listener<A>,
}

impl<A> Subscription<A> {
    /// Removes this listener from this event.
    ///
    /// Idempotent: repeated calls, calls after [`EventBus::clear`], and calls
    /// after the bus is dropped do nothing.
    pub fn unsubscribe(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if let Some(set) = registry.get_mut(&self.event) {
            set.retain(|l| !Arc::ptr_eq(l, &self.listener));
        }
    }
}

impl<A> fmt::Debug for Subscription<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

// == Helpers ==
fn validate_event_name(event: &str) -> Result<()> {
    if event.trim().is_empty() {
        return Err(CacheError::blank_event_name(event));
    }
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("listener panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("listener panicked: {}", s)
    } else {
        "listener panicked".to_string()
    }
}
