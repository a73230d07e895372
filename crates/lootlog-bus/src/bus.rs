//! Synchronous fan-out of persisted envelopes.
//!
//! Handlers run on the publisher's thread (the store writer), in
//! registration order, against a point-in-time snapshot of the handler set.
//! A handler panic is caught and logged; it never prevents delivery to the
//! remaining handlers. Subscribe/unsubscribe are safe from any thread and
//! never disturb an in-flight publish.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use metrics::counter;
use parking_lot::Mutex;
use tracing::warn;

use lootlog_core::EventEnvelope;

type Handler = Arc<dyn Fn(&EventEnvelope) + Send + Sync + 'static>;

struct BusInner {
    // BTreeMap keeps registration (id) order for publish.
    handlers: Mutex<BTreeMap<u64, Handler>>,
    next_id: Mutex<u64>,
}

/// In-process publish/subscribe distribution of [`EventEnvelope`]s.
#[derive(Clone)]
pub struct PersistedEventBus {
    inner: Arc<BusInner>,
}

impl Default for PersistedEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistedEventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                handlers: Mutex::new(BTreeMap::new()),
                next_id: Mutex::new(0),
            }),
        }
    }

    /// Register a handler. Returns the subscription handle; the handler
    /// stays registered until [`BusSubscription::close`] is called.
    pub fn subscribe(
        &self,
        handler: impl Fn(&EventEnvelope) + Send + Sync + 'static,
    ) -> BusSubscription {
        let id = {
            let mut next = self.inner.next_id.lock();
            let id = *next;
            *next += 1;
            id
        };
        let _ = self.inner.handlers.lock().insert(id, Arc::new(handler));
        BusSubscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an envelope to every currently registered handler,
    /// synchronously, on the caller's thread.
    pub fn publish(&self, envelope: &EventEnvelope) {
        // Snapshot under the lock, deliver outside it — a handler that
        // re-enters subscribe/unsubscribe must not deadlock.
        let snapshot: Vec<Handler> = self.inner.handlers.lock().values().cloned().collect();
        for handler in snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler(envelope))).is_err() {
                warn!(
                    event_id = envelope.event_id,
                    event_type = %envelope.event_type,
                    "event handler panicked, continuing with remaining handlers"
                );
                counter!("persisted_bus_handler_panics_total").increment(1);
            }
        }
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.inner.handlers.lock().len()
    }
}

/// Handle for deregistering a bus handler.
pub struct BusSubscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl BusSubscription {
    /// Remove the handler. Safe from any thread; a publish running
    /// concurrently may still deliver to the point-in-time snapshot it
    /// already took, but no publish started after this call will.
    pub fn close(self) {
        if let Some(bus) = self.bus.upgrade() {
            let _ = bus.handlers.lock().remove(&self.id);
        }
    }
}
