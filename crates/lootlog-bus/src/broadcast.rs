//! Thread→async broadcast of persisted envelopes.
//!
//! The store writer thread pushes envelopes into per-subscriber bounded
//! queues; async consumers await them. A full queue drops its oldest entry,
//! so a stalled consumer loses its own history but never blocks the writer
//! or any other subscriber.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};

use metrics::counter;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

use lootlog_core::EventEnvelope;

/// Per-subscriber queue depth. Deep enough to ride out a render hiccup,
/// shallow enough that a dead consumer wastes little memory.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 200;

struct SubscriberQueue {
    buf: Mutex<VecDeque<EventEnvelope>>,
    notify: Notify,
}

struct HubInner {
    subscribers: Mutex<HashMap<u64, Arc<SubscriberQueue>>>,
    next_id: Mutex<u64>,
    capacity: usize,
}

/// Fan-out hub bridging the writer thread to async subscribers.
#[derive(Clone)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

impl BroadcastHub {
    /// Create a hub whose subscribers each buffer up to `capacity` envelopes.
    ///
    /// Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                subscribers: Mutex::new(HashMap::new()),
                next_id: Mutex::new(0),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Register a new subscriber. It sees only envelopes published after
    /// this call; dropping the returned handle unregisters it.
    pub fn register(&self) -> EventSubscriber {
        let id = {
            let mut next = self.inner.next_id.lock();
            let id = *next;
            *next += 1;
            id
        };
        let queue = Arc::new(SubscriberQueue {
            buf: Mutex::new(VecDeque::with_capacity(self.inner.capacity)),
            notify: Notify::new(),
        });
        let _ = self
            .inner
            .subscribers
            .lock()
            .insert(id, Arc::clone(&queue));
        debug!(subscriber_id = id, "broadcast subscriber registered");
        EventSubscriber {
            id,
            queue,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Push an envelope to every subscriber, dropping each full queue's
    /// oldest entry. Never blocks; callable from any thread.
    pub fn publish(&self, envelope: &EventEnvelope) {
        let snapshot: Vec<Arc<SubscriberQueue>> =
            self.inner.subscribers.lock().values().cloned().collect();
        for queue in snapshot {
            let mut buf = queue.buf.lock();
            if buf.len() >= self.inner.capacity {
                let _ = buf.pop_front();
                counter!("broadcast_dropped_oldest_total").increment(1);
            }
            buf.push_back(envelope.clone());
            drop(buf);
            queue.notify.notify_one();
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

/// Consumer end of a [`BroadcastHub`] registration.
///
/// Envelopes arrive in publish order; unregistration happens on drop.
pub struct EventSubscriber {
    id: u64,
    queue: Arc<SubscriberQueue>,
    hub: Weak<HubInner>,
}

impl EventSubscriber {
    /// Await the next envelope. Resolves immediately if one is queued.
    pub async fn recv(&mut self) -> EventEnvelope {
        loop {
            if let Some(envelope) = self.queue.buf.lock().pop_front() {
                return envelope;
            }
            self.queue.notify.notified().await;
        }
    }

    /// Non-blocking pop.
    pub fn try_recv(&mut self) -> Option<EventEnvelope> {
        self.queue.buf.lock().pop_front()
    }

    /// Envelopes currently buffered for this subscriber.
    pub fn pending(&self) -> usize {
        self.queue.buf.lock().len()
    }
}

impl Drop for EventSubscriber {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            let _ = hub.subscribers.lock().remove(&self.id);
            debug!(subscriber_id = self.id, "broadcast subscriber unregistered");
        }
    }
}
