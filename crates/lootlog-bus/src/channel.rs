//! Bounded MPSC channel between producer threads and the store writer.
//!
//! Carries domain events from the chat input thread(s) to the single
//! persistence worker. The default policy blocks the producer when the
//! queue is full — a slow consumer stalls upstream producers. That is an
//! explicit, acknowledged tradeoff; the alternate policies are available
//! per channel.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::counter;
use parking_lot::{Condvar, Mutex};
use tracing::warn;

/// What `emit` does when the queue is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackpressurePolicy {
    /// Block the producer until space frees up.
    Block,
    /// Block up to the given duration, then drop the new event.
    BlockTimeout(Duration),
    /// Drop the new event immediately.
    DropNewest,
}

/// Default queue capacity — sized to absorb bursts without materially
/// delaying persistence.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

struct Shared<T> {
    queue: Mutex<VecDeque<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    policy: BackpressurePolicy,
}

/// Bounded, thread-safe, multi-producer/single-consumer event queue.
///
/// Clones share the same queue; producers call [`emit`](Self::emit) from any
/// thread, the single consumer calls [`take`](Self::take) with a timeout so
/// it can check its stop flag between waits.
pub struct EventChannel<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for EventChannel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY, BackpressurePolicy::Block)
    }
}

impl<T> EventChannel<T> {
    /// Create a channel with the given capacity and full-queue policy.
    ///
    /// Capacity is clamped to at least 1.
    pub fn new(capacity: usize, policy: BackpressurePolicy) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::new()),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                capacity: capacity.max(1),
                policy,
            }),
        }
    }

    /// Enqueue an event, applying the configured backpressure policy.
    ///
    /// Returns `false` if the event was dropped (timeout or `DropNewest`
    /// on a full queue); `true` if it was enqueued.
    pub fn emit(&self, event: T) -> bool {
        let shared = &*self.shared;
        let mut queue = shared.queue.lock();

        match shared.policy {
            BackpressurePolicy::Block => {
                while queue.len() >= shared.capacity {
                    shared.not_full.wait(&mut queue);
                }
            }
            BackpressurePolicy::BlockTimeout(max_wait) => {
                let deadline = Instant::now() + max_wait;
                while queue.len() >= shared.capacity {
                    let now = Instant::now();
                    if now >= deadline {
                        drop(queue);
                        warn!("event channel full after timeout, dropping event");
                        counter!("event_channel_dropped_total").increment(1);
                        return false;
                    }
                    let _ = shared.not_full.wait_until(&mut queue, deadline);
                }
            }
            BackpressurePolicy::DropNewest => {
                if queue.len() >= shared.capacity {
                    drop(queue);
                    warn!("event channel full, dropping event");
                    counter!("event_channel_dropped_total").increment(1);
                    return false;
                }
            }
        }

        queue.push_back(event);
        drop(queue);
        shared.not_empty.notify_one();
        true
    }

    /// Consumer-side blocking pop with timeout. `None` on timeout.
    pub fn take(&self, timeout: Duration) -> Option<T> {
        let shared = &*self.shared;
        let deadline = Instant::now() + timeout;
        let mut queue = shared.queue.lock();
        loop {
            if let Some(event) = queue.pop_front() {
                drop(queue);
                shared.not_full.notify_one();
                return Some(event);
            }
            if Instant::now() >= deadline {
                return None;
            }
            let _ = shared.not_empty.wait_until(&mut queue, deadline);
        }
    }

    /// Number of queued events (observability only — racy by nature).
    pub fn len(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
