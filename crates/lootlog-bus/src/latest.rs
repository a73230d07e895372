//! Latest-value distribution for high-frequency samples.
//!
//! Position samples arrive faster than consumers care to render them, so
//! this hub keeps only the most recent value: publishing overwrites,
//! subscribing primes with whatever is current, and awaiting yields the
//! newest sample at wake time — intermediate values are skipped by design.

use tokio::sync::watch;

/// Overwrite-on-publish hub. Cheap to clone; clones publish to the same
/// slot. Built on [`tokio::sync::watch`], so publishing never blocks and is
/// safe from any thread.
#[derive(Clone)]
pub struct LatestValueHub<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T: Clone> Default for LatestValueHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> LatestValueHub<T> {
    /// Create a hub with no current value.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current value. Succeeds even with zero subscribers.
    pub fn publish(&self, value: T) {
        let _ = self.tx.send_replace(Some(value));
    }

    /// The current value, if any has been published.
    pub fn latest(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    /// Register a subscriber. Its first [`last_known`] read is primed with
    /// the current value; unsubscribing is dropping the handle.
    ///
    /// [`last_known`]: LatestValueSubscription::last_known
    pub fn subscribe(&self) -> LatestValueSubscription<T> {
        LatestValueSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

/// Consumer end of a [`LatestValueHub`].
pub struct LatestValueSubscription<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T: Clone> LatestValueSubscription<T> {
    /// The most recent value without waiting, if any exists yet.
    pub fn last_known(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Await the next publish and return the value current at wake time.
    /// Returns `None` once every hub handle has been dropped.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }
}
