//! Cooperative stop flag shared by all worker loops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cheap, cloneable cancellation flag.
///
/// Every long-running loop (tailer, store writer) checks the flag at each
/// poll/timeout boundary. Setting it requests shutdown; it is never unset.
#[derive(Clone, Debug, Default)]
pub struct StopFlag {
    inner: Arc<AtomicBool>,
}

impl StopFlag {
    /// Create a new, unsignaled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown.
    pub fn trigger(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested.
    pub fn is_set(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset() {
        assert!(!StopFlag::new().is_set());
    }

    #[test]
    fn trigger_is_visible_through_clones() {
        let flag = StopFlag::new();
        let clone = flag.clone();
        flag.trigger();
        assert!(clone.is_set());
    }
}
