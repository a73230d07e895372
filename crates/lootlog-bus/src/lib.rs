//! # lootlog-bus
//!
//! In-process event distribution between the worker threads and the
//! async consumer side:
//!
//! - [`channel::EventChannel`] — bounded MPSC queue between the chat input
//!   thread and the store writer, with configurable backpressure
//! - [`bus::PersistedEventBus`] — synchronous fan-out of persisted
//!   envelopes to registered handlers, isolated from handler panics
//! - [`broadcast::BroadcastHub`] — thread→async bridge fanning envelopes to
//!   many per-subscriber bounded queues with drop-oldest backpressure
//! - [`latest::LatestValueHub`] — thread→async bridge for high-frequency
//!   samples where only the most recent value matters
//!
//! All handler/subscriber sets are guarded by a single lock each, and every
//! fan-out iterates a snapshot taken under the lock, then releases it before
//! delivering — handler execution never holds a hub lock.

#![deny(unsafe_code)]

pub mod broadcast;
pub mod bus;
pub mod channel;
pub mod latest;

pub use broadcast::{BroadcastHub, EventSubscriber};
pub use bus::{BusSubscription, PersistedEventBus};
pub use channel::{BackpressurePolicy, EventChannel};
pub use latest::{LatestValueHub, LatestValueSubscription};
