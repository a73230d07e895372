//! # lootlog-runtime
//!
//! Composition layer: spawns the chat input and store writer threads,
//! wires the persisted-event bus to the broadcast hub, and owns cooperative
//! shutdown. Everything is driven by an explicit [`RuntimeConfig`] — no
//! ambient environment reads.
//!
//! ```text
//! chat.log --tail--> parse --> interpret --> EventChannel
//!                                                |
//!                                         store writer thread
//!                                          append -> publish
//!                                           /           \
//!                                    BroadcastHub   LatestValueHub
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod runtime;
pub mod workers;

pub use config::RuntimeConfig;
pub use runtime::{Runtime, wire_broadcast};
