//! # lootlog-core
//!
//! Foundation types for the lootlog game-log bridge.
//!
//! This crate provides the shared vocabulary that all other lootlog crates
//! depend on:
//!
//! - **Chat lines**: [`chat::ChatLine`] and [`chat::ChannelKind`] — the
//!   structured form of one raw log line
//! - **Domain events**: [`events::ChatEvent`] with [`events::ChatEventKind`]
//!   variants and typed payload structs
//! - **Envelopes**: [`envelope::EventEnvelope`] — the durable, identity-bearing
//!   record returned by the store and fanned out to subscribers
//! - **Money**: [`money::Mpec`] integer minor-units (no floats, ever)
//! - **Position**: [`position::PositionSample`] high-frequency samples for the
//!   latest-value stream
//! - **Logging**: [`logging::init`] tracing subscriber setup
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other lootlog crates.

#![deny(unsafe_code)]

pub mod chat;
pub mod envelope;
pub mod events;
pub mod logging;
pub mod money;
pub mod position;
pub mod shutdown;

pub use chat::{ChannelKind, ChatLine};
pub use envelope::EventEnvelope;
pub use events::{ChatEvent, ChatEventKind, ChatMeta};
pub use money::Mpec;
pub use position::PositionSample;
pub use shutdown::StopFlag;
