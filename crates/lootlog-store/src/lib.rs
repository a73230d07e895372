//! # lootlog-store
//!
//! Durable append-only event log over SQLite.
//!
//! Write path: [`EventStore`] — owned exclusively by the single writer
//! thread. `append` assigns the next monotonic `event_id` via SQLite's rowid
//! auto-increment and returns the fully populated
//! [`lootlog_core::EventEnvelope`].
//!
//! Read path: [`EventReader`] — opens an independent read-only connection
//! per request (open/use/close scoped to the call), so reads never share
//! mutable connection state with the writer.

#![deny(unsafe_code)]

pub mod errors;
pub mod reader;
pub mod schema;
pub mod store;

pub use errors::{Result, StoreError};
pub use reader::{DEFAULT_READ_LIMIT, EventReader, MAX_READ_LIMIT};
pub use store::EventStore;
