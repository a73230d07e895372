//! The durable [`EventEnvelope`] record.
//!
//! An envelope is created exactly once by the store at append time and is
//! immutable thereafter. Subscribers receive it by value — copies, never
//! shared mutable state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The durable, externally visible record of a persisted event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Store-assigned identity. Strictly increasing, starts at 1; never
    /// reused even across reopen.
    pub event_id: i64,
    /// Wall-clock creation time in epoch milliseconds.
    pub created_ts_ms: i64,
    /// Optional ISO timestamp label from the source line (not an instant).
    pub event_dt: Option<String>,
    /// Event-type discriminator, e.g. `ItemReceived`.
    pub event_type: String,
    /// Kind-specific fields as compact JSON.
    pub payload_json: String,
}

impl EventEnvelope {
    /// Deserialize `payload_json` into a generic JSON value for transport.
    pub fn payload(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.payload_json)
    }
}
