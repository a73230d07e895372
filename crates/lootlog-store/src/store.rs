//! The single-writer [`EventStore`].
//!
//! The store owns one read-write connection, and the connection is owned by
//! exactly one thread — the store is deliberately not `Sync` and all methods
//! take `&mut self`, so the single-writer rule is enforced by ownership, not
//! convention.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use tracing::{debug, instrument};

use lootlog_core::{ChatEvent, EventEnvelope};

use crate::errors::{Result, StoreError};
use crate::schema::{ensure_schema, open_connection};

/// Timestamp-label format persisted in the `event_dt` column (ISO 8601,
/// naive — matches the label semantics of the source line).
const EVENT_DT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Append-only event log with store-assigned monotonic identity.
pub struct EventStore {
    db_path: PathBuf,
    conn: Option<Connection>,
}

impl EventStore {
    /// Create a store handle. No I/O until [`open`](Self::open).
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            conn: None,
        }
    }

    /// Open the connection and ensure the schema exists. Idempotent.
    pub fn open(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        let conn = open_connection(&self.db_path)?;
        ensure_schema(&conn)?;
        debug!(db_path = %self.db_path.display(), "event store opened");
        self.conn = Some(conn);
        Ok(())
    }

    /// Release the connection. Idempotent.
    pub fn close(&mut self) {
        if self.conn.take().is_some() {
            debug!(db_path = %self.db_path.display(), "event store closed");
        }
    }

    /// Whether the store currently holds an open connection.
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// The backing database path.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Persist one event and return its envelope.
    ///
    /// Serializes the kind-specific fields to compact JSON (meta fields are
    /// hoisted to columns, not payload), stamps wall-clock creation time,
    /// and performs a single atomic insert. The returned `event_id` comes
    /// from SQLite's rowid auto-increment: strictly increasing from 1.
    ///
    /// On failure the error propagates — retry/drop/fail-fast is the
    /// caller's policy decision, not the store's.
    #[instrument(skip(self, event), fields(event_type = event.kind.event_type()))]
    pub fn append(&mut self, event: &ChatEvent) -> Result<EventEnvelope> {
        let conn = self.conn.as_ref().ok_or(StoreError::NotOpen)?;

        let event_type = event.kind.event_type();
        let payload_json = event.kind.payload_json()?;
        let created_ts_ms = chrono::Utc::now().timestamp_millis();
        let event_dt = event.meta.event_dt.format(EVENT_DT_FORMAT).to_string();

        let _ = conn.execute(
            "INSERT INTO events (created_ts_ms, event_type, payload_json, event_dt, raw)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![created_ts_ms, event_type, payload_json, event_dt, event.meta.raw],
        )?;
        let event_id = conn.last_insert_rowid();

        debug!(event_id, event_type, "event appended");

        Ok(EventEnvelope {
            event_id,
            created_ts_ms,
            event_dt: Some(event_dt),
            event_type: event_type.to_string(),
            payload_json,
        })
    }
}
