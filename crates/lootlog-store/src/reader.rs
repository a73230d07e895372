//! Read-only query surface.
//!
//! Each read opens its own read-only connection scoped to the call, so the
//! read path never touches the writer's connection and can run concurrently
//! from any thread. Both queries are bounded, non-blocking, side-effect-free.

use std::path::PathBuf;

use rusqlite::{Row, params};

use lootlog_core::EventEnvelope;

use crate::errors::Result;
use crate::schema::open_read_only;

/// Default row cap when the caller does not specify one.
pub const DEFAULT_READ_LIMIT: usize = 200;
/// Hard row cap; larger requests are clamped, not rejected.
pub const MAX_READ_LIMIT: usize = 2000;

/// Stateless handle for bounded reads against the event log.
#[derive(Clone, Debug)]
pub struct EventReader {
    db_path: PathBuf,
}

impl EventReader {
    /// Create a reader for the given database path.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// The most recent `limit` events, ordered oldest→newest among them.
    pub fn read_latest(&self, limit: usize) -> Result<Vec<EventEnvelope>> {
        let conn = open_read_only(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT * FROM (
               SELECT event_id, created_ts_ms, event_dt, event_type, payload_json
               FROM events
               ORDER BY event_id DESC
               LIMIT ?1
             )
             ORDER BY event_id ASC",
        )?;
        let rows = stmt.query_map(params![clamp_limit(limit)], map_envelope)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Events with id strictly greater than `after_event_id`, ascending,
    /// capped at `limit`.
    pub fn read_after(&self, after_event_id: i64, limit: usize) -> Result<Vec<EventEnvelope>> {
        let conn = open_read_only(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT event_id, created_ts_ms, event_dt, event_type, payload_json
             FROM events
             WHERE event_id > ?1
             ORDER BY event_id ASC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![after_event_id, clamp_limit(limit)], map_envelope)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }
}

fn clamp_limit(limit: usize) -> i64 {
    limit.clamp(1, MAX_READ_LIMIT) as i64
}

fn map_envelope(row: &Row<'_>) -> rusqlite::Result<EventEnvelope> {
    Ok(EventEnvelope {
        event_id: row.get(0)?,
        created_ts_ms: row.get(1)?,
        event_dt: row.get(2)?,
        event_type: row.get(3)?,
        payload_json: row.get(4)?,
    })
}
