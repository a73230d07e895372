//! The two long-running worker loops.
//!
//! `run_chat_input` and `run_store_writer` are plain blocking functions for
//! dedicated threads; [`Runtime`](crate::Runtime) owns the spawning and
//! joining. Keeping them free functions keeps each loop testable without a
//! full runtime.

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use tracing::{debug, error};

use lootlog_bus::{EventChannel, LatestValueHub, PersistedEventBus};
use lootlog_chat::{StartPosition, TailerConfig, interpret_chat_line, parse_chat_line, tail_lines};
use lootlog_core::{ChatEvent, ChatEventKind, PositionSample, StopFlag};
use lootlog_store::EventStore;

/// How long the writer sleeps in `take` before re-checking the stop flag.
const WRITER_TAKE_TIMEOUT: Duration = Duration::from_millis(100);

/// Chat input loop: tail → parse → interpret → emit.
///
/// Lines that fail to parse, and lines that parse but match no event, are
/// skipped silently — non-event chatter dominates the log, so per-line
/// rejection noise is useless. Runs until `stop` is set.
pub fn run_chat_input(
    chat_log_path: &Path,
    start: StartPosition,
    tailer_config: &TailerConfig,
    channel: &EventChannel<ChatEvent>,
    stop: &StopFlag,
) {
    tail_lines(chat_log_path, start, tailer_config, stop, |line| {
        let observed_at_ms = Utc::now().timestamp_millis();
        let Some(parsed) = parse_chat_line(&line, observed_at_ms) else {
            return;
        };
        let Some(event) = interpret_chat_line(&parsed) else {
            return;
        };
        // The channel logs and counts its own drops.
        let _ = channel.emit(event);
    });
    debug!("chat input worker stopped");
}

/// Store writer loop: take → append → publish.
///
/// Owns the sole write connection for the lifetime of the thread. Persistence
/// failure is fail-fast: the error is logged, `stop` is triggered so the
/// other workers wind down, and the error surfaces through the join handle.
pub fn run_store_writer(
    mut store: EventStore,
    channel: &EventChannel<ChatEvent>,
    bus: &PersistedEventBus,
    positions: &LatestValueHub<PositionSample>,
    stop: &StopFlag,
) -> anyhow::Result<()> {
    loop {
        match channel.take(WRITER_TAKE_TIMEOUT) {
            Some(event) => persist(&mut store, &event, bus, positions).inspect_err(|e| {
                error!(error = %e, "event persistence failed, shutting down");
                stop.trigger();
            })?,
            None if stop.is_set() => break,
            None => {}
        }
    }

    // Events enqueued before the producer observed the stop flag.
    while let Some(event) = channel.take(Duration::ZERO) {
        persist(&mut store, &event, bus, positions)
            .inspect_err(|e| error!(error = %e, "event persistence failed during drain"))?;
    }

    store.close();
    debug!("store writer stopped");
    Ok(())
}

fn persist(
    store: &mut EventStore,
    event: &ChatEvent,
    bus: &PersistedEventBus,
    positions: &LatestValueHub<PositionSample>,
) -> anyhow::Result<()> {
    let envelope = store
        .append(event)
        .with_context(|| format!("appending {} event", event.kind.event_type()))?;

    if let ChatEventKind::PlayerPosWaypoint(p) = &event.kind {
        positions.publish(PositionSample {
            ts_ms: envelope.created_ts_ms,
            planet_name: Some(p.planet_name.clone()),
            x: p.x,
            y: p.y,
            z: Some(p.z),
        });
    }

    bus.publish(&envelope);
    Ok(())
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lootlog_bus::BackpressurePolicy;
    use lootlog_core::events::ResourceClaimed;
    use lootlog_core::{ChannelKind, ChatMeta, EventEnvelope};
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    fn claim_event() -> ChatEvent {
        ChatEvent {
            meta: ChatMeta {
                event_dt: NaiveDate::from_ymd_opt(2026, 1, 10)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
                channel_kind: ChannelKind::System,
                channel_token: "System".into(),
                raw: "2026-01-10 12:00:00 [System] [] claim".into(),
            },
            kind: ChatEventKind::ResourceClaimed(ResourceClaimed {
                resource_name: "Lyst".into(),
            }),
        }
    }

    fn waypoint_event() -> ChatEvent {
        ChatEvent {
            meta: ChatMeta {
                event_dt: NaiveDate::from_ymd_opt(2026, 1, 10)
                    .unwrap()
                    .and_hms_opt(12, 0, 1)
                    .unwrap(),
                channel_kind: ChannelKind::System,
                channel_token: "System".into(),
                raw: "2026-01-10 12:00:01 [System] [] waypoint".into(),
            },
            kind: ChatEventKind::PlayerPosWaypoint(lootlog_core::events::PlayerPosWaypoint {
                planet_name: "Calypso".into(),
                x: 61_000,
                y: 75_000,
                z: 110,
            }),
        }
    }

    #[test]
    fn writer_persists_and_publishes_then_stops() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = EventStore::new(dir.path().join("events.sqlite3"));
        store.open().unwrap();

        let channel = EventChannel::new(16, BackpressurePolicy::Block);
        let bus = PersistedEventBus::new();
        let positions = LatestValueHub::new();
        let stop = StopFlag::default();

        let published = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&published);
        let _sub = bus.subscribe(move |env: &EventEnvelope| {
            sink.lock().unwrap().push(env.event_id);
        });

        channel.emit(claim_event());
        channel.emit(claim_event());
        stop.trigger();

        run_store_writer(store, &channel, &bus, &positions, &stop).unwrap();
        assert_eq!(*published.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn writer_feeds_position_hub_from_waypoints() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = EventStore::new(dir.path().join("events.sqlite3"));
        store.open().unwrap();

        let channel = EventChannel::new(16, BackpressurePolicy::Block);
        let bus = PersistedEventBus::new();
        let positions = LatestValueHub::new();
        let stop = StopFlag::default();

        channel.emit(waypoint_event());
        stop.trigger();
        run_store_writer(store, &channel, &bus, &positions, &stop).unwrap();

        let sample = positions.latest().expect("waypoint should prime the hub");
        assert_eq!(sample.planet_name.as_deref(), Some("Calypso"));
        assert_eq!((sample.x, sample.y, sample.z), (61_000, 75_000, Some(110)));
    }

    #[test]
    fn writer_fails_fast_on_closed_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = EventStore::new(dir.path().join("events.sqlite3"));
        store.open().unwrap();
        store.close();

        let channel = EventChannel::new(16, BackpressurePolicy::Block);
        let bus = PersistedEventBus::new();
        let positions = LatestValueHub::new();
        let stop = StopFlag::default();

        channel.emit(claim_event());
        let result = run_store_writer(store, &channel, &bus, &positions, &stop);
        assert!(result.is_err());
        assert!(stop.is_set());
    }
}
