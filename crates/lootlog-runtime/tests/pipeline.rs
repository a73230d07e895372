//! End-to-end pipeline test: lines appended to a temp chat log end up as
//! persisted envelopes, visible both through the broadcast hub and the read
//! API, in id order.

use std::io::Write as _;
use std::time::Duration;

use tokio::time::timeout;

use lootlog_runtime::{Runtime, RuntimeConfig};

const RECV_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test(flavor = "multi_thread")]
async fn chat_log_lines_become_ordered_envelopes() {
    lootlog_core::logging::init();

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("chat.log");
    let db_path = dir.path().join("events.sqlite3");

    let mut config = RuntimeConfig::new(&db_path, &log_path);
    config.start_at_end = false;
    config.poll_interval = Duration::from_millis(10);

    let runtime = Runtime::start(config).unwrap();
    let mut sub = runtime.events().register();
    let positions = runtime.positions().subscribe();

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .unwrap();
    // Two system events, one chatter line (no event), one malformed line,
    // one waypoint.
    writeln!(
        file,
        "2026-01-10 12:37:50 [System] [] You have claimed a resource! (Yellow Crystal)"
    )
    .unwrap();
    writeln!(file, "2026-01-10 12:37:51 [#mining] [Jane] nice one").unwrap();
    writeln!(file, "not a chat line at all").unwrap();
    writeln!(
        file,
        "2026-01-10 12:37:52 [System] [] You received Blue Crystal x (8) Value: 0.1600 PED"
    )
    .unwrap();
    writeln!(
        file,
        "2026-01-10 12:37:53 [System] [] [Calypso, 61234, 75678, 110, Waypoint]"
    )
    .unwrap();
    file.flush().unwrap();

    let first = timeout(RECV_TIMEOUT, sub.recv()).await.unwrap();
    assert_eq!(first.event_id, 1);
    assert_eq!(first.event_type, "ResourceClaimed");
    assert_eq!(first.payload().unwrap()["resource_name"], "Yellow Crystal");
    assert_eq!(first.event_dt.as_deref(), Some("2026-01-10T12:37:50"));

    let second = timeout(RECV_TIMEOUT, sub.recv()).await.unwrap();
    assert_eq!(second.event_id, 2);
    assert_eq!(second.event_type, "ItemReceived");
    let payload = second.payload().unwrap();
    assert_eq!(payload["item_name"], "Blue Crystal");
    assert_eq!(payload["qty"], 8);
    assert_eq!(payload["value_mpec"], 16_000);

    let third = timeout(RECV_TIMEOUT, sub.recv()).await.unwrap();
    assert_eq!(third.event_id, 3);
    assert_eq!(third.event_type, "PlayerPosWaypoint");

    // The waypoint was published to the position hub before its envelope
    // reached the broadcast hub, so the latest value is already there.
    let sample = positions.last_known().expect("waypoint primes the hub");
    assert_eq!(sample.planet_name.as_deref(), Some("Calypso"));
    assert_eq!((sample.x, sample.y, sample.z), (61_234, 75_678, Some(110)));

    // The read API agrees with the stream.
    let reader = runtime.reader();
    let rows = reader.read_latest(10).unwrap();
    let ids: Vec<i64> = rows.iter().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    let after: Vec<i64> = reader
        .read_after(1, 10)
        .unwrap()
        .iter()
        .map(|e| e.event_id)
        .collect();
    assert_eq!(after, vec![2, 3]);

    runtime.stop(Duration::from_secs(5)).unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn start_at_end_skips_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("chat.log");
    let db_path = dir.path().join("events.sqlite3");

    std::fs::write(
        &log_path,
        "2026-01-10 12:00:00 [System] [] You have claimed a resource! (Old Claim)\n",
    )
    .unwrap();

    let mut config = RuntimeConfig::new(&db_path, &log_path);
    config.poll_interval = Duration::from_millis(10);
    // start_at_end stays true (the default).

    let runtime = Runtime::start(config).unwrap();
    let mut sub = runtime.events().register();

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(&log_path)
        .unwrap();
    writeln!(
        file,
        "2026-01-10 12:37:50 [System] [] You have claimed a resource! (New Claim)"
    )
    .unwrap();
    file.flush().unwrap();

    let only = timeout(RECV_TIMEOUT, sub.recv()).await.unwrap();
    assert_eq!(only.event_id, 1);
    assert_eq!(only.payload().unwrap()["resource_name"], "New Claim");

    runtime.stop(Duration::from_secs(5)).unwrap();
}
