//! Lifecycle owner: spawn the workers, wire the bus to the hubs, and shut
//! everything down cooperatively.

use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use tracing::{info, warn};

use lootlog_bus::{
    BroadcastHub, BusSubscription, EventChannel, LatestValueHub, PersistedEventBus,
};
use lootlog_chat::{StartPosition, TailerConfig};
use lootlog_core::{ChatEvent, PositionSample, StopFlag};
use lootlog_store::{EventReader, EventStore};

use crate::config::RuntimeConfig;
use crate::workers;

/// Polling interval while waiting for workers to finish during shutdown.
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Forward every published envelope to the broadcast hub.
pub fn wire_broadcast(bus: &PersistedEventBus, hub: &BroadcastHub) -> BusSubscription {
    let hub = hub.clone();
    bus.subscribe(move |envelope| hub.publish(envelope))
}

/// A running lootlog pipeline: chat input thread, store writer thread, and
/// the distribution surfaces consumers attach to.
pub struct Runtime {
    stop: StopFlag,
    bus: PersistedEventBus,
    events_hub: BroadcastHub,
    position_hub: LatestValueHub<PositionSample>,
    db_path: PathBuf,
    hub_wiring: Option<BusSubscription>,
    chat_thread: Option<JoinHandle<()>>,
    writer_thread: Option<JoinHandle<anyhow::Result<()>>>,
}

impl Runtime {
    /// Open the event store and spawn the worker threads.
    ///
    /// Fails if the store cannot be opened or a thread cannot be spawned;
    /// in that case nothing keeps running.
    pub fn start(config: RuntimeConfig) -> anyhow::Result<Self> {
        let stop = StopFlag::default();

        let mut store = EventStore::new(&config.db_path);
        store.open().context("opening event store")?;

        let channel: EventChannel<ChatEvent> = EventChannel::default();
        let bus = PersistedEventBus::new();
        let events_hub = BroadcastHub::default();
        let position_hub: LatestValueHub<PositionSample> = LatestValueHub::new();
        let hub_wiring = wire_broadcast(&bus, &events_hub);

        let chat_thread = std::thread::Builder::new()
            .name("chat-input".into())
            .spawn({
                let path = config.chat_log_path.clone();
                let start = if config.start_at_end {
                    StartPosition::End
                } else {
                    StartPosition::Beginning
                };
                let tailer_config = TailerConfig {
                    poll_interval: config.poll_interval,
                    ..TailerConfig::default()
                };
                let channel = channel.clone();
                let stop = stop.clone();
                move || workers::run_chat_input(&path, start, &tailer_config, &channel, &stop)
            })
            .context("spawning chat input thread")?;

        let writer_thread = std::thread::Builder::new()
            .name("store-writer".into())
            .spawn({
                let bus = bus.clone();
                let positions = position_hub.clone();
                let stop = stop.clone();
                move || workers::run_store_writer(store, &channel, &bus, &positions, &stop)
            })
            .context("spawning store writer thread")?;

        info!(
            db_path = %config.db_path.display(),
            chat_log = %config.chat_log_path.display(),
            "runtime started"
        );

        Ok(Self {
            stop,
            bus,
            events_hub,
            position_hub,
            db_path: config.db_path,
            hub_wiring: Some(hub_wiring),
            chat_thread: Some(chat_thread),
            writer_thread: Some(writer_thread),
        })
    }

    /// The persisted-event bus. Handlers run synchronously on the writer
    /// thread; keep them fast.
    pub fn bus(&self) -> &PersistedEventBus {
        &self.bus
    }

    /// The broadcast hub for async envelope consumers.
    pub fn events(&self) -> &BroadcastHub {
        &self.events_hub
    }

    /// The latest-position hub.
    pub fn positions(&self) -> &LatestValueHub<PositionSample> {
        &self.position_hub
    }

    /// A read-only query handle against the event log. Usable concurrently
    /// with the running writer.
    pub fn reader(&self) -> EventReader {
        EventReader::new(&self.db_path)
    }

    /// Request shutdown and wait up to `grace` for the workers to finish.
    ///
    /// Best-effort: a worker that misses the deadline is abandoned with a
    /// warning rather than blocking the caller forever. Returns the writer's
    /// result, so a fail-fast persistence error surfaces here.
    pub fn stop(mut self, grace: Duration) -> anyhow::Result<()> {
        self.stop.trigger();
        if let Some(wiring) = self.hub_wiring.take() {
            wiring.close();
        }

        let deadline = Instant::now() + grace;
        if let Some(handle) = self.chat_thread.take() {
            let _ = join_with_deadline(handle, deadline, "chat-input");
        }
        let writer_result = self
            .writer_thread
            .take()
            .and_then(|handle| join_with_deadline(handle, deadline, "store-writer"));

        info!("runtime stopped");
        writer_result.unwrap_or(Ok(()))
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // If stop() was never called, at least ask the workers to wind down.
        self.stop.trigger();
    }
}

fn join_with_deadline<T>(handle: JoinHandle<T>, deadline: Instant, name: &str) -> Option<T> {
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!(worker = name, "worker did not stop in time, abandoning");
            return None;
        }
        std::thread::sleep(JOIN_POLL_INTERVAL);
    }
    match handle.join() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(worker = name, "worker panicked");
            None
        }
    }
}
