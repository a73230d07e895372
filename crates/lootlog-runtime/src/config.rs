//! Runtime configuration.
//!
//! Everything is explicit and injected by the embedding application — the
//! runtime never reads environment variables or probes well-known paths.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for [`Runtime::start`](crate::Runtime::start).
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// SQLite database file for the event log. Parent directories are
    /// created on open.
    pub db_path: PathBuf,
    /// The chat log file to tail. May not exist yet at start.
    pub chat_log_path: PathBuf,
    /// Skip chat-log content that already exists at start. Only applies if
    /// the file exists then; a late-created file is always read in full.
    pub start_at_end: bool,
    /// Tailer poll interval.
    pub poll_interval: Duration,
}

impl RuntimeConfig {
    /// Config with the default tailing behavior: skip pre-existing content,
    /// poll every 50ms.
    pub fn new(db_path: impl Into<PathBuf>, chat_log_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            chat_log_path: chat_log_path.into(),
            start_at_end: true,
            poll_interval: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::new("/tmp/events.sqlite3", "/tmp/chat.log");
        assert!(config.start_at_end);
        assert_eq!(config.poll_interval, Duration::from_millis(50));
    }
}
