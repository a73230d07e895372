//! Polling file tailer.
//!
//! Yields every complete, newline-terminated line appended to a growing text
//! file, exactly once, in order — regardless of the chunk boundaries the
//! writer happens to flush at. Tolerates the file not existing yet, being
//! truncated/rotated, and transient I/O errors.
//!
//! The tailer is a blocking loop intended for a dedicated thread. It
//! suspends only on its poll sleep and checks the stop flag at every poll
//! boundary, so cancellation is prompt.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use lootlog_core::StopFlag;

/// Where tailing begins relative to the file's content at start time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartPosition {
    /// Replay the file from byte 0.
    Beginning,
    /// Skip content that already exists.
    ///
    /// Applies at most once, and only if the file exists when tailing
    /// starts. If the file is created later, nothing is skipped — lines
    /// written after creation are always yielded.
    End,
}

/// Tailer tuning knobs.
#[derive(Clone, Debug)]
pub struct TailerConfig {
    /// Sleep between polls when no new bytes are available.
    pub poll_interval: Duration,
    /// Upper bound on buffered bytes without a line terminator.
    ///
    /// A terminator-less run beyond this bound is discarded up to the next
    /// newline (the whole oversized line is dropped with a warning) instead
    /// of growing the buffer without limit.
    pub max_line_bytes: usize,
}

impl Default for TailerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            max_line_bytes: 1024 * 1024,
        }
    }
}

const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Tail `path`, invoking `on_line` for each complete line until `stop` is set.
///
/// Lines are passed with the terminator removed (one trailing `\r` is also
/// trimmed). Bytes are decoded per line with invalid UTF-8 replaced, never
/// fatal. Partial lines are held back until their terminator arrives.
pub fn tail_lines(
    path: &Path,
    start: StartPosition,
    config: &TailerConfig,
    stop: &StopFlag,
    mut on_line: impl FnMut(String),
) {
    let mut offset: u64 = match start {
        StartPosition::End => std::fs::metadata(path).map_or(0, |m| m.len()),
        StartPosition::Beginning => 0,
    };
    let mut buf: Vec<u8> = Vec::new();
    let mut discarding = false;

    while !stop.is_set() {
        let len = match std::fs::metadata(path) {
            Ok(m) => m.len(),
            Err(_) => {
                // Not created yet, or removed mid-rotation. Wait it out.
                std::thread::sleep(config.poll_interval);
                continue;
            }
        };

        if len < offset {
            debug!(offset, len, "file shrank, treating as truncation");
            offset = 0;
            buf.clear();
            discarding = false;
        }

        if len == offset {
            std::thread::sleep(config.poll_interval);
            continue;
        }

        if let Err(e) = read_available(
            path,
            &mut offset,
            &mut buf,
            &mut discarding,
            config,
            stop,
            &mut on_line,
        ) {
            // Transient: file locked, removed mid-read, etc. Retry next poll.
            debug!(error = %e, "tail read failed, retrying");
            std::thread::sleep(config.poll_interval);
        }
    }
}

/// Read newly appended bytes from `offset` to EOF, draining complete lines
/// chunk by chunk so buffering stays bounded by line length, not file size.
fn read_available(
    path: &Path,
    offset: &mut u64,
    buf: &mut Vec<u8>,
    discarding: &mut bool,
    config: &TailerConfig,
    stop: &StopFlag,
    on_line: &mut impl FnMut(String),
) -> std::io::Result<()> {
    let mut file = File::open(path)?;
    let _ = file.seek(SeekFrom::Start(*offset))?;

    let mut chunk = vec![0_u8; READ_CHUNK_BYTES];
    loop {
        if stop.is_set() {
            return Ok(());
        }
        let n = file.read(&mut chunk)?;
        if n == 0 {
            return Ok(());
        }
        *offset += n as u64;
        buf.extend_from_slice(&chunk[..n]);
        drain_lines(buf, discarding, config.max_line_bytes, on_line);
    }
}

/// Extract complete lines greedily at each `\n` boundary.
fn drain_lines(
    buf: &mut Vec<u8>,
    discarding: &mut bool,
    max_line_bytes: usize,
    on_line: &mut impl FnMut(String),
) {
    while let Some(nl) = buf.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = buf.drain(..=nl).collect();
        let _ = line.pop(); // the \n itself
        if line.last() == Some(&b'\r') {
            let _ = line.pop();
        }
        if *discarding {
            // Tail end of an oversized line — swallow it and resume.
            *discarding = false;
            continue;
        }
        on_line(String::from_utf8_lossy(&line).into_owned());
    }

    if buf.len() > max_line_bytes {
        if !*discarding {
            warn!(
                buffered = buf.len(),
                max = max_line_bytes,
                "line exceeds buffer bound without terminator, dropping it"
            );
            counter!("chat_tailer_oversized_lines_total").increment(1);
            *discarding = true;
        }
        buf.clear();
    }
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;

    use std::fs::OpenOptions;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::time::Duration;

    fn test_config() -> TailerConfig {
        TailerConfig {
            poll_interval: Duration::from_millis(5),
            ..TailerConfig::default()
        }
    }

    fn append(path: &Path, text: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut f = OpenOptions::new().create(true).append(true).open(path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
        f.flush().unwrap();
    }

    struct TailerHandle {
        stop: StopFlag,
        rx: mpsc::Receiver<String>,
        thread: std::thread::JoinHandle<()>,
    }

    impl TailerHandle {
        fn expect_line(&self) -> String {
            self.rx
                .recv_timeout(Duration::from_secs(5))
                .expect("timed out waiting for a tailed line")
        }

        fn expect_no_line(&self) {
            assert!(
                self.rx.recv_timeout(Duration::from_millis(200)).is_err(),
                "expected no line"
            );
        }

        fn shutdown(self) {
            self.stop.trigger();
            self.thread.join().unwrap();
        }
    }

    fn start_tailer(path: PathBuf, start: StartPosition, config: TailerConfig) -> TailerHandle {
        let stop = StopFlag::new();
        let (tx, rx) = mpsc::channel();
        let thread_stop = stop.clone();
        let thread = std::thread::spawn(move || {
            tail_lines(&path, start, &config, &thread_stop, |line| {
                let _ = tx.send(line);
            });
        });
        TailerHandle { stop, rx, thread }
    }

    #[test]
    fn reads_existing_lines_from_beginning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        append(&path, "L1\nL2\n");

        let t = start_tailer(path, StartPosition::Beginning, test_config());
        assert_eq!(t.expect_line(), "L1");
        assert_eq!(t.expect_line(), "L2");
        t.shutdown();
    }

    #[test]
    fn skips_existing_lines_when_starting_at_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        append(&path, "OLD1\nOLD2\n");

        let t = start_tailer(path.clone(), StartPosition::End, test_config());
        t.expect_no_line();

        append(&path, "NEW1\n");
        assert_eq!(t.expect_line(), "NEW1");
        t.shutdown();
    }

    #[test]
    fn start_at_end_with_late_creation_skips_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        // File does not exist yet — the skip step must not apply.
        let t = start_tailer(path.clone(), StartPosition::End, test_config());

        std::thread::sleep(Duration::from_millis(50));
        append(&path, "A\nB\n");
        assert_eq!(t.expect_line(), "A");
        assert_eq!(t.expect_line(), "B");
        t.shutdown();
    }

    #[test]
    fn partial_line_held_until_terminator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        append(&path, "");

        let t = start_tailer(path.clone(), StartPosition::End, test_config());
        append(&path, "PART");
        t.expect_no_line();

        append(&path, "IAL\n");
        assert_eq!(t.expect_line(), "PARTIAL");
        t.shutdown();
    }

    #[test]
    fn lines_split_across_arbitrary_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        append(&path, "");

        let t = start_tailer(path.clone(), StartPosition::Beginning, test_config());
        for chunk in ["ab", "c\nde", "f", "\n"] {
            append(&path, chunk);
            std::thread::sleep(Duration::from_millis(15));
        }
        assert_eq!(t.expect_line(), "abc");
        assert_eq!(t.expect_line(), "def");
        t.shutdown();
    }

    #[test]
    fn crlf_terminators_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        append(&path, "one\r\ntwo\r\n");

        let t = start_tailer(path, StartPosition::Beginning, test_config());
        assert_eq!(t.expect_line(), "one");
        assert_eq!(t.expect_line(), "two");
        t.shutdown();
    }

    #[test]
    fn truncation_resets_to_byte_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        append(&path, "OLD-LONG-LINE-1\nOLD-LONG-LINE-2\n");

        let t = start_tailer(path.clone(), StartPosition::Beginning, test_config());
        assert_eq!(t.expect_line(), "OLD-LONG-LINE-1");
        assert_eq!(t.expect_line(), "OLD-LONG-LINE-2");

        // Rotate: shrink the file, then append fresh content.
        let f = OpenOptions::new().write(true).open(&path).unwrap();
        f.set_len(0).unwrap();
        drop(f);
        append(&path, "FRESH\n");

        assert_eq!(t.expect_line(), "FRESH");
        t.shutdown();
    }

    #[test]
    fn invalid_utf8_replaced_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut f = OpenOptions::new().create(true).append(true).open(&path).unwrap();
        f.write_all(b"ok\xff\xfe\n").unwrap();
        drop(f);

        let t = start_tailer(path, StartPosition::Beginning, test_config());
        let line = t.expect_line();
        assert!(line.starts_with("ok"));
        assert!(line.contains('\u{FFFD}'));
        t.shutdown();
    }

    #[test]
    fn oversized_line_dropped_with_following_line_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        append(&path, "");

        let config = TailerConfig {
            poll_interval: Duration::from_millis(5),
            max_line_bytes: 32,
        };
        let t = start_tailer(path.clone(), StartPosition::Beginning, config);

        // No terminator for well past the bound.
        append(&path, &"x".repeat(256));
        std::thread::sleep(Duration::from_millis(50));
        append(&path, &"y".repeat(256));
        std::thread::sleep(Duration::from_millis(50));
        // Terminate the monster line, then write a normal one.
        append(&path, "\nok\n");

        assert_eq!(t.expect_line(), "ok");
        t.shutdown();
    }

    #[test]
    fn stop_terminates_promptly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");

        let t = start_tailer(path, StartPosition::Beginning, test_config());
        t.stop.trigger();
        t.thread.join().unwrap();
    }
}
