//! Chat-line header parser.
//!
//! Grammar (full match required):
//!
//! ```text
//! YYYY-MM-DD HH:MM:SS [channelToken] [speaker] message
//! ```
//!
//! Example:
//!
//! ```text
//! 2026-01-10 12:37:50 [System] [] You have claimed a resource! (Yellow Crystal)
//! ```
//!
//! Anything that does not match — including multi-line continuations — is
//! rejected. Multi-line payloads are dropped rather than merged, by design.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use lootlog_core::{ChannelKind, ChatLine};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<ts>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) \[(?P<channel>[^\]]*)\] \[(?P<speaker>[^\]]*)\] (?P<msg>.*)$",
    )
    .expect("header regex is valid")
});

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse one raw line into a [`ChatLine`], or reject it.
///
/// `observed_at_ms` is the wall-clock time the tailer saw the line; the
/// timestamp inside the header is kept as a naive label and is never
/// timezone-converted. Invalid calendar dates reject the line — no default
/// is substituted.
pub fn parse_chat_line(raw_line: &str, observed_at_ms: i64) -> Option<ChatLine> {
    let raw = raw_line.trim_end_matches(['\r', '\n']);
    let caps = HEADER_RE.captures(raw)?;

    let event_dt = NaiveDateTime::parse_from_str(&caps["ts"], TS_FORMAT).ok()?;
    let channel_token = caps["channel"].trim().to_string();

    Some(ChatLine {
        observed_at_ms,
        event_dt,
        channel_kind: ChannelKind::classify(&channel_token),
        channel_token,
        speaker: caps["speaker"].trim().to_string(),
        message: caps["msg"].trim().to_string(),
        raw: raw.to_string(),
    })
}
