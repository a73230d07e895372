//! Structured chat-line types.
//!
//! A [`ChatLine`] is the parsed form of one complete line from the game's
//! `chat.log`. The embedded timestamp is a *label* taken verbatim from the
//! log header — it is naive local game time, never timezone-converted and
//! never used for ordering. Persistence order is authoritative.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Classification of the bracketed channel token in a log line header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// `[System]` — game system messages (loot, claims, skills, ...).
    System,
    /// `[Globals]` — server-wide announcement channel.
    Globals,
    /// `[#...]` — public chat channels.
    Public,
    /// Anything else (private chat, society, unrecognized tokens).
    Unknown,
}

impl ChannelKind {
    /// Classify a raw channel token.
    ///
    /// The token is matched case- and content-sensitively; only the `#`
    /// prefix check is positional.
    pub fn classify(token: &str) -> Self {
        if token == "System" {
            Self::System
        } else if token == "Globals" {
            Self::Globals
        } else if token.starts_with('#') {
            Self::Public
        } else {
            Self::Unknown
        }
    }
}

/// One fully parsed chat-log line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatLine {
    /// Wall-clock milliseconds at which the tailer observed the line.
    pub observed_at_ms: i64,
    /// Timestamp from the line header. Naive game time, label only.
    pub event_dt: NaiveDateTime,
    /// Classified channel.
    pub channel_kind: ChannelKind,
    /// Raw bracket contents, e.g. `System`, `#calytrade`, `Rookie`.
    pub channel_token: String,
    /// Speaker token (empty for system messages).
    pub speaker: String,
    /// Message body, surrounding whitespace trimmed.
    pub message: String,
    /// The original line, CR/LF stripped.
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_system() {
        assert_eq!(ChannelKind::classify("System"), ChannelKind::System);
    }

    #[test]
    fn classify_globals() {
        assert_eq!(ChannelKind::classify("Globals"), ChannelKind::Globals);
    }

    #[test]
    fn classify_public_hash_prefix() {
        assert_eq!(ChannelKind::classify("#calytrade"), ChannelKind::Public);
        assert_eq!(ChannelKind::classify("#"), ChannelKind::Public);
    }

    #[test]
    fn classify_is_case_sensitive() {
        assert_eq!(ChannelKind::classify("system"), ChannelKind::Unknown);
        assert_eq!(ChannelKind::classify("SYSTEM"), ChannelKind::Unknown);
    }

    #[test]
    fn classify_unknown_tokens() {
        assert_eq!(ChannelKind::classify("Rookie"), ChannelKind::Unknown);
        assert_eq!(ChannelKind::classify(""), ChannelKind::Unknown);
    }
}
