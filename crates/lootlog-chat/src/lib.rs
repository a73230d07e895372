//! # lootlog-chat
//!
//! Chat-log ingestion pipeline: tail a growing `chat.log`, parse each
//! complete line against the fixed header grammar, and interpret system
//! messages into typed domain events.
//!
//! The three stages are independent and individually testable:
//!
//! - [`tailer::tail_lines`] — crash-tolerant polling tailer; yields every
//!   complete appended line exactly once
//! - [`parser::parse_chat_line`] — header grammar → [`lootlog_core::ChatLine`]
//! - [`interpreter::interpret_chat_line`] — ordered matcher chain →
//!   [`lootlog_core::ChatEvent`]

#![deny(unsafe_code)]

pub mod interpreter;
pub mod parser;
pub mod tailer;

pub use interpreter::interpret_chat_line;
pub use parser::parse_chat_line;
pub use tailer::{StartPosition, TailerConfig, tail_lines};
