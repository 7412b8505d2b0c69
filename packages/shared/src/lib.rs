//! Shared building blocks for the Wac chat client.
//!
//! - `dto`: JSON payloads exchanged with the messaging backend
//! - `logger`: tracing subscriber setup
//! - `time`: clock abstraction and human-readable time formatting

pub mod dto;
pub mod logger;
pub mod time;
