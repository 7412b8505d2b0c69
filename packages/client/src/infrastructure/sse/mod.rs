//! Server-sent event stream of the backend.
//!
//! - `decoder`: `text/event-stream` framing
//! - `event`: frame → `PushEvent` mapping
//! - `connection`: subscription, reconnection and session gating

pub mod connection;
pub mod decoder;
pub mod event;

pub use connection::SseConnection;
pub use decoder::{SseDecoder, SseFrame};
pub use event::parse_push_event;
