//! Terminal chat client library.
//!
//! Keeps a local list of conversations in sync with a messaging backend by
//! merging three sources of updates: REST responses, user actions and the
//! server-sent event stream.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
pub mod error;
pub mod runner;

pub use runner::run_client;
