//! REST adapter for the messaging backend.

pub mod client;

pub use client::HttpApiClient;
