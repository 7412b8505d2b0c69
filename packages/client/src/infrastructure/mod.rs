//! Infrastructure layer
//!
//! Adapters implementing the domain ports: the REST client, the server-sent
//! event stream and the navigator.

pub mod dto;
pub mod http;
pub mod navigator;
pub mod sse;
