//! Data Transfer Objects (DTOs) exchanged with the messaging backend.
//!
//! DTOs are organized by resource:
//! - `user`: user records (search results, authenticated principal)
//! - `conversation`: conversations and creation requests
//! - `message`: messages, send requests and read receipts
//! - `request`: pagination query parameters
//!
//! All payloads use camelCase JSON field names.

pub mod conversation;
pub mod message;
pub mod request;
pub mod user;
