//! Wire format adapters.
//!
//! The DTOs themselves live in `wac_shared::dto`; this module only converts
//! them to and from domain entities.

pub mod conversion;
