//! Use cases of popy and the ports they talk through.
//!
//! Inbound ports ([`ports::inbound`]) are what the HTTP layer calls;
//! outbound ports ([`ports::outbound`]) are implemented by the `adapters`
//! crate.

pub mod dto;
pub mod error;
pub mod ports;
pub mod usecases;
