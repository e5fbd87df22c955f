//! Outbound adapters of popy: storage, cryptography, tokens and identity
//! providers.

#![forbid(unsafe_code)]

pub mod outbound;
