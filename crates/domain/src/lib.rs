//! Core entities of popy: users, roles, credentials and the rules binding
//! them. Nothing in here performs I/O.

#![forbid(unsafe_code)]

pub mod auth;
pub mod credential;
pub mod error;
pub mod identity;
