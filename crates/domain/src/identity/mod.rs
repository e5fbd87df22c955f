//! Accounts and the records attached to them.

pub mod account;
pub mod email;
pub mod id;
pub mod role;
pub mod user;
