//! These traits define what the application can do.

pub mod auth;
pub mod register;

pub use auth::*;
pub use register::*;
