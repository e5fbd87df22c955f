//! Authentification domain.

pub mod password;
pub mod provider;
pub mod registration;
