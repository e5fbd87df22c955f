//! PostgreSQL adapters.
//!
//! Schema lives in `migrations/` at the workspace root.

mod credential_store;
mod models;
mod role_repository;
mod user_repository;

pub use credential_store::PgCredentialStore;
pub use role_repository::PgRoleRepository;
pub use user_repository::PgUserRepository;
