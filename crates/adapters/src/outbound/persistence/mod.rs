//! Storage adapters.

pub mod memory;
pub mod postgres;

use application::error::ApplicationError;

/// Unique violations become [`ApplicationError::DuplicateUser`]; any other
/// failure is a persistence error.
pub(crate) fn map_sqlx(err: sqlx::Error) -> ApplicationError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            tracing::debug!(constraint = db.constraint(), "unique violation");
            ApplicationError::DuplicateUser
        },
        _ => ApplicationError::persistence(err),
    }
}
