//! Users-related HTTP API.
//!
//! Only registration is served. Profile routes are reserved and answer
//! `501 Not Implemented`.

use axum::Router;
use axum::routing::{get, post, put};

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::router::register;

async fn not_implemented() -> Result<()> {
    Err(ServerError::NotImplemented)
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /users` goes to `register`.
        .route("/", post(register::handler))
        .route("/{user_id}", get(not_implemented).put(not_implemented))
        .route("/{user_id}/password", put(not_implemented))
        .route("/{user_id}/email", put(not_implemented))
        .route("/{user_id}/mobile", put(not_implemented))
        .route("/{user_id}/avatar", put(not_implemented))
}
