//! Error handler for popy.

use application::error::ApplicationError;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Request family an error belongs to. Picks the `code` of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Auth,
    Register,
}

impl Operation {
    pub fn code(self) -> &'static str {
        match self {
            Self::Auth => "ErrAuth",
            Self::Register => "ErrRegister",
        }
    }
}

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{source}")]
    Application {
        operation: Operation,
        #[source]
        source: ApplicationError,
    },

    #[error("{source}")]
    Body {
        operation: Operation,
        #[source]
        source: JsonRejection,
    },

    #[error("route is not implemented")]
    NotImplemented,
}

impl ServerError {
    pub fn auth(source: impl Into<ApplicationError>) -> Self {
        Self::Application {
            operation: Operation::Auth,
            source: source.into(),
        }
    }

    pub fn register(source: impl Into<ApplicationError>) -> Self {
        Self::Application {
            operation: Operation::Register,
            source: source.into(),
        }
    }

    pub fn body(operation: Operation, source: JsonRejection) -> Self {
        Self::Body { operation, source }
    }
}

/// Body of every error response.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ResponseError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_owned(),
            message: message.into(),
            field: None,
        }
    }

    fn field(mut self, field: Option<&str>) -> Self {
        self.field = field.map(str::to_owned);
        self
    }

    fn with_status(self, status: StatusCode) -> Response {
        match serde_json::to_string(&self) {
            Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body)
                .into_response(),
            Err(_) => internal_server_error(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Application { operation, source } => {
                let kind = source.kind();
                if kind.is_client_fault() {
                    ResponseError::new(operation.code(), source.to_string())
                        .field(source.field())
                        .with_status(StatusCode::BAD_REQUEST)
                } else {
                    tracing::error!(
                        error = ?source,
                        kind = kind.as_str(),
                        code = operation.code(),
                        "server returned 500 status"
                    );
                    ResponseError::new(operation.code(), "internal server error")
                        .with_status(StatusCode::INTERNAL_SERVER_ERROR)
                }
            },

            ServerError::Body { operation, source } => {
                ResponseError::new(operation.code(), source.body_text())
                    .with_status(StatusCode::BAD_REQUEST)
            },

            ServerError::NotImplemented => {
                ResponseError::new("ErrNotImplemented", self.to_string())
                    .with_status(StatusCode::NOT_IMPLEMENTED)
            },
        }
    }
}

fn internal_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"code":"ErrInternal","message":"internal server error"}"#,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::error::DomainError;
    use http_body_util::BodyExt;

    async fn body(response: Response) -> ResponseError {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_names_field() {
        let response = ServerError::register(DomainError::validation(
            "code",
            "code is required",
        ))
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body(response).await,
            ResponseError {
                code: "ErrRegister".into(),
                message: "code: code is required".into(),
                field: Some("code".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_not_found_is_client_fault() {
        let response = ServerError::auth(ApplicationError::NotFound).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body(response).await;
        assert_eq!(body.code, "ErrAuth");
        assert_eq!(body.field, None);
    }

    #[tokio::test]
    async fn test_storage_failure_hides_details() {
        let response = ServerError::auth(ApplicationError::persistence(
            "password authentication failed for user postgres",
        ))
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body(response).await;
        assert_eq!(body.message, "internal server error");
        assert!(!body.message.contains("postgres"));
    }

    #[tokio::test]
    async fn test_signing_failure_is_server_fault() {
        let response =
            ServerError::register(ApplicationError::signing("bad key")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_not_implemented() {
        let response = ServerError::NotImplemented.into_response();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
