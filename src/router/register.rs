use application::dto::RegisterRequestDto;
use application::ports::inbound::Register;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{Operation, Result, ServerError};
use crate::router::model::UserResponse;

/// `POST /users` body.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub id: String,
    /// `mobile` or `email`.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pwd: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub token: String,
}

impl From<Body> for RegisterRequestDto {
    fn from(body: Body) -> Self {
        Self {
            id: body.id,
            kind: body.kind,
            password: body.pwd,
            code: body.code,
            token: body.token,
        }
    }
}

/// Handler to create user.
pub async fn handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Body>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let Json(body) =
        body.map_err(|err| ServerError::body(Operation::Register, err))?;

    let user = state
        .orchestrator
        .register(body.into())
        .await
        .map_err(ServerError::register)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResponseError;
    use crate::router::tests::{json, state};
    use crate::*;
    use axum::http::StatusCode;

    fn body(id: &str, kind: &str) -> Body {
        Body {
            id: id.into(),
            kind: kind.into(),
            pwd: "P$soW%920$n&".into(),
            code: "123456".into(),
            token: "verification-token".into(),
        }
    }

    async fn post(app: Router, body: &Body) -> axum::http::Response<axum::body::Body> {
        make_request(app, Method::POST, "/users", serde_json::to_string(body).unwrap())
            .await
    }

    #[tokio::test]
    async fn test_register_email() {
        let (store, state) = state();
        let response = post(app(state), &body("lin@example.com", "email")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let user: UserResponse = json(response).await;
        assert_eq!(user.email.as_deref(), Some("lin@example.com"));
        assert_eq!(user.mobile, None);
        assert!(!user.token.is_empty());
        assert!(user.credential.wechat.is_none());

        let stored = store.users().await;
        assert_eq!(stored.len(), 1);
        assert!(stored[0].password.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_identifier() {
        let (store, state) = state();
        let app = app(state);
        let body = body("13800000000", "mobile");

        assert_eq!(post(app.clone(), &body).await.status(), StatusCode::OK);
        let response = post(app, &body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ResponseError = json(response).await;
        assert_eq!(error.code, "ErrRegister");
        assert_eq!(error.message, "identifier is already registered");
        assert_eq!(store.users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_are_named() {
        let (_, state) = state();
        let app = app(state);

        let cases = [
            (Body { id: String::new(), ..body("x", "email") }, "id"),
            (Body { pwd: String::new(), ..body("13800000000", "mobile") }, "pwd"),
            (Body { code: String::new(), ..body("13800000000", "mobile") }, "code"),
            (Body { token: String::new(), ..body("13800000000", "mobile") }, "token"),
            (body("13800000000", "fax"), "type"),
            (body("not-an-email", "email"), "id"),
        ];

        for (body, field) in cases {
            let response = post(app.clone(), &body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{field}");

            let error: ResponseError = json(response).await;
            assert_eq!(error.code, "ErrRegister");
            assert_eq!(error.field.as_deref(), Some(field));
        }
    }

    #[tokio::test]
    async fn test_type_key_on_the_wire() {
        let raw = r#"{"id":"lin@example.com","type":"email","pwd":"p","code":"1","token":"t"}"#;
        let body: Body = serde_json::from_str(raw).unwrap();
        assert_eq!(body.kind, "email");
    }
}
