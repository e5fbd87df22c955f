use application::dto::{AuthRequestDto, FederatedPayload};
use application::ports::inbound::Authenticate;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{Operation, Result, ServerError};
use crate::router::model::UserResponse;

/// `POST /auth` body. `id` and `pwd` are read for `normal`, the other fields
/// for identity providers.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pwd: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
}

impl From<Body> for AuthRequestDto {
    fn from(body: Body) -> Self {
        Self {
            provider: body.provider,
            id: body.id,
            password: body.pwd,
            federated: FederatedPayload {
                code: body.code,
                encrypted_data: body.encrypted_data,
                iv: body.iv,
            },
        }
    }
}

/// Handler to log a user in.
pub async fn handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Body>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let Json(body) = body.map_err(|err| ServerError::body(Operation::Auth, err))?;

    let user = state
        .orchestrator
        .authenticate(body.into())
        .await
        .map_err(ServerError::auth)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResponseError;
    use crate::router::register;
    use crate::router::tests::{ISSUER, json, state};
    use crate::*;
    use adapters::outbound::jwt::JwtTokenSigner;
    use application::ports::outbound::TokenSigner;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn sign_up(app: Router, id: &str, kind: &str, pwd: &str) {
        let body = register::Body {
            id: id.into(),
            kind: kind.into(),
            pwd: pwd.into(),
            code: "123456".into(),
            token: "sms-token".into(),
        };
        let response =
            make_request(app, Method::POST, "/users", json!(body).to_string()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    fn local(id: &str, pwd: &str) -> String {
        json!(Body {
            provider: "normal".into(),
            id: id.into(),
            pwd: pwd.into(),
            ..Default::default()
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_local_login() {
        let (_, state) = state();
        let app = app(state);
        sign_up(app.clone(), "13800000000", "mobile", "S3cure!pass").await;

        let response = make_request(
            app,
            Method::POST,
            "/auth",
            local("13800000000", "S3cure!pass"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(raw.get("pwd").is_none());
        assert!(raw.get("password").is_none());

        let user: UserResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(user.mobile.as_deref(), Some("13800000000"));
        assert_eq!(user.role.name, "User");

        let claims = JwtTokenSigner::hs256(ISSUER, router::tests::SECRET)
            .verify(&user.token)
            .unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.iss, ISSUER);
    }

    #[tokio::test]
    async fn test_wrong_password_looks_like_unknown_account() {
        let (_, state) = state();
        let app = app(state);
        sign_up(app.clone(), "lin@example.com", "email", "S3cure!pass").await;

        let wrong = make_request(
            app.clone(),
            Method::POST,
            "/auth",
            local("lin@example.com", "nope"),
        )
        .await;
        let unknown = make_request(
            app,
            Method::POST,
            "/auth",
            local("nobody@example.com", "S3cure!pass"),
        )
        .await;

        assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
        let wrong: ResponseError = json(wrong).await;
        let unknown: ResponseError = json(unknown).await;
        assert_eq!(wrong, unknown);
        assert_eq!(wrong.code, "ErrAuth");
    }

    #[tokio::test]
    async fn test_federated_login_provisions_once() {
        let (store, state) = state();
        let app = app(state);
        let body = json!({"provider": "wechat", "code": "o-wechat-1"}).to_string();

        let first: UserResponse = json(
            make_request(app.clone(), Method::POST, "/auth", body.clone()).await,
        )
        .await;
        let second: UserResponse =
            json(make_request(app, Method::POST, "/auth", body).await).await;

        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "Lin");
        assert_eq!(first.gender, 2);
        assert_eq!(
            first.credential.wechat.map(|blob| blob.open_id).as_deref(),
            Some("o-wechat-1")
        );
        assert_eq!(store.users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let (store, state) = state();
        let response = make_request(
            app(state),
            Method::POST,
            "/auth",
            json!({"provider": "wechat", "code": "expired"}).to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ResponseError = json(response).await;
        assert_eq!(body.code, "ErrAuth");
        assert!(store.users().await.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_providers() {
        let (_, state) = state();
        let app = app(state);

        for provider in ["github", "alipay", ""] {
            let response = make_request(
                app.clone(),
                Method::POST,
                "/auth",
                json!({"provider": provider, "code": "c"}).to_string(),
            )
            .await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{provider}");
            let body: ResponseError = json(response).await;
            assert!(body.message.contains("unsupported provider"), "{provider}");
        }
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (_, state) = state();
        let response =
            make_request(app(state), Method::POST, "/auth", "{\"provider\":".into())
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ResponseError = json(response).await;
        assert_eq!(body.code, "ErrAuth");
    }
}
