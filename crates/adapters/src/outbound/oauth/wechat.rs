//! WeChat web/app OAuth.

use application::dto::FederatedPayload;
use async_trait::async_trait;
use domain::auth::provider::FederatedProvider;
use domain::credential::ExternalProfile;
use serde::Deserialize;
use url::Url;

use super::{IdentityProvider, OAuthError};

pub(super) fn default_api_url() -> String {
    "https://api.weixin.qq.com".into()
}

/// Credentials of a WeChat application.
#[derive(Debug, Clone, Deserialize)]
pub struct WeChatConfig {
    pub app_id: String,
    pub secret: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

/// Error fields WeChat adds to any failed response.
#[derive(Debug, Default, Deserialize)]
pub(super) struct WeChatStatus {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

impl WeChatStatus {
    pub fn check(&self, provider: FederatedProvider) -> Result<(), OAuthError> {
        if self.errcode == 0 {
            return Ok(());
        }

        Err(OAuthError::Provider {
            provider,
            code: self.errcode.to_string(),
            message: self.errmsg.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    #[serde(flatten)]
    status: WeChatStatus,
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    openid: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    #[serde(flatten)]
    status: WeChatStatus,
    #[serde(default)]
    openid: String,
    #[serde(default)]
    unionid: Option<String>,
    #[serde(default)]
    nickname: String,
    #[serde(default)]
    sex: i32,
}

/// WeChat OAuth 2.0: code → access token → user info.
pub struct WeChatOAuth {
    config: WeChatConfig,
    client: reqwest::Client,
}

impl WeChatOAuth {
    pub fn new(config: WeChatConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl IdentityProvider for WeChatOAuth {
    fn provider(&self) -> FederatedProvider {
        FederatedProvider::WeChat
    }

    async fn exchange(
        &self,
        payload: &FederatedPayload,
    ) -> Result<ExternalProfile, OAuthError> {
        let token: AccessTokenResponse = self
            .client
            .get(Url::parse(&self.config.api_url)?.join("sns/oauth2/access_token")?)
            .query(&[
                ("appid", self.config.app_id.as_str()),
                ("secret", self.config.secret.as_str()),
                ("code", payload.code.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        token.status.check(self.provider())?;

        if token.access_token.is_empty() || token.openid.is_empty() {
            return Err(OAuthError::Malformed(
                "access token response without token or openid".into(),
            ));
        }

        let info: UserInfoResponse = self
            .client
            .get(Url::parse(&self.config.api_url)?.join("sns/userinfo")?)
            .query(&[
                ("access_token", token.access_token.as_str()),
                ("openid", token.openid.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info.status.check(self.provider())?;

        Ok(ExternalProfile {
            provider: self.provider(),
            open_id: if info.openid.is_empty() {
                token.openid
            } else {
                info.openid
            },
            union_id: info.unionid,
            name: info.nickname,
            gender: info.sex,
        })
    }
}
