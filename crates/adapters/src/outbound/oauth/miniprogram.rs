//! WeChat mini program login.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, KeyIvInit};
use application::dto::FederatedPayload;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use domain::auth::provider::FederatedProvider;
use domain::credential::ExternalProfile;
use serde::Deserialize;
use url::Url;

use super::wechat::{WeChatStatus, default_api_url};
use super::{IdentityProvider, OAuthError};

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Credentials of a WeChat mini program.
#[derive(Debug, Clone, Deserialize)]
pub struct MiniProgramConfig {
    pub app_id: String,
    pub secret: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(flatten)]
    status: WeChatStatus,
    #[serde(default)]
    openid: String,
    #[serde(default)]
    unionid: Option<String>,
    #[serde(default)]
    session_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserData {
    #[serde(default)]
    open_id: String,
    #[serde(default)]
    union_id: Option<String>,
    #[serde(default)]
    nick_name: String,
    #[serde(default)]
    gender: i32,
    watermark: Watermark,
}

#[derive(Debug, Deserialize)]
struct Watermark {
    appid: String,
}

/// Mini program login: `js_code` → session, then optional decryption of the
/// user profile with the session key.
pub struct WeChatMiniProgram {
    config: MiniProgramConfig,
    client: reqwest::Client,
}

impl WeChatMiniProgram {
    pub fn new(config: MiniProgramConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Decrypt `encrypted_data` (AES-128-CBC, PKCS#7) and check it was
    /// produced for this mini program.
    fn decrypt(
        &self,
        session_key: &str,
        encrypted_data: &str,
        iv: &str,
    ) -> Result<UserData, OAuthError> {
        let decode = |value: &str, name: &str| {
            STANDARD
                .decode(value)
                .map_err(|err| OAuthError::Decryption(format!("{name}: {err}")))
        };
        let key = decode(session_key, "session_key")?;
        let iv = decode(iv, "iv")?;
        let data = decode(encrypted_data, "encrypted_data")?;

        let plaintext = Aes128CbcDec::new_from_slices(&key, &iv)
            .map_err(|err| OAuthError::Decryption(err.to_string()))?
            .decrypt_padded_vec_mut::<Pkcs7>(&data)
            .map_err(|err| OAuthError::Decryption(err.to_string()))?;

        let user: UserData = serde_json::from_slice(&plaintext)?;
        if user.watermark.appid != self.config.app_id {
            return Err(OAuthError::Decryption(
                "watermark belongs to another application".into(),
            ));
        }

        Ok(user)
    }
}

#[async_trait]
impl IdentityProvider for WeChatMiniProgram {
    fn provider(&self) -> FederatedProvider {
        FederatedProvider::WeChatMiniProgram
    }

    async fn exchange(
        &self,
        payload: &FederatedPayload,
    ) -> Result<ExternalProfile, OAuthError> {
        let session: SessionResponse = self
            .client
            .get(Url::parse(&self.config.api_url)?.join("sns/jscode2session")?)
            .query(&[
                ("appid", self.config.app_id.as_str()),
                ("secret", self.config.secret.as_str()),
                ("js_code", payload.code.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        session.status.check(self.provider())?;

        if session.openid.is_empty() {
            return Err(OAuthError::Malformed("session without openid".into()));
        }

        let mut profile = ExternalProfile {
            provider: self.provider(),
            open_id: session.openid,
            union_id: session.unionid,
            name: String::new(),
            gender: 0,
        };

        if let (Some(encrypted_data), Some(iv)) = (&payload.encrypted_data, &payload.iv) {
            let user = self.decrypt(&session.session_key, encrypted_data, iv)?;
            if !user.open_id.is_empty() && user.open_id != profile.open_id {
                return Err(OAuthError::Decryption(
                    "user data belongs to another openid".into(),
                ));
            }

            profile.name = user.nick_name;
            profile.gender = user.gender;
            if profile.union_id.is_none() {
                profile.union_id = user.union_id;
            }
        }

        Ok(profile)
    }
}
