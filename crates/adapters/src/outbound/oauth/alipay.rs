//! Alipay OAuth through the RSA2-signed open gateway.
//!
//! Response signatures are not verified: responses arrive over TLS from the
//! configured gateway.

use std::collections::BTreeMap;

use application::dto::FederatedPayload;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{FixedOffset, Utc};
use domain::auth::provider::FederatedProvider;
use domain::credential::ExternalProfile;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;

use super::{IdentityProvider, OAuthError};

const SUCCESS_CODE: &str = "10000";
/// Gateway timestamps are China Standard Time.
const GATEWAY_UTC_OFFSET: i32 = 8 * 60 * 60;

fn default_gateway_url() -> String {
    "https://openapi.alipay.com/gateway.do".into()
}

/// Credentials of an Alipay application.
#[derive(Debug, Clone, Deserialize)]
pub struct AlipayConfig {
    pub app_id: String,
    /// Application private key, PKCS#1 or PKCS#8 PEM.
    pub private_key_pem: String,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    sub_code: Option<String>,
    #[serde(default)]
    sub_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    open_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    #[serde(default)]
    nick_name: String,
    #[serde(default)]
    gender: String,
}

/// Alipay OAuth: `auth_code` → `alipay.system.oauth.token` →
/// `alipay.user.info.share`.
pub struct AlipayOAuth {
    config: AlipayConfig,
    signing_key: SigningKey<Sha256>,
    client: reqwest::Client,
}

impl AlipayOAuth {
    pub fn new(
        config: AlipayConfig,
        client: reqwest::Client,
    ) -> Result<Self, OAuthError> {
        let pem = config.private_key_pem.as_str();
        let private_key = if pem.contains("BEGIN RSA PRIVATE KEY") {
            // Means it is PKCS#1.
            RsaPrivateKey::from_pkcs1_pem(pem)
                .map_err(|err| OAuthError::Config(err.to_string()))?
        } else {
            RsaPrivateKey::from_pkcs8_pem(pem)
                .map_err(|err| OAuthError::Config(err.to_string()))?
        };

        Ok(Self {
            config,
            signing_key: SigningKey::<Sha256>::new(private_key),
            client,
        })
    }

    /// RSA2 signature of `params`.
    fn sign(&self, params: &BTreeMap<&str, String>) -> Result<String, OAuthError> {
        let signature = self
            .signing_key
            .try_sign(signing_content(params).as_bytes())
            .map_err(|err| OAuthError::Config(err.to_string()))?;

        Ok(STANDARD.encode(signature.to_bytes()))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        business: &[(&'static str, &str)],
    ) -> Result<T, OAuthError> {
        let offset = FixedOffset::east_opt(GATEWAY_UTC_OFFSET)
            .ok_or_else(|| OAuthError::Config("invalid gateway offset".into()))?;
        let timestamp = Utc::now()
            .with_timezone(&offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        let mut params = BTreeMap::from([
            ("app_id", self.config.app_id.clone()),
            ("method", method.to_owned()),
            ("format", "JSON".to_owned()),
            ("charset", "utf-8".to_owned()),
            ("sign_type", "RSA2".to_owned()),
            ("timestamp", timestamp),
            ("version", "1.0".to_owned()),
        ]);
        params.extend(business.iter().map(|(k, v)| (*k, (*v).to_owned())));
        let sign = self.sign(&params)?;
        params.insert("sign", sign);

        let body: serde_json::Value = self
            .client
            .post(self.config.gateway_url.as_str())
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = body.get("error_response") {
            return Err(gateway_error(serde_json::from_value(error.clone())?));
        }

        let key = format!("{}_response", method.replace('.', "_"));
        let node = body
            .get(&key)
            .ok_or_else(|| OAuthError::Malformed(format!("missing `{key}`")))?;

        if let Some(code) = node.get("code").and_then(serde_json::Value::as_str) {
            if code != SUCCESS_CODE {
                return Err(gateway_error(serde_json::from_value(node.clone())?));
            }
        }

        Ok(serde_json::from_value(node.clone())?)
    }
}

/// Sorted `key=value` pairs joined by `&`, without `sign` and empty
/// values.
fn signing_content(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .filter(|(key, value)| **key != "sign" && !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn gateway_error(error: GatewayError) -> OAuthError {
    OAuthError::Provider {
        provider: FederatedProvider::Alipay,
        code: error.sub_code.unwrap_or(error.code),
        message: error.sub_msg.unwrap_or(error.msg),
    }
}

fn gender_code(gender: &str) -> i32 {
    match gender {
        "M" | "m" => 1,
        "F" | "f" => 2,
        _ => 0,
    }
}

#[async_trait]
impl IdentityProvider for AlipayOAuth {
    fn provider(&self) -> FederatedProvider {
        FederatedProvider::Alipay
    }

    async fn exchange(
        &self,
        payload: &FederatedPayload,
    ) -> Result<ExternalProfile, OAuthError> {
        let token: OAuthTokenResponse = self
            .call(
                "alipay.system.oauth.token",
                &[
                    ("grant_type", "authorization_code"),
                    ("code", payload.code.as_str()),
                ],
            )
            .await?;

        let open_id = token
            .user_id
            .or(token.open_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| OAuthError::Malformed("token without user id".into()))?;

        let info: UserInfoResponse = self
            .call(
                "alipay.user.info.share",
                &[("auth_token", token.access_token.as_str())],
            )
            .await?;

        Ok(ExternalProfile {
            provider: self.provider(),
            open_id,
            union_id: None,
            name: info.nick_name,
            gender: gender_code(&info.gender),
        })
    }
}

#[cfg(test)]
mod tests {
    use rsa::RsaPublicKey;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::pkcs8::DecodePublicKey;
    use rsa::signature::Verifier;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const PRIVATE_KEY: &str = include_str!("../../../tests/fixtures/rsa_private.pem");
    const PUBLIC_KEY: &str = include_str!("../../../tests/fixtures/rsa_public.pem");

    fn client(gateway_url: String) -> AlipayOAuth {
        AlipayOAuth::new(
            AlipayConfig {
                app_id: "2021000000000000".into(),
                private_key_pem: PRIVATE_KEY.into(),
                gateway_url,
            },
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_signing_content() {
        let params = BTreeMap::from([
            ("method", "alipay.user.info.share".to_owned()),
            ("app_id", "2021".to_owned()),
            ("sign", "ignored".to_owned()),
            ("biz_content", String::new()),
        ]);
        assert_eq!(
            signing_content(&params),
            "app_id=2021&method=alipay.user.info.share"
        );
    }

    #[test]
    fn test_signature_verifies() {
        let alipay = client(default_gateway_url());
        let params = BTreeMap::from([
            ("app_id", "2021".to_owned()),
            ("code", "auth".to_owned()),
        ]);
        let sign = alipay.sign(&params).unwrap();

        let public_key = RsaPublicKey::from_public_key_pem(PUBLIC_KEY).unwrap();
        let signature =
            Signature::try_from(STANDARD.decode(sign).unwrap().as_slice()).unwrap();
        VerifyingKey::<Sha256>::new(public_key)
            .verify(signing_content(&params).as_bytes(), &signature)
            .unwrap();
    }

    #[test]
    fn test_rejects_invalid_key() {
        let config = AlipayConfig {
            app_id: "2021".into(),
            private_key_pem: "garbage".into(),
            gateway_url: default_gateway_url(),
        };
        assert!(AlipayOAuth::new(config, reqwest::Client::new()).is_err());
    }

    #[test]
    fn test_gender_code() {
        assert_eq!(gender_code("M"), 1);
        assert_eq!(gender_code("F"), 2);
        assert_eq!(gender_code(""), 0);
    }

    #[tokio::test]
    async fn test_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gateway.do"))
            .and(body_string_contains("method=alipay.system.oauth.token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "alipay_system_oauth_token_response": {
                    "user_id": "2088102150477652",
                    "access_token": "authusrB",
                    "expires_in": 3600
                },
                "sign": "unchecked"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/gateway.do"))
            .and(body_string_contains("method=alipay.user.info.share"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "alipay_user_info_share_response": {
                    "code": "10000",
                    "msg": "Success",
                    "user_id": "2088102150477652",
                    "nick_name": "popy",
                    "gender": "F"
                },
                "sign": "unchecked"
            })))
            .mount(&server)
            .await;

        let profile = client(format!("{}/gateway.do", server.uri()))
            .exchange(&FederatedPayload {
                code: "auth-code".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(profile.provider, FederatedProvider::Alipay);
        assert_eq!(profile.open_id, "2088102150477652");
        assert_eq!(profile.name, "popy");
        assert_eq!(profile.gender, 2);
    }

    #[tokio::test]
    async fn test_gateway_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gateway.do"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error_response": {
                    "code": "40002",
                    "msg": "Invalid Arguments",
                    "sub_code": "isv.code-invalid",
                    "sub_msg": "auth code is invalid"
                },
                "sign": "unchecked"
            })))
            .mount(&server)
            .await;

        let err = client(format!("{}/gateway.do", server.uri()))
            .exchange(&FederatedPayload {
                code: "stale".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err, OAuthError::Provider { ref code, .. } if code == "isv.code-invalid")
        );
    }
}
