//! Per-provider linkage data.
//!
//! A [`Credential`] keeps one blob per provider family. Lookups never read
//! the blobs: they go through [`IdentityKey`]s, which adapters index
//! separately.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::provider::FederatedProvider;

/// Identifiers a provider issued for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredential {
    pub open_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub union_id: Option<String>,
}

impl From<&ExternalProfile> for OAuthCredential {
    fn from(profile: &ExternalProfile) -> Self {
        let identity = profile.identity();
        Self {
            open_id: identity.open_id,
            union_id: identity.union_id,
        }
    }
}

/// Credential record owned by exactly one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub wechat: Option<OAuthCredential>,
    pub wechat_miniprogram: Option<OAuthCredential>,
    pub alipay: Option<OAuthCredential>,
}

impl Credential {
    /// Credential without any provider blob, for local accounts.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Credential holding a single provider blob.
    pub fn for_provider(
        id: impl Into<String>,
        provider: FederatedProvider,
        blob: OAuthCredential,
    ) -> Self {
        let mut credential = Self::empty(id);
        *credential.slot_mut(provider) = Some(blob);
        credential
    }

    /// Blob stored for `provider`.
    pub fn blob(&self, provider: FederatedProvider) -> Option<&OAuthCredential> {
        match provider {
            FederatedProvider::WeChat => self.wechat.as_ref(),
            FederatedProvider::WeChatMiniProgram => {
                self.wechat_miniprogram.as_ref()
            },
            FederatedProvider::Alipay => self.alipay.as_ref(),
        }
    }

    fn slot_mut(
        &mut self,
        provider: FederatedProvider,
    ) -> &mut Option<OAuthCredential> {
        match provider {
            FederatedProvider::WeChat => &mut self.wechat,
            FederatedProvider::WeChatMiniProgram => &mut self.wechat_miniprogram,
            FederatedProvider::Alipay => &mut self.alipay,
        }
    }

    /// Index keys derived from every blob.
    pub fn identity_keys(&self) -> Vec<IdentityKey> {
        FederatedProvider::ALL
            .into_iter()
            .filter_map(|provider| {
                self.blob(provider).map(|blob| {
                    FederatedIdentity::new(
                        provider,
                        blob.open_id.clone(),
                        blob.union_id.clone(),
                    )
                })
            })
            .flat_map(|identity| identity.keys())
            .collect()
    }
}

/// Which provider-issued identifier a key holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityKind {
    Open,
    Union,
}

impl IdentityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Union => "union",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact-match lookup key for a federated identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub namespace: &'static str,
    pub kind: IdentityKind,
    pub external_id: String,
}

/// An external identity as seen by one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    pub provider: FederatedProvider,
    pub open_id: String,
    pub union_id: Option<String>,
}

impl FederatedIdentity {
    /// Empty union ids are treated as absent.
    pub fn new(
        provider: FederatedProvider,
        open_id: impl Into<String>,
        union_id: Option<String>,
    ) -> Self {
        Self {
            provider,
            open_id: open_id.into(),
            union_id: union_id.filter(|id| !id.is_empty()),
        }
    }

    /// Lookup keys, open id first.
    pub fn keys(&self) -> Vec<IdentityKey> {
        let mut keys = vec![IdentityKey {
            namespace: self.provider.tag(),
            kind: IdentityKind::Open,
            external_id: self.open_id.clone(),
        }];

        if let Some(union_id) = &self.union_id {
            keys.push(IdentityKey {
                namespace: self.provider.union_namespace(),
                kind: IdentityKind::Union,
                external_id: union_id.clone(),
            });
        }

        keys
    }
}

/// Normalized profile returned by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub provider: FederatedProvider,
    pub open_id: String,
    pub union_id: Option<String>,
    pub name: String,
    /// 0 unknown, 1 male, 2 female.
    pub gender: i32,
}

impl ExternalProfile {
    pub fn identity(&self) -> FederatedIdentity {
        FederatedIdentity::new(
            self.provider,
            self.open_id.clone(),
            self.union_id.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_credential_has_no_keys() {
        assert!(Credential::empty("c1").identity_keys().is_empty());
    }

    #[test]
    fn test_keys_use_provider_namespaces() {
        let identity = FederatedIdentity::new(
            FederatedProvider::WeChatMiniProgram,
            "open-1",
            Some("union-1".into()),
        );
        let keys = identity.keys();

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].namespace, "wechat_miniprogram");
        assert_eq!(keys[0].kind, IdentityKind::Open);
        assert_eq!(keys[1].namespace, "wechat");
        assert_eq!(keys[1].kind, IdentityKind::Union);
        assert_eq!(keys[1].external_id, "union-1");
    }

    #[test]
    fn test_blank_union_id_is_ignored() {
        let identity =
            FederatedIdentity::new(FederatedProvider::Alipay, "2088", Some(String::new()));
        assert_eq!(identity.union_id, None);
        assert_eq!(identity.keys().len(), 1);
    }

    #[test]
    fn test_blob_lands_in_provider_slot() {
        let credential = Credential::for_provider(
            "c1",
            FederatedProvider::Alipay,
            OAuthCredential {
                open_id: "2088".into(),
                union_id: None,
            },
        );

        assert!(credential.wechat.is_none());
        assert_eq!(
            credential.blob(FederatedProvider::Alipay).map(|b| b.open_id.as_str()),
            Some("2088")
        );
        assert_eq!(credential.identity_keys().len(), 1);
    }

    #[test]
    fn test_blob_serialization() {
        let blob = OAuthCredential {
            open_id: "o".into(),
            union_id: Some("u".into()),
        };
        assert_eq!(
            serde_json::to_value(&blob).unwrap(),
            serde_json::json!({"open_id": "o", "union_id": "u"})
        );
    }
}
