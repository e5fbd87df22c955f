//! Authentication providers.
//!
//! Providers form a closed set. Wire tags are parsed once, at the boundary,
//! and everything behind it matches on the enums.

use std::fmt;
use std::str::FromStr;

use crate::error::{DomainError, Result};

/// Wire tag selecting identifier/password authentication.
pub const LOCAL_TAG: &str = "normal";

/// External identity providers an account can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FederatedProvider {
    WeChat,
    WeChatMiniProgram,
    Alipay,
}

impl FederatedProvider {
    pub const ALL: [Self; 3] =
        [Self::WeChat, Self::WeChatMiniProgram, Self::Alipay];

    /// Wire tag, also the credential column and the open-id namespace.
    pub fn tag(self) -> &'static str {
        match self {
            Self::WeChat => "wechat",
            Self::WeChatMiniProgram => "wechat_miniprogram",
            Self::Alipay => "alipay",
        }
    }

    /// Namespace union ids live in. A union id is issued per organisation,
    /// so every WeChat application shares one.
    pub fn union_namespace(self) -> &'static str {
        match self {
            Self::WeChat | Self::WeChatMiniProgram => "wechat",
            Self::Alipay => "alipay",
        }
    }
}

impl FromStr for FederatedProvider {
    type Err = DomainError;

    fn from_str(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.tag() == tag)
            .ok_or_else(|| DomainError::UnsupportedProvider(tag.to_owned()))
    }
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Strategy selector carried by an authentication request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthProvider {
    Local,
    Federated(FederatedProvider),
}

impl AuthProvider {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Local => LOCAL_TAG,
            Self::Federated(provider) => provider.tag(),
        }
    }
}

impl FromStr for AuthProvider {
    type Err = DomainError;

    fn from_str(tag: &str) -> Result<Self> {
        if tag == LOCAL_TAG {
            Ok(Self::Local)
        } else {
            tag.parse().map(Self::Federated)
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
