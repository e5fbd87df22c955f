//! Configuration manager for popy.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use adapters::outbound::oauth::{AlipayConfig, MiniProgramConfig, WeChatConfig};
use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Domain name of current instance. Used as token issuer.
    pub url: String,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to JsonWebToken configuration.
    #[serde(skip_serializing)]
    pub token: Option<Token>,
    /// Related to PostgreSQL configuration. Accounts are kept in memory
    /// without it.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to Argon2 configuration.
    #[serde(skip_serializing)]
    pub argon2: Option<Argon2>,
    /// Identity providers allowed to log users in.
    #[serde(default, skip_serializing)]
    pub oauth: OAuth,
    #[serde(default, skip_serializing)]
    pub timeouts: Timeouts,
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Argon2 {
    /// Memory used while hashing, in KiB.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
        }
    }
}

/// Json Web Token configuration.
///
/// An ES256 key pair wins over `secret`.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Token {
    pub public_key_pem: Option<String>,
    pub private_key_pem: Option<String>,
    /// HS256 shared secret.
    pub secret: Option<String>,
    /// Token lifetime, in seconds.
    pub expires_in: Option<u64>,
}

/// Identity providers configuration.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OAuth {
    pub wechat: Option<WeChatConfig>,
    pub wechat_miniprogram: Option<MiniProgramConfig>,
    pub alipay: Option<AlipayConfig>,
}

/// Upper bounds on outbound calls, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_persistence_timeout")]
    pub persistence: u64,
    #[serde(default = "default_resolution_timeout")]
    pub resolution: u64,
}

fn default_persistence_timeout() -> u64 {
    5
}

fn default_resolution_timeout() -> u64 {
    10
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            persistence: default_persistence_timeout(),
            resolution: default_resolution_timeout(),
        }
    }
}

impl From<Timeouts> for application::usecases::Timeouts {
    fn from(timeouts: Timeouts) -> Self {
        Self {
            persistence: Duration::from_secs(timeouts.persistence),
            resolution: Duration::from_secs(timeouts.resolution),
        }
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Running version, set once the file is read.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.to_string())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(file_path) {
            Ok(file) => match serde_yaml::from_reader(file) {
                Ok(config) => self.finish(config).map(Arc::new),
                Err(err) => Ok(Arc::new(self.error(err))),
            },
            Err(err) => Ok(Arc::new(self.error(err))),
        }
    }

    fn finish(&self, mut config: Configuration) -> Result<Self, url::ParseError> {
        config.version = VERSION.to_owned();
        config.path = self.path.clone();
        if !config.url.is_empty() {
            config.url = self.normalize_url(&config.url)?;
        }

        Ok(config)
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found or invalid, using defaults");
        Self {
            version: VERSION.to_owned(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: popy
url: accounts.example.com
token:
  secret: changeme
oauth:
  wechat:
    app_id: wx123
    secret: s3cr3t
timeouts:
  resolution: 3
"#;

    #[test]
    fn test_sections() {
        let config: Configuration = serde_yaml::from_str(YAML).unwrap();

        assert_eq!(config.name, "popy");
        assert!(config.postgres.is_none());
        assert_eq!(config.token.unwrap().secret.as_deref(), Some("changeme"));

        let wechat = config.oauth.wechat.unwrap();
        assert_eq!(wechat.app_id, "wx123");
        assert_eq!(wechat.api_url, "https://api.weixin.qq.com");
        assert!(config.oauth.alipay.is_none());

        assert_eq!(config.timeouts.resolution, 3);
        assert_eq!(config.timeouts.persistence, 5);
    }

    #[test]
    fn test_read_normalizes_url() {
        let path = std::env::temp_dir().join("popy-config-test.yaml");
        std::fs::write(&path, YAML).unwrap();

        let config = Configuration::default().path(path.clone()).read().unwrap();
        std::fs::remove_file(path).unwrap();

        assert_eq!(config.url, "https://accounts.example.com/");
        assert_eq!(config.version(), VERSION);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Configuration::default()
            .path(PathBuf::from("/nonexistent/popy.yaml"))
            .read()
            .unwrap();

        assert!(config.name.is_empty());
        assert!(config.token.is_none());
        assert_eq!(config.version(), VERSION);
    }

    #[test]
    fn test_timeouts_conversion() {
        let timeouts: application::usecases::Timeouts = Timeouts::default().into();
        assert_eq!(timeouts, application::usecases::Timeouts::default());
    }
}
