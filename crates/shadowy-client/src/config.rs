//! Client configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use shadowy_core::constants::{DEFAULT_NODE_URL, DEFAULT_TIMEOUT_SECS};

use crate::error::ClientError;

pub const ENV_NODE_URL: &str = "SHADOWY_NODE_URL";
pub const ENV_API_KEY: &str = "SHADOWY_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "SHADOWY_TIMEOUT_SECS";
pub const ENV_WALLET_DIR: &str = "SHADOWY_WALLET_DIR";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Node API base URL, including the `/api/v1` prefix.
    pub base_url: String,
    /// Bearer token sent with every request when set.
    pub api_key: Option<String>,
    /// Per-request timeout applied by the transport.
    pub timeout: Duration,
    /// Directory holding wallet files.
    pub wallet_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NODE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            wallet_dir: default_wallet_dir(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let defaults = Self::default();

        let base_url = lookup(ENV_NODE_URL)
            .map(|url| normalize_base_url(&url))
            .unwrap_or(defaults.base_url);

        let api_key = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty());

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ClientError::Config(format!("{ENV_TIMEOUT_SECS} must be a positive integer"))
                })?;
                if secs == 0 {
                    return Err(ClientError::Config(format!(
                        "{ENV_TIMEOUT_SECS} must be a positive integer"
                    )));
                }
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        let wallet_dir = lookup(ENV_WALLET_DIR)
            .map(PathBuf::from)
            .unwrap_or(defaults.wallet_dir);

        Ok(Self {
            base_url,
            api_key,
            timeout,
            wallet_dir,
        })
    }

    /// Full URL for an API path such as `/health`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Default wallet directory: `~/.shadowy`.
pub fn default_wallet_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".shadowy")
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8080/api/v1");
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.wallet_dir.ends_with(".shadowy"));
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn overrides_from_environment() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_NODE_URL, "https://node.example/api/v1/"),
            (ENV_API_KEY, "secret"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_WALLET_DIR, "/tmp/wallets"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://node.example/api/v1");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.wallet_dir, PathBuf::from("/tmp/wallets"));
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_API_KEY, "  ")])).unwrap();
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn bad_timeout_is_config_error() {
        for raw in ["abc", "0", "-1"] {
            let err = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, raw)])).unwrap_err();
            assert!(matches!(err, ClientError::Config(_)), "accepted {raw}");
        }
    }

    #[test]
    fn endpoint_joins_path() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint("/health"), "http://127.0.0.1:8080/api/v1/health");
    }
}
