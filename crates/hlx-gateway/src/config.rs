//! Gateway configuration.

use std::path::Path;
use std::time::Duration;

use hlx_executor::PricePolicy;
use hlx_registry::{Endpoints, MAINNET_API_URL, TESTNET_API_URL};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "HLX_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL for `isTestnet = false`.
    #[serde(default = "default_mainnet_url")]
    pub mainnet_url: String,
    /// Base URL for `isTestnet = true`.
    #[serde(default = "default_testnet_url")]
    pub testnet_url: String,
    /// Per-request HTTP timeout (ms). Default: 10,000.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub price_policy: PricePolicy,
}

fn default_mainnet_url() -> String {
    MAINNET_API_URL.to_string()
}

fn default_testnet_url() -> String {
    TESTNET_API_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mainnet_url: default_mainnet_url(),
            testnet_url: default_testnet_url(),
            request_timeout_ms: default_request_timeout_ms(),
            price_policy: PricePolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// Resolve and load: explicit path > `HLX_CONFIG` > built-in defaults.
    pub fn load(explicit: Option<&str>) -> AppResult<Self> {
        let path = explicit
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_ENV).ok().filter(|p| !p.is_empty()));

        match path {
            Some(path) => Self::from_file(&path),
            None => {
                tracing::debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        for (name, url) in [("mainnet_url", &self.mainnet_url), ("testnet_url", &self.testnet_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.request_timeout_ms == 0 {
            return Err(AppError::Config(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        self.price_policy.validate().map_err(AppError::Config)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.mainnet_url, &self.testnet_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
