//! Network -> base URL mapping.

use hlx_core::Network;

pub const MAINNET_API_URL: &str = "https://api.hyperliquid.xyz";
pub const TESTNET_API_URL: &str = "https://api.hyperliquid-testnet.xyz";

/// Base URLs for both networks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub mainnet_url: String,
    pub testnet_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            mainnet_url: MAINNET_API_URL.to_string(),
            testnet_url: TESTNET_API_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn new(mainnet_url: impl Into<String>, testnet_url: impl Into<String>) -> Self {
        Self {
            mainnet_url: mainnet_url.into(),
            testnet_url: testnet_url.into(),
        }
    }

    pub fn base_url(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mainnet_url,
            Network::Testnet => &self.testnet_url,
        }
    }

    pub fn info_url(&self, network: Network) -> String {
        format!("{}/info", self.base_url(network).trim_end_matches('/'))
    }

    pub fn exchange_url(&self, network: Network) -> String {
        format!("{}/exchange", self.base_url(network).trim_end_matches('/'))
    }
}
