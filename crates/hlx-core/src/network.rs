//! Network selector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which exchange deployment a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    /// Map the `isTestnet` input flag.
    pub fn from_is_testnet(is_testnet: bool) -> Self {
        if is_testnet {
            Self::Testnet
        } else {
            Self::Mainnet
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Testnet => write!(f, "TESTNET"),
            Self::Mainnet => write!(f, "MAINNET"),
        }
    }
}
