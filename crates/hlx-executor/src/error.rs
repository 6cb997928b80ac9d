//! Executor error types.
//!
//! Variants map one-to-one onto the failure kinds reported in the
//! `{"status":"error"}` envelope. Messages never carry secret material.

use hlx_core::CoreError;
use hlx_registry::RegistryError;
use thiserror::Error;

use crate::identity::KeyError;
use crate::signer::SignerError;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Empty or malformed input document.
    #[error("{0}")]
    Input(String),

    /// Missing or unusable signing credentials.
    #[error("{0}")]
    Configuration(String),

    /// Missing or invalid request field.
    #[error("{0}")]
    Validation(String),

    /// Reference price unavailable for the requested asset.
    #[error("{0}")]
    MarketData(String),

    /// Unrecognized `action` value.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Failure surfaced by the exchange client.
    #[error("{0}")]
    Exchange(String),
}

impl ExecutorError {
    /// Stable kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "InputError",
            Self::Configuration(_) => "ConfigurationError",
            Self::Validation(_) => "ValidationError",
            Self::MarketData(_) => "MarketDataError",
            Self::UnknownAction(_) => "UnknownActionError",
            Self::Exchange(_) => "ExchangeError",
        }
    }
}

impl From<CoreError> for ExecutorError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::UnknownAction(action) => Self::UnknownAction(action),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<KeyError> for ExecutorError {
    fn from(e: KeyError) -> Self {
        Self::Configuration(e.to_string())
    }
}

impl From<SignerError> for ExecutorError {
    fn from(e: SignerError) -> Self {
        Self::Exchange(e.to_string())
    }
}

impl From<RegistryError> for ExecutorError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::AssetNotFound(asset) => Self::Validation(format!("asset not found: {asset}")),
            other => Self::Exchange(other.to_string()),
        }
    }
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
