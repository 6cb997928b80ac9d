//! Registry error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
