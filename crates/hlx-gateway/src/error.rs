//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Executor error: {0}")]
    Executor(#[from] hlx_executor::ExecutorError),
}

pub type AppResult<T> = Result<T, AppError>;
