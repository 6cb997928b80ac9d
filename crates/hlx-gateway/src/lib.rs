//! hlx gateway: one JSON request on stdin, one JSON result on stdout.
//!
//! - [`GatewayConfig`]: Endpoints, timeout and price policy (TOML)
//! - [`Application`]: Exchange client + dispatcher wiring

pub mod app;
pub mod config;
pub mod error;

pub use app::{startup_failure, Application};
pub use config::{GatewayConfig, CONFIG_ENV};
pub use error::{AppError, AppResult};
