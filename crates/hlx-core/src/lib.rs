//! Core domain types for the hlx order gateway.
//!
//! This crate provides the types shared by every other crate:
//! - `Price`, `Size`: Precision-safe numeric types
//! - `OrderSide`, `OrderKind`, `TimeInForce`: Trading enums
//! - `Network`: Testnet / mainnet selector
//! - `RawRequest` and the typed requests parsed from it
//! - `ResolvedOrder`: The concrete order handed to the exchange client

pub mod decimal;
pub mod error;
pub mod network;
pub mod order;
pub mod request;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use network::Network;
pub use order::{OrderKind, OrderSide, ResolvedOrder, TimeInForce};
pub use request::{
    ActionKind, CancelRequest, Credentials, OrderRequest, QueryRequest, RawRequest,
};
