//! Order execution core for the hlx gateway.
//!
//! Turns one request document into one exchange call and wraps the outcome
//! in a [`ResultEnvelope`].
//!
//! # Key Components
//!
//! - [`resolve_identity`]: Credentials -> [`Identity`] (direct or API wallet)
//! - [`MarketData`]: Mid-price lookup for an asset
//! - [`PricePolicy`]: Slippage, tick rounding and time-in-force derivation
//! - [`order_builder`]: Validation and assembly of the [`ResolvedOrder`](hlx_core::ResolvedOrder)
//! - [`Dispatcher`]: Routes `order` / `cancel` / `positions` / `open_orders`
//! - [`ExchangeClient`]: Exchange seam; [`HttpExchangeClient`] in production,
//!   [`MockExchangeClient`] in tests
//! - [`signer`]: L1 action hashing and EIP-712 signing
//!
//! # Order flow (in `Dispatcher::dispatch`)
//!
//! 1. Parse document -> InputError
//! 2. Classify action -> UnknownActionError
//! 3. Resolve identity -> ConfigurationError
//! 4. Validate asset / size -> ValidationError
//! 5. Fetch mid if needed -> MarketDataError
//! 6. Round price, derive TIF, build order
//! 7. `place_order` -> native response or ExchangeError

pub mod client;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod http;
pub mod identity;
pub mod market_data;
pub mod nonce;
pub mod order_builder;
pub mod price_policy;
pub mod signer;

// Exchange seam
pub use client::{BoxFuture, ExchangeClient, MockCall, MockExchangeClient};
pub use http::HttpExchangeClient;

// Dispatch
pub use dispatcher::Dispatcher;
pub use envelope::ResultEnvelope;

// Error types
pub use error::{ExecutorError, ExecutorResult};

// Identity
pub use identity::{resolve_identity, Identity, IdentityMode, KeyError};

// Pricing and order assembly
pub use market_data::MarketData;
pub use order_builder::OrderSubmission;
pub use price_policy::{PricePolicy, ResolvedPricing};

// Signing
pub use nonce::{Clock, FixedClock, NonceManager, SystemClock};
pub use signer::{sign_l1_action, Action, ActionSignature, SignerError};
