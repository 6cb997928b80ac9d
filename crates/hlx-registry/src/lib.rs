//! Info endpoint access for hlx.
//!
//! Read-only queries against the exchange's public `/info` endpoint:
//! mid prices, the perp asset universe, clearinghouse state and open orders.
//! Also owns the network -> base URL mapping ([`Endpoints`]).

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{find_asset_index, parse_all_mids, InfoClient};
pub use endpoints::{Endpoints, MAINNET_API_URL, TESTNET_API_URL};
pub use error::{RegistryError, RegistryResult};
