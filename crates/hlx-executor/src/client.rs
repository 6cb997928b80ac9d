//! Exchange client seam.
//!
//! The core consumes the exchange only through [`ExchangeClient`]. This
//! allows:
//! - Unit testing with [`MockExchangeClient`]
//! - Swapping the transport ([`crate::http::HttpExchangeClient`] in production)
//!
//! Calls are awaited one at a time by the dispatcher; implementations own
//! any timeout policy. None retries.

use std::collections::HashMap;
use std::pin::Pin;

use hlx_core::{Network, Price, ResolvedOrder};
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::error::{ExecutorError, ExecutorResult};
use crate::identity::Identity;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Exchange operations consumed by the dispatcher.
pub trait ExchangeClient: Send + Sync {
    /// Mid prices for every listed asset.
    fn all_mids(&self, network: Network) -> BoxFuture<'_, ExecutorResult<HashMap<String, Price>>>;

    /// Submit one order. Returns the exchange's native response.
    fn place_order<'a>(
        &'a self,
        identity: &'a Identity,
        order: &'a ResolvedOrder,
        network: Network,
    ) -> BoxFuture<'a, ExecutorResult<Value>>;

    /// Cancel one order by exchange order id. Returns the native response.
    fn cancel_order<'a>(
        &'a self,
        identity: &'a Identity,
        asset: &'a str,
        order_id: u64,
        network: Network,
    ) -> BoxFuture<'a, ExecutorResult<Value>>;

    /// Account and position state for an address.
    fn user_state<'a>(&'a self, address: &'a str, network: Network)
        -> BoxFuture<'a, ExecutorResult<Value>>;

    /// Resting orders for an address.
    fn open_orders<'a>(
        &'a self,
        address: &'a str,
        network: Network,
    ) -> BoxFuture<'a, ExecutorResult<Value>>;
}

/// One recorded call on [`MockExchangeClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    AllMids {
        network: Network,
    },
    PlaceOrder {
        account: String,
        signer: String,
        order: ResolvedOrder,
        network: Network,
    },
    CancelOrder {
        account: String,
        asset: String,
        order_id: u64,
        network: Network,
    },
    UserState {
        address: String,
        network: Network,
    },
    OpenOrders {
        address: String,
        network: Network,
    },
}

/// Mock exchange client for testing.
///
/// Records every call and answers from canned values.
#[derive(Debug)]
pub struct MockExchangeClient {
    calls: Mutex<Vec<MockCall>>,
    mids: Mutex<HashMap<String, Price>>,
    response: Mutex<Value>,
    failure: Mutex<Option<String>>,
}

impl Default for MockExchangeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExchangeClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            mids: Mutex::new(HashMap::new()),
            response: Mutex::new(json!({"status": "ok"})),
            failure: Mutex::new(None),
        }
    }

    /// Set the mid price served for `asset`.
    pub fn set_mid(&self, asset: &str, price: Price) {
        self.mids.lock().insert(asset.to_string(), price);
    }

    /// Set the native response returned by every non-mids call.
    pub fn set_response(&self, response: Value) {
        *self.response.lock() = response;
    }

    /// Make every call fail with `ExecutorError::Exchange(message)`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_string());
    }

    /// Get recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Placed orders, in call order.
    pub fn placed_orders(&self) -> Vec<ResolvedOrder> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                MockCall::PlaceOrder { order, .. } => Some(order.clone()),
                _ => None,
            })
            .collect()
    }

    fn answer(&self, call: MockCall) -> ExecutorResult<Value> {
        self.calls.lock().push(call);
        match self.failure.lock().as_ref() {
            Some(message) => Err(ExecutorError::Exchange(message.clone())),
            None => Ok(self.response.lock().clone()),
        }
    }
}

impl ExchangeClient for MockExchangeClient {
    fn all_mids(&self, network: Network) -> BoxFuture<'_, ExecutorResult<HashMap<String, Price>>> {
        Box::pin(async move {
            self.calls.lock().push(MockCall::AllMids { network });
            match self.failure.lock().as_ref() {
                Some(message) => Err(ExecutorError::Exchange(message.clone())),
                None => Ok(self.mids.lock().clone()),
            }
        })
    }

    fn place_order<'a>(
        &'a self,
        identity: &'a Identity,
        order: &'a ResolvedOrder,
        network: Network,
    ) -> BoxFuture<'a, ExecutorResult<Value>> {
        Box::pin(async move {
            self.answer(MockCall::PlaceOrder {
                account: identity.account().to_string(),
                signer: identity.signer_address().to_string(),
                order: order.clone(),
                network,
            })
        })
    }

    fn cancel_order<'a>(
        &'a self,
        identity: &'a Identity,
        asset: &'a str,
        order_id: u64,
        network: Network,
    ) -> BoxFuture<'a, ExecutorResult<Value>> {
        Box::pin(async move {
            self.answer(MockCall::CancelOrder {
                account: identity.account().to_string(),
                asset: asset.to_string(),
                order_id,
                network,
            })
        })
    }

    fn user_state<'a>(
        &'a self,
        address: &'a str,
        network: Network,
    ) -> BoxFuture<'a, ExecutorResult<Value>> {
        Box::pin(async move {
            self.answer(MockCall::UserState {
                address: address.to_string(),
                network,
            })
        })
    }

    fn open_orders<'a>(
        &'a self,
        address: &'a str,
        network: Network,
    ) -> BoxFuture<'a, ExecutorResult<Value>> {
        Box::pin(async move {
            self.answer(MockCall::OpenOrders {
                address: address.to_string(),
                network,
            })
        })
    }
}
