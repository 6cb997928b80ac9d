//! Production [`ExchangeClient`] over the exchange's HTTP API.
//!
//! Info queries go through [`InfoClient`]. Orders and cancels are signed
//! locally and POSTed to `/exchange` as `{action, nonce, signature}`.
//!
//! A 2xx body is returned verbatim even when it reports `"status": "err"`;
//! transport failures and non-2xx statuses become `ExecutorError::Exchange`.

use std::collections::HashMap;
use std::time::Duration;

use hlx_core::{Network, Price, ResolvedOrder};
use hlx_registry::{Endpoints, InfoClient};
use hlx_telemetry::mask_address;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::{BoxFuture, ExchangeClient};
use crate::error::{ExecutorError, ExecutorResult};
use crate::identity::Identity;
use crate::nonce::NonceManager;
use crate::signer::{sign_l1_action, Action, ActionSignature, CancelWire, OrderWire};

/// Body of a POST to `/exchange`.
///
/// `vaultAddress` is left out: API wallets act for their approved account
/// without vault semantics.
#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    action: &'a Action,
    nonce: u64,
    signature: &'a ActionSignature,
}

pub struct HttpExchangeClient {
    info: InfoClient,
    http: Client,
    nonces: NonceManager,
}

impl HttpExchangeClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> ExecutorResult<Self> {
        Self::with_nonces(endpoints, timeout, NonceManager::with_system_clock())
    }

    pub fn with_nonces(
        endpoints: Endpoints,
        timeout: Duration,
        nonces: NonceManager,
    ) -> ExecutorResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExecutorError::Exchange(format!("Failed to create HTTP client: {e}")))?;
        let info = InfoClient::new(endpoints, timeout)?;

        Ok(Self { info, http, nonces })
    }

    pub fn endpoints(&self) -> &Endpoints {
        self.info.endpoints()
    }

    /// Sign `action` and submit it.
    async fn submit(
        &self,
        identity: &Identity,
        action: Action,
        network: Network,
    ) -> ExecutorResult<Value> {
        let nonce = self.nonces.next();
        let signature = sign_l1_action(identity, &action, nonce, network).await?;

        let url = self.info.endpoints().exchange_url(network);
        info!(
            %network,
            action = action.kind(),
            account = %mask_address(&identity.account().to_string()),
            nonce,
            "Submitting signed action"
        );

        let response = self
            .http
            .post(&url)
            .json(&ExchangeRequest {
                action: &action,
                nonce,
                signature: &signature,
            })
            .send()
            .await
            .map_err(|e| ExecutorError::Exchange(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutorError::Exchange(format!("HTTP {status}: {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ExecutorError::Exchange(format!("Failed to parse response: {e}")))?;
        debug!(status = ?body.get("status"), "Exchange responded");
        Ok(body)
    }
}

impl std::fmt::Debug for HttpExchangeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExchangeClient")
            .field("endpoints", self.info.endpoints())
            .finish_non_exhaustive()
    }
}

impl ExchangeClient for HttpExchangeClient {
    fn all_mids(&self, network: Network) -> BoxFuture<'_, ExecutorResult<HashMap<String, Price>>> {
        Box::pin(async move { Ok(self.info.fetch_all_mids(network).await?) })
    }

    fn place_order<'a>(
        &'a self,
        identity: &'a Identity,
        order: &'a ResolvedOrder,
        network: Network,
    ) -> BoxFuture<'a, ExecutorResult<Value>> {
        Box::pin(async move {
            let asset_index = self.info.fetch_asset_index(network, &order.asset).await?;
            let action = Action::order(OrderWire::from_resolved(order, asset_index));
            self.submit(identity, action, network).await
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
            let asset_index = self.info.fetch_asset_index(network, asset).await?;
            let action = Action::cancel(CancelWire {
                asset: asset_index,
                oid: order_id,
            });
            self.submit(identity, action, network).await
        })
    }

    fn user_state<'a>(
        &'a self,
        address: &'a str,
        network: Network,
    ) -> BoxFuture<'a, ExecutorResult<Value>> {
        Box::pin(async move { Ok(self.info.fetch_clearinghouse_state(network, address).await?) })
    }

    fn open_orders<'a>(
        &'a self,
        address: &'a str,
        network: Network,
    ) -> BoxFuture<'a, ExecutorResult<Value>> {
        Box::pin(async move { Ok(self.info.fetch_open_orders(network, address).await?) })
    }
}
