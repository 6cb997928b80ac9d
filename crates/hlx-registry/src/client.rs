//! HTTP client for the exchange info endpoint.
//!
//! Every query is a single POST with no retry or caching: one
//! point-in-time snapshot per call.

use crate::endpoints::Endpoints;
use crate::error::{RegistryError, RegistryResult};
use hlx_core::{Network, Price};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Request type for info endpoint.
#[derive(Debug, Serialize)]
struct InfoRequest {
    #[serde(rename = "type")]
    request_type: &'static str,
}

/// Request type for info endpoint with user address.
#[derive(Debug, Serialize)]
struct InfoRequestWithUser<'a> {
    #[serde(rename = "type")]
    request_type: &'static str,
    /// User address (0x...).
    user: &'a str,
}

/// Client for the public info endpoint.
pub struct InfoClient {
    /// HTTP client.
    client: Client,
    /// Base URLs per network.
    endpoints: Endpoints,
}

impl InfoClient {
    /// Create a new info client.
    pub fn new(endpoints: Endpoints, timeout: Duration) -> RegistryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetch mid prices for every listed asset (`{"type": "allMids"}`).
    pub async fn fetch_all_mids(&self, network: Network) -> RegistryResult<HashMap<String, Price>> {
        let body = self
            .post_info(network, &InfoRequest {
                request_type: "allMids",
            })
            .await?;
        let mids = parse_all_mids(&body)?;
        debug!(%network, count = mids.len(), "Fetched allMids");
        Ok(mids)
    }

    /// Resolve an asset symbol to its index in the perp universe (`{"type": "meta"}`).
    pub async fn fetch_asset_index(&self, network: Network, asset: &str) -> RegistryResult<u32> {
        let body = self
            .post_info(network, &InfoRequest {
                request_type: "meta",
            })
            .await?;
        let index = find_asset_index(&body, asset)?;
        debug!(%network, asset, index, "Resolved asset index from meta");
        Ok(index)
    }

    /// Fetch clearinghouse state (margin summary and positions) for a user.
    ///
    /// Returned verbatim.
    pub async fn fetch_clearinghouse_state(
        &self,
        network: Network,
        user_address: &str,
    ) -> RegistryResult<Value> {
        info!(%network, "Fetching clearinghouseState");
        self.post_info(network, &InfoRequestWithUser {
            request_type: "clearinghouseState",
            user: user_address,
        })
        .await
    }

    /// Fetch resting orders for a user. Returned verbatim.
    pub async fn fetch_open_orders(&self, network: Network, user_address: &str) -> RegistryResult<Value> {
        info!(%network, "Fetching openOrders");
        self.post_info(network, &InfoRequestWithUser {
            request_type: "openOrders",
            user: user_address,
        })
        .await
    }

    async fn post_info<T: Serialize + ?Sized>(
        &self,
        network: Network,
        request: &T,
    ) -> RegistryResult<Value> {
        let url = self.endpoints.info_url(network);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| RegistryError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::HttpClient(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| RegistryError::HttpClient(format!("Failed to parse response: {e}")))
    }
}

/// Parse an `allMids` body (`{"ETH": "2000.5", ...}`).
///
/// Entries whose value is not a decimal are skipped with a warning.
pub fn parse_all_mids(body: &Value) -> RegistryResult<HashMap<String, Price>> {
    let object = body.as_object().ok_or_else(|| {
        RegistryError::UnexpectedResponse("allMids response is not an object".to_string())
    })?;

    let mut mids = HashMap::with_capacity(object.len());
    for (symbol, value) in object {
        let parsed = match value {
            Value::String(s) => s.parse::<Price>().ok(),
            Value::Number(n) => n.to_string().parse::<Price>().ok(),
            _ => None,
        };
        match parsed {
            Some(price) => {
                mids.insert(symbol.clone(), price);
            }
            None => warn!(symbol = %symbol, "Skipping unparseable mid price"),
        }
    }
    Ok(mids)
}

/// Find `asset` in a `meta` body's `universe` array.
pub fn find_asset_index(body: &Value, asset: &str) -> RegistryResult<u32> {
    let universe = body
        .get("universe")
        .and_then(|u| u.as_array())
        .ok_or_else(|| {
            RegistryError::UnexpectedResponse("meta response has no universe".to_string())
        })?;

    universe
        .iter()
        .position(|entry| entry.get("name").and_then(|n| n.as_str()) == Some(asset))
        .map(|idx| idx as u32)
        .ok_or_else(|| RegistryError::AssetNotFound(asset.to_string()))
}
