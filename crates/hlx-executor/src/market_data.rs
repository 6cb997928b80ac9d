//! Reference price lookup.

use hlx_core::{Network, Price};
use hlx_telemetry::{DiagnosticRecord, Diagnostics, Level};

use crate::client::ExchangeClient;
use crate::error::{ExecutorError, ExecutorResult};

/// Fetches the current mid price for an asset.
///
/// One snapshot of the mid-price feed per call; no retry, no caching.
pub struct MarketData<'a> {
    client: &'a dyn ExchangeClient,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> MarketData<'a> {
    pub fn new(client: &'a dyn ExchangeClient, diagnostics: &'a dyn Diagnostics) -> Self {
        Self {
            client,
            diagnostics,
        }
    }

    pub async fn reference_price(&self, asset: &str, network: Network) -> ExecutorResult<Price> {
        let mids = self.client.all_mids(network).await?;

        let price = mids
            .get(asset)
            .copied()
            .ok_or_else(|| ExecutorError::MarketData(format!("asset not found: {asset}")))?;

        self.diagnostics.record(
            DiagnosticRecord::new(Level::Info, "reference_price", "Fetched mid price")
                .field("asset", asset)
                .field("mid", price)
                .field("network", network),
        );
        Ok(price)
    }
}
