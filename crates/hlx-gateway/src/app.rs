//! Wires configuration, exchange client and dispatcher together.

use std::sync::Arc;

use hlx_executor::{
    Dispatcher, ExchangeClient, ExecutorError, HttpExchangeClient, PricePolicy, ResultEnvelope,
};
use hlx_telemetry::{Diagnostics, TracingDiagnostics};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::info;

use crate::config::GatewayConfig;
use crate::error::AppResult;

pub struct Application {
    dispatcher: Dispatcher,
}

impl Application {
    /// Production wiring: HTTP exchange client, tracing diagnostics.
    pub fn new(config: &GatewayConfig) -> AppResult<Self> {
        let client = HttpExchangeClient::new(config.endpoints(), config.request_timeout())?;
        info!(
            mainnet_url = %config.mainnet_url,
            testnet_url = %config.testnet_url,
            timeout_ms = config.request_timeout_ms,
            "Exchange client ready"
        );
        Ok(Self::with_client(
            Arc::new(client),
            config.price_policy.clone(),
            Arc::new(TracingDiagnostics),
        ))
    }

    pub fn with_client(
        client: Arc<dyn ExchangeClient>,
        policy: PricePolicy,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(client, policy, diagnostics),
        }
    }

    /// Handle one input document.
    pub async fn handle(&self, input: &str) -> ResultEnvelope {
        self.dispatcher.dispatch(input).await
    }

    /// Read the whole of `reader` and handle it as one document.
    pub async fn handle_reader<R: AsyncRead + Unpin>(&self, reader: &mut R) -> ResultEnvelope {
        match read_input(reader).await {
            Ok(input) => self.handle(&input).await,
            Err(e) => ResultEnvelope::failure(&e),
        }
    }
}

async fn read_input<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String, ExecutorError> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .await
        .map_err(|e| ExecutorError::Input(format!("failed to read input: {e}")))?;
    Ok(input)
}

/// Envelope for a failure that happened before a dispatcher existed.
pub fn startup_failure(message: impl Into<String>) -> ResultEnvelope {
    ResultEnvelope::failure(&ExecutorError::Configuration(message.into()))
}
