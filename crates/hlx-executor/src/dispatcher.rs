//! Execution dispatcher: one request document in, one envelope out.
//!
//! Flow per action:
//! - `order`: identity -> (mid + price policy) -> order builder -> `place_order`
//! - `cancel`: identity -> `cancel_order`
//! - `positions` / `open_orders`: read-only query by address, no identity
//!
//! Every failure below this point is an [`ExecutorError`] and is folded
//! into [`ResultEnvelope::Failure`]; nothing escapes `dispatch`.

use std::sync::Arc;

use hlx_core::{ActionKind, CancelRequest, OrderRequest, QueryRequest, RawRequest};
use hlx_telemetry::{mask_address, DiagnosticRecord, Diagnostics, Level};
use serde_json::Value;

use crate::client::ExchangeClient;
use crate::envelope::ResultEnvelope;
use crate::error::{ExecutorError, ExecutorResult};
use crate::identity::resolve_identity;
use crate::market_data::MarketData;
use crate::order_builder;
use crate::price_policy::PricePolicy;

pub struct Dispatcher {
    client: Arc<dyn ExchangeClient>,
    policy: PricePolicy,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Dispatcher {
    pub fn new(
        client: Arc<dyn ExchangeClient>,
        policy: PricePolicy,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            client,
            policy,
            diagnostics,
        }
    }

    /// Handle one raw input document.
    pub async fn dispatch(&self, input: &str) -> ResultEnvelope {
        let result = match parse_document(input) {
            Ok(document) => self.try_dispatch(document).await,
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    fn finish(&self, result: ExecutorResult<Value>) -> ResultEnvelope {
        match result {
            Ok(native) => ResultEnvelope::Success(native),
            Err(e) => {
                self.diagnostics.record(
                    DiagnosticRecord::new(Level::Warn, "dispatch_failed", "Request failed")
                        .field("kind", e.kind())
                        .field("error", &e),
                );
                ResultEnvelope::failure(&e)
            }
        }
    }

    async fn try_dispatch(&self, document: Value) -> ExecutorResult<Value> {
        if !document.is_object() {
            return Err(ExecutorError::Input(
                "input must be a JSON object".to_string(),
            ));
        }

        // Classified before any credential field is deserialized.
        let action = ActionKind::from_document(&document)?;
        self.diagnostics.record(
            DiagnosticRecord::new(Level::Debug, "dispatch", "Dispatching request")
                .field("action", action),
        );

        let raw: RawRequest = serde_json::from_value(document)
            .map_err(|e| ExecutorError::Validation(format!("invalid request: {e}")))?;

        match action {
            ActionKind::Order => self.place_order(raw.into_order_request()?).await,
            ActionKind::Cancel => self.cancel_order(raw.into_cancel_request()?).await,
            ActionKind::Positions => self.positions(raw.into_query_request()?).await,
            ActionKind::OpenOrders => self.open_orders(raw.into_query_request()?).await,
        }
    }

    async fn place_order(&self, request: OrderRequest) -> ExecutorResult<Value> {
        let identity = resolve_identity(&request.credentials, self.diagnostics.as_ref())?;
        order_builder::validate_request(&request)?;

        let market = MarketData::new(self.client.as_ref(), self.diagnostics.as_ref());
        let pricing = self
            .policy
            .resolve(&request, &market, self.diagnostics.as_ref())
            .await?;

        let submission = order_builder::build(
            &identity,
            pricing.price,
            pricing.time_in_force,
            &request,
        )?;

        let order = &submission.order;
        self.diagnostics.record(
            DiagnosticRecord::new(Level::Info, "order_submitting", "Submitting order")
                .field("asset", &order.asset)
                .field("side", order.side)
                .field("size", order.size)
                .field("price", order.price)
                .field("tif", order.time_in_force)
                .field("reduce_only", order.reduce_only)
                .field("network", request.network)
                .field("account", mask_address(&identity.account().to_string())),
        );

        self.client
            .place_order(submission.identity, order, request.network)
            .await
    }

    async fn cancel_order(&self, request: CancelRequest) -> ExecutorResult<Value> {
        let identity = resolve_identity(&request.credentials, self.diagnostics.as_ref())?;

        self.diagnostics.record(
            DiagnosticRecord::new(Level::Info, "cancel_submitting", "Cancelling order")
                .field("asset", &request.asset)
                .field("order_id", request.order_id)
                .field("network", request.network)
                .field("account", mask_address(&identity.account().to_string())),
        );

        self.client
            .cancel_order(&identity, &request.asset, request.order_id, request.network)
            .await
    }

    async fn positions(&self, request: QueryRequest) -> ExecutorResult<Value> {
        self.record_query("positions", &request);
        self.client
            .user_state(&request.address, request.network)
            .await
    }

    async fn open_orders(&self, request: QueryRequest) -> ExecutorResult<Value> {
        self.record_query("open_orders", &request);
        self.client
            .open_orders(&request.address, request.network)
            .await
    }

    fn record_query(&self, action: &'static str, request: &QueryRequest) {
        self.diagnostics.record(
            DiagnosticRecord::new(Level::Info, "query", "Querying account")
                .field("action", action)
                .field("address", mask_address(&request.address))
                .field("network", request.network),
        );
    }
}

fn parse_document(input: &str) -> ExecutorResult<Value> {
    if input.trim().is_empty() {
        return Err(ExecutorError::Input("no input provided".to_string()));
    }
    serde_json::from_str(input)
        .map_err(|e| ExecutorError::Input(format!("invalid JSON input: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockCall, MockExchangeClient};
    use hlx_core::{Network, Price, Size, TimeInForce};
    use hlx_telemetry::MemoryDiagnostics;
    use rust_decimal_macros::dec;
    use serde_json::json;

    // Well-known test keys (DO NOT use in production)
    const KEY_A: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ADDR_A: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const KEY_B: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const ADDR_B: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    fn setup() -> (Arc<MockExchangeClient>, Arc<MemoryDiagnostics>, Dispatcher) {
        let client = Arc::new(MockExchangeClient::new());
        client.set_mid("ETH", Price::new(dec!(2000)));
        let sink = Arc::new(MemoryDiagnostics::new());
        let dispatcher = Dispatcher::new(client.clone(), PricePolicy::default(), sink.clone());
        (client, sink, dispatcher)
    }

    #[tokio::test]
    async fn test_order_without_type_or_price_example() {
        let (client, sink, dispatcher) = setup();
        let input = json!({
            "action": "order",
            "asset": "ETH",
            "isBuy": true,
            "size": "1",
            "isTestnet": true,
            "hyperliquidAddress": ADDR_A,
            "hyperliquidPrivateKey": format!("0x{KEY_A}"),
        });

        let envelope = dispatcher.dispatch(&input.to_string()).await;
        assert!(envelope.is_success(), "{envelope:?}");

        let orders = client.placed_orders();
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.price.to_string(), "2010.00");
        assert_eq!(order.time_in_force, TimeInForce::ImmediateOrCancel);
        assert!(!order.reduce_only);
        assert_eq!(order.size, Size::new(dec!(1)));
        assert!(!sink.mentions(KEY_A));
    }

    #[tokio::test]
    async fn test_market_order_overrides_requested_tif() {
        let (client, _sink, dispatcher) = setup();
        let input = json!({
            "asset": "ETH",
            "isBuy": true,
            "size": "1",
            "orderType": "MARKET",
            "timeInForce": "Gtc",
            "hyperliquidPrivateKey": KEY_A,
        });

        assert!(dispatcher.dispatch(&input.to_string()).await.is_success());

        let order = &client.placed_orders()[0];
        assert_eq!(order.price.to_string(), "2010.00");
        assert_eq!(order.time_in_force, TimeInForce::ImmediateOrCancel);
    }

    #[tokio::test]
    async fn test_limit_without_price_defaults_to_ioc() {
        let (client, _sink, dispatcher) = setup();
        let input = json!({
            "asset": "ETH",
            "isBuy": false,
            "size": 2,
            "hyperliquidPrivateKey": KEY_A,
        });

        assert!(dispatcher.dispatch(&input.to_string()).await.is_success());

        let order = &client.placed_orders()[0];
        assert_eq!(order.price.to_string(), "1990.00");
        assert_eq!(order.time_in_force, TimeInForce::ImmediateOrCancel);
    }

    #[tokio::test]
    async fn test_limit_with_price_defaults_to_gtc() {
        let (client, _sink, dispatcher) = setup();
        let input = json!({
            "asset": "ETH",
            "isBuy": true,
            "size": "1",
            "price": "1950",
            "hyperliquidPrivateKey": KEY_A,
        });

        assert!(dispatcher.dispatch(&input.to_string()).await.is_success());

        let order = &client.placed_orders()[0];
        assert_eq!(order.price.to_string(), "1950.00");
        assert_eq!(order.time_in_force, TimeInForce::GoodTilCancelled);
    }

    #[tokio::test]
    async fn test_non_positive_limit_price_rejected() {
        for price in [json!("0"), json!("-5"), json!(0)] {
            let (client, _sink, dispatcher) = setup();
            let input = json!({
                "asset": "ETH",
                "isBuy": true,
                "size": "1",
                "price": price,
                "hyperliquidPrivateKey": KEY_A,
            });

            let envelope = dispatcher.dispatch(&input.to_string()).await;

            assert!(
                matches!(envelope, ResultEnvelope::Failure { kind: "ValidationError", .. }),
                "price {price}: {envelope:?}"
            );
            assert_eq!(envelope.exit_code(), 1);
            assert!(client.placed_orders().is_empty());
        }
    }

    #[tokio::test]
    async fn test_overflowing_mid_becomes_envelope() {
        let (client, _sink, dispatcher) = setup();
        client.set_mid("ETH", Price::new(rust_decimal::Decimal::MAX));
        let input = json!({
            "asset": "ETH",
            "isBuy": true,
            "size": "1",
            "orderType": "MARKET",
            "hyperliquidPrivateKey": KEY_A,
        });

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert!(matches!(envelope, ResultEnvelope::Failure { kind: "MarketDataError", .. }));
        assert_eq!(envelope.exit_code(), 1);
        assert!(client.placed_orders().is_empty());
    }

    #[tokio::test]
    async fn test_empty_api_wallet_key_falls_back() {
        let (client, _sink, dispatcher) = setup();
        let input = json!({
            "asset": "ETH",
            "isBuy": true,
            "size": "1",
            "price": "1950",
            "hyperliquidAddress": ADDR_A,
            "apiWalletPrivateKey": "",
        });

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert!(matches!(envelope, ResultEnvelope::Failure { kind: "ConfigurationError", .. }));
        assert!(client.calls().is_empty());

        let input = json!({
            "asset": "ETH",
            "isBuy": true,
            "size": "1",
            "price": "1950",
            "hyperliquidAddress": ADDR_A,
            "apiWalletPrivateKey": "  ",
            "hyperliquidPrivateKey": KEY_A,
        });

        assert!(dispatcher.dispatch(&input.to_string()).await.is_success());
        match &client.calls()[..] {
            [MockCall::PlaceOrder { account, signer, .. }] => {
                assert_eq!(account.to_lowercase(), ADDR_A.to_lowercase());
                assert_eq!(signer.to_lowercase(), ADDR_A.to_lowercase());
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_round_trips_native_response() {
        let (client, _sink, dispatcher) = setup();
        let raw = r#"{"status":"ok","response":{"type":"order","data":{"statuses":[{"filled":{"totalSz":"1.0","avgPx":"2001.3","oid":9}}]}}}"#;
        client.set_response(serde_json::from_str(raw).unwrap());

        let input = json!({
            "asset": "ETH",
            "isBuy": true,
            "size": "1",
            "price": "1999.5",
            "hyperliquidAddress": ADDR_A,
            "hyperliquidPrivateKey": KEY_A,
        });
        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert_eq!(envelope.to_json(), raw);
        assert_eq!(envelope.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_unknown_action_touches_nothing() {
        let (client, sink, dispatcher) = setup();
        let input = json!({
            "action": "withdraw",
            "hyperliquidPrivateKey": KEY_A,
        });

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert_eq!(
            envelope.to_json(),
            r#"{"status":"error","message":"Unknown action: withdraw"}"#
        );
        assert_eq!(envelope.exit_code(), 1);
        assert!(client.calls().is_empty());
        assert!(sink.events("identity_resolved").is_empty());
    }

    #[tokio::test]
    async fn test_missing_credentials_no_network_call() {
        let (client, _sink, dispatcher) = setup();
        let input = json!({
            "asset": "ETH",
            "isBuy": true,
            "size": "1",
            "hyperliquidAddress": ADDR_A,
        });

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert!(matches!(
            envelope,
            ResultEnvelope::Failure {
                kind: "ConfigurationError",
                ..
            }
        ));
        assert_eq!(envelope.exit_code(), 1);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_and_malformed_input() {
        let (client, _sink, dispatcher) = setup();

        let empty = dispatcher.dispatch("  \n").await;
        assert_eq!(
            empty.to_json(),
            r#"{"status":"error","message":"no input provided"}"#
        );

        let malformed = dispatcher.dispatch("{\"asset\": ").await;
        match malformed {
            ResultEnvelope::Failure { kind, message } => {
                assert_eq!(kind, "InputError");
                assert!(message.starts_with("invalid JSON input: "));
            }
            other => panic!("expected failure, got {other:?}"),
        }

        let array = dispatcher.dispatch("[1, 2]").await;
        assert!(matches!(array, ResultEnvelope::Failure { kind: "InputError", .. }));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delegated_order_attributed_to_account() {
        let (client, _sink, dispatcher) = setup();
        let input = json!({
            "asset": "ETH",
            "isBuy": true,
            "size": "0.5",
            "price": 1800,
            "timeInForce": "Alo",
            "reduceOnly": true,
            "isTestnet": false,
            "hyperliquidAddress": ADDR_A,
            "apiWalletPrivateKey": format!("0x{KEY_B}"),
        });

        assert!(dispatcher.dispatch(&input.to_string()).await.is_success());

        match &client.calls()[..] {
            [MockCall::PlaceOrder {
                account,
                signer,
                order,
                network,
            }] => {
                assert_eq!(account.to_lowercase(), ADDR_A.to_lowercase());
                assert_eq!(signer.to_lowercase(), ADDR_B.to_lowercase());
                assert_eq!(order.price.to_string(), "1800.00");
                assert_eq!(order.time_in_force, TimeInForce::AddLiquidityOnly);
                assert!(order.reduce_only);
                assert_eq!(*network, Network::Mainnet);
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_mid_is_market_data_error() {
        let (client, _sink, dispatcher) = setup();
        let input = json!({
            "asset": "DOGE",
            "isBuy": true,
            "size": "100",
            "orderType": "market",
            "hyperliquidPrivateKey": KEY_A,
        });

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert_eq!(
            envelope.to_json(),
            r#"{"status":"error","message":"asset not found: DOGE"}"#
        );
        assert!(client.placed_orders().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_size_rejected_before_market_data() {
        let (client, _sink, dispatcher) = setup();
        let input = json!({
            "asset": "ETH",
            "isBuy": true,
            "size": "-1",
            "hyperliquidPrivateKey": KEY_A,
        });

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert!(matches!(envelope, ResultEnvelope::Failure { kind: "ValidationError", .. }));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_routes_order_id() {
        let (client, _sink, dispatcher) = setup();
        let input = json!({
            "action": "cancel",
            "asset": "ETH",
            "orderId": "123456789",
            "hyperliquidPrivateKey": KEY_A,
        });

        assert!(dispatcher.dispatch(&input.to_string()).await.is_success());
        assert_eq!(
            client.calls(),
            vec![MockCall::CancelOrder {
                account: ADDR_A.parse::<alloy::primitives::Address>().unwrap().to_string(),
                asset: "ETH".to_string(),
                order_id: 123_456_789,
                network: Network::Testnet,
            }]
        );
    }

    #[tokio::test]
    async fn test_cancel_requires_order_id() {
        let (client, _sink, dispatcher) = setup();
        let input = json!({
            "action": "cancel",
            "asset": "ETH",
            "hyperliquidPrivateKey": KEY_A,
        });

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert!(matches!(envelope, ResultEnvelope::Failure { kind: "ValidationError", .. }));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_positions_need_no_credentials() {
        let (client, sink, dispatcher) = setup();
        client.set_response(json!({"assetPositions": [], "withdrawable": "12.5"}));
        let input = json!({
            "action": "positions",
            "isTestnet": false,
            "hyperliquidAddress": ADDR_A,
        });

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert_eq!(
            envelope.to_json(),
            r#"{"assetPositions":[],"withdrawable":"12.5"}"#
        );
        assert_eq!(
            client.calls(),
            vec![MockCall::UserState {
                address: ADDR_A.to_string(),
                network: Network::Mainnet,
            }]
        );
        assert!(sink.events("identity_resolved").is_empty());
        assert!(!sink.mentions(ADDR_A));
    }

    #[tokio::test]
    async fn test_open_orders_routes_to_open_orders() {
        let (client, _sink, dispatcher) = setup();
        client.set_response(json!([]));
        let input = json!({"action": "open_orders", "hyperliquidAddress": ADDR_B});

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert_eq!(envelope.to_json(), "[]");
        assert!(matches!(
            &client.calls()[..],
            [MockCall::OpenOrders { network: Network::Testnet, .. }]
        ));
    }

    #[tokio::test]
    async fn test_exchange_failure_becomes_envelope() {
        let (client, sink, dispatcher) = setup();
        client.fail_with("HTTP 502 Bad Gateway: upstream");
        let input = json!({"action": "positions", "hyperliquidAddress": ADDR_A});

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert_eq!(
            envelope.to_json(),
            r#"{"status":"error","message":"HTTP 502 Bad Gateway: upstream"}"#
        );
        let failures = sink.events("dispatch_failed");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].get("kind"), Some("ExchangeError"));
    }

    #[tokio::test]
    async fn test_bad_secret_never_echoed() {
        let (_client, sink, dispatcher) = setup();
        let secret = "0xzzzzsupersecretzzzz";
        let input = json!({
            "asset": "ETH",
            "isBuy": true,
            "size": "1",
            "hyperliquidPrivateKey": secret,
        });

        let envelope = dispatcher.dispatch(&input.to_string()).await;

        assert!(!envelope.to_json().contains("supersecret"));
        assert!(!sink.mentions("supersecret"));
    }
}
