//! Mock exchange HTTP server for integration tests.
//!
//! Serves `/info` (allMids, meta, clearinghouseState, openOrders) and
//! `/exchange` from canned values and records every request body.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct Canned {
    mids: Value,
    universe: Value,
    user_state: Value,
    open_orders: Value,
    exchange_status: StatusCode,
    exchange_body: Value,
    info_requests: Vec<Value>,
    exchange_requests: Vec<Value>,
}

type Shared = Arc<Mutex<Canned>>;

/// A mock exchange for testing.
pub struct MockExchangeServer {
    addr: SocketAddr,
    state: Shared,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockExchangeServer {
    /// Start a new mock exchange on an available port.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Canned {
            mids: json!({"BTC": "98000.5", "ETH": "2000"}),
            universe: json!([
                {"name": "BTC", "szDecimals": 5, "maxLeverage": 40},
                {"name": "ETH", "szDecimals": 4, "maxLeverage": 25},
            ]),
            user_state: json!({
                "assetPositions": [],
                "marginSummary": {"accountValue": "1000.0", "totalNtlPos": "0.0"},
                "withdrawable": "1000.0"
            }),
            open_orders: json!([
                {"coin": "ETH", "side": "B", "limitPx": "1800.0", "sz": "0.5", "oid": 77, "timestamp": 1700000000000u64}
            ]),
            exchange_status: StatusCode::OK,
            exchange_body: json!({
                "status": "ok",
                "response": {"type": "order", "data": {"statuses": [{"resting": {"oid": 77}}]}}
            }),
            info_requests: Vec::new(),
            exchange_requests: Vec::new(),
        }));

        let router = Router::new()
            .route("/info", post(info))
            .route("/exchange", post(exchange))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL (`http://127.0.0.1:port`).
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_mids(&self, mids: Value) {
        self.state.lock().mids = mids;
    }

    pub fn set_user_state(&self, body: Value) {
        self.state.lock().user_state = body;
    }

    /// Response served by `/exchange`.
    pub fn set_exchange_response(&self, status: u16, body: Value) {
        let mut state = self.state.lock();
        state.exchange_status = StatusCode::from_u16(status).unwrap();
        state.exchange_body = body;
    }

    pub fn info_requests(&self) -> Vec<Value> {
        self.state.lock().info_requests.clone()
    }

    /// `type` of every info request, in order.
    pub fn info_types(&self) -> Vec<String> {
        self.info_requests()
            .iter()
            .filter_map(|r| r.get("type").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    pub fn exchange_requests(&self) -> Vec<Value> {
        self.state.lock().exchange_requests.clone()
    }

    /// Shutdown the server.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn info(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut state = state.lock();
    state.info_requests.push(body.clone());

    let response = match body.get("type").and_then(Value::as_str) {
        Some("allMids") => state.mids.clone(),
        Some("meta") => json!({"universe": state.universe.clone()}),
        Some("clearinghouseState") => state.user_state.clone(),
        Some("openOrders") => state.open_orders.clone(),
        _ => return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!("unknown info type"))),
    };
    (StatusCode::OK, Json(response))
}

async fn exchange(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock();
    state.exchange_requests.push(body);
    (state.exchange_status, Json(state.exchange_body.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockExchangeServer::start().await;
        assert!(server.url().starts_with("http://127.0.0.1:"));
        server.shutdown();
    }
}
