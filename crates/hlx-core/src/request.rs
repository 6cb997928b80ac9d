//! Request documents and the typed requests parsed from them.
//!
//! One JSON document arrives per invocation. It is first classified by its
//! `action` field ([`ActionKind::from_document`]) and only then deserialized
//! into a [`RawRequest`], so an unknown action never touches credential
//! fields.

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::decimal::{parse_decimal, Price, Size};
use crate::error::{CoreError, Result};
use crate::network::Network;
use crate::order::{OrderKind, OrderSide, TimeInForce};

/// Declared action of a request document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Order,
    Cancel,
    Positions,
    OpenOrders,
}

impl ActionKind {
    /// Read the `action` field of a parsed document (absent or null means `order`).
    pub fn from_document(document: &Value) -> Result<Self> {
        match document.get("action") {
            None | Some(Value::Null) => Ok(Self::Order),
            Some(Value::String(action)) => action.parse(),
            Some(other) => Err(CoreError::UnknownAction(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Cancel => "cancel",
            Self::Positions => "positions",
            Self::OpenOrders => "open_orders",
        }
    }
}

impl FromStr for ActionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "order" => Ok(Self::Order),
            "cancel" => Ok(Self::Cancel),
            "positions" => Ok(Self::Positions),
            "open_orders" => Ok(Self::OpenOrders),
            other => Err(CoreError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw credential fields as supplied by the caller.
///
/// Secrets are wrapped in `SecretString`, so `Debug` output is redacted.
#[derive(Debug, Default)]
pub struct Credentials {
    /// Trading account address (`hyperliquidAddress`).
    pub address: Option<String>,
    /// Direct signing secret (`hyperliquidPrivateKey`).
    pub private_key: Option<SecretString>,
    /// Delegated API wallet secret (`apiWalletPrivateKey`).
    pub api_wallet_private_key: Option<SecretString>,
}

/// The input document with every field optional.
///
/// Numeric fields stay as JSON values until the typed conversion so that
/// both `"1.5"` and `1.5` are accepted and bad values surface as
/// validation errors naming the field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRequest {
    #[serde(default)]
    pub action: Option<Value>,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub is_buy: Option<bool>,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub time_in_force: Option<String>,
    #[serde(default)]
    pub reduce_only: Option<bool>,
    #[serde(default)]
    pub order_id: Option<Value>,
    #[serde(default)]
    pub is_testnet: Option<bool>,
    #[serde(default)]
    pub hyperliquid_address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub hyperliquid_private_key: Option<SecretString>,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub api_wallet_private_key: Option<SecretString>,
}

/// Secrets deserialize through `Value` so a type error never echoes the value.
fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(SecretString::from(s))),
        _ => Err(serde::de::Error::custom("private key fields must be strings")),
    }
}

/// Logical order intent.
#[derive(Debug)]
pub struct OrderRequest {
    pub asset: String,
    pub side: OrderSide,
    pub size: Size,
    pub price: Option<Price>,
    pub kind: OrderKind,
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: bool,
    pub network: Network,
    pub credentials: Credentials,
}

/// Cancel of a resting order by exchange order id.
#[derive(Debug)]
pub struct CancelRequest {
    pub asset: String,
    pub order_id: u64,
    pub network: Network,
    pub credentials: Credentials,
}

/// Read-only account query (positions or open orders).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub network: Network,
    pub address: String,
}

impl RawRequest {
    pub fn network(&self) -> Network {
        Network::from_is_testnet(self.is_testnet.unwrap_or(true))
    }

    pub fn into_order_request(self) -> Result<OrderRequest> {
        let network = self.network();
        let asset = self.asset.ok_or(CoreError::MissingField("asset"))?;
        let is_buy = self.is_buy.ok_or(CoreError::MissingField("isBuy"))?;
        let size = self
            .size
            .as_ref()
            .ok_or(CoreError::MissingField("size"))
            .and_then(|v| decimal_field(v, "size"))
            .map(Size::new)?;
        let price = match self.price.as_ref() {
            None | Some(Value::Null) => None,
            Some(v) => Some(Price::new(decimal_field(v, "price")?)),
        };
        let kind = self
            .order_type
            .as_deref()
            .map(str::parse::<OrderKind>)
            .transpose()?
            .unwrap_or_default();
        let time_in_force = self
            .time_in_force
            .as_deref()
            .map(str::parse::<TimeInForce>)
            .transpose()?;

        Ok(OrderRequest {
            asset,
            side: OrderSide::from_is_buy(is_buy),
            size,
            price,
            kind,
            time_in_force,
            reduce_only: self.reduce_only.unwrap_or(false),
            network,
            credentials: Credentials {
                address: self.hyperliquid_address,
                private_key: self.hyperliquid_private_key,
                api_wallet_private_key: self.api_wallet_private_key,
            },
        })
    }

    pub fn into_cancel_request(self) -> Result<CancelRequest> {
        let network = self.network();
        let asset = self
            .asset
            .filter(|a| !a.trim().is_empty())
            .ok_or(CoreError::MissingField("asset"))?;
        let order_id = self
            .order_id
            .as_ref()
            .ok_or(CoreError::MissingField("orderId"))
            .and_then(order_id_field)?;

        Ok(CancelRequest {
            asset,
            order_id,
            network,
            credentials: Credentials {
                address: self.hyperliquid_address,
                private_key: self.hyperliquid_private_key,
                api_wallet_private_key: self.api_wallet_private_key,
            },
        })
    }

    pub fn into_query_request(self) -> Result<QueryRequest> {
        let network = self.network();
        let address = self
            .hyperliquid_address
            .filter(|a| !a.trim().is_empty())
            .ok_or(CoreError::MissingField("hyperliquidAddress"))?;

        Ok(QueryRequest { network, address })
    }
}

fn decimal_field(value: &Value, field: &'static str) -> Result<Decimal> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(CoreError::invalid(
                field,
                format!("expected a string or number, got {other}"),
            ))
        }
    };
    parse_decimal(&text).map_err(|e| CoreError::invalid(field, format!("{text:?}: {e}")))
}

fn order_id_field(value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        CoreError::invalid("orderId", format!("expected a non-negative integer, got {value}"))
    })
}
