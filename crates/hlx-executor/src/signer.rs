//! L1 action signing.
//!
//! An action is signed in two steps:
//! 1. `action_hash = keccak256(msgpack(action) || nonce_be || 0x00)`; the
//!    trailing `0x00` is the empty vault tag.
//! 2. secp256k1 over the EIP-712 digest of `Agent { source, connectionId }`
//!    where `connectionId = action_hash` and `source` is `"a"` on mainnet,
//!    `"b"` on testnet.
//!
//! Msgpack field order and omitted keys are part of the hash.

use alloy::primitives::{keccak256, Address, PrimitiveSignature, B256};
use alloy::signers::Signer as _;
use alloy::sol;
use alloy::sol_types::{eip712_domain, SolStruct};
use hlx_core::{Network, ResolvedOrder, TimeInForce};
use serde::Serialize;
use thiserror::Error;

use crate::identity::Identity;

const NO_VAULT_TAG: u8 = 0x00;

/// Signing errors.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Signing failed: {0}")]
    SigningFailed(#[from] alloy::signers::Error),

    #[error("Action serialization failed: {0}")]
    SerializationFailed(String),
}

/// Exchange action. Serializes as `{"type": ..., <fields>}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Order {
        orders: Vec<OrderWire>,
        grouping: String,
    },
    Cancel {
        cancels: Vec<CancelWire>,
    },
}

impl Action {
    /// Single standalone order.
    pub fn order(order: OrderWire) -> Self {
        Self::Order {
            orders: vec![order],
            grouping: "na".to_string(),
        }
    }

    pub fn cancel(cancel: CancelWire) -> Self {
        Self::Cancel {
            cancels: vec![cancel],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Order { .. } => "order",
            Self::Cancel { .. } => "cancel",
        }
    }
}

/// `{"a": asset, "b": is_buy, "p": price, "s": size, "r": reduce_only, "t": type}`
#[derive(Debug, Clone, Serialize)]
pub struct OrderWire {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "b")]
    pub is_buy: bool,
    #[serde(rename = "p")]
    pub price: String,
    #[serde(rename = "s")]
    pub size: String,
    #[serde(rename = "r")]
    pub reduce_only: bool,
    #[serde(rename = "t")]
    pub kind: OrderTypeWire,
    /// Client order id (`cloid`). The gateway never assigns one, so this is
    /// `None` on every order it builds and the key is left off the wire.
    #[serde(rename = "c", skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
}

impl OrderWire {
    pub fn from_resolved(order: &ResolvedOrder, asset_index: u32) -> Self {
        Self {
            asset: asset_index,
            is_buy: order.is_buy(),
            price: order.price.to_wire(),
            size: order.size.to_wire(),
            reduce_only: order.reduce_only,
            kind: OrderTypeWire::limit(order.time_in_force),
            client_order_id: None,
        }
    }
}

/// Every order is a limit order on the wire: `{"limit": {"tif": ...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderTypeWire {
    pub limit: LimitWire,
}

#[derive(Debug, Clone, Serialize)]
pub struct LimitWire {
    pub tif: &'static str,
}

impl OrderTypeWire {
    pub fn limit(tif: TimeInForce) -> Self {
        Self {
            limit: LimitWire { tif: tif.as_str() },
        }
    }
}

/// `{"a": asset, "o": order_id}`
#[derive(Debug, Clone, Serialize)]
pub struct CancelWire {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "o")]
    pub oid: u64,
}

/// keccak256 of the msgpack-encoded action, the nonce and the empty vault tag.
pub fn action_hash(action: &Action, nonce: u64) -> Result<B256, SignerError> {
    let mut data = rmp_serde::to_vec_named(action)
        .map_err(|e| SignerError::SerializationFailed(e.to_string()))?;
    data.extend_from_slice(&nonce.to_be_bytes());
    data.push(NO_VAULT_TAG);
    Ok(keccak256(&data))
}

sol! {
    #[derive(Debug)]
    struct Agent {
        string source;
        bytes32 connectionId;
    }
}

pub fn agent_source(network: Network) -> &'static str {
    match network {
        Network::Mainnet => "a",
        Network::Testnet => "b",
    }
}

/// EIP-712 digest of the phantom agent for `action_hash`.
///
/// Domain: `Exchange`, version `1`, chain id 1337, zero verifying contract.
pub fn agent_digest(action_hash: B256, network: Network) -> B256 {
    let domain = eip712_domain! {
        name: "Exchange",
        version: "1",
        chain_id: 1337,
        verifying_contract: Address::ZERO,
    };
    Agent {
        source: agent_source(network).to_string(),
        connectionId: action_hash,
    }
    .eip712_signing_hash(&domain)
}

/// `{"r": "0x..", "s": "0x..", "v": 27|28}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSignature {
    pub r: String,
    pub s: String,
    pub v: u8,
}

impl From<&PrimitiveSignature> for ActionSignature {
    fn from(signature: &PrimitiveSignature) -> Self {
        Self {
            r: format!("0x{}", hex::encode(B256::from(signature.r()))),
            s: format!("0x{}", hex::encode(B256::from(signature.s()))),
            v: 27 + u8::from(signature.v()),
        }
    }
}

/// Sign an action with the identity's key.
///
/// An API wallet signs for its approved account directly, so no vault
/// address enters the hash.
pub async fn sign_l1_action(
    identity: &Identity,
    action: &Action,
    nonce: u64,
    network: Network,
) -> Result<ActionSignature, SignerError> {
    let digest = agent_digest(action_hash(action, nonce)?, network);
    let signature = identity.signer().sign_hash(&digest).await?;
    Ok(ActionSignature::from(&signature))
}
