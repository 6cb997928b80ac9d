//! Identity resolution: which key signs, which account trades.
//!
//! Credentials are resolved once at the top of request handling into an
//! [`Identity`]; downstream components never see raw credential fields.
//!
//! Security notes:
//! - Secret bytes live in `Zeroizing` buffers only for the duration of derivation.
//! - Error messages name the offending field, never its value.
//! - Never log private key material.

use std::fmt;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use hlx_core::Credentials;
use hlx_telemetry::{mask_address, DiagnosticRecord, Diagnostics, Level};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use zeroize::Zeroizing;

/// Key resolution errors.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("no private key provided (neither apiWalletPrivateKey nor hyperliquidPrivateKey)")]
    NoPrivateKey,

    #[error("no account address provided (hyperliquidAddress is required with apiWalletPrivateKey)")]
    NoAccountAddress,

    #[error("{0} is not valid hex")]
    HexDecode(&'static str),

    #[error("{0} is not a valid secp256k1 private key")]
    InvalidKey(&'static str),

    #[error("hyperliquidAddress is not a valid address: {0}")]
    InvalidAddress(String),
}

/// Identity mode chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMode {
    /// Secret signs for its own account.
    Direct,
    /// API wallet secret acting for a separately supplied account.
    Delegated,
}

impl fmt::Display for IdentityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Delegated => write!(f, "api_wallet"),
        }
    }
}

/// Resolved signing capability bound to a trading account.
pub enum Identity {
    Direct {
        signer: PrivateKeySigner,
        account: Address,
    },
    Delegated {
        signer: PrivateKeySigner,
        account: Address,
    },
}

impl Identity {
    pub fn signer(&self) -> &PrivateKeySigner {
        match self {
            Self::Direct { signer, .. } | Self::Delegated { signer, .. } => signer,
        }
    }

    /// Account every order and cancel is attributed to.
    pub fn account(&self) -> Address {
        match self {
            Self::Direct { account, .. } | Self::Delegated { account, .. } => *account,
        }
    }

    /// Address derived from the signing key.
    pub fn signer_address(&self) -> Address {
        self.signer().address()
    }

    pub fn mode(&self) -> IdentityMode {
        match self {
            Self::Direct { .. } => IdentityMode::Direct,
            Self::Delegated { .. } => IdentityMode::Delegated,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("mode", &self.mode())
            .field("account", &self.account())
            .finish_non_exhaustive()
    }
}

/// Resolve credentials into an identity.
///
/// An API wallet secret takes precedence over a direct secret. The
/// delegated branch requires `hyperliquidAddress`; the direct branch uses
/// it as the account, falling back to the derived address when absent.
pub fn resolve_identity(
    credentials: &Credentials,
    diagnostics: &dyn Diagnostics,
) -> Result<Identity, KeyError> {
    let address = credentials
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    let identity = if let Some(secret) = credentials.api_wallet_private_key.as_ref() {
        let account = parse_address(address.ok_or(KeyError::NoAccountAddress)?)?;
        let signer = signer_from_secret(secret, "apiWalletPrivateKey")?;
        Identity::Delegated { signer, account }
    } else if let Some(secret) = credentials.private_key.as_ref() {
        let signer = signer_from_secret(secret, "hyperliquidPrivateKey")?;
        let account = match address {
            Some(a) => parse_address(a)?,
            None => signer.address(),
        };
        if signer.address() != account {
            diagnostics.record(
                DiagnosticRecord::new(
                    Level::Warn,
                    "identity_address_mismatch",
                    "hyperliquidPrivateKey does not derive hyperliquidAddress",
                )
                .field("expected", mask_address(&account.to_string()))
                .field("derived", mask_address(&signer.address().to_string())),
            );
        }
        Identity::Direct { signer, account }
    } else {
        return Err(KeyError::NoPrivateKey);
    };

    let message = match identity.mode() {
        IdentityMode::Direct => "Using main wallet",
        IdentityMode::Delegated => "Using API wallet to trade on behalf of account",
    };
    diagnostics.record(
        DiagnosticRecord::new(Level::Info, "identity_resolved", message)
            .field("mode", identity.mode())
            .field("account", mask_address(&identity.account().to_string())),
    );

    Ok(identity)
}

/// Strip the `0x` prefix and surrounding whitespace, hex-decode, derive the signer.
fn signer_from_secret(
    secret: &SecretString,
    field: &'static str,
) -> Result<PrivateKeySigner, KeyError> {
    let bytes = Zeroizing::new(
        hex::decode(normalize_secret(secret.expose_secret())).map_err(|_| KeyError::HexDecode(field))?,
    );
    PrivateKeySigner::from_slice(&bytes).map_err(|_| KeyError::InvalidKey(field))
}

/// `0x`-prefixed or bare hex -> bare hex.
pub(crate) fn normalize_secret(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

fn parse_address(raw: &str) -> Result<Address, KeyError> {
    raw.parse::<Address>()
        .map_err(|_| KeyError::InvalidAddress(mask_address(raw)))
}
