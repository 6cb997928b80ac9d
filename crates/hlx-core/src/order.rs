//! Order-related types.
//!
//! Provides order side, kind, time-in-force and the fully resolved
//! order handed to the exchange client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::decimal::{Price, Size};
use crate::error::CoreError;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Map the `isBuy` input flag.
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy {
            Self::Buy
        } else {
            Self::Sell
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Self::Buy)
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Logical order kind requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    /// Limit order (default).
    #[default]
    Limit,
    /// Market-style order: slippage-padded IOC limit.
    Market,
}

impl FromStr for OrderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LIMIT" => Ok(Self::Limit),
            "MARKET" => Ok(Self::Market),
            _ => Err(CoreError::invalid(
                "orderType",
                format!("expected MARKET or LIMIT, got {s:?}"),
            )),
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "LIMIT"),
            Self::Market => write!(f, "MARKET"),
        }
    }
}

/// Time-in-force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled.
    #[default]
    #[serde(rename = "Gtc")]
    GoodTilCancelled,
    /// Immediate-or-cancel.
    #[serde(rename = "Ioc")]
    ImmediateOrCancel,
    /// Add-liquidity-only.
    #[serde(rename = "Alo")]
    AddLiquidityOnly,
}

impl TimeInForce {
    /// Exchange wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoodTilCancelled => "Gtc",
            Self::ImmediateOrCancel => "Ioc",
            Self::AddLiquidityOnly => "Alo",
        }
    }
}

impl FromStr for TimeInForce {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Gtc" => Ok(Self::GoodTilCancelled),
            "Ioc" => Ok(Self::ImmediateOrCancel),
            "Alo" => Ok(Self::AddLiquidityOnly),
            _ => Err(CoreError::invalid(
                "timeInForce",
                format!("expected Gtc, Ioc or Alo, got {s:?}"),
            )),
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully concrete order submitted to the exchange client.
///
/// Produced only by the order builder; `price` is always positive and
/// already rounded to policy precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOrder {
    pub asset: String,
    pub side: OrderSide,
    pub size: Size,
    pub price: Price,
    pub time_in_force: TimeInForce,
    pub reduce_only: bool,
}

impl ResolvedOrder {
    pub fn is_buy(&self) -> bool {
        self.side.is_buy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_kind_parse_case_insensitive() {
        assert_eq!("market".parse::<OrderKind>().unwrap(), OrderKind::Market);
        assert_eq!("LIMIT".parse::<OrderKind>().unwrap(), OrderKind::Limit);
        assert!("stop".parse::<OrderKind>().is_err());
    }

    #[test]
    fn test_time_in_force_parse() {
        assert_eq!(
            "Ioc".parse::<TimeInForce>().unwrap(),
            TimeInForce::ImmediateOrCancel
        );
        assert_eq!(
            "Alo".parse::<TimeInForce>().unwrap(),
            TimeInForce::AddLiquidityOnly
        );
        assert!("FOK".parse::<TimeInForce>().is_err());
    }

    #[test]
    fn test_time_in_force_default_is_gtc() {
        assert_eq!(TimeInForce::default(), TimeInForce::GoodTilCancelled);
        assert_eq!(TimeInForce::default().to_string(), "Gtc");
    }

    #[test]
    fn test_order_side_from_flag() {
        assert_eq!(OrderSide::from_is_buy(true), OrderSide::Buy);
        assert!(!OrderSide::from_is_buy(false).is_buy());
    }
}
