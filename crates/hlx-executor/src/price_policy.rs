//! Execution price and time-in-force policy.
//!
//! Market-style requests (kind = market, or a limit without an explicit
//! price) are priced off the mid with a fixed slippage offset and sent IOC
//! so the padded price crosses the book. Every price, whatever its source,
//! is then rounded to
//! the policy precision: `high_price_decimals` above `high_price_threshold`,
//! `low_price_decimals` otherwise.
//!
//! These thresholds approximate the exchange's significant-figure rule.
//! They are not per-asset tick sizes.
// TODO: source per-asset tick sizes from the meta endpoint (szDecimals / max price decimals)

use hlx_core::{OrderKind, OrderRequest, OrderSide, Price, TimeInForce};
use hlx_telemetry::{DiagnosticRecord, Diagnostics, Level};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ExecutorError, ExecutorResult};
use crate::market_data::MarketData;

const BPS_DENOMINATOR: u32 = 10_000;
const MAX_DECIMALS: u32 = 8;

/// Configurable pricing policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricePolicy {
    /// Slippage applied to the mid for market-style orders (50 = 0.5%).
    pub slippage_bps: u32,
    /// Prices strictly above this use `high_price_decimals`.
    pub high_price_threshold: Decimal,
    pub high_price_decimals: u32,
    pub low_price_decimals: u32,
}

impl Default for PricePolicy {
    fn default() -> Self {
        Self {
            slippage_bps: 50,
            high_price_threshold: Decimal::ONE_HUNDRED,
            high_price_decimals: 2,
            low_price_decimals: 4,
        }
    }
}

/// Output of [`PricePolicy::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPricing {
    pub price: Price,
    pub time_in_force: TimeInForce,
    /// Mid price the order was priced from, if any.
    pub reference: Option<Price>,
}

impl PricePolicy {
    /// Check the policy is usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.slippage_bps >= BPS_DENOMINATOR {
            return Err(format!(
                "slippage_bps must be below {BPS_DENOMINATOR}, got {}",
                self.slippage_bps
            ));
        }
        if self.high_price_threshold <= Decimal::ZERO {
            return Err(format!(
                "high_price_threshold must be positive, got {}",
                self.high_price_threshold
            ));
        }
        if self.high_price_decimals > MAX_DECIMALS || self.low_price_decimals > MAX_DECIMALS {
            return Err(format!("price decimals must be at most {MAX_DECIMALS}"));
        }
        Ok(())
    }

    /// Whether the request must be priced off the mid.
    pub fn needs_reference_price(&self, request: &OrderRequest) -> bool {
        request.kind == OrderKind::Market || request.price.is_none()
    }

    /// Multiplier applied to the mid: `1 + s` for buys, `1 - s` for sells.
    pub fn slippage_factor(&self, side: OrderSide) -> Decimal {
        let slippage = Decimal::from(self.slippage_bps) / Decimal::from(BPS_DENOMINATOR);
        match side {
            OrderSide::Buy => Decimal::ONE + slippage,
            OrderSide::Sell => Decimal::ONE - slippage,
        }
    }

    /// # Errors
    /// `MarketData` when the padded mid overflows the decimal range.
    pub fn apply_slippage(&self, reference: Price, side: OrderSide) -> ExecutorResult<Price> {
        reference
            .inner()
            .checked_mul(self.slippage_factor(side))
            .map(Price::new)
            .ok_or_else(|| {
                ExecutorError::MarketData(format!("reference price out of range: {reference}"))
            })
    }

    /// Round to policy precision; the result carries exactly that many decimals.
    pub fn round(&self, price: Price) -> Price {
        let decimals = if price.inner() > self.high_price_threshold {
            self.high_price_decimals
        } else {
            self.low_price_decimals
        };
        price.round_dp_exact(decimals)
    }

    /// Market orders are always IOC. A limit priced off the mid keeps the
    /// caller's TIF or falls back to IOC; an explicit limit falls back to GTC.
    pub fn time_in_force(&self, request: &OrderRequest) -> TimeInForce {
        match (request.kind, request.time_in_force) {
            (OrderKind::Market, _) => TimeInForce::ImmediateOrCancel,
            (OrderKind::Limit, Some(requested)) => requested,
            (OrderKind::Limit, None) if self.needs_reference_price(request) => {
                TimeInForce::ImmediateOrCancel
            }
            (OrderKind::Limit, None) => TimeInForce::GoodTilCancelled,
        }
    }

    /// Resolve the final price and time-in-force for a request.
    ///
    /// Performs at most one mid-price fetch.
    ///
    /// # Errors
    /// - `MarketData` when the mid is needed but the asset is not in the feed,
    ///   or the padded mid overflows
    /// - `Validation` when the resolved price is not positive
    pub async fn resolve(
        &self,
        request: &OrderRequest,
        market: &MarketData<'_>,
        diagnostics: &dyn Diagnostics,
    ) -> ExecutorResult<ResolvedPricing> {
        let (unrounded, reference) = match request.price {
            Some(explicit) if !self.needs_reference_price(request) => (explicit, None),
            _ => {
                let mid = market.reference_price(&request.asset, request.network).await?;
                (self.apply_slippage(mid, request.side)?, Some(mid))
            }
        };

        let price = self.round(unrounded);
        if !price.is_positive() {
            return Err(ExecutorError::Validation(format!(
                "price must be positive, got {price}"
            )));
        }

        let time_in_force = self.time_in_force(request);

        let mut record = DiagnosticRecord::new(Level::Info, "price_resolved", "Resolved order price")
            .field("kind", request.kind)
            .field("price", price)
            .field("tif", time_in_force);
        if let Some(mid) = reference {
            record = record
                .field("mid", mid)
                .field("slippage_bps", self.slippage_bps);
        }
        diagnostics.record(record);

        Ok(ResolvedPricing {
            price,
            time_in_force,
            reference,
        })
    }
}
