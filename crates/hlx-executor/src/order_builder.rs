//! Assembles the concrete order handed to the exchange client.

use hlx_core::{OrderRequest, Price, ResolvedOrder, TimeInForce};

use crate::error::{ExecutorError, ExecutorResult};
use crate::identity::Identity;

/// Signed-for order ready for submission.
#[derive(Debug)]
pub struct OrderSubmission<'a> {
    pub identity: &'a Identity,
    pub order: ResolvedOrder,
}

/// Reject requests that could never produce a valid order.
///
/// Runs before any network access so bad input costs no round-trips.
pub fn validate_request(request: &OrderRequest) -> ExecutorResult<()> {
    if request.asset.trim().is_empty() {
        return Err(ExecutorError::Validation("asset must not be empty".to_string()));
    }
    if !request.size.is_positive() {
        return Err(ExecutorError::Validation(format!(
            "size must be positive, got {}",
            request.size
        )));
    }
    Ok(())
}

/// Combine identity, resolved price and time-in-force with the request.
///
/// # Errors
/// `Validation` on an empty asset or a non-positive size or price.
pub fn build<'a>(
    identity: &'a Identity,
    price: Price,
    time_in_force: TimeInForce,
    request: &OrderRequest,
) -> ExecutorResult<OrderSubmission<'a>> {
    validate_request(request)?;
    if !price.is_positive() {
        return Err(ExecutorError::Validation(format!(
            "price must be positive, got {price}"
        )));
    }

    Ok(OrderSubmission {
        identity,
        order: ResolvedOrder {
            asset: request.asset.clone(),
            side: request.side,
            size: request.size,
            price,
            time_in_force,
            reduce_only: request.reduce_only,
        },
    })
}
