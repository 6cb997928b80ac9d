//! Exact decimal newtypes for prices and sizes.
//!
//! Both wrap `rust_decimal::Decimal` so the two can't be mixed up in
//! arithmetic. Wire strings carry no trailing zeros.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! decimal_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Decimal);

        impl $name {
            pub const ZERO: Self = Self(Decimal::ZERO);

            #[inline]
            pub fn new(value: Decimal) -> Self {
                Self(value)
            }

            #[inline]
            pub fn inner(&self) -> Decimal {
                self.0
            }

            /// Strictly greater than zero.
            #[inline]
            pub fn is_positive(&self) -> bool {
                self.0 > Decimal::ZERO
            }

            /// `2010.00` -> `"2010"`, `0.5000` -> `"0.5"`.
            pub fn to_wire(&self) -> String {
                self.0.normalize().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = rust_decimal::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_decimal(s).map(Self)
            }
        }

        impl From<Decimal> for $name {
            fn from(value: Decimal) -> Self {
                Self(value)
            }
        }
    };
}

decimal_newtype!(
    /// Limit or reference price.
    Price
);

decimal_newtype!(
    /// Order quantity in base units.
    Size
);

impl Price {
    /// Round half-to-even to `decimals` places, then pad so exactly that
    /// many digits are carried (`2010` -> `2010.00`).
    pub fn round_dp_exact(&self, decimals: u32) -> Self {
        let mut value = self
            .0
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
        value.rescale(decimals);
        Self(value)
    }
}

/// Parse plain (`"2000.5"`) or scientific (`"1e-5"`) decimal text.
pub fn parse_decimal(text: &str) -> Result<Decimal, rust_decimal::Error> {
    let text = text.trim();
    match Decimal::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) if text.contains(['e', 'E']) => Decimal::from_scientific(text),
        Err(e) => Err(e),
    }
}
