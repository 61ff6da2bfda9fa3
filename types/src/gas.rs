//! Gas parameters for a distribution run.

use serde::{Deserialize, Serialize};

use crate::Wei;

/// Fee rate and per-transaction fee-unit budget.
///
/// The price is fetched fresh from the chain on every run; the limit is fixed
/// by configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimate {
    pub gas_price: Wei,
    pub gas_limit: u64,
}

impl GasEstimate {
    pub fn new(gas_price: Wei, gas_limit: u64) -> Self {
        Self {
            gas_price,
            gas_limit,
        }
    }

    /// Maximum fee of `count` transactions at this price and limit.
    /// `None` on overflow.
    pub fn fee_for(&self, count: u64) -> Option<Wei> {
        self.gas_price
            .checked_mul(self.gas_limit)?
            .checked_mul(count)
    }
}
