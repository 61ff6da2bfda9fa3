//! Fee-safe split of the vault balance.
//!
//! All arithmetic is exact unsigned integer arithmetic on [`Wei`]. The split
//! is a fixed one-third / two-thirds ratio computed from a single truncated
//! division, so the shares can never exceed what is left after the fee reserve.

use serde::{Deserialize, Serialize};
use tokenholder_types::{GasEstimate, Wei};

use crate::error::DistributionError;

/// Gas limit of a plain value transfer.
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

/// Number of transfers whose fees are reserved out of the balance.
pub const RESERVED_TRANSFER_COUNT: u64 = 2;

/// The primary share is `net / PRIMARY_SHARE_DIVISOR`.
pub const PRIMARY_SHARE_DIVISOR: u64 = 3;

/// The secondary share is `primary * SECONDARY_SHARE_MULTIPLIER`.
pub const SECONDARY_SHARE_MULTIPLIER: u64 = 2;

const _: () = assert!(SECONDARY_SHARE_MULTIPLIER < PRIMARY_SHARE_DIVISOR);

/// The computed distribution.
///
/// `remainder` is the truncation dust of the division. It is never
/// distributed and stays in the vault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitResult {
    pub fee_reserve: Wei,
    pub net_balance: Wei,
    pub primary_share: Wei,
    pub secondary_share: Wei,
    pub remainder: Wei,
}

/// Reserve fees for two transfers, then split the rest one-third / two-thirds.
///
/// Fails with [`DistributionError::InsufficientFunds`] unless the balance is
/// strictly greater than the fee reserve.
pub fn compute_distribution(
    raw_balance: Wei,
    gas: &GasEstimate,
) -> Result<SplitResult, DistributionError> {
    let fee_reserve = gas
        .fee_for(RESERVED_TRANSFER_COUNT)
        .ok_or(DistributionError::InsufficientFunds {
            balance: raw_balance,
            fee_reserve: Wei::MAX,
        })?;

    let net_balance = match raw_balance.checked_sub(fee_reserve) {
        Some(net) if !net.is_zero() => net,
        _ => {
            return Err(DistributionError::InsufficientFunds {
                balance: raw_balance,
                fee_reserve,
            })
        }
    };

    let (primary_share, remainder) = net_balance.div_rem(PRIMARY_SHARE_DIVISOR);
    // primary <= net / 3, so this never saturates.
    let secondary_share = primary_share
        .checked_mul(SECONDARY_SHARE_MULTIPLIER)
        .unwrap_or(Wei::MAX);

    Ok(SplitResult {
        fee_reserve,
        net_balance,
        primary_share,
        secondary_share,
        remainder,
    })
}
