use proptest::prelude::*;

use tokenholder_distributor::{compute_distribution, DistributionError};
use tokenholder_types::{GasEstimate, Wei};

proptest! {
    /// Above the fee reserve the shares never exceed the net balance and the
    /// secondary share is exactly twice the primary.
    #[test]
    fn shares_fit_in_net_balance(
        price in 0u64..1_000_000_000_000,
        limit in 0u64..1_000_000,
        excess in 1u128..u128::MAX / 2,
    ) {
        let gas = GasEstimate::new(Wei::from(price), limit);
        let reserve = price as u128 * limit as u128 * 2;
        let balance = Wei::from(reserve + excess);

        let split = compute_distribution(balance, &gas).unwrap();

        prop_assert_eq!(split.fee_reserve, Wei::from(reserve));
        prop_assert_eq!(split.net_balance, Wei::from(excess));
        prop_assert_eq!(split.secondary_share, split.primary_share.checked_mul(2).unwrap());
        let distributed = split.primary_share.checked_add(split.secondary_share).unwrap();
        prop_assert!(distributed <= split.net_balance);
        prop_assert_eq!(distributed.checked_add(split.remainder), Some(split.net_balance));
        prop_assert!(split.remainder < Wei::from(3u64));
    }

    /// At or below the fee reserve every balance is insufficient.
    #[test]
    fn balance_within_reserve_is_insufficient(
        price in 0u64..1_000_000_000_000,
        limit in 0u64..1_000_000,
        shortfall_pct in 0u64..=100,
    ) {
        let gas = GasEstimate::new(Wei::from(price), limit);
        let reserve = price as u128 * limit as u128 * 2;
        let balance = Wei::from(reserve - reserve * shortfall_pct as u128 / 100);

        let is_insufficient = matches!(
            compute_distribution(balance, &gas),
            Err(DistributionError::InsufficientFunds { .. })
        );
        prop_assert!(is_insufficient);
    }
}
