//! Currency amounts in the chain's smallest unit.
//!
//! Amounts are unsigned 256-bit integers so balances, fee reserves and shares
//! never lose precision and never go negative.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of native currency in wei.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Wei(U256);

impl Wei {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const MAX: Self = Self(U256::MAX);

    pub fn new(raw: U256) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn checked_mul(self, factor: u64) -> Option<Self> {
        self.0.checked_mul(U256::from(factor)).map(Self)
    }

    /// Integer division, truncating toward zero. Returns the quotient and remainder.
    pub fn div_rem(self, divisor: u64) -> (Self, Self) {
        let divisor = U256::from(divisor);
        (Self(self.0 / divisor), Self(self.0 % divisor))
    }

    /// Narrow to `u128`, as needed by legacy transaction fields.
    pub fn to_u128(self) -> Option<u128> {
        if self.0 > U256::from(u128::MAX) {
            None
        } else {
            Some(self.0.to::<u128>())
        }
    }
}

impl From<u64> for Wei {
    fn from(raw: u64) -> Self {
        Self(U256::from(raw))
    }
}

impl From<u128> for Wei {
    fn from(raw: u128) -> Self {
        Self(U256::from(raw))
    }
}

impl From<U256> for Wei {
    fn from(raw: U256) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}
