//! Transaction hash returned by submission and used to poll for a receipt.

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(B256);

impl TxHash {
    pub const ZERO: Self = Self(B256::ZERO);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }
}

impl From<B256> for TxHash {
    fn from(hash: B256) -> Self {
        Self(hash)
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.0)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
