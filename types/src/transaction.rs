//! Transaction requests and receipts exchanged with the chain client.

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{GasEstimate, TxHash, Wei};

/// A transaction ready to be signed and submitted.
///
/// Gas fields left as `None` are filled in by the chain client (current
/// suggested price, estimated limit).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: Option<Wei>,
    pub data: Option<Bytes>,
    pub gas_price: Option<Wei>,
    pub gas_limit: Option<u64>,
}

impl TransactionRequest {
    /// A plain value transfer with explicit gas parameters.
    pub fn transfer(from: Address, to: Address, value: Wei, gas: &GasEstimate) -> Self {
        Self {
            from,
            to,
            value: Some(value),
            data: None,
            gas_price: Some(gas.gas_price),
            gas_limit: Some(gas.gas_limit),
        }
    }

    /// A contract call carrying an encoded payload and no value.
    pub fn call(from: Address, to: Address, data: Bytes) -> Self {
        Self {
            from,
            to,
            value: None,
            data: Some(data),
            gas_price: None,
            gas_limit: None,
        }
    }
}

/// Execution status recorded in a receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Failed,
}

/// The ledger's record of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub status: ReceiptStatus,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx {} status {:?}", self.tx_hash, self.status)?;
        if let Some(block) = self.block_number {
            write!(f, " in block {block}")?;
        }
        write!(f, ", gas used {}", self.gas_used)
    }
}
