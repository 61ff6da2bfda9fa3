//! Binding for the token-holder program contract.
//!
//! Only the two zero-argument voucher operations are used; each becomes a
//! plain contract-call [`TransactionRequest`] signed by the processing key.

use alloy::sol;
use alloy::sol_types::SolCall;
use std::fmt;
use tokenholder_types::{Address, Bytes, TransactionRequest};

sol! {
    interface ITokenHolderProgram {
        function sellVouchers() external;
        function buyVouchers() external;
    }
}

/// A voucher operation on the token-holder contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoucherMethod {
    SellVouchers,
    BuyVouchers,
}

impl VoucherMethod {
    /// ABI-encoded call payload.
    pub fn calldata(&self) -> Bytes {
        match self {
            Self::SellVouchers => ITokenHolderProgram::sellVouchersCall {}.abi_encode().into(),
            Self::BuyVouchers => ITokenHolderProgram::buyVouchersCall {}.abi_encode().into(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SellVouchers => "sellVouchers",
            Self::BuyVouchers => "buyVouchers",
        }
    }
}

impl fmt::Display for VoucherMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A voucher operation bound to a deployed contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractCall {
    pub contract: Address,
    pub method: VoucherMethod,
}

impl ContractCall {
    pub fn new(contract: Address, method: VoucherMethod) -> Self {
        Self { contract, method }
    }

    /// Build the submittable transaction for the given sender.
    pub fn to_request(&self, from: Address) -> TransactionRequest {
        TransactionRequest::call(from, self.contract, self.method.calldata())
    }
}
