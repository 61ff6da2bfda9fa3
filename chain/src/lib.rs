//! Chain access for the distribution service.
//!
//! The orchestrator only ever talks to a [`ChainClient`]. This crate defines
//! that trait, a JSON-RPC implementation for Ethereum-compatible nodes, and
//! the binding for the token-holder contract's voucher operations.

pub mod client;
pub mod contract;
pub mod error;
pub mod rpc;
pub mod signing;

pub use client::{BackendCapability, ChainClient};
pub use contract::{ContractCall, VoucherMethod};
pub use error::ChainError;
pub use rpc::JsonRpcClient;
