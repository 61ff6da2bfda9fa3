//! Nullable infrastructure for deterministic testing.
//!
//! The chain is the only external dependency of the distributor, and it is
//! already abstracted behind [`tokenholder_chain::ChainClient`]. This crate
//! provides a test-friendly implementation that:
//! - Returns deterministic hashes, prices and balances
//! - Can be scripted per transaction (pending, reverted, query errors)
//! - Records everything submitted for later assertions
//! - Never touches the network
//!
//! Usage: swap `JsonRpcClient` for `NullChain` in tests.

pub mod chain;

pub use chain::{NullChain, ReceiptResponse};
