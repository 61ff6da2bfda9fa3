//! Fundamental types for the token-holder distribution service.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! amounts, transaction hashes, gas parameters, transaction requests and receipts,
//! signing identities, and the trigger's event time.

pub mod address;
pub mod amount;
pub mod error;
pub mod gas;
pub mod hash;
pub mod keys;
pub mod time;
pub mod transaction;

pub use address::parse_address;
pub use alloy::primitives::{Address, Bytes};
pub use amount::Wei;
pub use error::ParseError;
pub use gas::GasEstimate;
pub use hash::TxHash;
pub use keys::SigningKey;
pub use time::EventTime;
pub use transaction::{Receipt, ReceiptStatus, TransactionRequest};
