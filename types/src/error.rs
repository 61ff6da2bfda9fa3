//! Parsing errors for externally supplied keys and addresses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },
}
