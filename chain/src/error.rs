use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// The queried item (usually a receipt) does not exist yet.
    #[error("not found")]
    NotFound,

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("{0}")]
    Other(String),
}

impl ChainError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
