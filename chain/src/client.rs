//! The chain-client collaborator.

use async_trait::async_trait;
use tokenholder_types::{Address, Receipt, SigningKey, TransactionRequest, TxHash, Wei};

use crate::ChainError;

/// How a backend makes submitted transactions final.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendCapability {
    /// Blocks are produced independently; receipts must be polled for.
    Polling,
    /// Nothing is mined until [`ChainClient::commit`] is called.
    /// Only deterministic test backends report this.
    ManualCommit,
}

/// Everything the orchestrator needs from a chain node.
///
/// Nonces belong to the implementation: callers never pass one.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Currently suggested gas price.
    async fn suggest_gas_price(&self) -> Result<Wei, ChainError>;

    /// Latest balance of `address`.
    async fn balance_at(&self, address: Address) -> Result<Wei, ChainError>;

    /// Sign `request` with `signer` and submit it.
    async fn send_transaction(
        &self,
        signer: &SigningKey,
        request: &TransactionRequest,
    ) -> Result<TxHash, ChainError>;

    /// Receipt of a mined transaction, or [`ChainError::NotFound`] while it is pending.
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Receipt, ChainError>;

    fn capability(&self) -> BackendCapability {
        BackendCapability::Polling
    }

    /// Mine everything pending. Only meaningful for [`BackendCapability::ManualCommit`].
    async fn commit(&self) -> Result<(), ChainError> {
        Err(ChainError::Unsupported("manual commit"))
    }
}
