//! Confirmation wait for submitted transactions.
//!
//! `Pending -> {Confirmed, ReceiptFailed, Cancelled}`. A "not found" answer
//! keeps the wait pending (the transaction is still propagating); any other
//! query error ends it at once. Backends that only mine on demand are
//! committed once and checked once instead of polled.

use std::sync::Arc;
use std::time::Duration;
use tokenholder_chain::{BackendCapability, ChainClient};
use tokenholder_types::{Receipt, TxHash};

use crate::cancel::CancelToken;
use crate::error::WaitError;

/// Interval between receipt queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Polls a chain backend until a transaction resolves.
pub struct TransactionWaiter<C: ?Sized> {
    client: Arc<C>,
    capability: BackendCapability,
    poll_interval: Duration,
}

impl<C: ChainClient + ?Sized> TransactionWaiter<C> {
    /// The backend's capability is read once, here.
    pub fn new(client: Arc<C>) -> Self {
        let capability = client.capability();
        Self {
            client,
            capability,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn capability(&self) -> BackendCapability {
        self.capability
    }

    /// Wait until `hash` is confirmed with a successful status.
    pub async fn wait(&self, hash: TxHash, cancel: &CancelToken) -> Result<Receipt, WaitError> {
        tracing::info!(%hash, "waiting for transaction");
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        match self.capability {
            BackendCapability::ManualCommit => self.commit_and_check(hash).await,
            BackendCapability::Polling => self.poll(hash, cancel).await,
        }
    }

    async fn commit_and_check(&self, hash: TxHash) -> Result<Receipt, WaitError> {
        self.client.commit().await?;
        let receipt = self.client.transaction_receipt(hash).await?;
        check_status(receipt)
    }

    async fn poll(&self, hash: TxHash, cancel: &CancelToken) -> Result<Receipt, WaitError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let query = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WaitError::Cancelled),
                result = self.client.transaction_receipt(hash) => result,
            };

            match query {
                Ok(receipt) => {
                    tracing::debug!(%hash, attempt, "receipt found");
                    return check_status(receipt);
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(%hash, attempt, "transaction not yet mined");
                }
                Err(e) => return Err(WaitError::Chain(e)),
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WaitError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

fn check_status(receipt: Receipt) -> Result<Receipt, WaitError> {
    if receipt.is_success() {
        tracing::info!(hash = %receipt.tx_hash, block = ?receipt.block_number, "transaction confirmed");
        Ok(receipt)
    } else {
        tracing::warn!(hash = %receipt.tx_hash, "transaction failed on chain");
        Err(WaitError::ReceiptFailed(receipt))
    }
}
