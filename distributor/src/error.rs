//! Error vocabulary of a distribution run.

use std::fmt;
use thiserror::Error;
use tokenholder_chain::ChainError;
use tokenholder_types::{Receipt, TxHash, Wei};

/// A stage of the distribution run. The label is part of every surfaced error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Config,
    Connect,
    GasPrice,
    VaultBalance,
    Split,
    TokenHolderTransfer,
    BeneficiaryTransfer,
    SellVouchers,
    BuyVouchers,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config => "configuration",
            Self::Connect => "chain connection",
            Self::GasPrice => "gas price query",
            Self::VaultBalance => "vault balance query",
            Self::Split => "distribution split",
            Self::TokenHolderTransfer => "transfer to token holder contract",
            Self::BeneficiaryTransfer => "transfer to beneficiary",
            Self::SellVouchers => "sell vouchers",
            Self::BuyVouchers => "buy vouchers",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What went wrong, independent of where.
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("config error: {0}")]
    Config(String),

    #[error("chain query error: {0}")]
    ChainQuery(#[source] ChainError),

    #[error("insufficient funds: balance {balance} does not exceed fee reserve {fee_reserve}")]
    InsufficientFunds { balance: Wei, fee_reserve: Wei },

    #[error("submission error: {0}")]
    Submission(#[source] ChainError),

    #[error("transaction {hash} failed: {receipt}")]
    ReceiptFailed { hash: TxHash, receipt: Receipt },

    #[error("chain error while waiting for {hash}: {source}")]
    Chain { hash: TxHash, source: ChainError },

    #[error("cancelled{}", .hash.map(|h| format!(" while waiting for {h}")).unwrap_or_default())]
    Cancelled { hash: Option<TxHash> },
}

/// Outcome of a confirmation wait that did not confirm.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("transaction failed: {0}")]
    ReceiptFailed(Receipt),

    #[error("cancelled")]
    Cancelled,
}

impl DistributionError {
    /// Attach the hash of the transaction being waited on.
    pub fn from_wait(hash: TxHash, err: WaitError) -> Self {
        match err {
            WaitError::Chain(source) => Self::Chain { hash, source },
            WaitError::ReceiptFailed(receipt) => Self::ReceiptFailed { hash, receipt },
            WaitError::Cancelled => Self::Cancelled { hash: Some(hash) },
        }
    }
}

/// A transaction that was confirmed before the run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletedStep {
    pub stage: Stage,
    pub hash: TxHash,
}

/// The single failure value a run surfaces: which stage failed and why.
///
/// `completed` lists the steps already confirmed on chain. Those are not
/// rolled back; a non-empty list means the vault was partially distributed.
#[derive(Debug, Error)]
#[error("{stage} failed: {cause}")]
pub struct OrchestrationError {
    pub stage: Stage,
    #[source]
    pub cause: DistributionError,
    pub completed: Vec<CompletedStep>,
}

impl OrchestrationError {
    pub fn new(stage: Stage, cause: DistributionError) -> Self {
        Self {
            stage,
            cause,
            completed: Vec::new(),
        }
    }

    pub fn with_completed(mut self, completed: Vec<CompletedStep>) -> Self {
        self.completed = completed;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, DistributionError::Cancelled { .. })
    }

    pub fn is_partial(&self) -> bool {
        !self.completed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_leads_with_stage_label() {
        let err = OrchestrationError::new(
            Stage::BeneficiaryTransfer,
            DistributionError::Submission(ChainError::Other("nonce too low".into())),
        );
        assert_eq!(
            err.to_string(),
            "transfer to beneficiary failed: submission error: nonce too low"
        );
    }

    #[test]
    fn voucher_stages_use_method_labels() {
        assert_eq!(Stage::SellVouchers.label(), "sell vouchers");
        assert_eq!(Stage::BuyVouchers.label(), "buy vouchers");
        let err = OrchestrationError::new(
            Stage::BuyVouchers,
            DistributionError::Submission(ChainError::Other("reverted".into())),
        );
        assert_eq!(err.to_string(), "buy vouchers failed: submission error: reverted");
    }

    #[test]
    fn cancelled_mentions_pending_hash() {
        let bare = DistributionError::Cancelled { hash: None };
        assert_eq!(bare.to_string(), "cancelled");

        let waiting = DistributionError::Cancelled {
            hash: Some(TxHash::ZERO),
        };
        assert!(waiting.to_string().starts_with("cancelled while waiting for 0x"));
    }

    #[test]
    fn wait_errors_keep_the_hash() {
        let hash = TxHash::new([7u8; 32]);
        match DistributionError::from_wait(hash, WaitError::Chain(ChainError::Transport("reset".into()))) {
            DistributionError::Chain { hash: h, .. } => assert_eq!(h, hash),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            DistributionError::from_wait(hash, WaitError::Cancelled),
            DistributionError::Cancelled { hash: Some(_) }
        ));
    }
}
