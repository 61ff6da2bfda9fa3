//! Executes one on-chain step: submit, then wait for confirmation.
//!
//! Every failure is wrapped with the step's [`Stage`], so the label of the
//! failing transfer or call is part of the error the caller sees.

use async_trait::async_trait;
use std::sync::Arc;
use tokenholder_chain::{ChainClient, ContractCall};
use tokenholder_types::{Address, GasEstimate, SigningKey, TransactionRequest, TxHash, Wei};
use tracing::Instrument;

use crate::cancel::CancelToken;
use crate::error::{DistributionError, OrchestrationError, Stage};
use crate::spans::wait_span;
use crate::waiter::TransactionWaiter;

/// Runs the orchestrator's on-chain steps.
///
/// Both operations return only after the transaction is confirmed.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute_transfer(
        &self,
        stage: Stage,
        signer: &SigningKey,
        to: Address,
        value: Wei,
        gas: &GasEstimate,
        cancel: &CancelToken,
    ) -> Result<TxHash, OrchestrationError>;

    async fn execute_contract_call(
        &self,
        stage: Stage,
        signer: &SigningKey,
        call: ContractCall,
        cancel: &CancelToken,
    ) -> Result<TxHash, OrchestrationError>;
}

/// The production executor: submits through a [`ChainClient`] and waits
/// with a [`TransactionWaiter`].
pub struct ChainStepExecutor<C: ?Sized> {
    client: Arc<C>,
    waiter: TransactionWaiter<C>,
}

impl<C: ChainClient + ?Sized> ChainStepExecutor<C> {
    pub fn new(client: Arc<C>) -> Self {
        let waiter = TransactionWaiter::new(Arc::clone(&client));
        Self { client, waiter }
    }

    pub fn with_waiter(client: Arc<C>, waiter: TransactionWaiter<C>) -> Self {
        Self { client, waiter }
    }

    async fn submit_and_wait(
        &self,
        stage: Stage,
        signer: &SigningKey,
        request: TransactionRequest,
        cancel: &CancelToken,
    ) -> Result<TxHash, OrchestrationError> {
        let hash = self
            .client
            .send_transaction(signer, &request)
            .await
            .map_err(|e| OrchestrationError::new(stage, DistributionError::Submission(e)))?;
        tracing::info!(%stage, %hash, to = %request.to, "transaction submitted");

        self.waiter
            .wait(hash, cancel)
            .instrument(wait_span(&hash))
            .await
            .map_err(|e| OrchestrationError::new(stage, DistributionError::from_wait(hash, e)))?;
        Ok(hash)
    }
}

#[async_trait]
impl<C: ChainClient + ?Sized> StepExecutor for ChainStepExecutor<C> {
    async fn execute_transfer(
        &self,
        stage: Stage,
        signer: &SigningKey,
        to: Address,
        value: Wei,
        gas: &GasEstimate,
        cancel: &CancelToken,
    ) -> Result<TxHash, OrchestrationError> {
        let request = TransactionRequest::transfer(signer.address(), to, value, gas);
        self.submit_and_wait(stage, signer, request, cancel).await
    }

    async fn execute_contract_call(
        &self,
        stage: Stage,
        signer: &SigningKey,
        call: ContractCall,
        cancel: &CancelToken,
    ) -> Result<TxHash, OrchestrationError> {
        tracing::debug!(%stage, method = %call.method, contract = %call.contract, "calling contract");
        let request = call.to_request(signer.address());
        self.submit_and_wait(stage, signer, request, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenholder_chain::VoucherMethod;
    use tokenholder_nullables::{NullChain, ReceiptResponse};

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn key() -> SigningKey {
        SigningKey::from_hex(DEV_KEY).unwrap()
    }

    fn gas() -> GasEstimate {
        GasEstimate::new(Wei::from(10u64), 21_000)
    }

    #[tokio::test]
    async fn transfer_submits_and_confirms() {
        let chain = Arc::new(NullChain::new());
        let executor = ChainStepExecutor::new(chain.clone());
        let to = Address::repeat_byte(0x42);

        let hash = executor
            .execute_transfer(Stage::TokenHolderTransfer, &key(), to, Wei::from(100u64), &gas(), &CancelToken::never())
            .await
            .unwrap();

        assert_eq!(hash, NullChain::tx_hash(0));
        let sent = chain.submissions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, to);
        assert_eq!(sent[0].value, Some(Wei::from(100u64)));
        assert_eq!(sent[0].gas_price, Some(Wei::from(10u64)));
        assert_eq!(sent[0].gas_limit, Some(21_000));
    }

    #[tokio::test]
    async fn contract_call_carries_calldata() {
        let chain = Arc::new(NullChain::new());
        let executor = ChainStepExecutor::new(chain.clone());
        let call = ContractCall::new(Address::repeat_byte(0x11), VoucherMethod::SellVouchers);

        executor
            .execute_contract_call(Stage::SellVouchers, &key(), call, &CancelToken::never())
            .await
            .unwrap();

        let sent = chain.submissions();
        assert_eq!(sent[0].data, Some(VoucherMethod::SellVouchers.calldata()));
        assert!(sent[0].value.is_none());
    }

    #[tokio::test]
    async fn submission_failure_is_labelled() {
        let chain = Arc::new(NullChain::new());
        chain.fail_submission(0, "insufficient funds for gas");
        let executor = ChainStepExecutor::new(chain.clone());

        let err = executor
            .execute_transfer(Stage::BeneficiaryTransfer, &key(), Address::ZERO, Wei::from(1u64), &gas(), &CancelToken::never())
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::BeneficiaryTransfer);
        assert!(matches!(err.cause, DistributionError::Submission(_)));
        assert!(err.to_string().starts_with("transfer to beneficiary failed"));
        assert_eq!(chain.receipt_queries(), 0);
    }

    #[tokio::test]
    async fn reverted_call_is_labelled_with_hash() {
        let chain = Arc::new(NullChain::new());
        chain.script_receipts(0, vec![ReceiptResponse::Failed]);
        let executor = ChainStepExecutor::new(chain.clone());
        let call = ContractCall::new(Address::repeat_byte(0x11), VoucherMethod::BuyVouchers);

        let err = executor
            .execute_contract_call(Stage::BuyVouchers, &key(), call, &CancelToken::never())
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::BuyVouchers);
        match err.cause {
            DistributionError::ReceiptFailed { hash, .. } => assert_eq!(hash, NullChain::tx_hash(0)),
            other => panic!("unexpected cause: {other:?}"),
        }
    }
}
