//! The distribution run.
//!
//! Strictly sequential: gas price, vault balance, split, then four on-chain
//! steps, each confirmed before the next is submitted. The first failure ends
//! the run. Confirmed steps are never compensated; they are reported on the
//! error instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokenholder_chain::{ChainClient, ContractCall, VoucherMethod};
use tokenholder_types::{Address, EventTime, GasEstimate, TxHash, Wei};
use tracing::Instrument;

use crate::cancel::CancelToken;
use crate::config::Credentials;
use crate::error::{CompletedStep, DistributionError, OrchestrationError, Stage};
use crate::executor::StepExecutor;
use crate::spans::{run_span, step_span};
use crate::splitter::{compute_distribution, SplitResult};

/// What the trigger supplies for one run.
#[derive(Clone)]
pub struct TriggerContext {
    pub event_time: EventTime,
    pub cancel: CancelToken,
}

impl TriggerContext {
    pub fn new(event_time: EventTime, cancel: CancelToken) -> Self {
        Self { event_time, cancel }
    }
}

/// Steps 1-3 of a run: everything decided before the first submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionPlan {
    pub vault: Address,
    pub gas: GasEstimate,
    pub balance: Wei,
    pub split: SplitResult,
}

impl fmt::Display for DistributionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vault:              {}", self.vault)?;
        writeln!(f, "balance:            {}", self.balance)?;
        writeln!(f, "gas price:          {}", self.gas.gas_price)?;
        writeln!(f, "gas limit:          {}", self.gas.gas_limit)?;
        writeln!(f, "fee reserve:        {}", self.split.fee_reserve)?;
        writeln!(f, "token holder share: {}", self.split.primary_share)?;
        writeln!(f, "beneficiary share:  {}", self.split.secondary_share)?;
        write!(f, "undistributed:      {}", self.split.remainder)
    }
}

/// The success message of a run.
pub fn success_message(event_time: &EventTime) -> String {
    format!("distribution completed at {event_time}")
}

/// Sequences one distribution run.
pub struct Orchestrator<C: ?Sized, E> {
    client: Arc<C>,
    executor: E,
    credentials: Credentials,
    gas_limit: u64,
}

impl<C: ChainClient + ?Sized, E: StepExecutor> Orchestrator<C, E> {
    pub fn new(client: Arc<C>, executor: E, credentials: Credentials, gas_limit: u64) -> Self {
        Self {
            client,
            executor,
            credentials,
            gas_limit,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Fetch gas price and vault balance and compute the split, without
    /// submitting anything.
    pub async fn plan(&self) -> Result<DistributionPlan, OrchestrationError> {
        let gas_price = self
            .client
            .suggest_gas_price()
            .await
            .map_err(|e| OrchestrationError::new(Stage::GasPrice, DistributionError::ChainQuery(e)))?;
        let gas = GasEstimate::new(gas_price, self.gas_limit);

        let vault = self.credentials.vault.address();
        let balance = self
            .client
            .balance_at(vault)
            .await
            .map_err(|e| OrchestrationError::new(Stage::VaultBalance, DistributionError::ChainQuery(e)))?;

        let split = compute_distribution(balance, &gas)
            .map_err(|e| OrchestrationError::new(Stage::Split, e))?;
        tracing::info!(
            %vault,
            %balance,
            gas_price = %gas.gas_price,
            fee_reserve = %split.fee_reserve,
            primary = %split.primary_share,
            secondary = %split.secondary_share,
            "computed distribution"
        );
        if !split.remainder.is_zero() {
            tracing::info!(remainder = %split.remainder, "truncation remainder left in vault");
        }

        Ok(DistributionPlan {
            vault,
            gas,
            balance,
            split,
        })
    }

    /// Run the whole distribution and return the success message.
    pub async fn run(&self, trigger: &TriggerContext) -> Result<String, OrchestrationError> {
        self.run_steps(trigger)
            .instrument(run_span(&trigger.event_time))
            .await
    }

    async fn run_steps(&self, trigger: &TriggerContext) -> Result<String, OrchestrationError> {
        let cancel = &trigger.cancel;
        let plan = self.plan().await?;
        let mut completed = Vec::new();

        let token_holder = self.credentials.token_holder_contract;
        let beneficiary = self.credentials.beneficiary;
        let vault = &self.credentials.vault;
        let processing = &self.credentials.processing;

        let stage = Stage::TokenHolderTransfer;
        let hash = self
            .guarded(stage, cancel, &completed, async {
                self.executor
                    .execute_transfer(stage, vault, token_holder, plan.split.primary_share, &plan.gas, cancel)
                    .await
            })
            .await?;
        completed.push(CompletedStep { stage, hash });

        let stage = Stage::BeneficiaryTransfer;
        let hash = self
            .guarded(stage, cancel, &completed, async {
                self.executor
                    .execute_transfer(stage, vault, beneficiary, plan.split.secondary_share, &plan.gas, cancel)
                    .await
            })
            .await?;
        completed.push(CompletedStep { stage, hash });

        let stage = Stage::SellVouchers;
        let call = ContractCall::new(token_holder, VoucherMethod::SellVouchers);
        let hash = self
            .guarded(stage, cancel, &completed, async {
                self.executor
                    .execute_contract_call(stage, processing, call, cancel)
                    .await
            })
            .await?;
        completed.push(CompletedStep { stage, hash });

        let stage = Stage::BuyVouchers;
        let call = ContractCall::new(token_holder, VoucherMethod::BuyVouchers);
        let hash = self
            .guarded(stage, cancel, &completed, async {
                self.executor
                    .execute_contract_call(stage, processing, call, cancel)
                    .await
            })
            .await?;
        completed.push(CompletedStep { stage, hash });

        tracing::info!(steps = completed.len(), "distribution completed");
        Ok(success_message(&trigger.event_time))
    }

    /// Run one step unless already cancelled, attaching the confirmed steps
    /// to any failure.
    async fn guarded<F>(
        &self,
        stage: Stage,
        cancel: &CancelToken,
        completed: &[CompletedStep],
        step: F,
    ) -> Result<TxHash, OrchestrationError>
    where
        F: std::future::Future<Output = Result<TxHash, OrchestrationError>>,
    {
        let result = if cancel.is_cancelled() {
            Err(OrchestrationError::new(
                stage,
                DistributionError::Cancelled { hash: None },
            ))
        } else {
            step.instrument(step_span(stage)).await
        };

        result.map_err(|err| {
            if !completed.is_empty() {
                tracing::warn!(
                    failed = %stage,
                    confirmed = completed.len(),
                    "run stopped after partial distribution; confirmed transfers are not reverted"
                );
            }
            err.with_completed(completed.to_vec())
        })
    }
}
