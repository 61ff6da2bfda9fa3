//! Transactional fund distribution for the token-holder program.
//!
//! One run reserves fees out of the vault balance, sends one third of the
//! rest to the token-holder contract and two thirds to the beneficiary, then
//! calls `sellVouchers` and `buyVouchers` on the contract. Every step waits
//! for confirmation before the next begins, and the first failure ends the run.
//!
//! - [`splitter`]: fee reserve and integer split
//! - [`waiter`]: receipt polling with cancellation
//! - [`executor`]: submit-and-confirm for one labelled step
//! - [`orchestrator`]: the sequenced run

pub mod cancel;
pub mod config;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod spans;
pub mod splitter;
pub mod waiter;

pub use cancel::{CancelController, CancelToken};
pub use config::{Credentials, DistributionConfig};
pub use error::{CompletedStep, DistributionError, OrchestrationError, Stage, WaitError};
pub use executor::{ChainStepExecutor, StepExecutor};
pub use orchestrator::{success_message, DistributionPlan, Orchestrator, TriggerContext};
pub use splitter::{compute_distribution, SplitResult};
pub use waiter::TransactionWaiter;

use std::sync::Arc;
use tokenholder_chain::JsonRpcClient;

/// An orchestrator wired to a JSON-RPC node.
pub type RpcOrchestrator = Orchestrator<JsonRpcClient, ChainStepExecutor<JsonRpcClient>>;

/// Validate `config` and connect to its node. Keys and addresses are checked
/// before any network access.
pub fn connect(config: &DistributionConfig) -> Result<RpcOrchestrator, OrchestrationError> {
    let credentials = Credentials::from_config(config)?;
    let client = JsonRpcClient::new(&config.rpc_url)
        .map_err(|e| OrchestrationError::new(Stage::Connect, DistributionError::ChainQuery(e)))?;
    let client = Arc::new(client);
    let waiter = TransactionWaiter::new(Arc::clone(&client)).with_poll_interval(config.poll_interval());
    let executor = ChainStepExecutor::with_waiter(Arc::clone(&client), waiter);
    Ok(Orchestrator::new(client, executor, credentials, config.gas_limit))
}

/// Handle one trigger event: run the full distribution.
pub async fn handle_event(
    config: &DistributionConfig,
    trigger: TriggerContext,
) -> Result<String, OrchestrationError> {
    let orchestrator = connect(config)?;
    orchestrator.run(&trigger).await
}

/// Compute what a run would distribute, without submitting anything.
pub async fn plan_distribution(
    config: &DistributionConfig,
) -> Result<DistributionPlan, OrchestrationError> {
    connect(config)?.plan().await
}
