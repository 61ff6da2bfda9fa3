//! Token-holder distribution daemon: entry point for one distribution run.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokenholder_distributor::{
    handle_event, plan_distribution, CancelController, DistributionConfig, TriggerContext,
};
use tokenholder_types::EventTime;
use tokenholder_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "tokenholder-daemon", about = "Token-holder fund distribution")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "TOKENHOLDER_CONFIG")]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint of the chain node.
    #[arg(long, env = "TOKENHOLDER_RPC_URL")]
    rpc_url: Option<String>,

    /// Hex private key of the vault.
    #[arg(long, env = "TOKENHOLDER_VAULT_KEY", hide_env_values = true)]
    vault_key: Option<String>,

    /// Hex private key allowed to call the voucher operations.
    #[arg(long, env = "TOKENHOLDER_PROCESSING_KEY", hide_env_values = true)]
    processing_key: Option<String>,

    /// Address of the token-holder contract.
    #[arg(long, env = "TOKENHOLDER_TOKEN_HOLDER_CONTRACT")]
    token_holder_contract: Option<String>,

    /// Address receiving the secondary share.
    #[arg(long, env = "TOKENHOLDER_BENEFICIARY")]
    beneficiary: Option<String>,

    /// Gas limit of each value transfer.
    #[arg(long, env = "TOKENHOLDER_GAS_LIMIT")]
    gas_limit: Option<u64>,

    /// Seconds between receipt queries.
    #[arg(long, env = "TOKENHOLDER_POLL_INTERVAL_SECS")]
    poll_interval_secs: Option<u64>,

    /// Abort the run after this many seconds.
    #[arg(long, env = "TOKENHOLDER_DEADLINE_SECS")]
    deadline_secs: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TOKENHOLDER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TOKENHOLDER_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run one distribution.
    Run {
        /// Time of the triggering event, echoed in the success message.
        /// Defaults to the current unix time.
        #[arg(long)]
        event_time: Option<String>,
    },
    /// Show what a run would distribute without submitting anything.
    Plan,
    /// Print the effective configuration (keys omitted).
    ShowConfig,
}

impl Cli {
    /// Layer flags and env vars over `base`.
    fn apply_overrides(&self, base: DistributionConfig) -> DistributionConfig {
        DistributionConfig {
            rpc_url: self.rpc_url.clone().unwrap_or(base.rpc_url),
            vault_private_key: self.vault_key.clone().unwrap_or(base.vault_private_key),
            processing_private_key: self
                .processing_key
                .clone()
                .unwrap_or(base.processing_private_key),
            token_holder_contract: self
                .token_holder_contract
                .clone()
                .unwrap_or(base.token_holder_contract),
            beneficiary_address: self.beneficiary.clone().unwrap_or(base.beneficiary_address),
            gas_limit: self.gas_limit.unwrap_or(base.gas_limit),
            poll_interval_secs: self.poll_interval_secs.unwrap_or(base.poll_interval_secs),
            deadline_secs: self.deadline_secs.or(base.deadline_secs),
            log_format: self.log_format.clone().unwrap_or(base.log_format),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
        }
    }

    fn load_config(&self) -> anyhow::Result<DistributionConfig> {
        let base = match &self.config {
            Some(path) => DistributionConfig::from_toml_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => DistributionConfig::default(),
        };
        Ok(self.apply_overrides(base))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    match cli.command {
        Command::Run { event_time } => {
            let event_time = event_time.map(EventTime::new).unwrap_or_else(EventTime::now);
            let controller = CancelController::new();
            if let Some(deadline) = config.deadline() {
                controller.cancel_after(deadline);
            }
            let signals = controller.clone();
            tokio::spawn(async move { signals.wait_for_signal().await });

            tracing::info!(rpc_url = %config.rpc_url, %event_time, "starting distribution");
            let trigger = TriggerContext::new(event_time, controller.token());
            match handle_event(&config, trigger).await {
                Ok(message) => {
                    println!("{message}");
                    Ok(())
                }
                Err(err) => {
                    for step in &err.completed {
                        tracing::error!(stage = %step.stage, tx = %step.hash, "step already confirmed");
                    }
                    Err(err.into())
                }
            }
        }
        Command::Plan => {
            let plan = plan_distribution(&config).await?;
            println!("{plan}");
            Ok(())
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}
