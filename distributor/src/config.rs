//! Run configuration with TOML file support.
//!
//! The trigger hands a [`DistributionConfig`] to the entry point; nothing is
//! read from process-wide state. Keys and addresses stay raw strings here and
//! are validated by [`Credentials::from_config`] before any chain access.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tokenholder_types::{parse_address, Address, SigningKey};

use crate::error::{DistributionError, OrchestrationError, Stage};
use crate::splitter::DEFAULT_GAS_LIMIT;
use crate::waiter::DEFAULT_POLL_INTERVAL;

/// Configuration for one distribution run.
///
/// Private keys are never serialized and never shown by `Debug`.
#[derive(Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// JSON-RPC endpoint of the chain node.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Hex private key of the vault holding the funds.
    #[serde(default, skip_serializing)]
    pub vault_private_key: String,

    /// Hex private key authorized to call the voucher operations.
    #[serde(default, skip_serializing)]
    pub processing_private_key: String,

    /// Token-holder contract: receives the primary share and exposes the voucher calls.
    #[serde(default)]
    pub token_holder_contract: String,

    /// Receives the secondary share.
    #[serde(default)]
    pub beneficiary_address: String,

    /// Gas limit of each value transfer.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    /// Seconds between receipt queries.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Optional overall deadline for a run, in seconds.
    #[serde(default)]
    pub deadline_secs: Option<u64>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DistributionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DistributionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DistributionError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DistributionError> {
        toml::from_str(s).map_err(|e| DistributionError::Config(e.to_string()))
    }

    /// Serialize the configuration (without keys) to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DistributionError> {
        toml::to_string_pretty(self).map_err(|e| DistributionError::Config(e.to_string()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// Reject numeric settings that would make a run meaningless.
    pub fn validate(&self) -> Result<(), DistributionError> {
        if self.gas_limit == 0 {
            return Err(DistributionError::Config("gas_limit must be positive".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(DistributionError::Config(
                "poll_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            vault_private_key: String::new(),
            processing_private_key: String::new(),
            token_holder_contract: String::new(),
            beneficiary_address: String::new(),
            gas_limit: default_gas_limit(),
            poll_interval_secs: default_poll_interval_secs(),
            deadline_secs: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

impl fmt::Debug for DistributionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributionConfig")
            .field("rpc_url", &self.rpc_url)
            .field("vault_private_key", &"<redacted>")
            .field("processing_private_key", &"<redacted>")
            .field("token_holder_contract", &self.token_holder_contract)
            .field("beneficiary_address", &self.beneficiary_address)
            .field("gas_limit", &self.gas_limit)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("deadline_secs", &self.deadline_secs)
            .field("log_format", &self.log_format)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Validated identities and recipients.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub vault: SigningKey,
    pub processing: SigningKey,
    pub token_holder_contract: Address,
    pub beneficiary: Address,
}

impl Credentials {
    /// Validate `config` and parse every key and address, failing on the
    /// first malformed one.
    pub fn from_config(config: &DistributionConfig) -> Result<Self, OrchestrationError> {
        config
            .validate()
            .map_err(|e| OrchestrationError::new(Stage::Config, e))?;

        let config_error = |field: &str, e: tokenholder_types::ParseError| {
            OrchestrationError::new(
                Stage::Config,
                DistributionError::Config(format!("{field}: {e}")),
            )
        };

        let vault = SigningKey::from_hex(&config.vault_private_key)
            .map_err(|e| config_error("vault_private_key", e))?;
        let processing = SigningKey::from_hex(&config.processing_private_key)
            .map_err(|e| config_error("processing_private_key", e))?;
        let token_holder_contract = parse_address(&config.token_holder_contract)
            .map_err(|e| config_error("token_holder_contract", e))?;
        let beneficiary = parse_address(&config.beneficiary_address)
            .map_err(|e| config_error("beneficiary_address", e))?;

        Ok(Self {
            vault,
            processing,
            token_holder_contract,
            beneficiary,
        })
    }
}
