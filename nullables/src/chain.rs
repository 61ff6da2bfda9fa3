//! Nullable chain: an in-memory ledger with scriptable receipts.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use tokenholder_chain::{BackendCapability, ChainClient, ChainError};
use tokenholder_types::{
    Address, Receipt, ReceiptStatus, SigningKey, TransactionRequest, TxHash, Wei,
};

/// One scripted answer to a receipt query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiptResponse {
    NotFound,
    Error(String),
    Success,
    Failed,
}

struct State {
    gas_price: Result<Wei, String>,
    balances: HashMap<Address, Wei>,
    balance_error: Option<String>,
    failing_submissions: HashMap<usize, String>,
    attempts: usize,
    submissions: Vec<TransactionRequest>,
    known: HashSet<TxHash>,
    pending: Vec<TxHash>,
    committed: HashSet<TxHash>,
    scripts: HashMap<TxHash, VecDeque<ReceiptResponse>>,
    receipt_queries: usize,
    commits: usize,
}

/// A deterministic chain backend for testing.
///
/// In polling mode every submitted transaction is immediately mined unless a
/// script says otherwise. In manual-commit mode nothing is mined until
/// [`ChainClient::commit`] is called.
pub struct NullChain {
    capability: BackendCapability,
    state: Mutex<State>,
}

impl NullChain {
    /// A polling backend with a gas price of 1 and no balances.
    pub fn new() -> Self {
        Self::with_capability(BackendCapability::Polling)
    }

    /// A backend that only mines on explicit commit.
    pub fn with_manual_commit() -> Self {
        Self::with_capability(BackendCapability::ManualCommit)
    }

    fn with_capability(capability: BackendCapability) -> Self {
        Self {
            capability,
            state: Mutex::new(State {
                gas_price: Ok(Wei::from(1u64)),
                balances: HashMap::new(),
                balance_error: None,
                failing_submissions: HashMap::new(),
                attempts: 0,
                submissions: Vec::new(),
                known: HashSet::new(),
                pending: Vec::new(),
                committed: HashSet::new(),
                scripts: HashMap::new(),
                receipt_queries: 0,
                commits: 0,
            }),
        }
    }

    /// The hash assigned to the `index`-th submission attempt (0-based).
    pub fn tx_hash(index: usize) -> TxHash {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&(index as u64 + 1).to_be_bytes());
        TxHash::new(bytes)
    }

    pub fn set_gas_price(&self, price: Wei) {
        self.state.lock().unwrap().gas_price = Ok(price);
    }

    /// Make gas-price queries fail.
    pub fn fail_gas_price(&self, message: impl Into<String>) {
        self.state.lock().unwrap().gas_price = Err(message.into());
    }

    pub fn set_balance(&self, address: Address, balance: Wei) {
        self.state.lock().unwrap().balances.insert(address, balance);
    }

    /// Make balance queries fail.
    pub fn fail_balance(&self, message: impl Into<String>) {
        self.state.lock().unwrap().balance_error = Some(message.into());
    }

    /// Reject the `index`-th submission attempt (0-based).
    pub fn fail_submission(&self, index: usize, message: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .failing_submissions
            .insert(index, message.into());
    }

    /// Queue receipt answers for the `index`-th submission. Once the queue is
    /// drained the default behavior applies.
    pub fn script_receipts(&self, index: usize, responses: Vec<ReceiptResponse>) {
        self.state
            .lock()
            .unwrap()
            .scripts
            .entry(Self::tx_hash(index))
            .or_default()
            .extend(responses);
    }

    /// All accepted submissions, in order.
    pub fn submissions(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn receipt_queries(&self) -> usize {
        self.state.lock().unwrap().receipt_queries
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new()
    }
}

fn receipt(hash: TxHash, status: ReceiptStatus, block: usize) -> Receipt {
    Receipt {
        tx_hash: hash,
        status,
        block_number: Some(block as u64),
        gas_used: 21_000,
    }
}

#[async_trait]
impl ChainClient for NullChain {
    async fn suggest_gas_price(&self) -> Result<Wei, ChainError> {
        self.state
            .lock()
            .unwrap()
            .gas_price
            .clone()
            .map_err(ChainError::Other)
    }

    async fn balance_at(&self, address: Address) -> Result<Wei, ChainError> {
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.balance_error {
            return Err(ChainError::Other(message.clone()));
        }
        Ok(state.balances.get(&address).copied().unwrap_or(Wei::ZERO))
    }

    async fn send_transaction(
        &self,
        signer: &SigningKey,
        request: &TransactionRequest,
    ) -> Result<TxHash, ChainError> {
        let mut state = self.state.lock().unwrap();
        let index = state.attempts;
        state.attempts += 1;
        if let Some(message) = state.failing_submissions.get(&index) {
            return Err(ChainError::Other(message.clone()));
        }
        if request.from != signer.address() {
            return Err(ChainError::Signing("sender does not match signing key".into()));
        }

        let hash = Self::tx_hash(index);
        state.submissions.push(request.clone());
        state.known.insert(hash);
        if self.capability == BackendCapability::ManualCommit {
            state.pending.push(hash);
        }
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Receipt, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.receipt_queries += 1;
        let block = state.commits.max(1);

        if let Some(response) = state.scripts.get_mut(&hash).and_then(VecDeque::pop_front) {
            return match response {
                ReceiptResponse::NotFound => Err(ChainError::NotFound),
                ReceiptResponse::Error(message) => Err(ChainError::Other(message)),
                ReceiptResponse::Success => Ok(receipt(hash, ReceiptStatus::Success, block)),
                ReceiptResponse::Failed => Ok(receipt(hash, ReceiptStatus::Failed, block)),
            };
        }

        let mined = match self.capability {
            BackendCapability::Polling => state.known.contains(&hash),
            BackendCapability::ManualCommit => state.committed.contains(&hash),
        };
        if mined {
            Ok(receipt(hash, ReceiptStatus::Success, block))
        } else {
            Err(ChainError::NotFound)
        }
    }

    fn capability(&self) -> BackendCapability {
        self.capability
    }

    async fn commit(&self) -> Result<(), ChainError> {
        if self.capability != BackendCapability::ManualCommit {
            return Err(ChainError::Unsupported("manual commit"));
        }
        let mut state = self.state.lock().unwrap();
        state.commits += 1;
        let pending: Vec<TxHash> = state.pending.drain(..).collect();
        state.committed.extend(pending);
        Ok(())
    }
}
