//! JSON-RPC chain client for Ethereum-compatible nodes.
//!
//! Wraps `reqwest::Client` with the node's URL and maps each
//! [`ChainClient`] operation onto the corresponding `eth_*` method.
//! Transactions are signed locally and sent raw, so the node never holds keys.

use alloy::primitives::{B256, U256, U64};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokenholder_types::{
    Address, Receipt, ReceiptStatus, SigningKey, TransactionRequest, TxHash, Wei,
};

use crate::client::{BackendCapability, ChainClient};
use crate::signing::{sign_legacy, ResolvedGas};
use crate::ChainError;

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// Receipt fields as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    gas_used: Option<U64>,
}

impl From<RpcReceipt> for Receipt {
    fn from(r: RpcReceipt) -> Self {
        let status = if r.status == Some(U64::from(1)) {
            ReceiptStatus::Success
        } else {
            ReceiptStatus::Failed
        };
        Receipt {
            tx_hash: TxHash::from(r.transaction_hash),
            status,
            block_number: r.block_number.map(|n| n.to::<u64>()),
            gas_used: r.gas_used.map(|n| n.to::<u64>()).unwrap_or(0),
        }
    }
}

/// Unwrap a JSON-RPC envelope. A `null` result is `Ok(None)`.
fn decode_response<T: DeserializeOwned>(response: RpcResponse) -> Result<Option<T>, ChainError> {
    if let Some(err) = response.error {
        return Err(ChainError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    match response.result {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ChainError::InvalidResponse(e.to_string())),
    }
}

/// The call object used by `eth_estimateGas`.
fn call_object(request: &TransactionRequest) -> Value {
    let mut obj = json!({ "from": request.from, "to": request.to });
    if let Some(value) = request.value {
        obj["value"] = json!(value.raw());
    }
    if let Some(data) = &request.data {
        obj["data"] = json!(data);
    }
    obj
}

/// HTTP JSON-RPC client.
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    chain_id: OnceCell<u64>,
}

impl JsonRpcClient {
    /// Create a client targeting `url` (e.g. `http://127.0.0.1:8545`).
    pub fn new(url: impl Into<String>) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChainError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
            chain_id: OnceCell::new(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("{method}: {e}")))?;

        if !response.status().is_success() {
            return Err(ChainError::Transport(format!(
                "{method}: node returned HTTP {}",
                response.status()
            )));
        }

        let decoded: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(format!("{method}: {e}")))?;
        decode_response(decoded)
    }

    async fn call_required<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ChainError> {
        self.call(method, params)
            .await?
            .ok_or_else(|| ChainError::InvalidResponse(format!("{method} returned null")))
    }

    /// Chain id, fetched once and cached.
    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        self.chain_id
            .get_or_try_init(|| async {
                let id: U64 = self.call_required("eth_chainId", json!([])).await?;
                Ok::<u64, ChainError>(id.to::<u64>())
            })
            .await
            .copied()
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError> {
        let nonce: U64 = self
            .call_required("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        Ok(nonce.to::<u64>())
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, ChainError> {
        let gas: U64 = self
            .call_required("eth_estimateGas", json!([call_object(request)]))
            .await?;
        Ok(gas.to::<u64>())
    }
}

#[async_trait]
impl ChainClient for JsonRpcClient {
    async fn suggest_gas_price(&self) -> Result<Wei, ChainError> {
        let price: U256 = self.call_required("eth_gasPrice", json!([])).await?;
        Ok(Wei::new(price))
    }

    async fn balance_at(&self, address: Address) -> Result<Wei, ChainError> {
        let balance: U256 = self
            .call_required("eth_getBalance", json!([address, "latest"]))
            .await?;
        Ok(Wei::new(balance))
    }

    async fn send_transaction(
        &self,
        signer: &SigningKey,
        request: &TransactionRequest,
    ) -> Result<TxHash, ChainError> {
        let chain_id = self.chain_id().await?;
        let nonce = self.pending_nonce(request.from).await?;
        let gas_price = match request.gas_price {
            Some(price) => price,
            None => self.suggest_gas_price().await?,
        };
        let gas_price = gas_price.to_u128().ok_or_else(|| {
            ChainError::Signing(format!("gas price {gas_price} does not fit a legacy transaction"))
        })?;
        let gas_limit = match request.gas_limit {
            Some(limit) => limit,
            None => self.estimate_gas(request).await?,
        };

        let raw = sign_legacy(
            signer,
            request,
            ResolvedGas {
                chain_id,
                nonce,
                gas_price,
                gas_limit,
            },
        )?;
        tracing::debug!(from = %request.from, to = %request.to, nonce, gas_limit, "sending raw transaction");

        let hash: B256 = self
            .call_required(
                "eth_sendRawTransaction",
                json!([format!("0x{}", hex::encode(raw))]),
            )
            .await?;
        Ok(TxHash::from(hash))
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Receipt, ChainError> {
        let receipt: Option<RpcReceipt> = self
            .call("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await?;
        receipt.map(Receipt::from).ok_or(ChainError::NotFound)
    }

    fn capability(&self) -> BackendCapability {
        BackendCapability::Polling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenholder_types::{Bytes, GasEstimate};

    fn response(raw: &str) -> RpcResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn null_result_decodes_as_none() {
        let decoded: Option<RpcReceipt> =
            decode_response(response(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn error_object_becomes_rpc_error() {
        let err = decode_response::<U64>(response(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"nonce too low"}}"#,
        ))
        .unwrap_err();
        match err {
            ChainError::Rpc { code, message } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "nonce too low");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn quantity_decodes_from_hex() {
        let price: Option<U256> =
            decode_response(response(r#"{"jsonrpc":"2.0","id":1,"result":"0x3b9aca00"}"#)).unwrap();
        assert_eq!(price, Some(U256::from(1_000_000_000u64)));
    }

    #[test]
    fn receipt_status_maps_to_success_or_failure() {
        let ok: RpcReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
            "status": "0x1",
            "blockNumber": "0x10",
            "gasUsed": "0x5208",
        }))
        .unwrap();
        let ok = Receipt::from(ok);
        assert!(ok.is_success());
        assert_eq!(ok.block_number, Some(16));
        assert_eq!(ok.gas_used, 21_000);

        let reverted: RpcReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
            "status": "0x0",
        }))
        .unwrap();
        assert_eq!(Receipt::from(reverted).status, ReceiptStatus::Failed);
    }

    #[test]
    fn call_object_includes_only_present_fields() {
        let call = TransactionRequest::call(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        );
        let obj = call_object(&call);
        assert_eq!(obj["data"], json!("0xdeadbeef"));
        assert!(obj.get("value").is_none());

        let gas = GasEstimate::new(Wei::from(1u64), 21_000);
        let transfer = TransactionRequest::transfer(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            Wei::from(255u64),
            &gas,
        );
        let obj = call_object(&transfer);
        assert_eq!(obj["value"], json!("0xff"));
        assert!(obj.get("data").is_none());
    }

    // ── Scripted node over HTTP ─────────────────────────────────────────

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokenholder_types::SigningKey;

    use crate::contract::{ContractCall, VoucherMethod};

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    enum Reply {
        Result(Value),
        Error(i64, &'static str),
    }

    /// Answers each JSON-RPC method with a canned reply and records calls.
    struct ScriptedNode {
        status: StatusCode,
        replies: HashMap<&'static str, Reply>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedNode {
        fn methods(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }

        fn params(&self, method: &str) -> Value {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .find(|(m, _)| m == method)
                .map(|(_, p)| p.clone())
                .unwrap()
        }
    }

    async fn handle(
        State(node): State<Arc<ScriptedNode>>,
        Json(request): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let method = request["method"].as_str().unwrap_or_default().to_string();
        node.calls
            .lock()
            .unwrap()
            .push((method.clone(), request["params"].clone()));

        let body = match node.replies.get(method.as_str()) {
            Some(Reply::Result(result)) => {
                json!({ "jsonrpc": "2.0", "id": request["id"], "result": result })
            }
            Some(Reply::Error(code, message)) => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": code, "message": message },
            }),
            None => json!({ "jsonrpc": "2.0", "id": request["id"], "result": null }),
        };
        (node.status, Json(body))
    }

    async fn spawn_node(
        status: StatusCode,
        replies: Vec<(&'static str, Reply)>,
    ) -> (JsonRpcClient, Arc<ScriptedNode>) {
        let node = Arc::new(ScriptedNode {
            status,
            replies: replies.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/", post(handle))
            .with_state(Arc::clone(&node));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let client = JsonRpcClient::new(format!("http://{addr}/")).unwrap();
        (client, node)
    }

    fn submission_replies() -> Vec<(&'static str, Reply)> {
        vec![
            ("eth_chainId", Reply::Result(json!("0x539"))),
            ("eth_getTransactionCount", Reply::Result(json!("0x7"))),
            ("eth_gasPrice", Reply::Result(json!("0x3b9aca00"))),
            ("eth_estimateGas", Reply::Result(json!("0xb411"))),
            (
                "eth_sendRawTransaction",
                Reply::Result(json!(format!("0x{}", "ab".repeat(32)))),
            ),
        ]
    }

    #[tokio::test]
    async fn null_receipt_is_not_found() {
        let (client, node) = spawn_node(StatusCode::OK, vec![]).await;

        let err = client
            .transaction_receipt(TxHash::new([1u8; 32]))
            .await
            .unwrap_err();

        assert!(matches!(err, ChainError::NotFound));
        assert_eq!(node.methods(), vec!["eth_getTransactionReceipt"]);
    }

    #[tokio::test]
    async fn mined_receipt_is_decoded() {
        let hash = format!("0x{}", "cd".repeat(32));
        let (client, _node) = spawn_node(
            StatusCode::OK,
            vec![(
                "eth_getTransactionReceipt",
                Reply::Result(json!({
                    "transactionHash": hash,
                    "status": "0x0",
                    "blockNumber": "0x2",
                    "gasUsed": "0x5208",
                })),
            )],
        )
        .await;

        let receipt = client
            .transaction_receipt(TxHash::new([0xcd; 32]))
            .await
            .unwrap();

        assert_eq!(receipt.status, ReceiptStatus::Failed);
        assert_eq!(receipt.block_number, Some(2));
    }

    #[tokio::test]
    async fn http_error_status_is_transport_error() {
        let (client, _node) = spawn_node(
            StatusCode::SERVICE_UNAVAILABLE,
            vec![("eth_gasPrice", Reply::Result(json!("0x1")))],
        )
        .await;

        let err = client.suggest_gas_price().await.unwrap_err();

        match err {
            ChainError::Transport(message) => assert!(message.contains("503")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rpc_error_object_surfaces_code_and_message() {
        let (client, _node) = spawn_node(
            StatusCode::OK,
            vec![("eth_getBalance", Reply::Error(-32602, "invalid address"))],
        )
        .await;

        let err = client.balance_at(Address::repeat_byte(1)).await.unwrap_err();

        assert!(matches!(
            err,
            ChainError::Rpc { code: -32602, ref message } if message == "invalid address"
        ));
    }

    #[tokio::test]
    async fn contract_call_fills_gas_and_uses_pending_nonce() {
        let (client, node) = spawn_node(StatusCode::OK, submission_replies()).await;
        let key = SigningKey::from_hex(DEV_KEY).unwrap();
        let request = ContractCall::new(Address::repeat_byte(0x11), VoucherMethod::SellVouchers)
            .to_request(key.address());

        let hash = client.send_transaction(&key, &request).await.unwrap();

        assert_eq!(hash, TxHash::new([0xab; 32]));
        assert_eq!(
            node.methods(),
            vec![
                "eth_chainId",
                "eth_getTransactionCount",
                "eth_gasPrice",
                "eth_estimateGas",
                "eth_sendRawTransaction",
            ]
        );

        let nonce_params = node.params("eth_getTransactionCount");
        let sender: Address = serde_json::from_value(nonce_params[0].clone()).unwrap();
        assert_eq!(sender, key.address());
        assert_eq!(nonce_params[1], json!("pending"));

        let estimate = &node.params("eth_estimateGas")[0];
        assert_eq!(estimate["data"], json!(VoucherMethod::SellVouchers.calldata()));

        let expected = sign_legacy(
            &key,
            &request,
            ResolvedGas {
                chain_id: 1337,
                nonce: 7,
                gas_price: 1_000_000_000,
                gas_limit: 0xb411,
            },
        )
        .unwrap();
        assert_eq!(
            node.params("eth_sendRawTransaction")[0],
            json!(format!("0x{}", hex::encode(expected)))
        );
    }

    #[tokio::test]
    async fn priced_transfer_skips_gas_queries_and_caches_chain_id() {
        let (client, node) = spawn_node(StatusCode::OK, submission_replies()).await;
        let key = SigningKey::from_hex(DEV_KEY).unwrap();
        let gas = GasEstimate::new(Wei::from(10u64), 21_000);
        let request = TransactionRequest::transfer(
            key.address(),
            Address::repeat_byte(0x22),
            Wei::from(160_000u64),
            &gas,
        );

        client.send_transaction(&key, &request).await.unwrap();
        client.send_transaction(&key, &request).await.unwrap();

        assert_eq!(
            node.methods(),
            vec![
                "eth_chainId",
                "eth_getTransactionCount",
                "eth_sendRawTransaction",
                "eth_getTransactionCount",
                "eth_sendRawTransaction",
            ]
        );
    }
}
