//! Local signing of legacy (EIP-155) transactions.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::TxKind;
use tokenholder_types::{SigningKey, TransactionRequest};

use crate::ChainError;

/// Fully resolved fields that the request may have left open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedGas {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
}

/// Sign `request` and return the raw bytes for `eth_sendRawTransaction`.
pub fn sign_legacy(
    signer: &SigningKey,
    request: &TransactionRequest,
    resolved: ResolvedGas,
) -> Result<Vec<u8>, ChainError> {
    if request.from != signer.address() {
        return Err(ChainError::Signing(format!(
            "request sender {} does not match signing key {}",
            request.from,
            signer.address()
        )));
    }

    let mut tx = TxLegacy {
        chain_id: Some(resolved.chain_id),
        nonce: resolved.nonce,
        gas_price: resolved.gas_price,
        gas_limit: resolved.gas_limit,
        to: TxKind::Call(request.to),
        value: request.value.map(|v| v.raw()).unwrap_or_default(),
        input: request.data.clone().unwrap_or_default(),
    };
    let signature = signer
        .signer()
        .sign_transaction_sync(&mut tx)
        .map_err(|e| ChainError::Signing(e.to_string()))?;
    let envelope = TxEnvelope::Legacy(tx.into_signed(signature));
    Ok(envelope.encoded_2718())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenholder_types::{Address, GasEstimate, Wei};

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn resolved() -> ResolvedGas {
        ResolvedGas {
            chain_id: 1337,
            nonce: 0,
            gas_price: 10,
            gas_limit: 21_000,
        }
    }

    #[test]
    fn signs_deterministic_legacy_envelope() {
        let key = SigningKey::from_hex(DEV_KEY).unwrap();
        let gas = GasEstimate::new(Wei::from(10u64), 21_000);
        let req = TransactionRequest::transfer(key.address(), Address::repeat_byte(1), Wei::from(5u64), &gas);

        let first = sign_legacy(&key, &req, resolved()).unwrap();
        let second = sign_legacy(&key, &req, resolved()).unwrap();
        // Legacy transactions are bare RLP lists.
        assert!(first[0] >= 0xc0);
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_mismatched_sender() {
        let key = SigningKey::from_hex(DEV_KEY).unwrap();
        let gas = GasEstimate::new(Wei::from(10u64), 21_000);
        let req = TransactionRequest::transfer(Address::repeat_byte(9), Address::repeat_byte(1), Wei::from(5u64), &gas);
        assert!(matches!(
            sign_legacy(&key, &req, resolved()),
            Err(ChainError::Signing(_))
        ));
    }
}
