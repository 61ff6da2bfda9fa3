//! Signing identities for the vault and the processing account.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// A secp256k1 private key together with the address it controls.
///
/// `Debug` shows only the address so key material never reaches logs.
#[derive(Clone)]
pub struct SigningKey {
    signer: PrivateKeySigner,
}

impl SigningKey {
    /// Parse a hex-encoded private key (with or without `0x`).
    pub fn from_hex(input: &str) -> Result<Self, ParseError> {
        let signer = PrivateKeySigner::from_str(input.trim())
            .map_err(|e| ParseError::InvalidKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// The address derived from the public key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey({})", self.address())
    }
}
