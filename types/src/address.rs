//! Address parsing for externally supplied recipients.

use alloy::primitives::Address;
use std::str::FromStr;

use crate::ParseError;

/// Parse a 20-byte hex address, with or without the `0x` prefix.
///
/// Unlike a lenient hex conversion, malformed input is rejected instead of
/// being silently truncated or zero-padded.
pub fn parse_address(input: &str) -> Result<Address, ParseError> {
    let trimmed = input.trim();
    Address::from_str(trimmed).map_err(|e| ParseError::InvalidAddress {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })
}
