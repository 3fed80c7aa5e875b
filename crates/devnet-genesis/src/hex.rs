//! Hex string conventions
//!
//! The dump schema carries `0x`-prefixed values, the RSK genesis schema
//! unprefixed ones, and RPC results are hex while RSK balances are decimal.
//! These helpers normalize between the three.

use alloy_primitives::U256;

use crate::error::GenesisError;

/// Adds the `0x` prefix if absent. Idempotent.
pub fn prefix_hex(value: &str) -> String {
    if value.starts_with("0x") {
        value.to_string()
    } else {
        format!("0x{value}")
    }
}

/// Canonical form for allocation map keys: always `0x`-prefixed, so two
/// spellings of the same address can never coexist in one set.
pub fn normalize_address(address: &str) -> String {
    prefix_hex(address)
}

/// Removes the `0x` prefix if present
pub fn strip_hex_prefix(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

/// Reinterprets a hex string as a base-10 string. Balances exceed u64, so
/// this goes through a 256-bit integer.
pub fn hex_to_decimal(value: &str) -> Result<String, GenesisError> {
    let parsed = U256::from_str_radix(strip_hex_prefix(value), 16)
        .map_err(|_| GenesisError::InvalidHex(value.to_string()))?;
    Ok(parsed.to_string())
}

/// Parses a hex string into a u64, for nonces and transaction counts
pub fn hex_to_u64(value: &str) -> Result<u64, GenesisError> {
    u64::from_str_radix(strip_hex_prefix(value), 16)
        .map_err(|_| GenesisError::InvalidHex(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixing_is_idempotent() {
        for input in ["cd34", "0xcd34", "00", "0x00"] {
            let once = normalize_address(input);
            assert_eq!(normalize_address(&once), once);
            assert!(once.starts_with("0x"));
        }
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_hex_prefix("0xab12"), "ab12");
        assert_eq!(strip_hex_prefix("ab12"), "ab12");
    }

    #[test]
    fn test_hex_to_decimal() {
        assert_eq!(
            hex_to_decimal("0xde0b6b3a7640000").unwrap(),
            "1000000000000000000"
        );
        assert_eq!(hex_to_decimal("0x5").unwrap(), "5");
        assert_eq!(hex_to_decimal("0").unwrap(), "0");
        assert!(hex_to_decimal("0xzz").is_err());
    }

    #[test]
    fn test_hex_to_decimal_beyond_u64() {
        // 2^128, which no machine integer holds
        assert_eq!(
            hex_to_decimal("0x100000000000000000000000000000000").unwrap(),
            "340282366920938463463374607431768211456"
        );
    }

    #[test]
    fn test_hex_to_u64() {
        assert_eq!(hex_to_u64("0x10").unwrap(), 16);
        assert_eq!(hex_to_u64("5").unwrap(), 5);
        assert!(hex_to_u64("0x").is_err());
    }
}
