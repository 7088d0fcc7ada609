//! Hex parsing helpers used by fixtures and the command line

use crate::error::PrimitiveError;
use primitive_types::{H160, H256, U256};

fn strip(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// Parse a hex string (with or without 0x prefix) into bytes.
///
/// Odd-length input is left-padded with a zero nibble.
pub fn parse_bytes(s: &str) -> Result<Vec<u8>, PrimitiveError> {
    let s = strip(s);
    let decoded = if s.len() % 2 == 1 {
        hex::decode(format!("0{s}"))
    } else {
        hex::decode(s)
    };
    decoded.map_err(|e| PrimitiveError::InvalidHex(e.to_string()))
}

/// Parse a 20-byte address
pub fn parse_address(s: &str) -> Result<H160, PrimitiveError> {
    let bytes = parse_bytes(s)?;
    if bytes.len() != 20 {
        return Err(PrimitiveError::InvalidLength { expected: 20, got: bytes.len() });
    }
    Ok(H160::from_slice(&bytes))
}

/// Parse a hash, left-padding shorter input to 32 bytes
pub fn parse_h256(s: &str) -> Result<H256, PrimitiveError> {
    let bytes = parse_bytes(s)?;
    if bytes.len() > 32 {
        return Err(PrimitiveError::InvalidLength { expected: 32, got: bytes.len() });
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(H256(out))
}

/// Parse a word given either as 0x-prefixed hex or as a decimal literal
pub fn parse_u256(s: &str) -> Result<U256, PrimitiveError> {
    let t = s.trim();
    if t.starts_with("0x") || t.starts_with("0X") {
        let bytes = parse_bytes(t)?;
        if bytes.len() > 32 {
            return Err(PrimitiveError::InvalidLength { expected: 32, got: bytes.len() });
        }
        Ok(U256::from_big_endian(&bytes))
    } else {
        U256::from_dec_str(t).map_err(|_| PrimitiveError::InvalidNumber(t.to_string()))
    }
}

/// Parse a u64 given as hex or decimal
pub fn parse_u64(s: &str) -> Result<u64, PrimitiveError> {
    let value = parse_u256(s)?;
    if value > U256::from(u64::MAX) {
        return Err(PrimitiveError::InvalidNumber(s.to_string()));
    }
    Ok(value.low_u64())
}

/// Encode bytes as 0x-prefixed lowercase hex
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes_prefix_optional() {
        assert_eq!(parse_bytes("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(parse_bytes("0102").unwrap(), vec![1, 2]);
        assert_eq!(parse_bytes("0x").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_parse_bytes_odd_length() {
        assert_eq!(parse_bytes("0x1").unwrap(), vec![1]);
        assert_eq!(parse_bytes("0x102").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_parse_bytes_invalid() {
        assert!(matches!(parse_bytes("0xzz"), Err(PrimitiveError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_address_length() {
        let addr = parse_address("0x0f572e5295c57f15886f9b263e2f6d2d6c7b5ec6").unwrap();
        assert_eq!(addr.as_bytes()[0], 0x0f);
        assert_eq!(
            parse_address("0x0102"),
            Err(PrimitiveError::InvalidLength { expected: 20, got: 2 })
        );
    }

    #[test]
    fn test_parse_u256_hex_and_decimal() {
        assert_eq!(parse_u256("0x0100").unwrap(), U256::from(256));
        assert_eq!(parse_u256("256").unwrap(), U256::from(256));
        assert_eq!(parse_u256("0x").unwrap(), U256::zero());
        assert!(parse_u256("abc").is_err());
    }

    #[test]
    fn test_parse_u64_overflow() {
        assert_eq!(parse_u64("0x0f4240").unwrap(), 1_000_000);
        assert!(parse_u64("0x010000000000000000").is_err());
    }

    #[test]
    fn test_parse_h256_left_pads() {
        let h = parse_h256("0x01").unwrap();
        assert_eq!(h.as_bytes()[31], 1);
        assert!(h.as_bytes()[..31].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0xde, 0xad]), "0xdead");
        assert_eq!(to_hex(&[]), "0x");
    }
}
