//! # sable-primitives
//!
//! Primitive types shared by every Sable crate.
//!
//! Fixed-size hashes and the 256-bit word come straight from `primitive-types`
//! so that RLP and serde support are available everywhere without wrappers.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod convert;
mod error;
mod hex_util;

pub use convert::{address_to_h256, address_to_word, h256_to_word, word_to_address, word_to_h256};
pub use error::PrimitiveError;
pub use hex_util::{parse_address, parse_bytes, parse_h256, parse_u256, parse_u64, to_hex};

pub use primitive_types::{H160, H256, U256, U512};

/// 20-byte account address
pub type Address = H160;

/// Block number type
pub type BlockNumber = u64;

/// Account nonce type
pub type Nonce = u64;

/// Gas type
pub type Gas = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_basic() {
        let a = U256::from(100u64);
        let b = U256::from(200u64);
        assert_eq!(a + b, U256::from(300u64));
    }

    #[test]
    fn test_address_alias() {
        let addr: Address = H160::repeat_byte(0x11);
        assert_eq!(addr.as_bytes().len(), 20);
    }
}
