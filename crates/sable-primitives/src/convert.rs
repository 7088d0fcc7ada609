//! Conversions between words, hashes and addresses

use primitive_types::{H160, H256, U256};

/// Interpret a 32-byte hash as a big-endian word
pub fn h256_to_word(hash: &H256) -> U256 {
    U256::from_big_endian(hash.as_bytes())
}

/// Encode a word as a 32-byte big-endian hash
pub fn word_to_h256(word: &U256) -> H256 {
    let mut out = [0u8; 32];
    word.to_big_endian(&mut out);
    H256(out)
}

/// Take the low 20 bytes of a word as an address
pub fn word_to_address(word: &U256) -> H160 {
    let bytes = word_to_h256(word);
    H160::from_slice(&bytes.as_bytes()[12..])
}

/// Left-pad an address into a word
pub fn address_to_word(address: &H160) -> U256 {
    U256::from_big_endian(address.as_bytes())
}

/// Left-pad an address into a 32-byte hash
pub fn address_to_h256(address: &H160) -> H256 {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(address.as_bytes());
    H256(out)
}
