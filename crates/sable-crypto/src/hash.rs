//! Hash functions

use ripemd::Ripemd160;
use sable_primitives::H256;
use sha2::Sha256;
use sha3::{Digest, Keccak256};

/// keccak256 of the empty byte string, the code hash of accounts without code
pub const KECCAK_EMPTY: H256 = H256([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// keccak256(rlp("")), the root of an empty trie
pub const KECCAK_NULL_RLP: H256 = H256([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
]);

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    H256::from_slice(Keccak256::digest(data).as_slice())
}

/// Compute SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute RIPEMD-160 hash of the input data
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Known vectors ====================

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(keccak256(&[]), KECCAK_EMPTY);
    }

    #[test]
    fn test_keccak256_null_rlp() {
        // rlp("") is the single byte 0x80
        assert_eq!(keccak256(&[0x80]), KECCAK_NULL_RLP);
    }

    #[test]
    fn test_keccak256_hello() {
        let hash = keccak256(b"hello");
        assert_eq!(
            hex::encode(hash.as_bytes()),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_keccak256_32_zero_bytes() {
        let hash = keccak256(&[0u8; 32]);
        assert_eq!(
            hex::encode(hash.as_bytes()),
            "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"
        );
    }

    #[test]
    fn test_keccak256_transfer_selector() {
        let hash = keccak256(b"transfer(address,uint256)");
        assert_eq!(&hash.as_bytes()[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_sha256_vectors() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_ripemd160_vectors() {
        assert_eq!(hex::encode(ripemd160(b"")), "9c1185a5c5e9fc54612808977ee8f548b2258d31");
        assert_eq!(hex::encode(ripemd160(b"abc")), "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc");
    }

    #[test]
    fn test_keccak256_deterministic() {
        assert_eq!(keccak256(b"sable"), keccak256(b"sable"));
        assert_ne!(keccak256(&[0x00]), keccak256(&[0x01]));
    }
}
