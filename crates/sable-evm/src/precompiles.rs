//! Precompiled contracts at addresses 1 to 4

use crate::error::EvmResult;
use crate::gas::word_gas;
use sable_crypto::{ecrecover, ripemd160, sha256};
use sable_primitives::{Address, H256};

/// A native contract reachable through the CALL family
pub trait PrecompiledContract: Sync {
    /// Gas charged for `input`
    fn required_gas(&self, input: &[u8]) -> u64;
    /// Compute the output
    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>>;
}

/// secp256k1 public key recovery
#[derive(Debug)]
pub struct EcRecover;

/// SHA-256
#[derive(Debug)]
pub struct Sha256Hash;

/// RIPEMD-160, left-padded to 32 bytes
#[derive(Debug)]
pub struct Ripemd160Hash;

/// Identity
#[derive(Debug)]
pub struct DataCopy;

fn linear_cost(input: &[u8], base: u64, per_word: u64) -> u64 {
    word_gas(input.len() as u64, per_word)
        .map(|g| g.saturating_add(base))
        .unwrap_or(u64::MAX)
}

fn right_pad(input: &[u8], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let n = input.len().min(len);
    out[..n].copy_from_slice(&input[..n]);
    out
}

impl PrecompiledContract for EcRecover {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        3000
    }

    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>> {
        let input = right_pad(input, 128);
        // v is a full word that must be exactly 27 or 28
        if input[32..63].iter().any(|b| *b != 0) {
            return Ok(Vec::new());
        }
        let hash = H256::from_slice(&input[..32]);
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&input[64..96]);
        s.copy_from_slice(&input[96..128]);
        match ecrecover(&hash, input[63], &r, &s) {
            Ok(address) => {
                let mut out = vec![0u8; 32];
                out[12..].copy_from_slice(address.as_bytes());
                Ok(out)
            }
            Err(_) => Ok(Vec::new()),
        }
    }
}

impl PrecompiledContract for Sha256Hash {
    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(input, 60, 12)
    }

    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>> {
        Ok(sha256(input).to_vec())
    }
}

impl PrecompiledContract for Ripemd160Hash {
    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(input, 600, 120)
    }

    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>> {
        let mut out = vec![0u8; 32];
        out[12..].copy_from_slice(&ripemd160(input));
        Ok(out)
    }
}

impl PrecompiledContract for DataCopy {
    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(input, 15, 3)
    }

    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>> {
        Ok(input.to_vec())
    }
}

/// Precompile living at `address`, if any
pub fn precompile(address: &Address) -> Option<&'static dyn PrecompiledContract> {
    let bytes = address.as_bytes();
    if bytes[..19].iter().any(|b| *b != 0) {
        return None;
    }
    match bytes[19] {
        1 => Some(&EcRecover),
        2 => Some(&Sha256Hash),
        3 => Some(&Ripemd160Hash),
        4 => Some(&DataCopy),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_crypto::{public_key_to_address, sign, PrivateKey};

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn test_lookup() {
        assert!(precompile(&addr(0)).is_none());
        assert!(precompile(&addr(1)).is_some());
        assert!(precompile(&addr(4)).is_some());
        assert!(precompile(&addr(5)).is_none());
        assert!(precompile(&addr(0x0101)).is_none());
    }

    #[test]
    fn test_gas() {
        assert_eq!(EcRecover.required_gas(&[]), 3000);
        assert_eq!(Sha256Hash.required_gas(&[]), 60);
        assert_eq!(Sha256Hash.required_gas(&[0; 33]), 84);
        assert_eq!(Ripemd160Hash.required_gas(&[0; 32]), 720);
        assert_eq!(DataCopy.required_gas(&[0; 64]), 21);
    }

    #[test]
    fn test_sha256_empty() {
        let out = Sha256Hash.run(&[]).unwrap();
        assert_eq!(
            hex::encode(out),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_ripemd_padded() {
        let out = Ripemd160Hash.run(&[]).unwrap();
        assert_eq!(out.len(), 32);
        assert!(out[..12].iter().all(|b| *b == 0));
        assert_eq!(hex::encode(&out[12..]), "9c1185a5c5e9fc54612808977ee8f548b2258d31");
    }

    #[test]
    fn test_identity() {
        assert_eq!(DataCopy.run(&[1, 2, 3]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_ecrecover_roundtrip() {
        let key = PrivateKey::from_slice(&[0x46; 32]).unwrap();
        let expected = public_key_to_address(key.verifying_key());
        let hash = H256::repeat_byte(0x11);
        let sig = sign(&hash, &key).unwrap();

        let mut input = vec![0u8; 128];
        input[..32].copy_from_slice(hash.as_bytes());
        input[63] = sig.v;
        input[64..96].copy_from_slice(&sig.r);
        input[96..].copy_from_slice(&sig.s);

        let out = EcRecover.run(&input).unwrap();
        assert_eq!(&out[12..], expected.as_bytes());
    }

    #[test]
    fn test_ecrecover_bad_v() {
        let mut input = vec![0u8; 128];
        input[63] = 29;
        assert!(EcRecover.run(&input).unwrap().is_empty());
        input[63] = 27;
        input[40] = 1;
        assert!(EcRecover.run(&input).unwrap().is_empty());
    }
}
