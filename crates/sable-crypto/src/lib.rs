//! # sable-crypto
//!
//! Cryptographic primitives for Sable.
//!
//! - Keccak-256, SHA-256 and RIPEMD-160 hashing
//! - secp256k1 signing and public key recovery
//! - CREATE / CREATE2 contract address derivation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod contract;
mod error;
mod hash;
mod signature;

pub use contract::{create2_address, create_address};
pub use error::CryptoError;
pub use hash::{keccak256, ripemd160, sha256, KECCAK_EMPTY, KECCAK_NULL_RLP};
pub use signature::{
    ecrecover, public_key_to_address, recover_public_key, sign, PrivateKey, PublicKey, Signature,
};
