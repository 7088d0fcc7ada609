//! ECDSA signature operations using secp256k1

use crate::{keccak256, CryptoError};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use sable_primitives::{Address, H256};

/// ECDSA signature with recovery id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component
    pub r: [u8; 32],
    /// s component
    pub s: [u8; 32],
    /// recovery id, stored as 27 or 28
    pub v: u8,
}

/// secp256k1 public key
pub type PublicKey = VerifyingKey;

/// secp256k1 private key
pub type PrivateKey = SigningKey;

impl Signature {
    /// Recovery id (0 or 1)
    pub fn recovery_id(&self) -> u8 {
        if self.v >= 27 {
            self.v - 27
        } else {
            self.v
        }
    }
}

/// Sign a 32-byte hash, normalizing to low-s form
pub fn sign(message_hash: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (signature, recovery_id) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => {
            let flipped = RecoveryId::from_byte(recovery_id.to_byte() ^ 1)
                .ok_or(CryptoError::InvalidRecoveryId(recovery_id.to_byte() ^ 1))?;
            (normalized, flipped)
        }
        None => (signature, recovery_id),
    };

    Ok(Signature {
        r: signature.r().to_bytes().into(),
        s: signature.s().to_bytes().into(),
        v: recovery_id.to_byte() + 27,
    })
}

/// Recover the signer's public key
pub fn recover_public_key(message_hash: &H256, signature: &Signature) -> Result<PublicKey, CryptoError> {
    let r: k256::FieldBytes = signature.r.into();
    let s: k256::FieldBytes = signature.s.into();
    let k256_sig = K256Signature::from_scalars(r, s)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let recovery_id = RecoveryId::from_byte(signature.recovery_id())
        .ok_or(CryptoError::InvalidRecoveryId(signature.recovery_id()))?;

    VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &k256_sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))
}

/// Derive the account address of a public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    // skip the 0x04 tag
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// Recover the signer's address from `(hash, v, r, s)`.
///
/// `v` must be 27 or 28.
pub fn ecrecover(message_hash: &H256, v: u8, r: &[u8; 32], s: &[u8; 32]) -> Result<Address, CryptoError> {
    if v != 27 && v != 28 {
        return Err(CryptoError::InvalidRecoveryId(v));
    }
    let signature = Signature { r: *r, s: *s, v };
    let public_key = recover_public_key(message_hash, &signature)?;
    Ok(public_key_to_address(&public_key))
}
