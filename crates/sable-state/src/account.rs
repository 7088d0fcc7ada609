//! Account record stored in the state trie

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use sable_crypto::{KECCAK_EMPTY, KECCAK_NULL_RLP};
use sable_primitives::{H256, U256};

/// Consensus representation of an account: `[nonce, balance, storage_root, code_hash]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Account nonce
    pub nonce: u64,
    /// Account balance
    pub balance: U256,
    /// Root of the account's storage trie
    pub storage_root: H256,
    /// keccak256 of the account's code
    pub code_hash: H256,
}

impl Account {
    /// A fresh account with the given nonce and nothing else
    pub fn new(nonce: u64) -> Self {
        Self {
            nonce,
            balance: U256::zero(),
            storage_root: KECCAK_NULL_RLP,
            code_hash: KECCAK_EMPTY,
        }
    }

    /// Zero nonce, zero balance and no code
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.code_hash == KECCAK_EMPTY
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Encodable for Account {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.nonce);
        s.append(&self.balance);
        s.append(&self.storage_root);
        s.append(&self.code_hash);
    }
}

impl Decodable for Account {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 4 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            nonce: rlp.val_at(0)?,
            balance: rlp.val_at(1)?,
            storage_root: rlp.val_at(2)?,
            code_hash: rlp.val_at(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_is_empty() {
        let account = Account::new(0);
        assert!(account.is_empty());
        assert_eq!(account.storage_root, KECCAK_NULL_RLP);
        assert_eq!(account.code_hash, KECCAK_EMPTY);
        assert!(!Account::new(1).is_empty());
    }

    #[test]
    fn test_rlp_layout() {
        let account = Account {
            nonce: 1,
            balance: U256::from(0x0400),
            ..Account::default()
        };
        let encoded = rlp::encode(&account);
        let view = Rlp::new(&encoded);
        assert_eq!(view.item_count().unwrap(), 4);
        assert_eq!(view.val_at::<u64>(0).unwrap(), 1);
        assert_eq!(view.at(1).unwrap().data().unwrap(), &[0x04, 0x00]);

        let decoded: Account = rlp::decode(&encoded).unwrap();
        assert_eq!(decoded, account);
    }

    #[test]
    fn test_decode_rejects_short_list() {
        let mut s = RlpStream::new_list(2);
        s.append(&1u64);
        s.append(&2u64);
        assert!(rlp::decode::<Account>(&s.out()).is_err());
    }
}
