//! Serializable world-state dump

use crate::account::Account;
use crate::error::StateResult;
use crate::object::StateObject;
use sable_primitives::{to_hex, Address, H256};
use sable_storage::{KeyValueStore, SecureTrie};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One account in a [`Dump`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpAccount {
    /// Balance in decimal
    pub balance: String,
    /// Nonce
    pub nonce: u64,
    /// Storage root
    pub root: String,
    /// Code hash
    pub code_hash: String,
    /// Code as hex
    pub code: String,
    /// Non-zero storage slots
    pub storage: BTreeMap<String, String>,
}

/// Committed state keyed by hex address
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dump {
    /// State root
    pub root: String,
    /// Accounts
    pub accounts: BTreeMap<String, DumpAccount>,
}

pub(crate) fn build_dump(root: H256, trie: &SecureTrie, db: &Arc<dyn KeyValueStore>) -> StateResult<Dump> {
    let mut accounts = BTreeMap::new();
    for (key, raw) in trie.iter() {
        let address = Address::from_slice(key);
        let data: Account = rlp::decode(raw)?;
        let mut object = StateObject::new(address, data.clone());
        let code = object.code(db)?;
        let storage = object
            .storage_entries(db)?
            .into_iter()
            .map(|(k, v)| (to_hex(k.as_bytes()), to_hex(v.as_bytes())))
            .collect();

        accounts.insert(
            to_hex(address.as_bytes()),
            DumpAccount {
                balance: data.balance.to_string(),
                nonce: data.nonce,
                root: to_hex(data.storage_root.as_bytes()),
                code_hash: to_hex(data.code_hash.as_bytes()),
                code: to_hex(&code),
                storage,
            },
        );
    }
    Ok(Dump {
        root: to_hex(root.as_bytes()),
        accounts,
    })
}
