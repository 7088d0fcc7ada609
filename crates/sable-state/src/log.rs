//! Contract event logs

use rlp::{Encodable, RlpStream};
use sable_crypto::keccak256;
use sable_primitives::{Address, H256};
use serde::Serialize;

/// A log emitted by LOG0..LOG4
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics
    pub topics: Vec<H256>,
    /// Unindexed payload
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
    /// Transaction hash
    pub tx_hash: H256,
    /// Transaction position in the block
    pub tx_index: usize,
    /// Block hash
    pub block_hash: H256,
    /// Position of the log in the block
    pub index: usize,
}

fn serialize_hex<S: serde::Serializer>(data: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&sable_primitives::to_hex(data))
}

impl Log {
    /// Log without block metadata
    pub fn new(address: Address, topics: Vec<H256>, data: Vec<u8>) -> Self {
        Self {
            address,
            topics,
            data,
            ..Self::default()
        }
    }
}

// Consensus encoding only covers address, topics and data.
impl Encodable for Log {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.address);
        s.append_list::<H256, _>(&self.topics);
        s.append(&self.data);
    }
}

/// keccak256 of the RLP list of `logs`
pub fn logs_hash(logs: &[Log]) -> H256 {
    keccak256(&rlp::encode_list::<Log, _>(logs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_logs_hash() {
        // keccak256(0xc0)
        assert_eq!(
            format!("{:x}", logs_hash(&[])),
            "1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347"
        );
    }

    #[test]
    fn test_metadata_not_hashed() {
        let a = Log::new(Address::repeat_byte(1), vec![H256::repeat_byte(2)], vec![3]);
        let mut b = a.clone();
        b.index = 7;
        b.tx_hash = H256::repeat_byte(9);
        assert_eq!(logs_hash(&[a.clone()]), logs_hash(&[b]));

        let mut c = a.clone();
        c.data.push(4);
        assert_ne!(logs_hash(&[a]), logs_hash(&[c]));
    }

    #[test]
    fn test_serialize_data_as_hex() {
        let log = Log::new(Address::zero(), vec![], vec![0xab]);
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["data"], "0xab");
        assert!(json.get("txHash").is_some());
    }
}
