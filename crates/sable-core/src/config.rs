//! Chain configuration

use sable_evm::RuleSet;
use sable_primitives::BlockNumber;
use serde::{Deserialize, Serialize};

/// Fork activation blocks for a chain. `None` means never activated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Chain identifier used for replay protection
    pub chain_id: u64,
    /// Homestead
    #[serde(default)]
    pub homestead_block: Option<BlockNumber>,
    /// EIP-150 gas repricing
    #[serde(default)]
    pub eip150_block: Option<BlockNumber>,
    /// EIP-155 replay protection
    #[serde(default)]
    pub eip155_block: Option<BlockNumber>,
    /// EIP-160 EXP repricing
    #[serde(default)]
    pub eip160_block: Option<BlockNumber>,
    /// ECIP-1045B: the Byzantium opcode and precompile set
    #[serde(default)]
    pub byzantium_block: Option<BlockNumber>,
    /// ECIP-1045C: the Constantinople opcode set
    #[serde(default)]
    pub constantinople_block: Option<BlockNumber>,
    /// Nonce of freshly created accounts
    #[serde(default)]
    pub starting_nonce: u64,
}

fn active(fork: Option<BlockNumber>, number: BlockNumber) -> bool {
    fork.is_some_and(|block| number >= block)
}

impl ChainConfig {
    /// Classic main network
    pub fn mainnet() -> Self {
        Self {
            chain_id: 61,
            homestead_block: Some(1_150_000),
            eip150_block: Some(2_500_000),
            eip155_block: Some(3_000_000),
            eip160_block: Some(3_000_000),
            byzantium_block: Some(8_772_000),
            constantinople_block: Some(9_573_000),
            starting_nonce: 0,
        }
    }

    /// Morden test network; accounts start at nonce 2^20
    pub fn testnet() -> Self {
        Self {
            chain_id: 62,
            homestead_block: Some(494_000),
            eip150_block: Some(1_783_000),
            eip155_block: Some(1_915_000),
            eip160_block: Some(1_915_000),
            byzantium_block: None,
            constantinople_block: None,
            starting_nonce: 1 << 20,
        }
    }

    /// No forks
    pub fn frontier() -> Self {
        Self {
            chain_id: 1,
            homestead_block: None,
            eip150_block: None,
            eip155_block: None,
            eip160_block: None,
            byzantium_block: None,
            constantinople_block: None,
            starting_nonce: 0,
        }
    }

    /// Every fork from genesis
    pub fn all_enabled() -> Self {
        Self {
            chain_id: 1,
            homestead_block: Some(0),
            eip150_block: Some(0),
            eip155_block: Some(0),
            eip160_block: Some(0),
            byzantium_block: Some(0),
            constantinople_block: Some(0),
            starting_nonce: 0,
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl RuleSet for ChainConfig {
    fn is_homestead(&self, number: BlockNumber) -> bool {
        active(self.homestead_block, number)
    }

    fn is_eip150(&self, number: BlockNumber) -> bool {
        active(self.eip150_block, number)
    }

    fn is_eip155(&self, number: BlockNumber) -> bool {
        active(self.eip155_block, number)
    }

    fn is_eip160(&self, number: BlockNumber) -> bool {
        active(self.eip160_block, number)
    }

    fn is_byzantium(&self, number: BlockNumber) -> bool {
        active(self.byzantium_block, number)
    }

    fn is_constantinople(&self, number: BlockNumber) -> bool {
        active(self.constantinople_block, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_evm::{GasTable, Rules};

    // ==================== Fork activation ====================

    #[test]
    fn test_mainnet_forks() {
        let config = ChainConfig::mainnet();
        assert!(!config.is_homestead(1_149_999));
        assert!(config.is_homestead(1_150_000));
        assert!(!config.is_eip150(2_499_999));
        assert!(config.is_eip150(2_500_000));
        assert!(config.is_eip160(3_000_000));
        assert!(!config.is_constantinople(9_000_000));
    }

    #[test]
    fn test_gas_table_selection() {
        let config = ChainConfig::mainnet();
        assert_eq!(config.gas_table(0), GasTable::FRONTIER);
        assert_eq!(config.gas_table(1_150_000), GasTable::FRONTIER);
        assert_eq!(config.gas_table(2_500_000), GasTable::EIP150);
        assert_eq!(config.gas_table(3_000_000), GasTable::EIP160);
    }

    #[test]
    fn test_presets_match_rules() {
        assert_eq!(ChainConfig::all_enabled().rules(0), Rules::all_enabled());
        assert_eq!(ChainConfig::frontier().rules(10_000_000), Rules::frontier());
        assert_eq!(ChainConfig::testnet().starting_nonce, 1 << 20);
    }

    // ==================== Serde ====================

    #[test]
    fn test_deserialize() {
        let json = r#"{"chainId":7,"homesteadBlock":5,"eip150Block":10,"startingNonce":3}"#;
        let config: ChainConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.chain_id, 7);
        assert!(config.is_homestead(5));
        assert!(!config.is_eip160(u64::MAX));
        assert_eq!(config.starting_nonce, 3);
    }

    #[test]
    fn test_roundtrip_field_names() {
        let value = serde_json::to_value(ChainConfig::testnet()).unwrap();
        assert_eq!(value["byzantiumBlock"], serde_json::Value::Null);
        assert_eq!(value["eip155Block"], 1_915_000);
    }
}
