//! Fixture types for the JSON VM-test format
//!
//! Numbers may appear as 0x-prefixed hex, decimal strings or plain JSON
//! integers; all of them decode into the primitive types used by the EVM.

use bytes::Bytes;
use sable_primitives::{
    parse_address, parse_bytes, parse_h256, parse_u256, parse_u64, Address, PrimitiveError, H256,
    U256,
};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// A JSON string or integer, before parsing
#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Str(String),
    Num(u64),
}

impl Raw {
    fn into_string(self) -> String {
        match self {
            Raw::Str(s) => s,
            Raw::Num(n) => n.to_string(),
        }
    }
}

fn decode<'de, D, T>(deserializer: D, parse: fn(&str) -> Result<T, PrimitiveError>) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(D::Error::custom)
}

fn decode_number<'de, D, T>(deserializer: D, parse: fn(&str) -> Result<T, PrimitiveError>) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Raw::deserialize(deserializer)?.into_string();
    parse(&s).map_err(D::Error::custom)
}

/// Hex-encoded byte string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Bytes);

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode(deserializer, parse_bytes).map(|b| HexBytes(Bytes::from(b)))
    }
}

/// 256-bit number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexU256(pub U256);

impl<'de> Deserialize<'de> for HexU256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode_number(deserializer, parse_u256).map(HexU256)
    }
}

/// 64-bit number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexU64(pub u64);

impl<'de> Deserialize<'de> for HexU64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode_number(deserializer, parse_u64).map(HexU64)
    }
}

/// 20-byte address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HexAddress(pub Address);

impl<'de> Deserialize<'de> for HexAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode(deserializer, parse_address).map(HexAddress)
    }
}

/// 32-byte hash or storage word, left-padded when shorter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HexH256(pub H256);

impl<'de> Deserialize<'de> for HexH256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode(deserializer, parse_h256).map(HexH256)
    }
}

// =============================================================================
// VM Test Types
// =============================================================================

/// VM test file: test name to case
pub type VmTestFile = BTreeMap<String, VmTestCase>;

/// Single VM test case
#[derive(Debug, Deserialize)]
pub struct VmTestCase {
    /// Block environment
    pub env: VmEnv,
    /// Frame to execute
    pub exec: VmExec,
    /// Expected gas left; absent when execution must fail
    pub gas: Option<HexU64>,
    /// Expected hash of the emitted logs
    pub logs: Option<HexH256>,
    /// Expected return data
    pub out: Option<HexBytes>,
    /// Accounts before execution
    #[serde(default)]
    pub pre: BTreeMap<HexAddress, AccountState>,
    /// Accounts after execution; absent when execution must fail
    pub post: Option<BTreeMap<HexAddress, AccountState>>,
}

impl VmTestCase {
    /// Whether the fixture expects execution to fail
    pub fn expects_failure(&self) -> bool {
        self.gas.is_none()
    }
}

/// Block environment of a VM test
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmEnv {
    /// Block beneficiary
    pub current_coinbase: HexAddress,
    /// Block difficulty
    pub current_difficulty: HexU256,
    /// Block gas limit
    pub current_gas_limit: HexU64,
    /// Block number
    pub current_number: HexU64,
    /// Block timestamp
    pub current_timestamp: HexU64,
}

/// Frame parameters of a VM test
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmExec {
    /// Account the code runs as
    pub address: HexAddress,
    /// Caller
    pub caller: HexAddress,
    /// Code to execute
    pub code: HexBytes,
    /// Call data
    pub data: HexBytes,
    /// Gas provided
    pub gas: HexU64,
    /// Gas price
    pub gas_price: HexU256,
    /// Transaction origin
    pub origin: HexAddress,
    /// Value sent with the call
    pub value: HexU256,
}

/// Account as listed in `pre` and `post`
#[derive(Debug, Default, Deserialize)]
pub struct AccountState {
    /// Balance
    #[serde(default)]
    pub balance: HexU256,
    /// Code
    #[serde(default)]
    pub code: HexBytes,
    /// Nonce
    #[serde(default)]
    pub nonce: HexU64,
    /// Storage slots
    #[serde(default)]
    pub storage: BTreeMap<HexH256, HexH256>,
}
