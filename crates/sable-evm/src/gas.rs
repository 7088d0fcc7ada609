//! Gas costs and fork-dependent gas tables

use crate::error::{EvmError, EvmResult};
use sable_primitives::{H256, U256};

/// Fork-independent gas costs
pub mod cost {
    /// Zero gas
    pub const ZERO: u64 = 0;
    /// Base gas
    pub const BASE: u64 = 2;
    /// Very low gas
    pub const VERYLOW: u64 = 3;
    /// Low gas
    pub const LOW: u64 = 5;
    /// Mid gas
    pub const MID: u64 = 8;
    /// High gas
    pub const HIGH: u64 = 10;
    /// Ext gas (BLOCKHASH)
    pub const EXT: u64 = 20;

    /// Jump dest gas
    pub const JUMPDEST: u64 = 1;
    /// Exp gas
    pub const EXP: u64 = 10;
    /// SHA3 base gas
    pub const SHA3: u64 = 30;
    /// SHA3 word gas
    pub const SHA3_WORD: u64 = 6;
    /// Per word copied by the *COPY opcodes
    pub const COPY: u64 = 3;
    /// Linear memory coefficient
    pub const MEMORY: u64 = 3;
    /// Quadratic memory divisor
    pub const QUAD_COEFF_DIV: u64 = 512;
    /// EXTCODEHASH
    pub const EXTCODEHASH: u64 = 400;

    /// Sstore set gas (zero to non-zero)
    pub const SSTORE_SET: u64 = 20000;
    /// Sstore reset gas
    pub const SSTORE_RESET: u64 = 5000;
    /// Sstore clear refund
    pub const SSTORE_CLEAR_REFUND: u64 = 15000;

    /// EIP-1283: no-op or dirty-slot write
    pub const NET_SSTORE_NOOP: u64 = 200;
    /// EIP-1283: fresh slot written from zero
    pub const NET_SSTORE_INIT: u64 = 20000;
    /// EIP-1283: clean slot written from non-zero
    pub const NET_SSTORE_CLEAN: u64 = 5000;
    /// EIP-1283: already dirty slot
    pub const NET_SSTORE_DIRTY: u64 = 200;
    /// EIP-1283: clearing a slot
    pub const NET_SSTORE_CLEAR_REFUND: u64 = 15000;
    /// EIP-1283: restoring a slot that was non-zero originally
    pub const NET_SSTORE_RESET_REFUND: u64 = 4800;
    /// EIP-1283: restoring a slot that was zero originally
    pub const NET_SSTORE_RESET_CLEAR_REFUND: u64 = 19800;

    /// Log gas
    pub const LOG: u64 = 375;
    /// Log topic gas
    pub const LOG_TOPIC: u64 = 375;
    /// Log data gas per byte
    pub const LOG_DATA: u64 = 8;

    /// Create gas
    pub const CREATE: u64 = 32000;
    /// Create2 gas (plus hashing of the init code)
    pub const CREATE2: u64 = 32000;
    /// Per byte of deployed code
    pub const CREATE_DATA: u64 = 200;
    /// Call value transfer
    pub const CALL_VALUE: u64 = 9000;
    /// Call to an account that does not exist yet
    pub const CALL_NEW_ACCOUNT: u64 = 25000;
    /// Stipend handed to the callee on value transfer
    pub const CALL_STIPEND: u64 = 2300;
    /// Refund for the first SELFDESTRUCT of an account
    pub const SUICIDE_REFUND: u64 = 24000;

    /// Transaction base gas
    pub const TX: u64 = 21000;
    /// Contract-creating transaction base gas (Homestead)
    pub const TX_CREATE: u64 = 53000;
    /// Per zero byte of transaction data
    pub const TX_DATA_ZERO: u64 = 4;
    /// Per non-zero byte of transaction data
    pub const TX_DATA_NON_ZERO: u64 = 68;

    /// Nested call/create depth limit
    pub const CALL_CREATE_DEPTH: usize = 1024;
    /// Deployed code size limit (EIP-170)
    pub const MAX_CODE_SIZE: usize = 24576;
}

/// Fork-dependent costs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasTable {
    /// EXTCODESIZE
    pub extcode_size: u64,
    /// EXTCODECOPY base
    pub extcode_copy: u64,
    /// BALANCE
    pub balance: u64,
    /// SLOAD (also the EIP-1283 no-op price)
    pub sload: u64,
    /// CALL family base
    pub calls: u64,
    /// SELFDESTRUCT base
    pub suicide: u64,
    /// EXP per exponent byte
    pub exp_byte: u64,
    /// SELFDESTRUCT to a missing account; non-zero enables the 63/64 rule
    pub create_by_suicide: u64,
}

impl GasTable {
    /// Frontier and Homestead
    pub const FRONTIER: GasTable = GasTable {
        extcode_size: 20,
        extcode_copy: 20,
        balance: 20,
        sload: 50,
        calls: 40,
        suicide: 0,
        exp_byte: 10,
        create_by_suicide: 0,
    };

    /// EIP-150 repricing
    pub const EIP150: GasTable = GasTable {
        extcode_size: 700,
        extcode_copy: 700,
        balance: 400,
        sload: 200,
        calls: 700,
        suicide: 5000,
        exp_byte: 10,
        create_by_suicide: 25000,
    };

    /// EIP-160 EXP repricing on top of EIP-150
    pub const EIP160: GasTable = GasTable {
        exp_byte: 50,
        ..GasTable::EIP150
    };

    /// Whether the EIP-150 all-but-one-64th rule caps forwarded gas
    pub fn caps_call_gas(&self) -> bool {
        self.create_by_suicide > 0
    }
}

impl Default for GasTable {
    fn default() -> Self {
        GasTable::FRONTIER
    }
}

/// Total cost of `words` words of memory
pub fn memory_gas(words: u64) -> u64 {
    words
        .saturating_mul(cost::MEMORY)
        .saturating_add(words.saturating_mul(words) / cost::QUAD_COEFF_DIV)
}

/// `per_word` for every started 32-byte word of `len` bytes
pub fn word_gas(len: u64, per_word: u64) -> EvmResult<u64> {
    len.div_ceil(32)
        .checked_mul(per_word)
        .ok_or(EvmError::OutOfGas)
}

/// Per-byte EXP charge
pub fn exp_gas(table: &GasTable, exponent: &U256) -> EvmResult<u64> {
    let bytes = (exponent.bits() as u64).div_ceil(8);
    bytes.checked_mul(table.exp_byte).ok_or(EvmError::OutOfGas)
}

/// Gas to forward to a child call.
///
/// With the 63/64 rule the request is capped at all but one 64th of what is
/// left after `base`; before it the request must fit in full, which the
/// caller checks when charging.
pub fn call_gas(table: &GasTable, available: u64, base: u64, requested: &U256) -> EvmResult<u64> {
    if table.caps_call_gas() {
        let available = available.saturating_sub(base);
        let cap = available - available / 64;
        if requested.bits() > 64 || cap < requested.low_u64() {
            return Ok(cap);
        }
    }
    if requested.bits() > 64 {
        return Err(EvmError::OutOfGas);
    }
    Ok(requested.low_u64())
}

/// Signed change to the refund counter caused by an SSTORE
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefundDelta {
    /// Gas added to the counter
    pub add: u64,
    /// Gas removed from the counter
    pub sub: u64,
}

/// Pre-Constantinople SSTORE pricing
pub fn sstore_gas_legacy(current: &H256, new: &H256) -> (u64, RefundDelta) {
    if current.is_zero() && !new.is_zero() {
        (cost::SSTORE_SET, RefundDelta::default())
    } else if !current.is_zero() && new.is_zero() {
        (
            cost::SSTORE_RESET,
            RefundDelta {
                add: cost::SSTORE_CLEAR_REFUND,
                sub: 0,
            },
        )
    } else {
        (cost::SSTORE_RESET, RefundDelta::default())
    }
}

/// EIP-1283 net gas metering.
///
/// `original` is the slot value at the start of the transaction, `current`
/// the value before this write.
pub fn sstore_gas_net(original: &H256, current: &H256, new: &H256) -> (u64, RefundDelta) {
    let mut refund = RefundDelta::default();
    if current == new {
        return (cost::NET_SSTORE_NOOP, refund);
    }
    if original == current {
        if original.is_zero() {
            return (cost::NET_SSTORE_INIT, refund);
        }
        if new.is_zero() {
            refund.add = cost::NET_SSTORE_CLEAR_REFUND;
        }
        return (cost::NET_SSTORE_CLEAN, refund);
    }
    if !original.is_zero() {
        if current.is_zero() {
            refund.sub += cost::NET_SSTORE_CLEAR_REFUND;
        } else if new.is_zero() {
            refund.add += cost::NET_SSTORE_CLEAR_REFUND;
        }
    }
    if original == new {
        if original.is_zero() {
            refund.add += cost::NET_SSTORE_RESET_CLEAR_REFUND;
        } else {
            refund.add += cost::NET_SSTORE_RESET_REFUND;
        }
    }
    (cost::NET_SSTORE_DIRTY, refund)
}

/// Intrinsic gas of a transaction carrying `data`
pub fn intrinsic_gas(data: &[u8], contract_creation: bool, homestead: bool) -> u64 {
    let base = if contract_creation && homestead {
        cost::TX_CREATE
    } else {
        cost::TX
    };
    let zeros = data.iter().filter(|b| **b == 0).count() as u64;
    let non_zeros = data.len() as u64 - zeros;
    base.saturating_add(zeros.saturating_mul(cost::TX_DATA_ZERO))
        .saturating_add(non_zeros.saturating_mul(cost::TX_DATA_NON_ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(v: u64) -> H256 {
        H256::from_low_u64_be(v)
    }

    // ==================== Tables ====================

    #[test]
    fn test_tables() {
        assert_eq!(GasTable::FRONTIER.sload, 50);
        assert_eq!(GasTable::EIP150.sload, 200);
        assert_eq!(GasTable::EIP150.exp_byte, 10);
        assert_eq!(GasTable::EIP160.exp_byte, 50);
        assert_eq!(GasTable::EIP160.calls, 700);
        assert!(!GasTable::FRONTIER.caps_call_gas());
        assert!(GasTable::EIP150.caps_call_gas());
    }

    #[test]
    fn test_memory_gas() {
        assert_eq!(memory_gas(0), 0);
        assert_eq!(memory_gas(1), 3);
        assert_eq!(memory_gas(32), 98);
        assert_eq!(memory_gas(1024), 3 * 1024 + 2048);
    }

    #[test]
    fn test_exp_gas() {
        assert_eq!(exp_gas(&GasTable::EIP160, &U256::zero()).unwrap(), 0);
        assert_eq!(exp_gas(&GasTable::EIP160, &U256::from(0xff)).unwrap(), 50);
        assert_eq!(exp_gas(&GasTable::EIP160, &U256::from(0x100)).unwrap(), 100);
        assert_eq!(exp_gas(&GasTable::FRONTIER, &U256::MAX).unwrap(), 320);
    }

    // ==================== Call gas ====================

    #[test]
    fn test_call_gas_all_but_one_64th() {
        let gas = call_gas(&GasTable::EIP150, 64_000 + 100, 100, &U256::MAX).unwrap();
        assert_eq!(gas, 63_000);
        let gas = call_gas(&GasTable::EIP150, 64_000, 0, &U256::from(1000)).unwrap();
        assert_eq!(gas, 1000);
    }

    #[test]
    fn test_call_gas_frontier() {
        let gas = call_gas(&GasTable::FRONTIER, 100, 0, &U256::from(5000)).unwrap();
        assert_eq!(gas, 5000);
        assert_eq!(
            call_gas(&GasTable::FRONTIER, 100, 0, &U256::MAX),
            Err(EvmError::OutOfGas)
        );
    }

    // ==================== SSTORE ====================

    #[test]
    fn test_sstore_legacy() {
        assert_eq!(sstore_gas_legacy(&word(0), &word(1)).0, 20000);
        let (gas, refund) = sstore_gas_legacy(&word(1), &word(0));
        assert_eq!(gas, 5000);
        assert_eq!(refund.add, 15000);
        assert_eq!(sstore_gas_legacy(&word(0), &word(0)).0, 5000);
        assert_eq!(sstore_gas_legacy(&word(1), &word(2)).0, 5000);
    }

    #[test]
    fn test_sstore_net_table() {
        let cases: [(u64, u64, u64, u64, u64, u64); 10] = [
            // original, current, new, gas, refund add, refund sub
            (0, 0, 0, 200, 0, 0),
            (0, 0, 1, 20000, 0, 0),
            (1, 1, 1, 200, 0, 0),
            (1, 1, 2, 5000, 0, 0),
            (1, 1, 0, 5000, 15000, 0),
            (0, 1, 0, 200, 19800, 0),
            (0, 1, 2, 200, 0, 0),
            (1, 0, 1, 200, 4800, 15000),
            (1, 0, 2, 200, 0, 15000),
            (1, 2, 0, 200, 15000, 0),
        ];
        for (original, current, new, gas, add, sub) in cases {
            let (g, refund) = sstore_gas_net(&word(original), &word(current), &word(new));
            assert_eq!(g, gas, "{original} {current} {new}");
            assert_eq!(refund, RefundDelta { add, sub }, "{original} {current} {new}");
        }
    }

    #[test]
    fn test_intrinsic_gas() {
        assert_eq!(intrinsic_gas(&[], false, true), 21000);
        assert_eq!(intrinsic_gas(&[], true, true), 53000);
        assert_eq!(intrinsic_gas(&[], true, false), 21000);
        assert_eq!(intrinsic_gas(&[0, 1, 0, 2], false, true), 21000 + 8 + 136);
    }
}
