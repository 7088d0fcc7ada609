//! Fork rules

use crate::gas::GasTable;
use sable_primitives::BlockNumber;

/// Block-height dependent feature flags and gas costs.
///
/// Implemented by the chain configuration; the interpreter only sees the
/// flattened [`Rules`] for the block being executed.
pub trait RuleSet {
    /// Homestead: DELEGATECALL, stricter creation rules
    fn is_homestead(&self, number: BlockNumber) -> bool;
    /// EIP-150 gas repricing
    fn is_eip150(&self, number: BlockNumber) -> bool;
    /// EIP-155 replay protection
    fn is_eip155(&self, number: BlockNumber) -> bool;
    /// EIP-160 EXP repricing
    fn is_eip160(&self, number: BlockNumber) -> bool;
    /// REVERT, RETURNDATA*, STATICCALL, code size limit
    fn is_byzantium(&self, number: BlockNumber) -> bool;
    /// Bit shifts, CREATE2, EXTCODEHASH, net gas metering
    fn is_constantinople(&self, number: BlockNumber) -> bool;

    /// Gas table in force at `number`
    fn gas_table(&self, number: BlockNumber) -> GasTable {
        if self.is_eip160(number) {
            GasTable::EIP160
        } else if self.is_eip150(number) {
            GasTable::EIP150
        } else {
            GasTable::FRONTIER
        }
    }

    /// Resolve every flag for one block
    fn rules(&self, number: BlockNumber) -> Rules {
        Rules {
            homestead: self.is_homestead(number),
            eip150: self.is_eip150(number),
            eip155: self.is_eip155(number),
            eip160: self.is_eip160(number),
            byzantium: self.is_byzantium(number),
            constantinople: self.is_constantinople(number),
            gas_table: self.gas_table(number),
        }
    }
}

/// Rules resolved for a single block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rules {
    /// Homestead active
    pub homestead: bool,
    /// EIP-150 active
    pub eip150: bool,
    /// EIP-155 active
    pub eip155: bool,
    /// EIP-160 active
    pub eip160: bool,
    /// Byzantium feature set active
    pub byzantium: bool,
    /// Constantinople feature set active
    pub constantinople: bool,
    /// Gas costs in force
    pub gas_table: GasTable,
}

impl Rules {
    /// Nothing enabled
    pub fn frontier() -> Self {
        Self::default()
    }

    /// Homestead only
    pub fn homestead() -> Self {
        Self {
            homestead: true,
            ..Self::default()
        }
    }

    /// Everything up to EIP-160, without Byzantium or Constantinople
    pub fn eip160() -> Self {
        Self {
            homestead: true,
            eip150: true,
            eip155: true,
            eip160: true,
            gas_table: GasTable::EIP160,
            ..Self::default()
        }
    }

    /// Every supported fork enabled
    pub fn all_enabled() -> Self {
        Self {
            byzantium: true,
            constantinople: true,
            ..Self::eip160()
        }
    }
}
