//! Block gas accounting

use crate::error::{TransitionError, TransitionResult};
use std::fmt;

/// Gas available to the remaining transactions of a block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasPool(u64);

impl GasPool {
    /// Pool holding `gas`
    pub fn new(gas: u64) -> Self {
        Self(gas)
    }

    /// Return unused gas
    pub fn add_gas(&mut self, amount: u64) -> &mut Self {
        self.0 = self.0.saturating_add(amount);
        self
    }

    /// Reserve `amount` for a transaction
    pub fn sub_gas(&mut self, amount: u64) -> TransitionResult<()> {
        if self.0 < amount {
            return Err(TransitionError::GasLimitReached {
                requested: amount,
                available: self.0,
            });
        }
        self.0 -= amount;
        Ok(())
    }

    /// Gas left
    pub fn gas(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GasPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
