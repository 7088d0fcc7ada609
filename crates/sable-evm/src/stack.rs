//! EVM word stack

use crate::error::{EvmError, EvmResult};
use sable_primitives::U256;

/// Maximum number of words on the stack
pub const STACK_LIMIT: usize = 1024;

/// Bounded LIFO stack of 256-bit words
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordStack {
    data: Vec<U256>,
}

impl WordStack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(STACK_LIMIT),
        }
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: U256) -> EvmResult<()> {
        if self.data.len() >= STACK_LIMIT {
            return Err(EvmError::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Push a `u64`
    pub fn push_u64(&mut self, value: u64) -> EvmResult<()> {
        self.push(U256::from(value))
    }

    /// Push 0 or 1
    pub fn push_bool(&mut self, value: bool) -> EvmResult<()> {
        self.push(if value { U256::one() } else { U256::zero() })
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> EvmResult<U256> {
        self.data.pop().ok_or(EvmError::StackUnderflow)
    }

    /// Pop `N` values, top first
    pub fn pop_n<const N: usize>(&mut self) -> EvmResult<[U256; N]> {
        if self.data.len() < N {
            return Err(EvmError::StackUnderflow);
        }
        let mut out = [U256::zero(); N];
        for slot in out.iter_mut() {
            *slot = self.pop()?;
        }
        Ok(out)
    }

    /// Peek at depth `n` (0 = top)
    pub fn peek(&self, n: usize) -> EvmResult<&U256> {
        let len = self.data.len();
        if n >= len {
            return Err(EvmError::StackUnderflow);
        }
        Ok(&self.data[len - 1 - n])
    }

    /// DUPn: copy the n-th item (1 = top) onto the top
    pub fn dup(&mut self, n: usize) -> EvmResult<()> {
        if n == 0 || n > self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        let value = self.data[self.data.len() - n];
        self.push(value)
    }

    /// SWAPn: exchange the top with the (n+1)-th item
    pub fn swap(&mut self, n: usize) -> EvmResult<()> {
        let len = self.data.len();
        if n == 0 || n >= len {
            return Err(EvmError::StackUnderflow);
        }
        self.data.swap(len - 1, len - 1 - n);
        Ok(())
    }

    /// Current depth
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bottom-to-top view, as shown by tracers
    pub fn data(&self) -> &[U256] {
        &self.data
    }
}
