//! EVM memory

use crate::error::{EvmError, EvmResult};
use crate::gas::memory_gas;
use sable_primitives::U256;

/// Largest memory size whose expansion cost still fits in a `u64`
pub const MAX_MEMORY_SIZE: u64 = 0x1F_FFFF_FFE0;

/// Bytes touched by an access of `len` bytes at `offset`.
///
/// Zero-length accesses touch nothing regardless of the offset. Sizes that
/// cannot be paid for are reported as `OutOfGas`.
pub fn memory_size(offset: &U256, len: &U256) -> EvmResult<u64> {
    if len.is_zero() {
        return Ok(0);
    }
    let (end, overflow) = offset.overflowing_add(*len);
    if overflow || end > U256::from(MAX_MEMORY_SIZE) {
        return Err(EvmError::OutOfGas);
    }
    Ok(end.low_u64())
}

/// Number of 32-byte words needed to hold `size` bytes
pub fn to_words(size: u64) -> u64 {
    size.div_ceil(32)
}

/// Byte-addressable, word-aligned, growing buffer
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
    /// Expansion cost already paid for the current size
    last_gas_cost: u64,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Current size in bytes (always a multiple of 32)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been touched yet
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Extra gas needed to grow to `new_size` bytes; zero if already that large
    pub fn expansion_cost(&self, new_size: u64) -> EvmResult<u64> {
        if new_size <= self.data.len() as u64 {
            return Ok(0);
        }
        if new_size > MAX_MEMORY_SIZE {
            return Err(EvmError::OutOfGas);
        }
        let total = memory_gas(to_words(new_size));
        Ok(total.saturating_sub(self.last_gas_cost))
    }

    /// Grow to hold `new_size` bytes, rounded up to a whole word
    pub fn resize(&mut self, new_size: u64) {
        if new_size <= self.data.len() as u64 {
            return;
        }
        let words = to_words(new_size);
        self.data.resize((words * 32) as usize, 0);
        self.last_gas_cost = memory_gas(words);
    }

    /// Write `value` at `offset`. The region must already be allocated.
    pub fn store(&mut self, offset: usize, value: &[u8]) {
        if value.is_empty() {
            return;
        }
        self.data[offset..offset + value.len()].copy_from_slice(value);
    }

    /// Write up to `len` bytes of `value` at `offset`, leaving the rest untouched
    pub fn store_truncated(&mut self, offset: usize, len: usize, value: &[u8]) {
        let take = value.len().min(len);
        if take == 0 {
            return;
        }
        self.data[offset..offset + take].copy_from_slice(&value[..take]);
    }

    /// Write a big-endian word
    pub fn store_word(&mut self, offset: usize, value: U256) {
        let mut buf = [0u8; 32];
        value.to_big_endian(&mut buf);
        self.store(offset, &buf);
    }

    /// Write one byte
    pub fn store_byte(&mut self, offset: usize, value: u8) {
        self.data[offset] = value;
    }

    /// Read `len` bytes at `offset`; bytes past the end read as zero
    pub fn load(&self, offset: usize, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        if offset < self.data.len() {
            let end = offset.saturating_add(len).min(self.data.len());
            out[..end - offset].copy_from_slice(&self.data[offset..end]);
        }
        out
    }

    /// Read a big-endian word
    pub fn load_word(&self, offset: usize) -> U256 {
        U256::from_big_endian(&self.load(offset, 32))
    }
}
