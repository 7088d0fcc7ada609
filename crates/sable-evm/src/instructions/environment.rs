//! Environment and block information

use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::interpreter::{to_range, Interpreter};
use sable_crypto::keccak256;
use sable_primitives::{address_to_word, h256_to_word, word_to_address, U256};

/// `len` bytes of `data` from `start`, zero-padded past the end
pub(crate) fn padded_slice(data: &[u8], start: &U256, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    if start.bits() <= 64 && (start.low_u64() as usize) < data.len() {
        let start = start.low_u64() as usize;
        let end = start.saturating_add(len).min(data.len());
        out[..end - start].copy_from_slice(&data[start..end]);
    }
    out
}

pub(crate) fn op_sha3(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [offset, len] = interp.stack.pop_n::<2>()?;
    let (offset, len) = to_range(&offset, &len);
    let hash = keccak256(&interp.memory.load(offset, len));
    interp.stack.push(h256_to_word(&hash))
}

pub(crate) fn op_address(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(address_to_word(&interp.context.address))
}

pub(crate) fn op_balance(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let address = word_to_address(&interp.stack.pop()?);
    let balance = evm.state.get_balance(&address);
    interp.stack.push(balance)
}

pub(crate) fn op_origin(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(address_to_word(&evm.tx.origin))
}

pub(crate) fn op_caller(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(address_to_word(&interp.context.caller))
}

pub(crate) fn op_callvalue(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(interp.context.value)
}

pub(crate) fn op_calldataload(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let offset = interp.stack.pop()?;
    let data = padded_slice(&interp.context.input, &offset, 32);
    interp.stack.push(U256::from_big_endian(&data))
}

pub(crate) fn op_calldatasize(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push_u64(interp.context.input.len() as u64)
}

pub(crate) fn op_calldatacopy(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [mem_offset, data_offset, len] = interp.stack.pop_n::<3>()?;
    let (mem_offset, len) = to_range(&mem_offset, &len);
    let data = padded_slice(&interp.context.input, &data_offset, len);
    interp.memory.store(mem_offset, &data);
    Ok(())
}

pub(crate) fn op_codesize(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push_u64(interp.context.code.len() as u64)
}

pub(crate) fn op_codecopy(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [mem_offset, code_offset, len] = interp.stack.pop_n::<3>()?;
    let (mem_offset, len) = to_range(&mem_offset, &len);
    let data = padded_slice(&interp.context.code, &code_offset, len);
    interp.memory.store(mem_offset, &data);
    Ok(())
}

pub(crate) fn op_gasprice(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(evm.tx.gas_price)
}

pub(crate) fn op_extcodesize(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let address = word_to_address(&interp.stack.pop()?);
    let size = evm.state.get_code_size(&address);
    interp.stack.push_u64(size as u64)
}

pub(crate) fn op_extcodecopy(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let [address, mem_offset, code_offset, len] = interp.stack.pop_n::<4>()?;
    let (mem_offset, len) = to_range(&mem_offset, &len);
    let code = evm.state.get_code(&word_to_address(&address));
    let data = padded_slice(&code, &code_offset, len);
    interp.memory.store(mem_offset, &data);
    Ok(())
}

pub(crate) fn op_returndatasize(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push_u64(interp.return_data.len() as u64)
}

pub(crate) fn op_returndatacopy(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [mem_offset, data_offset, len] = interp.stack.pop_n::<3>()?;
    let (end, overflow) = data_offset.overflowing_add(len);
    if overflow || end > U256::from(interp.return_data.len()) {
        return Err(EvmError::ReturnDataOutOfBounds);
    }
    let (mem_offset, len) = to_range(&mem_offset, &len);
    let start = data_offset.low_u64() as usize;
    let data = interp.return_data[start..start + len].to_vec();
    interp.memory.store(mem_offset, &data);
    Ok(())
}

pub(crate) fn op_extcodehash(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let address = word_to_address(&interp.stack.pop()?);
    if evm.state.is_empty_account(&address) {
        interp.stack.push(U256::zero())
    } else {
        let hash = evm.state.get_code_hash(&address);
        interp.stack.push(h256_to_word(&hash))
    }
}

pub(crate) fn op_blockhash(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let number = interp.stack.pop()?;
    let hash = evm.block.block_hash(&number);
    interp.stack.push(h256_to_word(&hash))
}

pub(crate) fn op_coinbase(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(address_to_word(&evm.block.coinbase))
}

pub(crate) fn op_timestamp(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push_u64(evm.block.timestamp)
}

pub(crate) fn op_number(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push_u64(evm.block.number)
}

pub(crate) fn op_difficulty(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(evm.block.difficulty)
}

pub(crate) fn op_gaslimit(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push_u64(evm.block.gas_limit)
}
