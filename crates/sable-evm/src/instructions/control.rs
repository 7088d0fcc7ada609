//! Stack, memory and flow operations

use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::interpreter::{to_range, Interpreter, Status};
use sable_primitives::U256;

pub(crate) fn op_pop(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.pop()?;
    Ok(())
}

pub(crate) fn op_mload(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let offset = interp.stack.pop()?;
    let value = interp.memory.load_word(offset.low_u64() as usize);
    interp.stack.push(value)
}

pub(crate) fn op_mstore(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [offset, value] = interp.stack.pop_n::<2>()?;
    interp.memory.store_word(offset.low_u64() as usize, value);
    Ok(())
}

pub(crate) fn op_mstore8(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [offset, value] = interp.stack.pop_n::<2>()?;
    interp.memory.store_byte(offset.low_u64() as usize, value.byte(0));
    Ok(())
}

pub(crate) fn op_jump(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let dest = interp.stack.pop()?;
    if !interp.context.valid_jump(&dest) {
        return Err(EvmError::InvalidJump);
    }
    interp.pc = dest.low_u64() as usize;
    Ok(())
}

pub(crate) fn op_jumpi(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [dest, cond] = interp.stack.pop_n::<2>()?;
    if cond.is_zero() {
        interp.pc += 1;
        return Ok(());
    }
    if !interp.context.valid_jump(&dest) {
        return Err(EvmError::InvalidJump);
    }
    interp.pc = dest.low_u64() as usize;
    Ok(())
}

pub(crate) fn op_pc(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push_u64(interp.pc as u64)
}

pub(crate) fn op_msize(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push_u64(interp.memory.len() as u64)
}

pub(crate) fn op_gas(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push_u64(interp.context.gas)
}

pub(crate) fn op_jumpdest(_interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    Ok(())
}

/// PUSHn; immediates cut off by the end of the code read as zero
pub(crate) fn op_push<const N: usize>(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let code = &interp.context.code;
    let start = (interp.pc + 1).min(code.len());
    let end = (start + N).min(code.len());
    let mut buf = [0u8; 32];
    buf[..end - start].copy_from_slice(&code[start..end]);
    interp.stack.push(U256::from_big_endian(&buf[..N]))?;
    interp.pc += N;
    Ok(())
}

pub(crate) fn op_dup<const N: usize>(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.dup(N)
}

pub(crate) fn op_swap<const N: usize>(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.swap(N)
}

pub(crate) fn op_return(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [offset, len] = interp.stack.pop_n::<2>()?;
    let (offset, len) = to_range(&offset, &len);
    interp.output = interp.memory.load(offset, len);
    interp.status = Status::Stopped;
    Ok(())
}

pub(crate) fn op_revert(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [offset, len] = interp.stack.pop_n::<2>()?;
    let (offset, len) = to_range(&offset, &len);
    interp.output = interp.memory.load(offset, len);
    interp.status = Status::Reverted;
    Ok(())
}
