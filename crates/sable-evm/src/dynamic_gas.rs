//! Value-dependent gas and memory footprints of individual opcodes.
//!
//! Memory expansion is charged by the interpreter; the functions here return
//! only the remaining dynamic part. The stack depth has already been checked
//! when any of them runs.

use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::gas::{
    call_gas, cost, exp_gas, sstore_gas_legacy, sstore_gas_net, word_gas,
};
use crate::interpreter::Interpreter;
use crate::memory::memory_size;
use crate::stack::WordStack;
use sable_primitives::{word_to_address, word_to_h256, U256};

fn arg(stack: &WordStack, n: usize) -> EvmResult<U256> {
    stack.peek(n).copied()
}

fn add(a: u64, b: u64) -> EvmResult<u64> {
    a.checked_add(b).ok_or(EvmError::OutOfGas)
}

// ==================== Memory footprints ====================

fn range(stack: &WordStack, offset: usize, len: usize) -> EvmResult<u64> {
    memory_size(&arg(stack, offset)?, &arg(stack, len)?)
}

pub(crate) fn memory_sha3(stack: &WordStack) -> EvmResult<u64> {
    range(stack, 0, 1)
}

pub(crate) fn memory_copy(stack: &WordStack) -> EvmResult<u64> {
    range(stack, 0, 2)
}

pub(crate) fn memory_extcodecopy(stack: &WordStack) -> EvmResult<u64> {
    range(stack, 1, 3)
}

pub(crate) fn memory_mword(stack: &WordStack) -> EvmResult<u64> {
    memory_size(&arg(stack, 0)?, &U256::from(32))
}

pub(crate) fn memory_mbyte(stack: &WordStack) -> EvmResult<u64> {
    memory_size(&arg(stack, 0)?, &U256::one())
}

pub(crate) fn memory_log(stack: &WordStack) -> EvmResult<u64> {
    range(stack, 0, 1)
}

pub(crate) fn memory_create(stack: &WordStack) -> EvmResult<u64> {
    range(stack, 1, 2)
}

pub(crate) fn memory_return(stack: &WordStack) -> EvmResult<u64> {
    range(stack, 0, 1)
}

pub(crate) fn memory_call(stack: &WordStack) -> EvmResult<u64> {
    Ok(range(stack, 3, 4)?.max(range(stack, 5, 6)?))
}

pub(crate) fn memory_delegatecall(stack: &WordStack) -> EvmResult<u64> {
    Ok(range(stack, 2, 3)?.max(range(stack, 4, 5)?))
}

// ==================== Dynamic gas ====================

pub(crate) fn gas_exp(interp: &mut Interpreter, evm: &mut Evm<'_>, _memory: u64) -> EvmResult<u64> {
    exp_gas(&evm.rules().gas_table, &arg(&interp.stack, 1)?)
}

pub(crate) fn gas_sha3(interp: &mut Interpreter, _evm: &mut Evm<'_>, _memory: u64) -> EvmResult<u64> {
    word_gas(arg(&interp.stack, 1)?.low_u64(), cost::SHA3_WORD)
}

pub(crate) fn gas_copy(interp: &mut Interpreter, _evm: &mut Evm<'_>, _memory: u64) -> EvmResult<u64> {
    word_gas(arg(&interp.stack, 2)?.low_u64(), cost::COPY)
}

pub(crate) fn gas_extcodecopy(
    interp: &mut Interpreter,
    _evm: &mut Evm<'_>,
    _memory: u64,
) -> EvmResult<u64> {
    word_gas(arg(&interp.stack, 3)?.low_u64(), cost::COPY)
}

pub(crate) fn gas_log(interp: &mut Interpreter, _evm: &mut Evm<'_>, _memory: u64) -> EvmResult<u64> {
    arg(&interp.stack, 1)?
        .low_u64()
        .checked_mul(cost::LOG_DATA)
        .ok_or(EvmError::OutOfGas)
}

pub(crate) fn gas_create2(interp: &mut Interpreter, _evm: &mut Evm<'_>, _memory: u64) -> EvmResult<u64> {
    word_gas(arg(&interp.stack, 2)?.low_u64(), cost::SHA3_WORD)
}

/// SSTORE price, adjusting the refund counter as a side effect
pub(crate) fn gas_sstore(interp: &mut Interpreter, evm: &mut Evm<'_>, _memory: u64) -> EvmResult<u64> {
    let address = interp.context.address;
    let key = word_to_h256(&arg(&interp.stack, 0)?);
    let new = word_to_h256(&arg(&interp.stack, 1)?);
    let current = evm.state.get_state(&address, &key);

    let (gas, refund) = if evm.rules().constantinople {
        let original = evm.state.get_committed_state(&address, &key);
        sstore_gas_net(&original, &current, &new)
    } else {
        sstore_gas_legacy(&current, &new)
    };

    if refund.add > 0 {
        evm.state.add_refund(refund.add);
    }
    if refund.sub > 0 {
        evm.state.sub_refund(refund.sub);
    }
    Ok(gas)
}

pub(crate) fn gas_call(interp: &mut Interpreter, evm: &mut Evm<'_>, memory: u64) -> EvmResult<u64> {
    let target = word_to_address(&arg(&interp.stack, 1)?);
    let mut surcharge = 0;
    if !evm.state.exists(&target) {
        surcharge += cost::CALL_NEW_ACCOUNT;
    }
    if !arg(&interp.stack, 2)?.is_zero() {
        surcharge += cost::CALL_VALUE;
    }
    forward(interp, evm, memory, surcharge)
}

pub(crate) fn gas_callcode(interp: &mut Interpreter, evm: &mut Evm<'_>, memory: u64) -> EvmResult<u64> {
    let surcharge = if arg(&interp.stack, 2)?.is_zero() {
        0
    } else {
        cost::CALL_VALUE
    };
    forward(interp, evm, memory, surcharge)
}

pub(crate) fn gas_delegatecall(
    interp: &mut Interpreter,
    evm: &mut Evm<'_>,
    memory: u64,
) -> EvmResult<u64> {
    forward(interp, evm, memory, 0)
}

/// Settle how much gas the child gets and return it plus `surcharge`
fn forward(interp: &mut Interpreter, evm: &mut Evm<'_>, memory: u64, surcharge: u64) -> EvmResult<u64> {
    let base = add(memory, surcharge)?;
    let requested = arg(&interp.stack, 0)?;
    interp.call_gas = call_gas(&evm.rules().gas_table, interp.context.gas, base, &requested)?;
    add(surcharge, interp.call_gas)
}

pub(crate) fn gas_selfdestruct(
    interp: &mut Interpreter,
    evm: &mut Evm<'_>,
    _memory: u64,
) -> EvmResult<u64> {
    let mut gas = 0;
    if evm.rules().eip150 {
        let beneficiary = word_to_address(&arg(&interp.stack, 0)?);
        if !evm.state.exists(&beneficiary) {
            gas += evm.rules().gas_table.create_by_suicide;
        }
    }
    let address = interp.context.address;
    if !evm.state.has_suicided(&address) {
        evm.state.add_refund(cost::SUICIDE_REFUND);
    }
    Ok(gas)
}
