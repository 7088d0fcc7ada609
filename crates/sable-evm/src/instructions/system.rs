//! Calls and contract creation

use crate::error::{EvmError, EvmResult};
use crate::evm::{CallResult, Evm};
use crate::gas::cost;
use crate::interpreter::{to_range, Interpreter};
use bytes::Bytes;
use sable_primitives::{address_to_word, word_to_address, word_to_h256, U256};

fn load_input(interp: &Interpreter, offset: &U256, len: &U256) -> Bytes {
    let (offset, len) = to_range(offset, len);
    Bytes::from(interp.memory.load(offset, len))
}

/// Everything but one 64th of the remaining gas goes to the init code
/// once EIP-150 is active.
fn create_gas(interp: &mut Interpreter, evm: &Evm<'_>) -> u64 {
    let mut gas = interp.context.gas;
    if evm.rules().eip150 {
        gas -= gas / 64;
    }
    interp.context.gas -= gas;
    gas
}

fn finish_create(interp: &mut Interpreter, evm: &Evm<'_>, result: CallResult) -> EvmResult<()> {
    let created = match &result.error {
        None => true,
        // Frontier keeps the account with empty code
        Some(EvmError::CodeStoreOutOfGas) => !evm.rules().homestead,
        Some(_) => false,
    };
    match result.address {
        Some(address) if created => interp.stack.push(address_to_word(&address))?,
        _ => interp.stack.push(U256::zero())?,
    }
    interp.context.gas += result.gas_left;
    interp.return_data = if result.error == Some(EvmError::Revert) {
        result.output
    } else {
        Vec::new()
    };
    Ok(())
}

pub(crate) fn op_create(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let [value, offset, len] = interp.stack.pop_n::<3>()?;
    let init = load_input(interp, &offset, &len);
    let gas = create_gas(interp, evm);
    let result = evm.create(interp.context.address, init, gas, value);
    finish_create(interp, evm, result)
}

pub(crate) fn op_create2(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let [value, offset, len, salt] = interp.stack.pop_n::<4>()?;
    let init = load_input(interp, &offset, &len);
    let gas = create_gas(interp, evm);
    let result = evm.create2(interp.context.address, init, gas, value, word_to_h256(&salt));
    finish_create(interp, evm, result)
}

/// Gas settled during charging, plus the stipend for value transfers
fn forwarded_gas(interp: &Interpreter, value: &U256) -> u64 {
    if value.is_zero() {
        interp.call_gas
    } else {
        interp.call_gas + cost::CALL_STIPEND
    }
}

pub(crate) fn op_call(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let [_, to, value, in_offset, in_len, out_offset, out_len] = interp.stack.pop_n::<7>()?;
    let input = load_input(interp, &in_offset, &in_len);
    let gas = forwarded_gas(interp, &value);
    let result = evm.call(interp.context.address, word_to_address(&to), input, gas, value);
    interp.finish_call(result, &out_offset, &out_len)
}

pub(crate) fn op_callcode(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let [_, to, value, in_offset, in_len, out_offset, out_len] = interp.stack.pop_n::<7>()?;
    let input = load_input(interp, &in_offset, &in_len);
    let gas = forwarded_gas(interp, &value);
    let result = evm.call_code(interp.context.address, word_to_address(&to), input, gas, value);
    interp.finish_call(result, &out_offset, &out_len)
}

pub(crate) fn op_delegatecall(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let [_, to, in_offset, in_len, out_offset, out_len] = interp.stack.pop_n::<6>()?;
    let input = load_input(interp, &in_offset, &in_len);
    let result = evm.delegate_call(&interp.context, word_to_address(&to), input, interp.call_gas);
    interp.finish_call(result, &out_offset, &out_len)
}

pub(crate) fn op_staticcall(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let [_, to, in_offset, in_len, out_offset, out_len] = interp.stack.pop_n::<6>()?;
    let input = load_input(interp, &in_offset, &in_len);
    let result = evm.static_call(interp.context.address, word_to_address(&to), input, interp.call_gas);
    interp.finish_call(result, &out_offset, &out_len)
}
