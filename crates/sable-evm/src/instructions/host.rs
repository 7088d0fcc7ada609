//! Storage, logs and self-destruct

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::interpreter::{to_range, Interpreter, Status};
use sable_primitives::{h256_to_word, word_to_address, word_to_h256, H256};
use sable_state::Log;

pub(crate) fn op_sload(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let key = word_to_h256(&interp.stack.pop()?);
    let value = evm.state.get_state(&interp.context.address, &key);
    interp.stack.push(h256_to_word(&value))
}

pub(crate) fn op_sstore(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let [key, value] = interp.stack.pop_n::<2>()?;
    evm.state
        .set_state(interp.context.address, word_to_h256(&key), word_to_h256(&value));
    Ok(())
}

pub(crate) fn op_log<const N: usize>(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let [offset, len] = interp.stack.pop_n::<2>()?;
    let mut topics: Vec<H256> = Vec::with_capacity(N);
    for _ in 0..N {
        topics.push(word_to_h256(&interp.stack.pop()?));
    }
    let (offset, len) = to_range(&offset, &len);
    let data = interp.memory.load(offset, len);
    evm.state.add_log(Log::new(interp.context.address, topics, data));
    Ok(())
}

pub(crate) fn op_selfdestruct(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let beneficiary = word_to_address(&interp.stack.pop()?);
    let address = interp.context.address;
    let balance = evm.state.get_balance(&address);
    evm.state.add_balance(beneficiary, balance);
    evm.state.suicide(&address);
    interp.status = Status::Stopped;
    Ok(())
}
