//! Applying a message to the state.
//!
//! The sequence is fixed:
//! 1. nonce check (if requested) and balance check for gas plus value
//! 2. gas reserved from the block pool and paid for up front
//! 3. intrinsic gas deducted
//! 4. the call or create runs; a call bumps the sender nonce first
//! 5. refund counter applied, capped at half the gas used
//! 6. unused gas returned to the sender and the pool, used gas paid to
//!    the coinbase

use crate::error::{TransitionError, TransitionResult};
use crate::gas_pool::GasPool;
use crate::message::Message;
use sable_evm::{intrinsic_gas, EvmError, Evm};
use sable_primitives::{Address, U256};
use tracing::debug;

/// Outcome of a message that passed validation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Return data, or the revert reason
    pub return_data: Vec<u8>,
    /// Gas charged to the sender after refunds
    pub gas_used: u64,
    /// Whether execution failed; the fee is paid regardless
    pub failed: bool,
    /// Why execution failed
    pub error: Option<EvmError>,
    /// Address of the deployed contract for creations
    pub contract_address: Option<Address>,
}

fn fee(gas: u64, price: U256) -> U256 {
    U256::from(gas).saturating_mul(price)
}

fn pre_check(evm: &mut Evm<'_>, msg: &Message) -> TransitionResult<()> {
    if msg.check_nonce {
        let state = evm.state.get_nonce(&msg.from);
        if state < msg.nonce {
            return Err(TransitionError::NonceTooHigh {
                state,
                message: msg.nonce,
            });
        }
        if state > msg.nonce {
            return Err(TransitionError::NonceTooLow {
                state,
                message: msg.nonce,
            });
        }
    }

    let required = fee(msg.gas_limit, msg.gas_price).saturating_add(msg.value);
    let available = evm.state.get_balance(&msg.from);
    if available < required {
        return Err(TransitionError::InsufficientBalance {
            required,
            available,
        });
    }
    Ok(())
}

/// Execute `msg` against the state behind `evm`.
///
/// Validation failures leave the state and `gas_pool` untouched and are
/// returned as errors. Everything after that, including interpreter
/// faults, produces an [`ExecutionResult`].
pub fn apply_message(
    evm: &mut Evm<'_>,
    msg: &Message,
    gas_pool: &mut GasPool,
) -> TransitionResult<ExecutionResult> {
    pre_check(evm, msg)?;
    gas_pool.sub_gas(msg.gas_limit)?;

    let creation = msg.is_contract_creation();
    let intrinsic = intrinsic_gas(&msg.data, creation, evm.rules().homestead);
    if msg.gas_limit < intrinsic {
        gas_pool.add_gas(msg.gas_limit);
        return Err(TransitionError::IntrinsicGas {
            required: intrinsic,
            provided: msg.gas_limit,
        });
    }
    evm.state.sub_balance(msg.from, fee(msg.gas_limit, msg.gas_price));
    let gas = msg.gas_limit - intrinsic;

    let result = match msg.to {
        None => evm.create(msg.from, msg.data.clone(), gas, msg.value),
        Some(to) => {
            let nonce = evm.state.get_nonce(&msg.from);
            evm.state.set_nonce(msg.from, nonce + 1);
            evm.call(msg.from, to, msg.data.clone(), gas, msg.value)
        }
    };

    let mut gas_left = result.gas_left;
    let refund = ((msg.gas_limit - gas_left) / 2).min(evm.state.get_refund());
    gas_left += refund;

    evm.state.add_balance(msg.from, fee(gas_left, msg.gas_price));
    gas_pool.add_gas(gas_left);

    let gas_used = msg.gas_limit - gas_left;
    let coinbase = evm.block.coinbase;
    evm.state.add_balance(coinbase, fee(gas_used, msg.gas_price));

    debug!(
        from = ?msg.from,
        to = ?msg.to,
        gas_used,
        refund,
        error = ?result.error,
        "Message applied"
    );

    Ok(ExecutionResult {
        failed: result.error.is_some(),
        contract_address: if creation && result.error.is_none() {
            result.address
        } else {
            None
        },
        return_data: result.output,
        gas_used,
        error: result.error,
    })
}
