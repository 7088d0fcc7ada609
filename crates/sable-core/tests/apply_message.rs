//! Fee accounting and validation around message execution

use bytes::Bytes;
use sable_core::{apply_message, ChainConfig, ExecutionResult, GasPool, Message, TransitionError};
use sable_crypto::create_address;
use sable_evm::{BlockContext, EvmError, Evm, RuleSet, VmConfig};
use sable_primitives::{Address, H256, U256};
use sable_state::{StateConfig, StateDb};
use sable_storage::MemoryDatabase;
use std::sync::Arc;

const BLOCK_GAS: u64 = 8_000_000;

fn sender() -> Address {
    Address::repeat_byte(0x51)
}

fn recipient() -> Address {
    Address::repeat_byte(0x52)
}

fn coinbase() -> Address {
    Address::repeat_byte(0xcb)
}

fn funded_state(balance: u64) -> StateDb {
    let mut state = StateDb::empty(Arc::new(MemoryDatabase::new()), StateConfig::default());
    state.add_balance(sender(), U256::from(balance));
    state
}

fn apply(
    state: &mut StateDb,
    msg: &Message,
    pool: &mut GasPool,
) -> Result<ExecutionResult, TransitionError> {
    let config = ChainConfig::all_enabled();
    let block = BlockContext {
        coinbase: coinbase(),
        gas_limit: BLOCK_GAS,
        ..Default::default()
    };
    let mut evm = Evm::new(state, block, msg.tx_context(), config.rules(0), VmConfig::default());
    apply_message(&mut evm, msg, pool)
}

fn transfer(nonce: u64, value: u64, gas: u64) -> Message {
    Message::call(
        sender(),
        recipient(),
        nonce,
        U256::from(value),
        gas,
        U256::one(),
        Bytes::new(),
    )
}

// ==================== Plain transfers ====================

#[test]
fn test_value_transfer_fees() {
    let mut state = funded_state(100_000);
    let mut pool = GasPool::new(BLOCK_GAS);

    let result = apply(&mut state, &transfer(0, 1_000, 50_000), &mut pool).unwrap();
    assert!(!result.failed);
    assert_eq!(result.gas_used, 21_000);
    assert_eq!(pool.gas(), BLOCK_GAS - 21_000);

    assert_eq!(state.get_balance(&sender()), U256::from(100_000 - 21_000 - 1_000));
    assert_eq!(state.get_balance(&recipient()), U256::from(1_000));
    assert_eq!(state.get_balance(&coinbase()), U256::from(21_000));
    assert_eq!(state.get_nonce(&sender()), 1);
}

// ==================== Validation ====================

#[test]
fn test_nonce_checks() {
    let mut state = funded_state(100_000);
    state.set_nonce(sender(), 2);
    let mut pool = GasPool::new(BLOCK_GAS);

    let err = apply(&mut state, &transfer(1, 0, 21_000), &mut pool).unwrap_err();
    assert!(matches!(err, TransitionError::NonceTooLow { state: 2, message: 1 }));
    let err = apply(&mut state, &transfer(3, 0, 21_000), &mut pool).unwrap_err();
    assert!(matches!(err, TransitionError::NonceTooHigh { state: 2, message: 3 }));

    let unchecked = transfer(9, 0, 21_000).without_nonce_check();
    assert!(apply(&mut state, &unchecked, &mut pool).is_ok());
    assert_eq!(state.get_nonce(&sender()), 3);
}

#[test]
fn test_insufficient_balance_leaves_state() {
    let mut state = funded_state(21_500);
    let mut pool = GasPool::new(BLOCK_GAS);

    let err = apply(&mut state, &transfer(0, 1_000, 21_000), &mut pool).unwrap_err();
    assert!(matches!(err, TransitionError::InsufficientBalance { .. }));
    assert_eq!(state.get_balance(&sender()), U256::from(21_500));
    assert_eq!(state.get_nonce(&sender()), 0);
    assert_eq!(pool.gas(), BLOCK_GAS);
}

#[test]
fn test_intrinsic_gas_too_low() {
    let mut state = funded_state(100_000);
    let mut pool = GasPool::new(BLOCK_GAS);

    let err = apply(&mut state, &transfer(0, 0, 20_999), &mut pool).unwrap_err();
    assert!(matches!(
        err,
        TransitionError::IntrinsicGas {
            required: 21_000,
            provided: 20_999
        }
    ));
    assert_eq!(state.get_balance(&sender()), U256::from(100_000));
    assert_eq!(pool.gas(), BLOCK_GAS);
}

#[test]
fn test_gas_pool_exhausted() {
    let mut state = funded_state(100_000);
    let mut pool = GasPool::new(30_000);

    apply(&mut state, &transfer(0, 0, 21_000), &mut pool).unwrap();
    let err = apply(&mut state, &transfer(1, 0, 21_000), &mut pool).unwrap_err();
    assert!(matches!(err, TransitionError::GasLimitReached { .. }));
}

// ==================== Execution ====================

#[test]
fn test_contract_creation() {
    let mut state = funded_state(1_000_000);
    let mut pool = GasPool::new(BLOCK_GAS);

    // copy the trailing 10 bytes of code into memory and return them
    let init = hex::decode("600a600c600039600a6000f3602a60005260206000f3").unwrap();
    let msg = Message::create(sender(), 0, U256::zero(), 100_000, U256::one(), Bytes::from(init));

    let result = apply(&mut state, &msg, &mut pool).unwrap();
    assert!(!result.failed);
    let address = create_address(&sender(), 0);
    assert_eq!(result.contract_address, Some(address));
    assert_eq!(state.get_code_size(&address), 10);
    assert_eq!(state.get_nonce(&sender()), 1);
    // 53000 + 4 zero bytes * 4 + 18 other bytes * 68, 24 to run, 2000 deposit
    assert_eq!(result.gas_used, 54_240 + 24 + 2_000);
}

#[test]
fn test_refund_capped_at_half() {
    let mut state = funded_state(1_000_000);
    let contract = Address::repeat_byte(0xc0);
    state.set_code(contract, Bytes::from(hex::decode("6000600055").unwrap()));
    state.set_state(contract, H256::zero(), H256::from_low_u64_be(1));
    state.commit().unwrap();
    let mut pool = GasPool::new(BLOCK_GAS);

    let msg = Message::call(
        sender(),
        contract,
        0,
        U256::zero(),
        100_000,
        U256::one(),
        Bytes::new(),
    );
    let result = apply(&mut state, &msg, &mut pool).unwrap();
    assert!(!result.failed);
    // 21000 + 6 + 5000 used, refund 15000 capped at half of that
    assert_eq!(result.gas_used, 26_006 - 13_003);
    assert_eq!(state.get_state(&contract, &H256::zero()), H256::zero());
}

#[test]
fn test_failed_execution_still_pays() {
    let mut state = funded_state(1_000_000);
    let contract = Address::repeat_byte(0xc1);
    state.set_code(contract, Bytes::from_static(&[0xfe]));
    let mut pool = GasPool::new(BLOCK_GAS);

    let msg = Message::call(
        sender(),
        contract,
        0,
        U256::from(7),
        50_000,
        U256::one(),
        Bytes::new(),
    );
    let result = apply(&mut state, &msg, &mut pool).unwrap();
    assert!(result.failed);
    assert_eq!(result.error, Some(EvmError::InvalidOpcode(0xfe)));
    assert_eq!(result.gas_used, 50_000);
    assert_eq!(state.get_balance(&sender()), U256::from(1_000_000 - 50_000));
    assert_eq!(state.get_balance(&contract), U256::zero());
    assert_eq!(state.get_balance(&coinbase()), U256::from(50_000));
    assert_eq!(state.get_nonce(&sender()), 1);
}
