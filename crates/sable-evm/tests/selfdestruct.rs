//! SELFDESTRUCT: balance moves, refund and deferred deletion

use bytes::Bytes;
use sable_evm::{BlockContext, EvmError, Evm, Rules, TxContext, VmConfig};
use sable_primitives::{Address, U256};
use sable_state::{StateConfig, StateDb};
use sable_storage::MemoryDatabase;
use std::sync::Arc;

const GAS: u64 = 100_000;

fn new_state() -> StateDb {
    StateDb::empty(Arc::new(MemoryDatabase::new()), StateConfig::default())
}

fn origin() -> Address {
    Address::repeat_byte(0xaa)
}

fn doomed() -> Address {
    Address::repeat_byte(0xdd)
}

fn heir() -> Address {
    Address::repeat_byte(0xee)
}

/// PUSH20 heir SELFDESTRUCT
fn destruct_code() -> Bytes {
    let mut c = vec![0x73];
    c.extend_from_slice(heir().as_bytes());
    c.push(0xff);
    Bytes::from(c)
}

fn setup() -> StateDb {
    let mut state = new_state();
    state.set_code(doomed(), destruct_code());
    state.add_balance(doomed(), U256::from(100));
    state
}

fn call(state: &mut StateDb, rules: Rules, to: Address) -> sable_evm::CallResult {
    let mut evm = Evm::new(
        state,
        BlockContext::default(),
        TxContext::default(),
        rules,
        VmConfig::default(),
    );
    evm.call(origin(), to, Bytes::new(), GAS, U256::zero())
}

#[test]
fn test_selfdestruct_moves_balance() {
    let mut state = setup();
    let result = call(&mut state, Rules::all_enabled(), doomed());
    assert!(result.is_success());

    assert_eq!(state.get_balance(&heir()), U256::from(100));
    assert_eq!(state.get_balance(&doomed()), U256::zero());
    assert!(state.has_suicided(&doomed()));
    assert_eq!(state.get_refund(), 24_000);
    // still visible until the state is committed
    assert!(state.exists(&doomed()));

    state.commit().unwrap();
    assert!(!state.exists(&doomed()));
    assert!(state.exists(&heir()));
}

#[test]
fn test_selfdestruct_gas_by_fork() {
    // PUSH20, SELFDESTRUCT 5000 and 25000 for the new beneficiary
    let mut state = setup();
    let result = call(&mut state, Rules::all_enabled(), doomed());
    assert_eq!(GAS - result.gas_left, 3 + 5_000 + 25_000);

    // beneficiary already exists
    let mut state = setup();
    state.add_balance(heir(), U256::one());
    let result = call(&mut state, Rules::all_enabled(), doomed());
    assert_eq!(GAS - result.gas_left, 3 + 5_000);

    // SELFDESTRUCT was free before EIP-150
    let mut state = setup();
    let result = call(&mut state, Rules::homestead(), doomed());
    assert_eq!(GAS - result.gas_left, 3);
}

#[test]
fn test_selfdestruct_undone_by_revert() {
    let mut state = setup();

    // call doomed with no args, then revert
    let mut c = vec![0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x73];
    c.extend_from_slice(doomed().as_bytes());
    c.extend_from_slice(&[0x61, 0xff, 0xff, 0xf1, 0x60, 0x00, 0x60, 0x00, 0xfd]);
    let parent = Address::repeat_byte(0x0a);
    state.set_code(parent, Bytes::from(c));

    let result = call(&mut state, Rules::all_enabled(), parent);
    assert_eq!(result.error, Some(EvmError::Revert));
    assert!(!state.has_suicided(&doomed()));
    assert_eq!(state.get_balance(&doomed()), U256::from(100));
    assert_eq!(state.get_balance(&heir()), U256::zero());
    assert_eq!(state.get_refund(), 0);
}
