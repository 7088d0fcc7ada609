//! Snapshot/revert and deferred-error behaviour of the state database

use bytes::Bytes;
use proptest::prelude::*;
use sable_primitives::{Address, H256, U256};
use sable_state::{StateConfig, StateDb, StateError};
use sable_storage::{KeyValueStore, MemoryDatabase, StorageError, StorageResult, WriteBatch};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug)]
enum Op {
    AddBalance(u8, u64),
    SubBalance(u8, u64),
    SetNonce(u8, u64),
    SetState(u8, u8, u8),
    SetCode(u8, Vec<u8>),
    Create(u8),
    Suicide(u8),
    Refund(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let addr = 0u8..4;
    prop_oneof![
        (addr.clone(), any::<u64>()).prop_map(|(a, v)| Op::AddBalance(a, v)),
        (addr.clone(), any::<u64>()).prop_map(|(a, v)| Op::SubBalance(a, v)),
        (addr.clone(), any::<u64>()).prop_map(|(a, v)| Op::SetNonce(a, v)),
        (addr.clone(), 0u8..4, any::<u8>()).prop_map(|(a, k, v)| Op::SetState(a, k, v)),
        (addr.clone(), prop::collection::vec(any::<u8>(), 0..8)).prop_map(|(a, c)| Op::SetCode(a, c)),
        addr.clone().prop_map(Op::Create),
        addr.prop_map(Op::Suicide),
        (0u64..50_000).prop_map(Op::Refund),
    ]
}

fn address(n: u8) -> Address {
    Address::from_low_u64_be(0x1000 + n as u64)
}

fn apply(state: &mut StateDb, op: &Op) {
    match op {
        Op::AddBalance(a, v) => state.add_balance(address(*a), U256::from(*v)),
        Op::SubBalance(a, v) => state.sub_balance(address(*a), U256::from(*v)),
        Op::SetNonce(a, v) => state.set_nonce(address(*a), *v),
        Op::SetState(a, k, v) => state.set_state(
            address(*a),
            H256::from_low_u64_be(*k as u64),
            H256::from_low_u64_be(*v as u64),
        ),
        Op::SetCode(a, c) => state.set_code(address(*a), Bytes::from(c.clone())),
        Op::Create(a) => state.create_account(address(*a)),
        Op::Suicide(a) => {
            state.suicide(&address(*a));
        }
        Op::Refund(g) => state.add_refund(*g),
    }
}

type Observed = Vec<(bool, U256, u64, H256, bool, Vec<H256>)>;

fn observe(state: &mut StateDb) -> (Observed, u64) {
    let accounts = (0..4)
        .map(|n| {
            let a = address(n);
            let slots = (0..4)
                .map(|k| state.get_state(&a, &H256::from_low_u64_be(k)))
                .collect();
            (
                state.exists(&a),
                state.get_balance(&a),
                state.get_nonce(&a),
                state.get_code_hash(&a),
                state.has_suicided(&a),
                slots,
            )
        })
        .collect();
    (accounts, state.get_refund())
}

proptest! {
    #[test]
    fn test_revert_restores_observable_state(
        setup in prop::collection::vec(op_strategy(), 0..12),
        changes in prop::collection::vec(op_strategy(), 1..24),
    ) {
        let mut state = StateDb::empty(Arc::new(MemoryDatabase::new()), StateConfig::default());
        for op in &setup {
            apply(&mut state, op);
        }
        let before = observe(&mut state);

        let snap = state.snapshot();
        for op in &changes {
            apply(&mut state, op);
        }
        state.revert_to_snapshot(snap).unwrap();

        prop_assert_eq!(observe(&mut state), before);
    }

    #[test]
    fn test_nested_revert_keeps_outer(
        outer in prop::collection::vec(op_strategy(), 1..12),
        inner in prop::collection::vec(op_strategy(), 1..12),
    ) {
        let mut state = StateDb::empty(Arc::new(MemoryDatabase::new()), StateConfig::default());
        let _ = state.snapshot();
        for op in &outer {
            apply(&mut state, op);
        }
        let after_outer = observe(&mut state);

        let child = state.snapshot();
        for op in &inner {
            apply(&mut state, op);
        }
        state.revert_to_snapshot(child).unwrap();

        prop_assert_eq!(observe(&mut state), after_outer);
    }
}

// ==================== Deferred storage errors ====================

#[derive(Default)]
struct FlakyStore {
    inner: MemoryDatabase,
    failing: AtomicBool,
}

impl FlakyStore {
    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected failure".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.check()?;
        self.inner.get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.check()?;
        self.inner.put(key, value)
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.check()?;
        self.inner.delete(key)
    }

    fn write_batch(&self, batch: WriteBatch) -> StorageResult<()> {
        self.check()?;
        self.inner.write_batch(batch)
    }
}

#[test]
fn test_read_failure_returns_zero_and_surfaces_at_commit() {
    let store = Arc::new(FlakyStore::default());
    let mut state = StateDb::empty(store.clone(), StateConfig::default());
    let a = address(1);
    state.set_state(a, H256::from_low_u64_be(1), H256::from_low_u64_be(42));
    state.set_code(a, Bytes::from_static(&[0x60, 0x00]));
    let root = state.commit().unwrap();

    let mut state = StateDb::new(root, store.clone(), StateConfig::default()).unwrap();
    store.failing.store(true, Ordering::SeqCst);

    assert_eq!(state.get_state(&a, &H256::from_low_u64_be(1)), H256::zero());
    assert!(state.get_code(&a).is_empty());
    assert!(matches!(state.error(), Some(StateError::Storage(StorageError::Backend(_)))));

    store.failing.store(false, Ordering::SeqCst);
    assert!(matches!(
        state.commit(),
        Err(StateError::Storage(StorageError::Backend(_)))
    ));
}

#[test]
fn test_storage_error_does_not_abort_execution_flow() {
    let store = Arc::new(FlakyStore::default());
    let mut state = StateDb::empty(store.clone(), StateConfig::default());
    state.add_balance(address(1), U256::from(5));
    state.set_code(address(1), Bytes::from_static(&[0xaa; 4]));
    let root = state.commit().unwrap();

    let mut state = StateDb::new(root, store.clone(), StateConfig::default()).unwrap();
    store.failing.store(true, Ordering::SeqCst);
    assert_eq!(state.get_code_size(&address(1)), 0);
    // account data lives in the already-loaded trie
    assert_eq!(state.get_balance(&address(1)), U256::from(5));
    state.add_balance(address(1), U256::from(1));
    assert_eq!(state.get_balance(&address(1)), U256::from(6));
}

#[test]
fn test_deferred_error_fails_every_commit_until_reset() {
    let store = Arc::new(FlakyStore::default());
    let a = address(2);
    let slot = H256::from_low_u64_be(1);
    let mut state = StateDb::empty(store.clone(), StateConfig::default());
    state.set_state(a, slot, H256::from_low_u64_be(42));
    let root = state.commit().unwrap();

    let mut state = StateDb::new(root, store.clone(), StateConfig::default()).unwrap();
    store.failing.store(true, Ordering::SeqCst);
    let seen = state.get_state(&a, &slot);
    assert_eq!(seen, H256::zero());
    store.failing.store(false, Ordering::SeqCst);

    // increment built on the bogus zero read
    let bumped = H256::from_low_u64_be(seen.to_low_u64_be() + 1);
    state.set_state(a, slot, bumped);

    assert!(state.commit().is_err());
    assert!(state.commit().is_err());
    assert!(state.error().is_some());

    let mut fresh = StateDb::new(root, store.clone(), StateConfig::default()).unwrap();
    assert_eq!(fresh.get_state(&a, &slot), H256::from_low_u64_be(42));

    state.reset(root).unwrap();
    assert!(state.error().is_none());
    assert_eq!(state.get_state(&a, &slot), H256::from_low_u64_be(42));
    assert_eq!(state.commit().unwrap(), root);
}
