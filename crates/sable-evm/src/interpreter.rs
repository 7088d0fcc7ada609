//! EVM bytecode interpreter

use crate::context::CallContext;
use crate::error::{EvmError, EvmResult};
use crate::evm::{CallResult, Evm};
use crate::jump_table::Operation;
use crate::memory::Memory;
use crate::opcode::OpCode;
use crate::stack::WordStack;
use sable_primitives::U256;

/// Frame state. `Running` is the only non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Still executing
    Running,
    /// STOP, RETURN, SELFDESTRUCT or end of code
    Stopped,
    /// REVERT
    Reverted,
    /// Gas exhausted
    OutOfGas,
    /// Undefined or fork-disabled opcode
    InvalidOpcode,
    /// Any other fault
    Faulted,
}

impl From<&EvmError> for Status {
    fn from(err: &EvmError) -> Self {
        match err {
            EvmError::OutOfGas => Status::OutOfGas,
            EvmError::InvalidOpcode(_) => Status::InvalidOpcode,
            EvmError::Revert => Status::Reverted,
            _ => Status::Faulted,
        }
    }
}

/// Result of running one frame to completion
#[derive(Clone, Debug)]
pub struct FrameOutcome {
    /// Terminal state
    pub status: Status,
    /// RETURN or REVERT data, empty on faults
    pub output: Vec<u8>,
    /// Gas handed back to the caller
    pub gas_left: u64,
    /// Set unless the frame stopped normally
    pub error: Option<EvmError>,
}

/// Zero-length ranges may carry any offset; callers only use the result
/// after the memory size of the access was validated.
pub(crate) fn to_range(offset: &U256, len: &U256) -> (usize, usize) {
    if len.is_zero() {
        (0, 0)
    } else {
        (offset.low_u64() as usize, len.low_u64() as usize)
    }
}

/// One call frame: program counter, stack, memory and the running code
#[derive(Debug)]
pub struct Interpreter {
    /// Code, identity and gas of the frame
    pub context: CallContext,
    /// Program counter
    pub pc: usize,
    /// Word stack
    pub stack: WordStack,
    /// Memory
    pub memory: Memory,
    /// Output of the last child call or create
    pub return_data: Vec<u8>,
    /// Data set by RETURN or REVERT
    pub output: Vec<u8>,
    /// Current state
    pub status: Status,
    /// STATICCALL frame or a descendant of one
    pub read_only: bool,
    /// Gas to forward, computed while charging the CALL family
    pub(crate) call_gas: u64,
}

impl Interpreter {
    /// New frame
    pub fn new(context: CallContext, read_only: bool) -> Self {
        Self {
            context,
            pc: 0,
            stack: WordStack::new(),
            memory: Memory::new(),
            return_data: Vec::new(),
            output: Vec::new(),
            status: Status::Running,
            read_only,
            call_gas: 0,
        }
    }

    /// Execute until a terminal state
    pub fn run(mut self, evm: &mut Evm<'_>) -> FrameOutcome {
        if self.context.code.is_empty() {
            return FrameOutcome {
                status: Status::Stopped,
                output: Vec::new(),
                gas_left: self.context.gas,
                error: None,
            };
        }

        let mut error = None;
        while self.status == Status::Running {
            if let Err(err) = self.step(evm) {
                error = Some(err);
                break;
            }
        }

        let status = match &error {
            Some(err) => Status::from(err),
            None => self.status,
        };
        if status == Status::Reverted {
            error = Some(EvmError::Revert);
        }
        let consumed = error.as_ref().is_some_and(|e| e.consumes_all_gas());

        FrameOutcome {
            status,
            output: if consumed { Vec::new() } else { self.output },
            gas_left: if consumed { 0 } else { self.context.gas },
            error,
        }
    }

    fn step(&mut self, evm: &mut Evm<'_>) -> EvmResult<()> {
        let op = OpCode(self.context.op_at(self.pc));
        let operation = *evm.operation(op);
        let gas_before = self.context.gas;

        let execute = match self.charge(op, &operation, evm) {
            Ok((execute, cost)) => {
                evm.capture_state(self, op, gas_before, cost, None);
                execute
            }
            Err(err) => {
                evm.capture_state(self, op, gas_before, 0, Some(&err));
                return Err(err);
            }
        };

        execute(self, evm)?;
        if !operation.jumps && self.status == Status::Running {
            self.pc += 1;
        }
        Ok(())
    }

    /// Validate the stack, then charge static, memory and dynamic gas.
    /// Nothing is mutated beyond gas and memory size if this fails.
    fn charge(
        &mut self,
        op: OpCode,
        operation: &Operation,
        evm: &mut Evm<'_>,
    ) -> EvmResult<(crate::jump_table::ExecuteFn, u64)> {
        let execute = operation.execute.ok_or(EvmError::InvalidOpcode(op.0))?;

        let depth = self.stack.len();
        if depth < operation.min_stack {
            return Err(EvmError::StackUnderflow);
        }
        if depth > operation.max_stack {
            return Err(EvmError::StackOverflow);
        }
        if self.read_only
            && (operation.writes || (op == OpCode::CALL && !self.stack.peek(2)?.is_zero()))
        {
            return Err(EvmError::WriteProtection);
        }

        let memory_size = match operation.memory_size {
            Some(size) => size(&self.stack)?,
            None => 0,
        };

        if !self.context.use_gas(operation.constant_gas) {
            return Err(EvmError::OutOfGas);
        }
        let mut cost = operation.constant_gas;

        if operation.dynamic_gas.is_some() || memory_size > 0 {
            let memory_cost = self.memory.expansion_cost(memory_size)?;
            let extra = match operation.dynamic_gas {
                Some(dynamic) => dynamic(self, evm, memory_cost)?,
                None => 0,
            };
            let dynamic = memory_cost.checked_add(extra).ok_or(EvmError::OutOfGas)?;
            if !self.context.use_gas(dynamic) {
                return Err(EvmError::OutOfGas);
            }
            cost += dynamic;
        }
        self.memory.resize(memory_size);

        Ok((execute, cost))
    }

    /// Fold a finished child call back into this frame
    pub(crate) fn finish_call(
        &mut self,
        result: CallResult,
        out_offset: &U256,
        out_len: &U256,
    ) -> EvmResult<()> {
        let ok = result.error.is_none();
        if ok || result.error == Some(EvmError::Revert) {
            let (offset, len) = to_range(out_offset, out_len);
            self.memory.store_truncated(offset, len, &result.output);
        }
        self.stack.push_bool(ok)?;
        self.context.gas += result.gas_left;
        self.return_data = result.output;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;
    use crate::context::{BlockContext, TxContext};
    use crate::rules::Rules;
    use bytes::Bytes;
    use sable_primitives::{Address, H256};
    use sable_state::{StateConfig, StateDb};
    use sable_storage::MemoryDatabase;
    use std::sync::Arc;

    fn new_state() -> StateDb {
        StateDb::empty(Arc::new(MemoryDatabase::new()), StateConfig::default())
    }

    fn contract() -> Address {
        Address::repeat_byte(0xcc)
    }

    fn run_with(state: &mut StateDb, rules: Rules, code: &[u8], gas: u64) -> Interpreter {
        let mut evm = Evm::new(
            state,
            BlockContext::default(),
            TxContext::default(),
            rules,
            VmConfig::default(),
        );
        let context = CallContext::new(
            Address::zero(),
            contract(),
            contract(),
            Bytes::copy_from_slice(code),
            Bytes::new(),
            U256::zero(),
            gas,
        );
        let mut interp = Interpreter::new(context, false);
        while interp.status == Status::Running {
            if let Err(err) = interp.step(&mut evm) {
                interp.status = Status::from(&err);
            }
        }
        interp
    }

    fn run_code(code: &[u8], gas: u64) -> Interpreter {
        let mut state = new_state();
        run_with(&mut state, Rules::all_enabled(), code, gas)
    }

    fn top(interp: &Interpreter) -> U256 {
        *interp.stack.peek(0).unwrap()
    }

    // ==================== Control flow ====================

    #[test]
    fn test_stop() {
        let interp = run_code(&[0x00], 1000);
        assert_eq!(interp.status, Status::Stopped);
        assert_eq!(interp.context.gas, 1000);
    }

    #[test]
    fn test_implicit_stop() {
        // PUSH1 1
        let interp = run_code(&[0x60, 0x01], 1000);
        assert_eq!(interp.status, Status::Stopped);
        assert_eq!(interp.context.gas, 997);
    }

    #[test]
    fn test_jump() {
        // PUSH1 4, JUMP, INVALID, JUMPDEST, STOP
        let interp = run_code(&[0x60, 0x04, 0x56, 0xfe, 0x5b, 0x00], 1000);
        assert_eq!(interp.status, Status::Stopped);
        assert_eq!(interp.context.gas, 1000 - 3 - 8 - 1);
    }

    #[test]
    fn test_jump_into_push_data() {
        // PUSH1 3, JUMP, PUSH1 0x5b
        let interp = run_code(&[0x60, 0x03, 0x56, 0x60, 0x5b], 1000);
        assert_eq!(interp.status, Status::Faulted);
    }

    #[test]
    fn test_jumpi_not_taken() {
        // PUSH1 0, PUSH1 6, JUMPI, STOP, INVALID, JUMPDEST
        let interp = run_code(&[0x60, 0x00, 0x60, 0x06, 0x57, 0x00, 0xfe, 0x5b], 1000);
        assert_eq!(interp.status, Status::Stopped);
        assert_eq!(interp.pc, 5);
    }

    #[test]
    fn test_invalid_opcode() {
        let interp = run_code(&[0xfe], 1000);
        assert_eq!(interp.status, Status::InvalidOpcode);
        let interp = run_code(&[0x21], 1000);
        assert_eq!(interp.status, Status::InvalidOpcode);
    }

    #[test]
    fn test_fork_disabled_opcode() {
        let mut state = new_state();
        // PUSH1 1, PUSH1 1, SHL
        let interp = run_with(&mut state, Rules::eip160(), &[0x60, 0x01, 0x60, 0x01, 0x1b], 1000);
        assert_eq!(interp.status, Status::InvalidOpcode);
    }

    // ==================== Stack ====================

    #[test]
    fn test_stack_underflow() {
        let interp = run_code(&[0x01], 1000);
        assert_eq!(interp.status, Status::Faulted);
        // nothing was charged
        assert_eq!(interp.context.gas, 1000);
    }

    #[test]
    fn test_stack_overflow() {
        // JUMPDEST, PUSH1 0, PUSH1 0, JUMP: grows the stack forever
        let interp = run_code(&[0x5b, 0x60, 0x00, 0x60, 0x00, 0x56], 1_000_000);
        assert_eq!(interp.status, Status::Faulted);
        assert_eq!(interp.stack.len(), 1024);
    }

    #[test]
    fn test_out_of_gas() {
        // PUSH1 3, PUSH1 5, ADD with 8 gas
        let interp = run_code(&[0x60, 0x03, 0x60, 0x05, 0x01], 8);
        assert_eq!(interp.status, Status::OutOfGas);
    }

    // ==================== Arithmetic ====================

    #[test]
    fn test_add_wraps() {
        // PUSH1 1, PUSH32 0xff..ff, ADD
        let mut code = vec![0x60, 0x01, 0x7f];
        code.extend_from_slice(&[0xff; 32]);
        code.push(0x01);
        let interp = run_code(&code, 1000);
        assert_eq!(top(&interp), U256::zero());
    }

    #[test]
    fn test_sub_operand_order() {
        // PUSH1 3, PUSH1 10, SUB -> 10 - 3
        let interp = run_code(&[0x60, 0x03, 0x60, 0x0a, 0x03], 1000);
        assert_eq!(top(&interp), U256::from(7));
    }

    #[test]
    fn test_exp_gas() {
        // PUSH2 0x0100, PUSH1 2, EXP
        let interp = run_code(&[0x61, 0x01, 0x00, 0x60, 0x02, 0x0a], 1000);
        assert_eq!(top(&interp), U256::zero());
        // 2 pushes + EXP 10 + 2 bytes * 50
        assert_eq!(interp.context.gas, 1000 - 6 - 10 - 100);
    }

    #[test]
    fn test_push32_truncated() {
        // PUSH2 with one byte of data
        let interp = run_code(&[0x61, 0x01], 1000);
        assert_eq!(top(&interp), U256::from(0x0100));
    }

    // ==================== Memory ====================

    #[test]
    fn test_mstore_mload() {
        // PUSH1 42, PUSH1 0, MSTORE, PUSH1 0, MLOAD
        let interp = run_code(&[0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x00, 0x51], 10_000);
        assert_eq!(top(&interp), U256::from(42));
        // 3 pushes + MSTORE + MLOAD + 1 word of memory
        assert_eq!(interp.context.gas, 10_000 - 9 - 6 - 3);
    }

    #[test]
    fn test_msize() {
        // PUSH1 1, PUSH1 33, MSTORE8, MSIZE
        let interp = run_code(&[0x60, 0x01, 0x60, 0x21, 0x53, 0x59], 10_000);
        assert_eq!(top(&interp), U256::from(64));
    }

    #[test]
    fn test_huge_memory_is_out_of_gas() {
        // PUSH1 1, PUSH4 0xffffffff, MLOAD
        let interp = run_code(&[0x60, 0x01, 0x63, 0xff, 0xff, 0xff, 0xff, 0x51], 1_000_000);
        assert_eq!(interp.status, Status::OutOfGas);
    }

    #[test]
    fn test_sha3_empty() {
        // PUSH1 0, PUSH1 0, SHA3
        let interp = run_code(&[0x60, 0x00, 0x60, 0x00, 0x20], 1000);
        assert_eq!(
            top(&interp),
            sable_primitives::h256_to_word(&sable_crypto::KECCAK_EMPTY)
        );
        assert_eq!(interp.context.gas, 1000 - 6 - 30);
    }

    #[test]
    fn test_return_data() {
        // PUSH1 0xaa, PUSH1 0, MSTORE8, PUSH1 1, PUSH1 0, RETURN
        let interp = run_code(&[0x60, 0xaa, 0x60, 0x00, 0x53, 0x60, 0x01, 0x60, 0x00, 0xf3], 1000);
        assert_eq!(interp.status, Status::Stopped);
        assert_eq!(interp.output, vec![0xaa]);
    }

    #[test]
    fn test_returndatacopy_out_of_bounds() {
        // PUSH1 1, PUSH1 0, PUSH1 0, RETURNDATACOPY
        let interp = run_code(&[0x60, 0x01, 0x60, 0x00, 0x60, 0x00, 0x3e], 1000);
        assert_eq!(interp.status, Status::Faulted);
    }

    // ==================== Storage ====================

    #[test]
    fn test_sstore_sload() {
        let mut state = new_state();
        // PUSH1 5, PUSH1 1, SSTORE, PUSH1 1, SLOAD
        let interp = run_with(
            &mut state,
            Rules::all_enabled(),
            &[0x60, 0x05, 0x60, 0x01, 0x55, 0x60, 0x01, 0x54],
            100_000,
        );
        assert_eq!(top(&interp), U256::from(5));
        assert_eq!(
            state.get_state(&contract(), &H256::from_low_u64_be(1)),
            H256::from_low_u64_be(5)
        );
        // 3 pushes + SSTORE 20000 + SLOAD 200
        assert_eq!(interp.context.gas, 100_000 - 9 - 20000 - 200);
    }

    #[test]
    fn test_sstore_legacy_noop_costs_reset() {
        let mut state = new_state();
        // PUSH1 0, PUSH1 0, SSTORE
        let interp = run_with(&mut state, Rules::eip160(), &[0x60, 0x00, 0x60, 0x00, 0x55], 10_000);
        assert_eq!(interp.context.gas, 10_000 - 6 - 5000);
    }

    #[test]
    fn test_sload_frontier_price() {
        let mut state = new_state();
        // PUSH1 0, SLOAD
        let interp = run_with(&mut state, Rules::frontier(), &[0x60, 0x00, 0x54], 1000);
        assert_eq!(interp.context.gas, 1000 - 3 - 50);
    }

    #[test]
    fn test_log_emitted() {
        let mut state = new_state();
        // PUSH1 0x11 (topic), PUSH1 0, PUSH1 0, LOG1
        let interp = run_with(
            &mut state,
            Rules::all_enabled(),
            &[0x60, 0x11, 0x60, 0x00, 0x60, 0x00, 0xa1],
            10_000,
        );
        assert_eq!(interp.status, Status::Stopped);
        assert_eq!(state.logs().len(), 1);
        assert_eq!(state.logs()[0].topics, vec![H256::from_low_u64_be(0x11)]);
        assert_eq!(interp.context.gas, 10_000 - 9 - 750);
    }
}
