//! Per-fork instruction table

use crate::dynamic_gas::*;
use crate::error::EvmResult;
use crate::evm::Evm;
use crate::gas::cost;
use crate::instructions::*;
use crate::interpreter::Interpreter;
use crate::opcode::OpCode;
use crate::rules::Rules;
use crate::stack::{WordStack, STACK_LIMIT};
use std::ops::Index;

/// Opcode semantics
pub type ExecuteFn = fn(&mut Interpreter, &mut Evm<'_>) -> EvmResult<()>;
/// Gas on top of the constant cost and memory expansion; gets the memory cost
pub type DynamicGasFn = fn(&mut Interpreter, &mut Evm<'_>, u64) -> EvmResult<u64>;
/// Bytes of memory the instruction will touch
pub type MemorySizeFn = fn(&WordStack) -> EvmResult<u64>;

/// Everything the interpreter needs to run one opcode
#[derive(Clone, Copy)]
pub struct Operation {
    /// Handler, `None` for undefined opcodes
    pub execute: Option<ExecuteFn>,
    /// Gas charged before anything else
    pub constant_gas: u64,
    /// Value-dependent gas
    pub dynamic_gas: Option<DynamicGasFn>,
    /// Memory touched
    pub memory_size: Option<MemorySizeFn>,
    /// Minimum stack depth
    pub min_stack: usize,
    /// Maximum stack depth before the opcode would overflow
    pub max_stack: usize,
    /// Modifies state, forbidden in read-only frames
    pub writes: bool,
    /// Sets the program counter itself
    pub jumps: bool,
}

impl Operation {
    const UNDEFINED: Operation = Operation {
        execute: None,
        constant_gas: 0,
        dynamic_gas: None,
        memory_size: None,
        min_stack: 0,
        max_stack: STACK_LIMIT,
        writes: false,
        jumps: false,
    };

    fn new(execute: ExecuteFn, constant_gas: u64, pops: usize, pushes: usize) -> Self {
        Self {
            execute: Some(execute),
            constant_gas,
            min_stack: pops,
            max_stack: STACK_LIMIT + pops - pushes,
            ..Self::UNDEFINED
        }
    }

    fn dynamic(mut self, gas: DynamicGasFn) -> Self {
        self.dynamic_gas = Some(gas);
        self
    }

    fn memory(mut self, size: MemorySizeFn) -> Self {
        self.memory_size = Some(size);
        self
    }

    fn writes(mut self) -> Self {
        self.writes = true;
        self
    }

    fn jumps(mut self) -> Self {
        self.jumps = true;
        self
    }
}

/// Dense opcode-indexed table, built once per fork
#[derive(Clone)]
pub struct JumpTable(Box<[Operation; 256]>);

impl Index<OpCode> for JumpTable {
    type Output = Operation;

    fn index(&self, op: OpCode) -> &Operation {
        &self.0[op.0 as usize]
    }
}

macro_rules! stack_family {
    ($t:ident, $base:expr, $op:ident, $pops:expr, $pushes:expr, [$($n:literal),*]) => {
        $(
            $t[$base + $n] = Operation::new($op::<$n>, cost::VERYLOW, $pops($n), $pushes($n));
        )*
    };
}

impl JumpTable {
    /// Instructions enabled by `rules`
    pub fn new(rules: &Rules) -> Self {
        let gt = rules.gas_table;
        let mut t = Box::new([Operation::UNDEFINED; 256]);

        t[0x00] = Operation::new(op_stop, cost::ZERO, 0, 0);
        t[0x01] = Operation::new(op_add, cost::VERYLOW, 2, 1);
        t[0x02] = Operation::new(op_mul, cost::LOW, 2, 1);
        t[0x03] = Operation::new(op_sub, cost::VERYLOW, 2, 1);
        t[0x04] = Operation::new(op_div, cost::LOW, 2, 1);
        t[0x05] = Operation::new(op_sdiv, cost::LOW, 2, 1);
        t[0x06] = Operation::new(op_mod, cost::LOW, 2, 1);
        t[0x07] = Operation::new(op_smod, cost::LOW, 2, 1);
        t[0x08] = Operation::new(op_addmod, cost::MID, 3, 1);
        t[0x09] = Operation::new(op_mulmod, cost::MID, 3, 1);
        t[0x0a] = Operation::new(op_exp, cost::EXP, 2, 1).dynamic(gas_exp);
        t[0x0b] = Operation::new(op_signextend, cost::LOW, 2, 1);

        t[0x10] = Operation::new(op_lt, cost::VERYLOW, 2, 1);
        t[0x11] = Operation::new(op_gt, cost::VERYLOW, 2, 1);
        t[0x12] = Operation::new(op_slt, cost::VERYLOW, 2, 1);
        t[0x13] = Operation::new(op_sgt, cost::VERYLOW, 2, 1);
        t[0x14] = Operation::new(op_eq, cost::VERYLOW, 2, 1);
        t[0x15] = Operation::new(op_iszero, cost::VERYLOW, 1, 1);
        t[0x16] = Operation::new(op_and, cost::VERYLOW, 2, 1);
        t[0x17] = Operation::new(op_or, cost::VERYLOW, 2, 1);
        t[0x18] = Operation::new(op_xor, cost::VERYLOW, 2, 1);
        t[0x19] = Operation::new(op_not, cost::VERYLOW, 1, 1);
        t[0x1a] = Operation::new(op_byte, cost::VERYLOW, 2, 1);

        t[0x20] = Operation::new(op_sha3, cost::SHA3, 2, 1)
            .dynamic(gas_sha3)
            .memory(memory_sha3);

        t[0x30] = Operation::new(op_address, cost::BASE, 0, 1);
        t[0x31] = Operation::new(op_balance, gt.balance, 1, 1);
        t[0x32] = Operation::new(op_origin, cost::BASE, 0, 1);
        t[0x33] = Operation::new(op_caller, cost::BASE, 0, 1);
        t[0x34] = Operation::new(op_callvalue, cost::BASE, 0, 1);
        t[0x35] = Operation::new(op_calldataload, cost::VERYLOW, 1, 1);
        t[0x36] = Operation::new(op_calldatasize, cost::BASE, 0, 1);
        t[0x37] = Operation::new(op_calldatacopy, cost::VERYLOW, 3, 0)
            .dynamic(gas_copy)
            .memory(memory_copy);
        t[0x38] = Operation::new(op_codesize, cost::BASE, 0, 1);
        t[0x39] = Operation::new(op_codecopy, cost::VERYLOW, 3, 0)
            .dynamic(gas_copy)
            .memory(memory_copy);
        t[0x3a] = Operation::new(op_gasprice, cost::BASE, 0, 1);
        t[0x3b] = Operation::new(op_extcodesize, gt.extcode_size, 1, 1);
        t[0x3c] = Operation::new(op_extcodecopy, gt.extcode_copy, 4, 0)
            .dynamic(gas_extcodecopy)
            .memory(memory_extcodecopy);

        t[0x40] = Operation::new(op_blockhash, cost::EXT, 1, 1);
        t[0x41] = Operation::new(op_coinbase, cost::BASE, 0, 1);
        t[0x42] = Operation::new(op_timestamp, cost::BASE, 0, 1);
        t[0x43] = Operation::new(op_number, cost::BASE, 0, 1);
        t[0x44] = Operation::new(op_difficulty, cost::BASE, 0, 1);
        t[0x45] = Operation::new(op_gaslimit, cost::BASE, 0, 1);

        t[0x50] = Operation::new(op_pop, cost::BASE, 1, 0);
        t[0x51] = Operation::new(op_mload, cost::VERYLOW, 1, 1).memory(memory_mword);
        t[0x52] = Operation::new(op_mstore, cost::VERYLOW, 2, 0).memory(memory_mword);
        t[0x53] = Operation::new(op_mstore8, cost::VERYLOW, 2, 0).memory(memory_mbyte);
        t[0x54] = Operation::new(op_sload, gt.sload, 1, 1);
        t[0x55] = Operation::new(op_sstore, cost::ZERO, 2, 0)
            .dynamic(gas_sstore)
            .writes();
        t[0x56] = Operation::new(op_jump, cost::MID, 1, 0).jumps();
        t[0x57] = Operation::new(op_jumpi, cost::HIGH, 2, 0).jumps();
        t[0x58] = Operation::new(op_pc, cost::BASE, 0, 1);
        t[0x59] = Operation::new(op_msize, cost::BASE, 0, 1);
        t[0x5a] = Operation::new(op_gas, cost::BASE, 0, 1);
        t[0x5b] = Operation::new(op_jumpdest, cost::JUMPDEST, 0, 0);

        let push_pops = |_: usize| 0;
        let push_pushes = |_: usize| 1;
        stack_family!(t, 0x5f, op_push, push_pops, push_pushes, [
            1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
            17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32
        ]);
        let dup_pops = |n: usize| n;
        let dup_pushes = |n: usize| n + 1;
        stack_family!(t, 0x7f, op_dup, dup_pops, dup_pushes, [
            1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16
        ]);
        let swap_pops = |n: usize| n + 1;
        let swap_pushes = |n: usize| n + 1;
        stack_family!(t, 0x8f, op_swap, swap_pops, swap_pushes, [
            1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16
        ]);

        t[0xa0] = log_operation(op_log::<0>, 0);
        t[0xa1] = log_operation(op_log::<1>, 1);
        t[0xa2] = log_operation(op_log::<2>, 2);
        t[0xa3] = log_operation(op_log::<3>, 3);
        t[0xa4] = log_operation(op_log::<4>, 4);

        t[0xf0] = Operation::new(op_create, cost::CREATE, 3, 1)
            .memory(memory_create)
            .writes();
        t[0xf1] = Operation::new(op_call, gt.calls, 7, 1)
            .dynamic(gas_call)
            .memory(memory_call);
        t[0xf2] = Operation::new(op_callcode, gt.calls, 7, 1)
            .dynamic(gas_callcode)
            .memory(memory_call);
        t[0xf3] = Operation::new(op_return, cost::ZERO, 2, 0).memory(memory_return);
        t[0xff] = Operation::new(op_selfdestruct, gt.suicide, 1, 0)
            .dynamic(gas_selfdestruct)
            .writes();

        if rules.homestead {
            t[0xf4] = Operation::new(op_delegatecall, gt.calls, 6, 1)
                .dynamic(gas_delegatecall)
                .memory(memory_delegatecall);
        }

        if rules.byzantium {
            t[0x3d] = Operation::new(op_returndatasize, cost::BASE, 0, 1);
            t[0x3e] = Operation::new(op_returndatacopy, cost::VERYLOW, 3, 0)
                .dynamic(gas_copy)
                .memory(memory_copy);
            t[0xfa] = Operation::new(op_staticcall, gt.calls, 6, 1)
                .dynamic(gas_delegatecall)
                .memory(memory_delegatecall);
            t[0xfd] = Operation::new(op_revert, cost::ZERO, 2, 0).memory(memory_return);
        }

        if rules.constantinople {
            t[0x1b] = Operation::new(op_shl, cost::VERYLOW, 2, 1);
            t[0x1c] = Operation::new(op_shr, cost::VERYLOW, 2, 1);
            t[0x1d] = Operation::new(op_sar, cost::VERYLOW, 2, 1);
            t[0x3f] = Operation::new(op_extcodehash, cost::EXTCODEHASH, 1, 1);
            t[0xf5] = Operation::new(op_create2, cost::CREATE2, 4, 1)
                .dynamic(gas_create2)
                .memory(memory_create)
                .writes();
        }

        JumpTable(t)
    }
}

fn log_operation(execute: ExecuteFn, topics: usize) -> Operation {
    Operation::new(execute, cost::LOG + cost::LOG_TOPIC * topics as u64, 2 + topics, 0)
        .dynamic(gas_log)
        .memory(memory_log)
        .writes()
}
