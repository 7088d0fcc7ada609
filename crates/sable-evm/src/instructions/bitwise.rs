//! Comparison and bitwise logic

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::interpreter::Interpreter;
use crate::word;

macro_rules! compare_op {
    ($name:ident, |$a:ident, $b:ident| $body:expr) => {
        pub(crate) fn $name(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
            let [$a, $b] = interp.stack.pop_n::<2>()?;
            interp.stack.push_bool($body)
        }
    };
}

macro_rules! bit_op {
    ($name:ident, |$a:ident, $b:ident| $body:expr) => {
        pub(crate) fn $name(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
            let [$a, $b] = interp.stack.pop_n::<2>()?;
            interp.stack.push($body)
        }
    };
}

compare_op!(op_lt, |a, b| a < b);
compare_op!(op_gt, |a, b| a > b);
compare_op!(op_slt, |a, b| word::slt(&a, &b));
compare_op!(op_sgt, |a, b| word::sgt(&a, &b));
compare_op!(op_eq, |a, b| a == b);

bit_op!(op_and, |a, b| a & b);
bit_op!(op_or, |a, b| a | b);
bit_op!(op_xor, |a, b| a ^ b);
bit_op!(op_byte, |index, value| word::byte(index, value));
bit_op!(op_shl, |shift, value| word::shl(shift, value));
bit_op!(op_shr, |shift, value| word::shr(shift, value));
bit_op!(op_sar, |shift, value| word::sar(shift, value));

pub(crate) fn op_iszero(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let value = interp.stack.pop()?;
    interp.stack.push_bool(value.is_zero())
}

pub(crate) fn op_not(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let value = interp.stack.pop()?;
    interp.stack.push(!value)
}
