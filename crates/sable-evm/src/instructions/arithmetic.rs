//! Stop and arithmetic operations

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::interpreter::{Interpreter, Status};
use crate::word;

pub(crate) fn op_stop(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.status = Status::Stopped;
    Ok(())
}

macro_rules! binary_op {
    ($name:ident, $f:path) => {
        pub(crate) fn $name(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
            let [a, b] = interp.stack.pop_n::<2>()?;
            interp.stack.push($f(a, b))
        }
    };
}

macro_rules! ternary_op {
    ($name:ident, $f:path) => {
        pub(crate) fn $name(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
            let [a, b, n] = interp.stack.pop_n::<3>()?;
            interp.stack.push($f(a, b, n))
        }
    };
}

binary_op!(op_add, word::add);
binary_op!(op_mul, word::mul);
binary_op!(op_sub, word::sub);
binary_op!(op_div, word::div);
binary_op!(op_sdiv, word::sdiv);
binary_op!(op_mod, word::rem);
binary_op!(op_smod, word::smod);
binary_op!(op_exp, word::exp);
binary_op!(op_signextend, word::signextend);
ternary_op!(op_addmod, word::addmod);
ternary_op!(op_mulmod, word::mulmod);
