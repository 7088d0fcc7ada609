//! Word arithmetic with EVM semantics.
//!
//! Unsigned operations wrap modulo 2^256. Signed operations read words as
//! two's complement.

use sable_primitives::{U256, U512};

/// Sign bit set
pub fn is_negative(x: &U256) -> bool {
    x.bit(255)
}

/// Two's complement negation
pub fn negate(x: U256) -> U256 {
    (!x).overflowing_add(U256::one()).0
}

fn abs(x: U256) -> U256 {
    if is_negative(&x) {
        negate(x)
    } else {
        x
    }
}

fn low_u256(x: U512) -> U256 {
    let mut buf = [0u8; 64];
    x.to_big_endian(&mut buf);
    U256::from_big_endian(&buf[32..])
}

/// ADD
pub fn add(a: U256, b: U256) -> U256 {
    a.overflowing_add(b).0
}

/// SUB
pub fn sub(a: U256, b: U256) -> U256 {
    a.overflowing_sub(b).0
}

/// MUL
pub fn mul(a: U256, b: U256) -> U256 {
    a.overflowing_mul(b).0
}

/// DIV, zero divisor yields zero
pub fn div(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        U256::zero()
    } else {
        a / b
    }
}

/// MOD, zero divisor yields zero
pub fn rem(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        U256::zero()
    } else {
        a % b
    }
}

/// SDIV. `-2^255 / -1` stays `-2^255`.
pub fn sdiv(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let quotient = abs(a) / abs(b);
    if is_negative(&a) != is_negative(&b) {
        negate(quotient)
    } else {
        quotient
    }
}

/// SMOD, result takes the sign of the dividend
pub fn smod(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let r = abs(a) % abs(b);
    if is_negative(&a) {
        negate(r)
    } else {
        r
    }
}

/// ADDMOD without intermediate overflow
pub fn addmod(a: U256, b: U256, n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    low_u256((U512::from(a) + U512::from(b)) % U512::from(n))
}

/// MULMOD without intermediate overflow
pub fn mulmod(a: U256, b: U256, n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    low_u256(a.full_mul(b) % U512::from(n))
}

/// EXP
pub fn exp(base: U256, exponent: U256) -> U256 {
    base.overflowing_pow(exponent).0
}

/// SIGNEXTEND from byte `back` (0 = least significant)
pub fn signextend(back: U256, value: U256) -> U256 {
    if back >= U256::from(31) {
        return value;
    }
    let bit = back.low_u64() as usize * 8 + 7;
    let mask = (U256::one() << bit) - U256::one();
    if value.bit(bit) {
        value | !mask
    } else {
        value & mask
    }
}

/// SLT
pub fn slt(a: &U256, b: &U256) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

/// SGT
pub fn sgt(a: &U256, b: &U256) -> bool {
    slt(b, a)
}

/// BYTE: the `index`-th byte counting from the most significant
pub fn byte(index: U256, value: U256) -> U256 {
    if index >= U256::from(32) {
        return U256::zero();
    }
    U256::from(value.byte(31 - index.low_u64() as usize))
}

/// SHL
pub fn shl(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256) {
        return U256::zero();
    }
    value << shift.low_u64() as usize
}

/// SHR
pub fn shr(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256) {
        return U256::zero();
    }
    value >> shift.low_u64() as usize
}

/// SAR
pub fn sar(shift: U256, value: U256) -> U256 {
    let negative = is_negative(&value);
    if shift >= U256::from(256) {
        return if negative { U256::MAX } else { U256::zero() };
    }
    let shift = shift.low_u64() as usize;
    if negative {
        !((!value) >> shift)
    } else {
        value >> shift
    }
}
