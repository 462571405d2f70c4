//! Arithmetic on hex encoded unsigned integers of arbitrary width.
//!
//! [Did](super::Did) carries its own modulo 2^160 arithmetic, these helpers remain for
//! callers that only hold the textual form of an identifier.

use num_bigint::BigUint;

use crate::error::Error;
use crate::error::Result;

fn parse(s: &str) -> Result<BigUint> {
    if s.is_empty() {
        return Ok(BigUint::default());
    }
    BigUint::parse_bytes(s.as_bytes(), 16)
        .ok_or_else(|| Error::InvalidArgument(format!("not a hex number: {s}")))
}

/// Add two hex numbers.
///
/// The result has the width of the longer operand and the carry out of that width is
/// discarded, i.e. the sum is taken modulo 16^width.
pub fn add(left: &str, right: &str) -> Result<String> {
    let width = left.len().max(right.len());
    let modulus = BigUint::from(16u8).pow(width as u32);
    let sum = (parse(left)? + parse(right)?) % modulus;
    Ok(format!("{:0>width$}", sum.to_str_radix(16), width = width))
}

/// 2^exponent in hex, written positionally as `2^(exponent mod 4)` followed by
/// `exponent / 4` zero digits.
pub fn pow2x(exponent: u32) -> String {
    let leading = 1u8 << (exponent % 4);
    format!("{:x}{}", leading, "0".repeat((exponent / 4) as usize))
}
