//! Arbitrary-precision nonnegative integers with an infinity sentinel.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A nonnegative integer of unbounded precision, or the distinguished
/// value `Inf`. `Inf` absorbs through every arithmetic operation and is
/// the saturation result when a value grows past [`Number::MAX_BITS`].
///
/// The variant order makes the derived `Ord` treat `Inf` as larger than
/// every finite value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Number {
    Finite(BigUint),
    Inf,
}

impl Number {
    /// Saturation envelope: finite values are capped at this many bits
    /// (roughly 1000 decimal digits).
    pub const MAX_BITS: u64 = 3400;

    pub fn zero() -> Self {
        Number::Finite(BigUint::zero())
    }

    pub fn one() -> Self {
        Number::Finite(BigUint::one())
    }

    pub fn is_inf(&self) -> bool {
        matches!(self, Number::Inf)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Number::Finite(v) if v.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Number::Finite(v) if v.is_one())
    }

    /// The finite value as `u64`, if it is finite and fits.
    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Number::Finite(v) => v.to_u64(),
            Number::Inf => None,
        }
    }

    /// The finite value as `i64`, if it is finite and fits.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Number::Finite(v) => v.to_i64(),
            Number::Inf => None,
        }
    }

    /// Converts a signed integer, clamping negative inputs to zero.
    /// The value domain is nonnegative; callers drawing from signed
    /// distributions land here.
    pub fn from_i64_clamped(value: i64) -> Self {
        if value <= 0 {
            Number::zero()
        } else {
            Number::from(value as u64)
        }
    }

    /// Bit length of the finite value; `None` for `Inf`.
    pub fn bits(&self) -> Option<u64> {
        match self {
            Number::Finite(v) => Some(v.bits()),
            Number::Inf => None,
        }
    }

    /// Saturates to `Inf` if the value exceeds the precision envelope.
    pub fn saturate(self) -> Self {
        match &self {
            Number::Finite(v) if v.bits() > Self::MAX_BITS => Number::Inf,
            _ => self,
        }
    }

    /// A deterministic 64-bit digest of the value, used for structural
    /// program hashing.
    pub fn fold_u64(&self) -> u64 {
        match self {
            Number::Finite(v) => v
                .to_u64_digits()
                .iter()
                .fold(0u64, |h, d| h.wrapping_mul(31).wrapping_add(*d)),
            Number::Inf => u64::MAX,
        }
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::Finite(BigUint::from(value))
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Finite(BigUint::from(value))
    }
}

impl From<BigUint> for Number {
    fn from(value: BigUint) -> Self {
        Number::Finite(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Finite(v) => write!(f, "{}", v),
            Number::Inf => write!(f, "inf"),
        }
    }
}

impl FromStr for Number {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Number::Finite(BigUint::from_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Number::Inf > Number::from(u64::MAX));
        assert!(Number::zero() < Number::one());
        assert_eq!(Number::Inf, Number::Inf);
    }

    #[test]
    fn test_clamped_conversion() {
        assert_eq!(Number::from_i64_clamped(-5), Number::zero());
        assert_eq!(Number::from_i64_clamped(0), Number::zero());
        assert_eq!(Number::from_i64_clamped(42), Number::from(42u64));
    }

    #[test]
    fn test_saturation() {
        let big = Number::Finite(BigUint::one() << 4000u32);
        assert_eq!(big.saturate(), Number::Inf);
        assert_eq!(Number::from(7u64).saturate(), Number::from(7u64));
    }

    #[test]
    fn test_display_roundtrip() {
        let n: Number = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(n.to_string(), "123456789012345678901234567890");
        assert_eq!(Number::Inf.to_string(), "inf");
    }

    #[test]
    fn test_fold_is_stable() {
        let a: Number = "987654321987654321".parse().unwrap();
        let b: Number = "987654321987654321".parse().unwrap();
        assert_eq!(a.fold_u64(), b.fold_u64());
        assert_ne!(a.fold_u64(), Number::from(1u64).fold_u64());
    }
}
