//! Total arithmetic over [`Number`].
//!
//! Every function returns `Inf` when any argument is `Inf` or when the
//! result would exceed the precision envelope. Division and modulo by
//! zero yield `Inf`. Totality keeps the interpreter hot path free of
//! error handling under adversarial mining inputs.

use crate::number::Number;
use num_bigint::BigUint;
use num_traits::{One, Zero};

pub fn add(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(x), Number::Finite(y)) => Number::Finite(x + y).saturate(),
        _ => Number::Inf,
    }
}

/// Truncating subtraction: `max(0, a - b)`.
pub fn sub(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(x), Number::Finite(y)) => {
            if x > y {
                Number::Finite(x - y)
            } else {
                Number::zero()
            }
        }
        _ => Number::Inf,
    }
}

pub fn mul(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(x), Number::Finite(y)) => Number::Finite(x * y).saturate(),
        _ => Number::Inf,
    }
}

pub fn div(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(x), Number::Finite(y)) => {
            if y.is_zero() {
                Number::Inf
            } else {
                Number::Finite(x / y)
            }
        }
        _ => Number::Inf,
    }
}

/// Division only if divisible: `a / b` if `b` divides `a`, else `a`.
/// `dif(a, 0) = a`.
pub fn dif(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(x), Number::Finite(y)) => {
            if y.is_zero() || !(x % y).is_zero() {
                a.clone()
            } else {
                Number::Finite(x / y)
            }
        }
        _ => Number::Inf,
    }
}

pub fn modulo(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(x), Number::Finite(y)) => {
            if y.is_zero() {
                Number::Inf
            } else {
                Number::Finite(x % y)
            }
        }
        _ => Number::Inf,
    }
}

/// Exponentiation by repeated squaring, saturating on intermediate
/// overflow so huge exponents return in bounded time.
pub fn pow(base: &Number, exp: &Number) -> Number {
    match (base, exp) {
        (Number::Finite(b), Number::Finite(e)) => {
            if b.is_zero() {
                return if e.is_zero() {
                    Number::one()
                } else {
                    Number::zero()
                };
            }
            if b.is_one() {
                return Number::one();
            }
            let mut res = Number::one();
            let mut sq = Number::Finite(b.clone());
            let mut e = e.clone();
            while !res.is_inf() && !e.is_zero() {
                if e.bit(0) {
                    res = mul(&res, &sq);
                }
                e >>= 1u32;
                if !e.is_zero() {
                    sq = mul(&sq, &sq);
                }
            }
            res
        }
        _ => Number::Inf,
    }
}

pub fn fac(a: &Number) -> Number {
    match a {
        Number::Finite(v) => {
            let mut res = Number::one();
            let mut i = v.clone();
            let one = BigUint::one();
            while i > one && !res.is_inf() {
                res = mul(&res, &Number::Finite(i.clone()));
                i -= &one;
            }
            res
        }
        Number::Inf => Number::Inf,
    }
}

pub fn gcd(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(x), Number::Finite(y)) => {
            let mut a = x.clone();
            let mut b = y.clone();
            while !b.is_zero() {
                let r = &a % &b;
                a = b;
                b = r;
            }
            Number::Finite(a)
        }
        _ => Number::Inf,
    }
}

/// Binomial coefficient `C(n, k)`; zero for `k > n`. Computed as an
/// alternating product and division to keep intermediates small.
pub fn bin(n: &Number, k: &Number) -> Number {
    match (n, k) {
        (Number::Finite(nv), Number::Finite(kv)) => {
            if kv > nv {
                return Number::zero();
            }
            let mut k = kv.clone();
            if &k * 2u32 > *nv {
                k = nv - &k;
            }
            let mut r = Number::one();
            let mut i = BigUint::zero();
            while i < k {
                r = mul(&r, &Number::Finite(nv - &i));
                i += 1u32;
                r = div(&r, &Number::Finite(i.clone()));
                if r.is_inf() {
                    break;
                }
            }
            r
        }
        _ => Number::Inf,
    }
}

/// Equality comparison: 1 if `a == b`, else 0.
pub fn cmp(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(x), Number::Finite(y)) => {
            if x == y {
                Number::one()
            } else {
                Number::zero()
            }
        }
        _ => Number::Inf,
    }
}

pub fn min(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(x), Number::Finite(y)) => Number::Finite(x.min(y).clone()),
        _ => Number::Inf,
    }
}

pub fn max(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(x), Number::Finite(y)) => Number::Finite(x.max(y).clone()),
        _ => Number::Inf,
    }
}

/// Floor logarithm of `a` in base `b`; requires `a >= 1` and `b >= 2`.
pub fn log(a: &Number, b: &Number) -> Number {
    match (a, b) {
        (Number::Finite(av), Number::Finite(bv)) => {
            if av.is_zero() || *bv < BigUint::from(2u32) {
                return Number::Inf;
            }
            let mut v = av.clone();
            let mut result = BigUint::zero();
            while v >= *bv {
                v /= bv;
                result += 1u32;
            }
            Number::Finite(result)
        }
        _ => Number::Inf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: u64) -> Number {
        Number::from(v)
    }

    #[test]
    fn test_inf_absorption() {
        let x = n(7);
        for f in [add, sub, mul, div, dif, modulo, pow, gcd, bin, cmp, min, max, log] {
            assert_eq!(f(&Number::Inf, &x), Number::Inf);
            assert_eq!(f(&x, &Number::Inf), Number::Inf);
            assert_eq!(f(&Number::Inf, &Number::Inf), Number::Inf);
        }
        assert_eq!(fac(&Number::Inf), Number::Inf);
    }

    #[test]
    fn test_truncating_sub() {
        assert_eq!(sub(&n(3), &n(10)), n(0));
        assert_eq!(sub(&n(10), &n(3)), n(7));
        assert_eq!(sub(&n(5), &n(5)), n(0));
    }

    #[test]
    fn test_div_mod_by_zero() {
        assert_eq!(div(&n(5), &n(0)), Number::Inf);
        assert_eq!(modulo(&n(5), &n(0)), Number::Inf);
        assert_eq!(div(&n(17), &n(5)), n(3));
        assert_eq!(modulo(&n(17), &n(5)), n(2));
    }

    #[test]
    fn test_dif() {
        assert_eq!(dif(&n(12), &n(4)), n(3));
        assert_eq!(dif(&n(12), &n(5)), n(12));
        assert_eq!(dif(&n(12), &n(0)), n(12));
    }

    #[test]
    fn test_pow_edge_cases() {
        assert_eq!(pow(&n(0), &n(0)), n(1));
        assert_eq!(pow(&n(0), &n(5)), n(0));
        assert_eq!(pow(&n(1), &n(1000)), n(1));
        assert_eq!(pow(&n(2), &n(10)), n(1024));
        assert_eq!(pow(&n(3), &n(4)), n(81));
    }

    #[test]
    fn test_pow_saturates_quickly() {
        assert_eq!(pow(&n(2), &n(1_000_000)), Number::Inf);
    }

    #[test]
    fn test_fac() {
        assert_eq!(fac(&n(0)), n(1));
        assert_eq!(fac(&n(1)), n(1));
        assert_eq!(fac(&n(5)), n(120));
        assert_eq!(fac(&n(10)), n(3628800));
        assert_eq!(fac(&n(1_000_000)), Number::Inf);
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(&n(12), &n(18)), n(6));
        assert_eq!(gcd(&n(17), &n(5)), n(1));
        assert_eq!(gcd(&n(0), &n(7)), n(7));
        assert_eq!(gcd(&n(0), &n(0)), n(0));
    }

    #[test]
    fn test_bin() {
        assert_eq!(bin(&n(5), &n(2)), n(10));
        assert_eq!(bin(&n(10), &n(10)), n(1));
        assert_eq!(bin(&n(4), &n(7)), n(0));
        assert_eq!(bin(&n(0), &n(0)), n(1));
        assert_eq!(bin(&n(50), &n(25)), "126410606437752".parse().unwrap());
    }

    #[test]
    fn test_cmp_min_max() {
        assert_eq!(cmp(&n(4), &n(4)), n(1));
        assert_eq!(cmp(&n(4), &n(5)), n(0));
        assert_eq!(min(&n(4), &n(5)), n(4));
        assert_eq!(max(&n(4), &n(5)), n(5));
    }

    #[test]
    fn test_log() {
        assert_eq!(log(&n(1), &n(2)), n(0));
        assert_eq!(log(&n(8), &n(2)), n(3));
        assert_eq!(log(&n(9), &n(2)), n(3));
        assert_eq!(log(&n(100), &n(10)), n(2));
        assert_eq!(log(&n(0), &n(2)), Number::Inf);
        assert_eq!(log(&n(5), &n(1)), Number::Inf);
    }
}
