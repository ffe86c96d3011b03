//! C1 — modular integer arithmetic shared by the curve, signing, and attack
//! layers. Every operation here is generic over the modulus: callers pass
//! `p` (the field prime) or `n` (the group order) explicitly rather than the
//! module baking in a single modulus, since both are needed side by side
//! throughout the rest of the crate.

use dashu::integer::{IBig, UBig};

use crate::error::Sm2Error;

/// Extended Euclidean algorithm.
///
/// Returns `(g, x, y)` with `a*x + b*y = g` and `g = gcd(a, b)`. Terminates
/// for all non-negative inputs.
pub fn extended_gcd(a: &UBig, b: &UBig) -> (UBig, IBig, IBig) {
    fn go(a: IBig, b: IBig) -> (IBig, IBig, IBig) {
        if a == IBig::ZERO {
            return (b, IBig::ZERO, IBig::ONE);
        }
        let (g, y, x) = go(&b % &a, a.clone());
        let q = &b / &a;
        (g, x - &q * &y, y)
    }
    let (g, x, y) = go(IBig::from(a.clone()), IBig::from(b.clone()));
    (g.unsigned_abs(), x, y)
}

/// Modular inverse of `x` modulo `m`.
///
/// Returns the unique `y` in `[1, m)` with `x*y ≡ 1 (mod m)`. Implemented via
/// [`extended_gcd`]; any algorithm yielding the same result is conformant.
pub fn inverse_mod(x: &UBig, m: &UBig) -> Result<UBig, Sm2Error> {
    let (g, inv, _) = extended_gcd(x, m);
    if g != UBig::ONE {
        return Err(Sm2Error::NoInverse);
    }
    let m_i = IBig::from(m.clone());
    let reduced = ((inv % &m_i) + &m_i) % &m_i;
    Ok(reduced.unsigned_abs())
}

/// `(a + b) mod m`.
pub fn add_mod(a: &UBig, b: &UBig, m: &UBig) -> UBig {
    (a + b) % m
}

/// `(a - b) mod m`, without underflowing when `a < b`.
pub fn sub_mod(a: &UBig, b: &UBig, m: &UBig) -> UBig {
    let a = a % m;
    let b = b % m;
    if a >= b {
        a - b
    } else {
        m - (b - a)
    }
}

/// `(a * b) mod m`.
pub fn mul_mod(a: &UBig, b: &UBig, m: &UBig) -> UBig {
    (a * b) % m
}

/// `-a mod m`, i.e. `m - (a mod m)`, with `0` mapping to `0`.
pub fn neg_mod(a: &UBig, m: &UBig) -> UBig {
    let a = a % m;
    if a == UBig::ZERO {
        UBig::ZERO
    } else {
        m - a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_gcd_satisfies_bezout() {
        let a = UBig::from(240u32);
        let b = UBig::from(46u32);
        let (g, x, y) = extended_gcd(&a, &b);
        assert_eq!(g, UBig::from(2u32));
        let lhs = IBig::from(a) * &x + IBig::from(b) * &y;
        assert_eq!(lhs, IBig::from(2));
    }

    #[test]
    fn inverse_mod_round_trips() {
        let m = UBig::from(97u32);
        let x = UBig::from(13u32);
        let inv = inverse_mod(&x, &m).unwrap();
        assert_eq!(mul_mod(&x, &inv, &m), UBig::ONE);
    }

    #[test]
    fn inverse_mod_rejects_non_coprime() {
        let m = UBig::from(12u32);
        let x = UBig::from(4u32);
        assert_eq!(inverse_mod(&x, &m), Err(Sm2Error::NoInverse));
    }

    #[test]
    fn sub_mod_handles_underflow() {
        let m = UBig::from(10u32);
        assert_eq!(sub_mod(&UBig::from(2u32), &UBig::from(5u32), &m), UBig::from(7u32));
    }
}
