//! C2 — affine point arithmetic over the SM2-recommended curve, plus the
//! domain parameters themselves (§3's "Domain parameters").
//!
//! Generalizes the teacher's `Curve` struct: same idea of a zero-sized
//! namespace holding the curve's constants as associated `const`s, but the
//! arithmetic below is real affine chord-and-tangent addition over `dashu`
//! integers rather than an ecrecover-precompile trick, since there is no SVM
//! syscall to abuse here.

use std::sync::OnceLock;

use dashu::integer::UBig;

use crate::error::Sm2Error;
use crate::field::{add_mod, inverse_mod, mul_mod, sub_mod};

/// A point on the curve, or the identity (point at infinity).
///
/// A tagged sum type rather than a sentinel coordinate pair, so arithmetic
/// can never mistake `(0, 0)` for the identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Point {
    /// The neutral element of the curve's group.
    Identity,
    /// An affine point `(x, y)` with `0 <= x, y < p`.
    Affine { x: UBig, y: UBig },
}

impl Point {
    /// Builds an affine point without checking curve membership.
    ///
    /// Only call this when the point is already known-good (e.g. copied
    /// from a validated signature), or deliberately, and visibly, for the
    /// off-curve forgery demonstration in [`crate::forgery`].
    pub fn affine_unchecked(x: UBig, y: UBig) -> Self {
        Point::Affine { x, y }
    }

    /// Builds an affine point, rejecting anything not on the curve.
    pub fn affine(x: UBig, y: UBig) -> Result<Self, Sm2Error> {
        let point = Point::Affine { x, y };
        if point.on_curve() {
            Ok(point)
        } else {
            Err(Sm2Error::InvalidPoint)
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Point::Identity)
    }

    /// `x`-coordinate, when not the identity.
    pub fn x(&self) -> Option<&UBig> {
        match self {
            Point::Identity => None,
            Point::Affine { x, .. } => Some(x),
        }
    }

    /// `y`-coordinate, when not the identity.
    pub fn y(&self) -> Option<&UBig> {
        match self {
            Point::Identity => None,
            Point::Affine { y, .. } => Some(y),
        }
    }

    /// Checks that a non-identity point satisfies the curve equation.
    /// The identity trivially satisfies it (there is nothing to check).
    pub fn on_curve(&self) -> bool {
        match self {
            Point::Identity => true,
            Point::Affine { x, y } => {
                let p = Curve::p();
                let lhs = mul_mod(y, y, &p);
                let x3 = mul_mod(&mul_mod(x, x, &p), x, &p);
                let rhs = add_mod(&add_mod(&x3, &mul_mod(&Curve::a(), x, &p), &p), &Curve::b(), &p);
                lhs == rhs
            }
        }
    }
}

/// Namespace for the SM2-recommended domain parameters and curve operations.
pub struct Curve;

impl Curve {
    /// Field prime modulus `p`.
    pub const P: [u8; 32] = [
        0x85, 0x42, 0xD6, 0x9E, 0x4C, 0x04, 0x4F, 0x18, 0xE8, 0xB9, 0x24, 0x35, 0xBF, 0x6F, 0xF7,
        0xDE, 0x45, 0x72, 0x83, 0x91, 0x5C, 0x45, 0x51, 0x7D, 0x72, 0x2E, 0xDB, 0x8B, 0x08, 0xF1,
        0xDF, 0xC3,
    ];

    /// Curve coefficient `a`.
    pub const A: [u8; 32] = [
        0x78, 0x79, 0x68, 0xB4, 0xFA, 0x32, 0xC3, 0xFD, 0x24, 0x17, 0x84, 0x2E, 0x73, 0xBB, 0xFE,
        0xFF, 0x2F, 0x3C, 0x84, 0x8B, 0x68, 0x31, 0xD7, 0xE0, 0xEC, 0x65, 0x22, 0x8B, 0x39, 0x37,
        0xE4, 0x98,
    ];

    /// Curve coefficient `b`.
    pub const B: [u8; 32] = [
        0x63, 0xE4, 0xC6, 0xD3, 0xB2, 0x3B, 0x0C, 0x84, 0x9C, 0xF8, 0x42, 0x41, 0x48, 0x4B, 0xFE,
        0x48, 0xF6, 0x1D, 0x59, 0xA5, 0xB1, 0x6B, 0xA0, 0x6E, 0x6E, 0x12, 0xD1, 0xDA, 0x27, 0xC5,
        0x24, 0x9A,
    ];

    /// Group order `n`.
    pub const N: [u8; 32] = [
        0x85, 0x42, 0xD6, 0x9E, 0x4C, 0x04, 0x4F, 0x18, 0xE8, 0xB9, 0x24, 0x35, 0xBF, 0x6F, 0xF7,
        0xDD, 0x29, 0x77, 0x20, 0x63, 0x04, 0x85, 0x62, 0x8D, 0x5A, 0xE7, 0x4E, 0xE7, 0xC3, 0x2E,
        0x79, 0xB7,
    ];

    /// Generator `x`-coordinate.
    pub const GX: [u8; 32] = [
        0x42, 0x1D, 0xEB, 0xD6, 0x1B, 0x62, 0xEA, 0xB6, 0x74, 0x64, 0x34, 0xEB, 0xC3, 0xCC, 0x31,
        0x5E, 0x32, 0x22, 0x0B, 0x3B, 0xAD, 0xD5, 0x0B, 0xDC, 0x4C, 0x4E, 0x6C, 0x14, 0x7F, 0xED,
        0xD4, 0x3D,
    ];

    /// Generator `y`-coordinate.
    pub const GY: [u8; 32] = [
        0x06, 0x80, 0x51, 0x2B, 0xCB, 0xB4, 0x2C, 0x07, 0xD4, 0x73, 0x49, 0xD2, 0x15, 0x3B, 0x70,
        0xC4, 0xE5, 0xD7, 0xFD, 0xFC, 0xBF, 0xA3, 0x6E, 0xA1, 0xA8, 0x58, 0x41, 0xB9, 0xE4, 0x6E,
        0x09, 0xA2,
    ];

    pub fn p() -> UBig {
        UBig::from_be_bytes(&Self::P)
    }

    pub fn a() -> UBig {
        UBig::from_be_bytes(&Self::A)
    }

    pub fn b() -> UBig {
        UBig::from_be_bytes(&Self::B)
    }

    pub fn n() -> UBig {
        UBig::from_be_bytes(&Self::N)
    }

    /// The generator point `G`.
    pub fn g() -> Point {
        Point::Affine {
            x: UBig::from_be_bytes(&Self::GX),
            y: UBig::from_be_bytes(&Self::GY),
        }
    }
}

/// `G_TABLE[i] == 2^i * G`, computed once and read-only thereafter.
fn g_table() -> &'static [Point; 256] {
    static TABLE: OnceLock<[Point; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table: Vec<Point> = Vec::with_capacity(256);
        let mut current = Curve::g();
        table.push(current.clone());
        for _ in 1..256 {
            current = point_double(&current);
            table.push(current.clone());
        }
        table
            .try_into()
            .unwrap_or_else(|_| unreachable!("exactly 256 entries pushed"))
    })
}

/// Affine chord-and-tangent point addition.
pub fn point_add(p1: &Point, p2: &Point) -> Point {
    match (p1, p2) {
        (Point::Identity, q) => q.clone(),
        (p, Point::Identity) => p.clone(),
        (Point::Affine { x: x1, y: y1 }, Point::Affine { x: x2, y: y2 }) => {
            let p = Curve::p();
            if x1 == x2 {
                if add_mod(y1, y2, &p) == UBig::ZERO {
                    return Point::Identity;
                }
                // x1 == x2 and y1 == y2: the same point, delegate to doubling.
                return point_double(p1);
            }
            let dx = sub_mod(x2, x1, &p);
            let dy = sub_mod(y2, y1, &p);
            // dx is nonzero here, since x1 != x2 and both are already reduced mod p.
            let inv_dx = inverse_mod(&dx, &p).expect("dx is nonzero mod prime p");
            let k = mul_mod(&dy, &inv_dx, &p);
            let x3 = sub_mod(&sub_mod(&mul_mod(&k, &k, &p), x1, &p), x2, &p);
            let y3 = sub_mod(&mul_mod(&k, &sub_mod(x1, &x3, &p), &p), y1, &p);
            Point::Affine { x: x3, y: y3 }
        }
    }
}

/// Affine point doubling.
pub fn point_double(point: &Point) -> Point {
    match point {
        Point::Identity => Point::Identity,
        Point::Affine { x: x1, y: y1 } => {
            let p = Curve::p();
            if *y1 == UBig::ZERO {
                return Point::Identity;
            }
            let three_x1_sq = mul_mod(&UBig::from(3u8), &mul_mod(x1, x1, &p), &p);
            let numerator = add_mod(&three_x1_sq, &Curve::a(), &p);
            let denominator = add_mod(y1, y1, &p);
            let inv_denominator = inverse_mod(&denominator, &p).expect("2*y1 is nonzero mod prime p");
            let k = mul_mod(&numerator, &inv_denominator, &p);
            let two_x1 = add_mod(x1, x1, &p);
            let x3 = sub_mod(&mul_mod(&k, &k, &p), &two_x1, &p);
            let y3 = sub_mod(&mul_mod(&k, &sub_mod(x1, &x3, &p), &p), y1, &p);
            Point::Affine { x: x3, y: y3 }
        }
    }
}

/// `k * P` for scalar `k >= 0`.
///
/// Dispatches on whether `point` equals the generator: in that case a plain
/// LSB-first double-and-add against the precomputed [`g_table`] is used;
/// otherwise a 4-bit MSB-first sliding window is used. Both strategies
/// compute the same `k * P` for every input (property 5, §8).
pub fn point_multiply(point: &Point, k: &UBig) -> Point {
    if *k == UBig::ZERO || point.is_identity() {
        return Point::Identity;
    }
    if *point == Curve::g() {
        return multiply_via_table(k);
    }
    multiply_windowed(point, k)
}

fn multiply_via_table(k: &UBig) -> Point {
    let table = g_table();
    let mut result = Point::Identity;
    for i in 0..256usize {
        if k.bit(i) {
            result = point_add(&result, &table[i]);
        }
    }
    result
}

/// 4-bit sliding-window scalar multiplication for an arbitrary point.
fn multiply_windowed(point: &Point, k: &UBig) -> Point {
    const WINDOW_BITS: usize = 4;
    let window_size = 1usize << WINDOW_BITS;

    // table[i] = i * point, for i in 1..window_size (table[0] unused).
    let mut table: Vec<Point> = Vec::with_capacity(window_size);
    table.push(Point::Identity);
    table.push(point.clone());
    for i in 2..window_size {
        table.push(if i % 2 == 0 {
            point_double(&table[i / 2])
        } else {
            point_add(&table[i - 1], point)
        });
    }

    let bit_len = k.bit_len();
    if bit_len == 0 {
        return Point::Identity;
    }
    let mut result = Point::Identity;
    let mut i = bit_len as isize - 1;
    while i >= 0 {
        if k.bit(i as usize) {
            let window_start = (i as usize + 1).saturating_sub(WINDOW_BITS);
            let mut bits = 0usize;
            for j in (window_start..=i as usize).rev() {
                bits = (bits << 1) | (k.bit(j) as usize);
            }
            for _ in window_start..=i as usize {
                result = point_double(&result);
            }
            result = point_add(&result, &table[bits]);
            i = window_start as isize - 1;
        } else {
            result = point_double(&result);
            i -= 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(Curve::g().on_curve());
    }

    #[test]
    fn n_times_g_is_identity() {
        let result = point_multiply(&Curve::g(), &Curve::n());
        assert_eq!(result, Point::Identity);
    }

    #[test]
    fn doubling_matches_addition() {
        let g = Curve::g();
        let doubled = point_double(&g);
        assert_eq!(doubled, point_add(&g, &g));
        assert_eq!(point_multiply(&g, &UBig::from(2u8)), doubled);
    }

    #[test]
    fn tripling_matches_add_of_double() {
        let g = Curve::g();
        let twice = point_multiply(&g, &UBig::from(2u8));
        let thrice = point_multiply(&g, &UBig::from(3u8));
        assert_eq!(thrice, point_add(&g, &twice));
    }

    #[test]
    fn table_path_agrees_with_windowed_path() {
        // Force the generic windowed path even for a point equal to G, to
        // check the two scalar-multiplication strategies against each other.
        let g_via_add = point_add(&Point::Identity, &Curve::g());
        let k = UBig::from(123456789u64);
        let via_table = point_multiply(&Curve::g(), &k);
        let via_window = multiply_windowed(&g_via_add, &k);
        assert_eq!(via_table, via_window);
    }

    #[test]
    fn scalar_multiply_arbitrary_point() {
        let g = Curve::g();
        let p2 = point_multiply(&g, &UBig::from(7u32));
        let p3 = point_multiply(&p2, &UBig::from(5u32));
        let p4 = point_multiply(&g, &UBig::from(35u32));
        assert_eq!(p3, p4);
    }

    #[test]
    fn affine_rejects_off_curve_points() {
        let bad = Point::affine(UBig::from(1u8), UBig::from(1u8));
        assert!(bad.is_err());
    }
}
