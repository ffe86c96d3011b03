//! C4 — SM2 signing and verification.
//!
//! Generalizes the teacher's pattern of wrapping raw bytes in a named type
//! (`CompressedPoint`, `UncompressedPoint`) into [`SigningKey`] /
//! [`VerifyingKey`]: owned state that precomputes `(1+d)^-1` once per key,
//! the way the spec's §4.4 suggests, rather than recomputing it on every
//! call to a bare `sign(d, ..)` free function.

use dashu::integer::UBig;
use rand_core::{CryptoRng, RngCore};
use sm3::{Digest, Sm3};

use crate::curve::{point_add, point_multiply, Curve, Point};
use crate::error::Sm2Error;
use crate::field::{add_mod, inverse_mod, mul_mod, sub_mod};
use crate::z::to_be_32;

/// An SM2 signature `(r, s)`. Transient; never persisted by this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: UBig,
    pub s: UBig,
}

/// A private signing key `d`, with its `(1+d)^-1 mod n` precomputed.
pub struct SigningKey {
    d: UBig,
    inv_one_plus_d: UBig,
}

/// A public verifying key `P = d*G`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyingKey {
    pub point: Point,
}

impl SigningKey {
    /// Wraps a private scalar `d`, requiring `1 < d < n-1`.
    pub fn new(d: UBig) -> Result<Self, Sm2Error> {
        let n = Curve::n();
        if d <= UBig::ONE || d >= &n - UBig::ONE {
            return Err(Sm2Error::InvalidScalar);
        }
        let one_plus_d = add_mod(&d, &UBig::ONE, &n);
        let inv_one_plus_d = inverse_mod(&one_plus_d, &n)?;
        Ok(SigningKey { d, inv_one_plus_d })
    }

    pub fn d(&self) -> &UBig {
        &self.d
    }

    /// The corresponding public key `P = d*G`.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            point: point_multiply(&Curve::g(), &self.d),
        }
    }
}

/// Draws a private key `d` uniformly from `[2, n-2]` and returns `(d, P)`.
pub fn generate_keypair<R: RngCore + CryptoRng>(rng: &mut R) -> (SigningKey, VerifyingKey) {
    let n = Curve::n();
    let d = secure_random_scalar_in(&UBig::from(2u8), &(&n - UBig::from(2u8)), rng);
    let signing_key = SigningKey::new(d).expect("drawn within [2, n-2] by construction");
    let verifying_key = signing_key.verifying_key();
    (signing_key, verifying_key)
}

/// Uniform scalar in `[low, high]`, drawn via rejection sampling from `rng`.
///
/// This is the one CSPRNG call site `sign` uses; the misuse kernel's
/// deliberately-weak nonce injection (§4.5) never goes through here.
///
/// Draws `byte_len` random bytes at a time and rejects any draw that falls
/// in the partial final bucket above the largest multiple of `span` that
/// fits in `byte_len` bytes, so the reduction below introduces no modulo
/// bias. The rejection probability per draw is under `span / 2^(8*byte_len)`,
/// negligible for the 256-bit spans this crate calls it with.
pub(crate) fn secure_random_scalar_in<R: RngCore>(low: &UBig, high: &UBig, rng: &mut R) -> UBig {
    let span = high - low + UBig::ONE;
    let byte_len = span.to_be_bytes().len().max(1);
    let range = UBig::from(2u8).pow(8 * byte_len);
    let usable = &range - (&range % &span);
    loop {
        let mut buf = vec![0u8; byte_len];
        rng.fill_bytes(&mut buf);
        let candidate = UBig::from_be_bytes(&buf);
        if candidate < usable {
            return low + (candidate % &span);
        }
    }
}

fn hash_message(z: &[u8; 32], message: &[u8]) -> UBig {
    let mut hasher = Sm3::new();
    hasher.update(z);
    hasher.update(message);
    let digest: [u8; 32] = hasher.finalize().into();
    UBig::from_be_bytes(&digest)
}

/// SM2 signing: draws a fresh CSPRNG nonce `k` each retry.
///
/// Loops until a valid `(r, s)` is produced, per §4.4 — the loop body's
/// reject conditions (`r == 0`, `r + k == n`, `s == 0`, `kG` the identity)
/// each have overwhelming per-iteration success probability and so never
/// observably loop more than a handful of times.
pub fn sign<R: RngCore + CryptoRng>(
    key: &SigningKey,
    message: &[u8],
    z: &[u8; 32],
    rng: &mut R,
) -> Signature {
    let n = Curve::n();
    let e = hash_message(z, message);
    loop {
        let k = secure_random_scalar_in(&UBig::from(2u8), &(&n - UBig::from(2u8)), rng);
        let r1 = point_multiply(&Curve::g(), &k);
        let x1 = match r1.x() {
            Some(x) => x.clone(),
            None => continue, // InvalidPoint: kG landed on the identity, retry.
        };
        let r = add_mod(&e, &x1, &n);
        if r == UBig::ZERO || &r + &k == n {
            continue;
        }
        let rd = mul_mod(&r, &key.d, &n);
        let k_minus_rd = sub_mod(&k, &rd, &n);
        let s = mul_mod(&key.inv_one_plus_d, &k_minus_rd, &n);
        if s == UBig::ZERO {
            continue;
        }
        return Signature { r, s };
    }
}

/// SM2 verification. Never panics; every rejection path returns `false`.
pub fn verify(key: &VerifyingKey, message: &[u8], z: &[u8; 32], sig: &Signature) -> bool {
    let n = Curve::n();
    if sig.r == UBig::ZERO || sig.r >= n || sig.s == UBig::ZERO || sig.s >= n {
        return false;
    }
    let e = hash_message(z, message);
    let t = add_mod(&sig.r, &sig.s, &n);
    if t == UBig::ZERO {
        return false;
    }
    let sg = point_multiply(&Curve::g(), &sig.s);
    let tp = point_multiply(&key.point, &t);
    let q = point_add(&sg, &tp);
    let x1 = match q.x() {
        Some(x) => x,
        None => return false,
    };
    add_mod(&e, x1, &n) == sig.r
}

/// Exposed for test vectors and debugging: the `e` value a signature was
/// computed against.
pub(crate) fn message_digest(z: &[u8; 32], message: &[u8]) -> UBig {
    hash_message(z, message)
}

/// Big-endian 32-byte encoding, re-exported for callers building on top of
/// [`Signature`] (e.g. for wire formats this crate does not itself define).
pub fn scalar_to_bytes(x: &UBig) -> [u8; 32] {
    to_be_32(x)
}
