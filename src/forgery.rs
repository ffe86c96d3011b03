//! C6 — existential forgery against a verifier that accepts an
//! attacker-supplied Z instead of rebinding it to a known identity.
//!
//! Grounded in the Z-confusion scenario (§4.5, S3) taken to its logical
//! endpoint: a verifier that does not independently recompute `Z` from the
//! identity it believes it is checking will accept *any* `Z` the attacker
//! hands it, provided `SM3(Z || message)` lands on a digest that completes
//! the verification equation. The construction fixes the **message** up
//! front — the thing a forger actually wants to put a signature on — and
//! searches over candidate **Z** values for one whose digest matches; this
//! mirrors `find_z_for_hash` in the cited original, which holds `message`
//! constant and iterates `Z_candidate_0, Z_candidate_1, ...`.

use dashu::integer::UBig;
use rand_core::{CryptoRng, RngCore};
use sm3::{Digest, Sm3};

use crate::curve::{point_add, point_multiply, Curve, Point};
use crate::error::Sm2Error;
use crate::field::{add_mod, inverse_mod, mul_mod, sub_mod};
use crate::sign::{secure_random_scalar_in, verify, Signature, VerifyingKey};
use crate::z::to_be_32;

/// Result of a forgery attempt.
#[derive(Debug)]
pub enum ForgeryOutcome {
    /// A `Z` whose `SM3(Z || message)` lands on the forged digest was found
    /// within the search budget; `(r, s)` verifies against `message` under
    /// this `Z` via the real verification equation ([`verify_forgery`]).
    Forged { signature: Signature, z: [u8; 32] },
    /// No `Z` was found within `search_budget` attempts. This is the
    /// expected outcome at any realistic budget: the construction below
    /// forces the target digest `e` to be algebraically congruent to `0 mod
    /// n` (see the derivation in `forge_signature`), so the search is an
    /// SM3 preimage hunt against a single fixed, highly improbable target —
    /// not a general hash inversion, but no easier for it. The kernel must
    /// report this explicitly rather than silently returning a signature
    /// that does not actually verify against anything.
    PreimageNotFound,
}

/// Attempts an existential forgery of a signature on `message`, against
/// `public_key`, for a verifier that accepts a caller-supplied `Z` without
/// rebinding it to a known identity.
///
/// Picks nonzero scalars `u, v` uniformly from `[1, n-1]`, computes
/// `(x1, _) = u*G + v*P`, sets `r = x1 mod n`, and solves the verification
/// equation for `s = v^-1 * (u + r*v) mod n` — the same derivation as
/// `forge_satoshi_signature` in the cited original. That original also
/// picks `e = (r - x1) mod n`; since `r` is *defined* as `x1 mod n`, `r` and
/// `x1` are congruent mod `n` by construction, so this `e` is always `0 mod
/// n` regardless of `u`/`v` — the "e ≡ 0 mod n is a valid algebraic choice"
/// case the spec calls out. The function then searches `Z_candidate_0,
/// Z_candidate_1, ...` (prefixed with `prefix`) for one whose
/// `SM3(Z || message)` equals that all-zero 32-byte target.
pub fn forge_signature<R: RngCore + CryptoRng>(
    public_key: &VerifyingKey,
    message: &[u8],
    prefix: &[u8],
    search_budget: u64,
    rng: &mut R,
) -> Result<ForgeryOutcome, Sm2Error> {
    let n = Curve::n();
    if public_key.point.is_identity() {
        return Err(Sm2Error::InvalidPoint);
    }

    let u = secure_random_scalar_in(&UBig::ONE, &(&n - UBig::ONE), rng);
    let v = loop {
        let candidate = secure_random_scalar_in(&UBig::ONE, &(&n - UBig::ONE), rng);
        if candidate != UBig::ZERO {
            break candidate;
        }
    };

    let ug = point_multiply(&Curve::g(), &u);
    let vp = point_multiply(&public_key.point, &v);
    let q_prime = point_add(&ug, &vp);
    let x1 = match q_prime.x() {
        Some(x) => x.clone(),
        None => return Err(Sm2Error::InvalidPoint),
    };

    let r = &x1 % &n;
    if r == UBig::ZERO {
        return Err(Sm2Error::OutOfRange);
    }
    // Always 0 mod n: r and x1 are congruent mod n by definition of r.
    let e = sub_mod(&r, &x1, &n);
    let e_bytes = to_be_32(&e);

    let inv_v = inverse_mod(&v, &n)?;
    let s = mul_mod(&inv_v, &add_mod(&u, &mul_mod(&r, &v, &n), &n), &n);
    if s == UBig::ZERO {
        return Err(Sm2Error::OutOfRange);
    }
    let signature = Signature { r, s };

    for counter in 0..search_budget {
        let z_candidate = candidate_z(prefix, counter);

        let mut hasher = Sm3::new();
        hasher.update(&z_candidate);
        hasher.update(message);
        let digest: [u8; 32] = hasher.finalize().into();

        if digest == e_bytes {
            return Ok(ForgeryOutcome::Forged { signature, z: z_candidate });
        }
    }

    Ok(ForgeryOutcome::PreimageNotFound)
}

/// Builds the `counter`-th 32-byte `Z` candidate: `prefix` (truncated to 24
/// bytes) followed by `counter` as 8 big-endian bytes, so each counter value
/// in the search loop names a distinct candidate the same way the cited
/// original's `Z_candidate_{i}` strings do, while staying a fixed 32 bytes
/// to match [`crate::sign::verify`]'s `Z` type.
fn candidate_z(prefix: &[u8], counter: u64) -> [u8; 32] {
    let mut z = [0u8; 32];
    let take = prefix.len().min(24);
    z[..take].copy_from_slice(&prefix[..take]);
    z[24..].copy_from_slice(&counter.to_be_bytes());
    z
}

/// Verifies a forged `(r, s)` against `message` under attacker-supplied
/// `z`, via the real SM2 verification equation (`SM3(Z || message)`, §4.4).
/// Delegates to [`crate::sign::verify`] — the only thing that makes this a
/// *forgery* rather than a correct signature is that `z` was never derived
/// from a bound identity via [`crate::z::calculate_z`]; a verifier that
/// performs that binding rejects every output of [`forge_signature`].
pub fn verify_forgery(public_key: &VerifyingKey, message: &[u8], z: &[u8; 32], sig: &Signature) -> bool {
    verify(public_key, message, z, sig)
}

/// Optional, clearly-labeled on-curve membership check for a target public
/// key before attempting forgery against it. Not part of the forgery path
/// itself — [`forge_signature`] derives `Q'` through already-validated
/// curve operations regardless — but useful for callers feeding in a
/// public key from an untrusted source (e.g. a point parsed from a wire
/// format this crate doesn't define).
pub fn assert_on_curve(point: &Point) -> Result<(), Sm2Error> {
    if point.is_identity() || !point.on_curve() {
        return Err(Sm2Error::InvalidPoint);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::generate_keypair;
    use rand::rngs::OsRng;

    #[test]
    fn forged_signature_verifies_under_its_own_z_when_found() {
        let (_, vk) = generate_keypair(&mut OsRng);
        match forge_signature(&vk, b"forged message", b"forged-", 1 << 16, &mut OsRng) {
            Ok(ForgeryOutcome::Forged { signature, z }) => {
                assert!(verify_forgery(&vk, b"forged message", &z, &signature));
            }
            Ok(ForgeryOutcome::PreimageNotFound) => {
                // Expected at this budget: the target digest is the
                // all-zero 32 bytes, an SM3 preimage hunt with no
                // shortcut.
            }
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }

    #[test]
    fn tampering_the_message_after_the_fact_breaks_the_forgery() {
        let (_, vk) = generate_keypair(&mut OsRng);
        if let Ok(ForgeryOutcome::Forged { signature, z }) =
            forge_signature(&vk, b"forged message", b"forged-", 1 << 16, &mut OsRng)
        {
            assert!(!verify_forgery(&vk, b"forged message, tampered", &z, &signature));
        }
    }

    #[test]
    fn forged_signature_never_fools_a_verifier_that_rebinds_z() {
        let (_, vk) = generate_keypair(&mut OsRng);
        let bound_z = crate::z::calculate_z(b"victim@example.com", &vk.point).unwrap();
        if let Ok(ForgeryOutcome::Forged { signature, .. }) =
            forge_signature(&vk, b"forged message", b"forged-", 1 << 16, &mut OsRng)
        {
            assert!(!crate::sign::verify(&vk, b"forged message", &bound_z, &signature));
        }
    }

    #[test]
    fn rejects_identity_public_key() {
        let identity_vk = VerifyingKey { point: Point::Identity };
        assert_eq!(
            forge_signature(&identity_vk, b"msg", b"x", 10, &mut OsRng).unwrap_err(),
            Sm2Error::InvalidPoint
        );
    }

    #[test]
    fn assert_on_curve_accepts_generator() {
        assert!(assert_on_curve(&Curve::g()).is_ok());
    }

    #[test]
    fn assert_on_curve_rejects_identity() {
        assert_eq!(assert_on_curve(&Point::Identity), Err(Sm2Error::InvalidPoint));
    }
}
