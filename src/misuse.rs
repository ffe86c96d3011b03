//! C5 — misuse kernel. Four attack constructors, each modeling a specific
//! signer misbehavior and producing a witness of the resulting break.
//!
//! The random-number call sites here are deliberately distinct from
//! [`crate::sign::sign`]'s CSPRNG call site — see the design note in §9 —
//! since these scenarios exist to demonstrate what goes wrong when a nonce
//! is reused or fixed, not to produce secure signatures.

use dashu::integer::UBig;

use crate::curve::{point_multiply, Curve};
use crate::field::{add_mod, inverse_mod, mul_mod, neg_mod, sub_mod};
use crate::sign::{message_digest, verify, Signature, VerifyingKey};

/// **S1 — repeated nonce recovers the private key.**
///
/// Given the signer's private key `d` (used here only to check the
/// recovery's correctness, not to perform the attack itself — a real
/// attacker never sees `d`), produces two signatures on `M1`/`M2` sharing a
/// single leaked nonce `k`, then recovers `d` from the public `(r, s)`
/// pairs and the messages' digests alone.
///
/// Returns `(d_recovered, d_recovered == d)`. Fails if the denominator
/// `s2*r1 - s1*r2 mod n` is zero.
pub fn scenario1_reused_k(
    d: &UBig,
    m1: &[u8],
    m2: &[u8],
    z1: &[u8; 32],
    z2: &[u8; 32],
    reused_k: &UBig,
) -> (UBig, bool) {
    let n = Curve::n();
    let one_plus_d = (&UBig::ONE + d) % &n;
    let inv_one_plus_d = inverse_mod(&one_plus_d, &n).expect("1+d invertible mod n for a valid key");

    let x1 = point_multiply(&Curve::g(), reused_k).x().expect("kG not identity").clone();

    let e1 = message_digest(z1, m1);
    let r1 = (&e1 + &x1) % &n;
    let s1 = mul_mod(&inv_one_plus_d, &sub_mod(reused_k, &mul_mod(&r1, d, &n), &n), &n);

    let e2 = message_digest(z2, m2);
    let r2 = (&e2 + &x1) % &n;
    let s2 = mul_mod(&inv_one_plus_d, &sub_mod(reused_k, &mul_mod(&r2, d, &n), &n), &n);

    recover_key_from_shared_nonce(&r1, &s1, &e1, &r2, &s2, &e2)
        .map(|recovered| {
            let success = recovered == *d;
            (recovered, success)
        })
        .unwrap_or((UBig::ZERO, false))
}

/// The algebraic core of S1: given two signatures known to share a nonce,
/// recovers `d = ((s1-s2)*(e1-e2)) * (s2*r1-s1*r2)^-1 mod n`.
fn recover_key_from_shared_nonce(
    r1: &UBig,
    s1: &UBig,
    e1: &UBig,
    r2: &UBig,
    s2: &UBig,
    e2: &UBig,
) -> Option<UBig> {
    let n = Curve::n();
    let numerator = mul_mod(&sub_mod(s1, s2, &n), &sub_mod(e1, e2, &n), &n);
    let denominator = sub_mod(&mul_mod(s2, r1, &n), &mul_mod(s1, r2, &n), &n);
    let inv_denominator = inverse_mod(&denominator, &n).ok()?;
    Some(mul_mod(&numerator, &inv_denominator, &n))
}

/// **S2 — fixed nonce enables existential forgery.**
///
/// Given one signature `(r, s)` on `M` made under a known fixed nonce `k`
/// and the attacker-known value `inv_one_plus_d = (1+d)^-1 mod n`
/// (recoverable from two S1-style signatures sharing `k`, or leaked
/// alongside the nonce directly — see the Open Questions in DESIGN.md),
/// forges a signature on `forged_message` that verifies under the original
/// public key without ever learning `d` itself.
pub fn scenario2_fixed_k(
    public_key: &VerifyingKey,
    message: &[u8],
    forged_message: &[u8],
    z: &[u8; 32],
    sig: &Signature,
    inv_one_plus_d: &UBig,
) -> (Signature, bool) {
    let n = Curve::n();
    let e = message_digest(z, message);
    let e_prime = message_digest(z, forged_message);

    // e and e_prime are raw SM3 digests, not yet reduced mod n, so the
    // subtraction goes through sub_mod rather than a literal `+ n - e`
    // (which can underflow: digests can exceed n in magnitude).
    let delta_r = sub_mod(&e_prime, &e, &n);
    let r_prime = add_mod(&sig.r, &delta_r, &n);
    let s_prime = (&sig.s + mul_mod(&delta_r, inv_one_plus_d, &n)) % &n;

    let forged = Signature { r: r_prime, s: s_prime };
    let valid = verify(public_key, forged_message, z, &forged);
    (forged, valid)
}

/// **S3 — Z confusion.**
///
/// A signature made under `z_signed` (the Z digest of whatever identity the
/// signer actually used) is checked against both `z_signed` itself and
/// `z_other` (the Z digest a relying party would compute for a *different*
/// identity it believed it was validating). The attack succeeds exactly
/// when the signature verifies under `z_signed` but not under `z_other` —
/// proof that a verifier which fails to bind the signature to the identity
/// it believes it's checking is exploitable.
pub fn scenario3_incorrect_z(
    public_key: &VerifyingKey,
    message: &[u8],
    z_signed: &[u8; 32],
    z_other: &[u8; 32],
    sig: &Signature,
) -> bool {
    let verifies_under_signed = verify(public_key, message, z_signed, sig);
    let verifies_under_other = verify(public_key, message, z_other, sig);
    verifies_under_signed && !verifies_under_other
}

/// **S4 — signature malleability.**
///
/// For any valid `(r, s)`, `(r, (-s-r) mod n)` is also a valid signature on
/// the same `(message, z, public_key)`, since the verification equation
/// only constrains `t = r + s mod n` up to this sign flip.
pub fn scenario4_malleable_signature(
    public_key: &VerifyingKey,
    message: &[u8],
    z: &[u8; 32],
    sig: &Signature,
) -> (Signature, bool) {
    let n = Curve::n();
    let s_prime = neg_mod(&((&sig.s + &sig.r) % &n), &n);
    let malleable = Signature { r: sig.r.clone(), s: s_prime };
    let valid = verify(public_key, message, z, &malleable);
    (malleable, valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::{generate_keypair, sign};
    use crate::z::calculate_z;
    use rand::rngs::OsRng;

    #[test]
    fn s1_recovers_exact_private_key() {
        let (sk, vk) = generate_keypair(&mut OsRng);
        let _ = &vk;
        let z1 = calculate_z(b"user1@example.com", &sk.verifying_key().point).unwrap();
        let z2 = calculate_z(b"user2@example.com", &sk.verifying_key().point).unwrap();
        let reused_k = UBig::from(123456789012345u64);

        let (recovered, success) =
            scenario1_reused_k(sk.d(), b"msg1", b"msg2", &z1, &z2, &reused_k);
        assert!(success);
        assert_eq!(&recovered, sk.d());
    }

    #[test]
    fn s2_forged_signature_verifies() {
        let (sk, vk) = generate_keypair(&mut OsRng);
        let z = calculate_z(b"user@example.com", &vk.point).unwrap();
        let fixed_k = UBig::from(999999999999u64);

        let n = Curve::n();
        let one_plus_d = (&UBig::ONE + sk.d()) % &n;
        let inv_one_plus_d = inverse_mod(&one_plus_d, &n).unwrap();

        let x1 = point_multiply(&Curve::g(), &fixed_k).x().unwrap().clone();
        let e = message_digest(&z, b"msg");
        let r = (&e + &x1) % &n;
        let s = mul_mod(&inv_one_plus_d, &sub_mod(&fixed_k, &mul_mod(&r, sk.d(), &n), &n), &n);
        let sig = Signature { r, s };
        assert!(verify(&vk, b"msg", &z, &sig));

        let (forged, valid) =
            scenario2_fixed_k(&vk, b"msg", b"msg_forged", &z, &sig, &inv_one_plus_d);
        assert!(valid);
        assert!(verify(&vk, b"msg_forged", &z, &forged));
    }

    #[test]
    fn s3_detects_z_confusion() {
        let (sk, vk) = generate_keypair(&mut OsRng);
        let z1 = calculate_z(b"id1@example.com", &vk.point).unwrap();
        let z2 = calculate_z(b"id2@example.com", &vk.point).unwrap();
        let sig = sign(&sk, b"message", &z1, &mut OsRng);

        assert!(scenario3_incorrect_z(&vk, b"message", &z1, &z2, &sig));
        assert!(verify(&vk, b"message", &z1, &sig));
        assert!(!verify(&vk, b"message", &z2, &sig));
    }

    #[test]
    fn s4_malleable_signature_verifies_and_differs() {
        let (sk, vk) = generate_keypair(&mut OsRng);
        let z = calculate_z(b"user@example.com", &vk.point).unwrap();
        let sig = sign(&sk, b"message", &z, &mut OsRng);

        let (malleable, valid) = scenario4_malleable_signature(&vk, b"message", &z, &sig);
        assert!(valid);
        // Differs unless 2s + r == 0 mod n, which is astronomically unlikely
        // for a freshly drawn signature.
        assert_ne!(malleable.s, sig.s);
    }
}
