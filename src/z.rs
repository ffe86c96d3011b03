//! C3 — the user-identifier digest Z, binding an identity string to the
//! curve's domain parameters and a signer's public key.

use sm3::{Digest, Sm3};

use crate::curve::{Curve, Point};
use crate::error::Sm2Error;

/// Computes the 32-byte Z-digest for `id` and public key `public_key`.
///
/// `Z = SM3(ENTLA || ID || a || b || Gx || Gy || Px || Py)`, where `ENTLA`
/// is the two-byte big-endian bit-length of `id` and the curve parameters
/// and public-key coordinates are each 32-byte big-endian, zero-padded.
/// Total preimage length is `2 + id.len() + 192` bytes.
///
/// Returns [`Sm2Error::InvalidPoint`] if `public_key` is the identity — a Z
/// digest is only meaningful for an actual signer key — or
/// [`Sm2Error::InvalidScalar`] if `id`'s bit length overflows `ENTLA`'s
/// 16-bit field (longer than 8191 bytes).
pub fn calculate_z(id: &[u8], public_key: &Point) -> Result<[u8; 32], Sm2Error> {
    let (px, py) = match public_key {
        Point::Identity => return Err(Sm2Error::InvalidPoint),
        Point::Affine { x, y } => (x, y),
    };

    let entla = id
        .len()
        .checked_mul(8)
        .and_then(|bits| u16::try_from(bits).ok())
        .ok_or(Sm2Error::InvalidScalar)?;

    let mut preimage = Vec::with_capacity(2 + id.len() + 192);
    preimage.extend_from_slice(&entla.to_be_bytes());
    preimage.extend_from_slice(id);
    preimage.extend_from_slice(&Curve::A);
    preimage.extend_from_slice(&Curve::B);
    preimage.extend_from_slice(&Curve::GX);
    preimage.extend_from_slice(&Curve::GY);
    preimage.extend_from_slice(&to_be_32(px));
    preimage.extend_from_slice(&to_be_32(py));

    let mut hasher = Sm3::new();
    hasher.update(&preimage);
    Ok(hasher.finalize().into())
}

/// Big-endian, zero-padded 32-byte encoding of a field/group element.
pub(crate) fn to_be_32(x: &dashu::integer::UBig) -> [u8; 32] {
    let bytes = x.to_be_bytes();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_is_deterministic() {
        let public_key = crate::curve::point_multiply(&Curve::g(), &dashu::integer::UBig::from(42u32));
        let z1 = calculate_z(b"user@example.com", &public_key).unwrap();
        let z2 = calculate_z(b"user@example.com", &public_key).unwrap();
        assert_eq!(z1, z2);
    }

    #[test]
    fn different_ids_give_different_z() {
        let public_key = crate::curve::point_multiply(&Curve::g(), &dashu::integer::UBig::from(42u32));
        let z1 = calculate_z(b"user1@example.com", &public_key).unwrap();
        let z2 = calculate_z(b"user2@example.com", &public_key).unwrap();
        assert_ne!(z1, z2);
    }

    #[test]
    fn rejects_identity_public_key() {
        assert_eq!(calculate_z(b"id", &Point::Identity), Err(Sm2Error::InvalidPoint));
    }
}
