//! Error types shared across the field, curve, signing, and attack layers.

use thiserror::Error;

/// Everything that can go wrong inside this crate.
///
/// Verification never surfaces these — `verify` reduces every rejection path
/// to `false`. Signing only ever surfaces [`Sm2Error::NoInverse`] (a
/// programmer/input bug: `1 + d` is never invertible mod `n` only if `d`
/// itself is malformed), since every other failure mode it can hit is a
/// documented retry condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Sm2Error {
    /// Attempted to invert an element that is not coprime with the modulus.
    #[error("no modular inverse exists for the given element and modulus")]
    NoInverse,

    /// A computed point landed on the identity where the caller's context
    /// requires a non-identity result.
    #[error("computed point is the identity (point at infinity)")]
    InvalidPoint,

    /// `r` or `s` fell outside `[1, n-1]`.
    #[error("signature component out of range")]
    OutOfRange,

    /// A scalar (private key, nonce) fell outside its required range.
    #[error("scalar out of range")]
    InvalidScalar,

    /// The forgery kernel exhausted its bounded preimage search.
    #[error("no SM3 preimage found within the search budget")]
    PreimageNotFound,
}
