//! A didactic implementation of the SM2 elliptic-curve signature scheme
//! (GB/T 32918) over SM3, built to demonstrate both correct usage and the
//! classic misuse and forgery attacks that follow from getting it wrong.
//!
//! The happy path lives in [`sign`]: generate a keypair, compute the
//! signer's Z-digest with [`z::calculate_z`], then [`sign::sign`] and
//! [`sign::verify`]. Everything in [`misuse`] and [`forgery`] exists to
//! break that happy path in a specific, named way — nonce reuse, a fixed
//! nonce, identity confusion, signature malleability, and existential
//! forgery against a verifier that forgets to bind `Z` — and is meant to be
//! read as a companion to `sign.rs`, not used in place of it.

pub mod curve;
pub mod error;
pub mod field;
pub mod forgery;
pub mod misuse;
pub mod sign;
pub mod z;

pub use curve::{point_add, point_multiply, Curve, Point};
pub use error::Sm2Error;
pub use forgery::{assert_on_curve, forge_signature, verify_forgery, ForgeryOutcome};
pub use misuse::{
    scenario1_reused_k, scenario2_fixed_k, scenario3_incorrect_z, scenario4_malleable_signature,
};
pub use sign::{generate_keypair, sign, verify, Signature, SigningKey, VerifyingKey};
pub use z::calculate_z;
