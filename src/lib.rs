// src/lib.rs
//! Large-window fixed-base secp256k1 scalar multiplication and batched
//! public-key generation.
//!
//! Two subsystems, leaf to root:
//!
//! - [`bigmult`]: a configurable large-window fixed-base scalar multiplier
//!   (`BigMultContext`) that precomputes a table of multiples of the
//!   generator and performs `k * G` via signed-digit table lookup plus
//!   Jacobian point additions.
//! - [`batch`]: a batched public-key pipeline that amortizes
//!   Jacobian-to-affine field inversion across many keys via Montgomery's
//!   simultaneous-inversion trick.
//!
//! Everything here is variable-time. This crate computes public keys from
//! private keys; it does not sign, verify, or implement ECDH, and it is
//! not constant-time. Do not use it anywhere timing leakage of the scalar
//! would matter beyond the resulting public key itself.

pub mod affine;
pub mod batch;
pub mod bigmult;
pub mod context;
pub mod errors;
pub mod field;
pub mod keys;
pub mod point;
pub mod scalar;
pub mod scratch;

/// Common imports for working with this crate.
pub mod prelude {
    pub use crate::affine::{PointA, PointStorage};
    pub use crate::batch::{pubkey_create_serialized, pubkey_create_serialized_batch};
    pub use crate::bigmult::BigMultContext;
    pub use crate::context::global_context;
    pub use crate::errors::MathError;
    pub use crate::field::FieldElement;
    pub use crate::keys::{SafePrivateKey, SafePublicKey};
    pub use crate::point::JacobianPoint;
    pub use crate::scalar::Scalar;
    pub use crate::scratch::Scratch;
}
