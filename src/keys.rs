// src/keys.rs
//! Thin wrappers around the `secp256k1` crate's own key types.
//!
//! These exist for two jobs only: backing the fallback fixed-base
//! multiplier (used when a caller has no [`crate::bigmult::BigMultContext`]
//! of their own) and generating/validating test vectors. Nothing in the
//! big-mult/batch hot path goes through these types.

use rand::rngs::OsRng;
use secp256k1::{PublicKey, SecretKey};

use crate::context::global_context;
use crate::errors::MathError;

/// A secp256k1 private key, wrapping [`SecretKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafePrivateKey {
    inner: SecretKey,
}

impl SafePrivateKey {
    /// Generates a new private key from the OS random number generator.
    #[must_use]
    pub fn new_random() -> Self {
        Self { inner: SecretKey::new(&mut OsRng) }
    }

    /// Parses a 32-byte big-endian buffer. Rejects zero and out-of-range
    /// values exactly as the `secp256k1` crate does.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, MathError> {
        Ok(Self { inner: SecretKey::from_slice(bytes)? })
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        *self.inner.as_ref()
    }

    #[must_use]
    pub fn as_inner(&self) -> &SecretKey {
        &self.inner
    }
}

/// A secp256k1 public key, wrapping [`PublicKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafePublicKey {
    internal_point: PublicKey,
}

impl SafePublicKey {
    /// Derives the public key `k * G` for private key `k`, via the
    /// `secp256k1` crate's own precomputed generator table. This is the
    /// fallback fixed-base multiplier used when no
    /// [`crate::bigmult::BigMultContext`] is supplied.
    #[must_use]
    pub fn from_private(private_key: &SafePrivateKey) -> Self {
        Self { internal_point: PublicKey::from_secret_key(global_context(), private_key.as_inner()) }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MathError> {
        Ok(Self { internal_point: PublicKey::from_slice(bytes)? })
    }

    #[must_use]
    pub fn to_bytes(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.internal_point.serialize().to_vec()
        } else {
            self.internal_point.serialize_uncompressed().to_vec()
        }
    }

    #[must_use]
    pub fn as_inner(&self) -> &PublicKey {
        &self.internal_point
    }
}
