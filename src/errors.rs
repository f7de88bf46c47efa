// src/errors.rs
//! Error taxonomy for the big-mult and batch-pipeline subsystems.
//!
//! Per-key failures (a zero private key, or a scalar that collapses to the
//! point at infinity) are never represented here — they are soft failures,
//! reported by an all-zero output slot and reflected in the returned count.
//! Only construction-time failures get a typed `Err`.

/// Errors surfaced at the big-mult / batch-pipeline boundary.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// A caller-supplied argument is out of the range this API accepts
    /// (window width outside `[4, 62]`, a batch longer than its scratch).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A heap allocation failed while building a table or a scratch buffer.
    #[error("allocation failed: {0}")]
    AllocationFailed(String),

    /// Propagated from the `secp256k1` crate's own context on the fallback
    /// (no-`BigMultContext`) multiplication path.
    #[error("elliptic curve error: {0}")]
    EllipticCurveError(#[from] secp256k1::Error),
}
