// src/batch.rs
//! Batched and single-key public-key derivation, with SEC1 serialization.
//!
//! The batch entry point amortizes the one expensive step in Jacobian ->
//! affine conversion — a field inversion — across an entire batch via
//! Montgomery's simultaneous-inversion trick, instead of paying one
//! inversion per key.

use tracing::{instrument, trace};

use crate::affine::PointA;
use crate::bigmult::BigMultContext;
use crate::errors::MathError;
use crate::field::FieldElement;
use crate::keys::{SafePrivateKey, SafePublicKey};
use crate::point::JacobianPoint;
use crate::scalar::Scalar;
use crate::scratch::Scratch;

const COMPRESSED_LEN: usize = 33;
const UNCOMPRESSED_LEN: usize = 65;

fn serialized_len(compressed: bool) -> usize {
    if compressed { COMPRESSED_LEN } else { UNCOMPRESSED_LEN }
}

fn serialize_point(point: &PointA, compressed: bool, out: &mut [u8]) {
    let x_bytes = point.x.to_bytes_be();
    if compressed {
        out[0] = 0x02 | u8::from(point.y.is_odd());
        out[1..33].copy_from_slice(&x_bytes);
    } else {
        out[0] = 0x04;
        out[1..33].copy_from_slice(&x_bytes);
        out[33..65].copy_from_slice(&point.y.to_bytes_be());
    }
}

/// `k * G` via [`SafePublicKey::from_private`], for callers with no
/// [`BigMultContext`] — the fallback fixed-base multiplier. Re-projects
/// into Jacobian coordinates with `z = 1` so the rest of the pipeline
/// (batch inversion, serialization) runs identically on both paths.
fn fallback_ecmult(scalar: &Scalar) -> JacobianPoint {
    let bytes = scalar.to_bytes_be();
    let private =
        SafePrivateKey::from_bytes(&bytes).expect("scalar is reduced mod n and checked nonzero");
    let public = SafePublicKey::from_private(&private);
    let uncompressed = public.to_bytes(false);
    let x = FieldElement::from_bytes_be(uncompressed[1..33].try_into().unwrap());
    let y = FieldElement::from_bytes_be(uncompressed[33..65].try_into().unwrap());
    JacobianPoint::from_affine(&PointA::new(x, y))
}

fn derive_point(bmul: Option<&BigMultContext>, scalar: &Scalar) -> JacobianPoint {
    if scalar.is_zero() {
        return JacobianPoint::infinity();
    }
    match bmul {
        Some(ctx) => ctx.mul(scalar),
        None => fallback_ecmult(scalar),
    }
}

/// Derives and serializes public keys for a batch of `key_count` 32-byte
/// private keys, amortizing Jacobian-to-affine conversion across the whole
/// batch with a single field inversion.
///
/// `priv_keys` holds `key_count` concatenated 32-byte big-endian private
/// keys; `out` holds `key_count` concatenated output slots, each
/// `33` bytes (compressed) or `65` bytes (uncompressed).
///
/// A zero private key, or a scalar that (in principle) maps to the point
/// at infinity, is a soft failure: its output slot stays all-zero and it
/// is not counted in the returned total. Only a malformed call shape
/// (lengths that don't match `key_count`, or a batch bigger than
/// `scratch`) is a hard [`MathError`].
#[instrument(level = "debug", skip_all, fields(key_count, compressed))]
pub fn pubkey_create_serialized_batch(
    bmul: Option<&BigMultContext>,
    scratch: &mut Scratch,
    out: &mut [u8],
    priv_keys: &[u8],
    key_count: usize,
    compressed: bool,
) -> Result<usize, MathError> {
    if key_count > scratch.size() {
        return Err(MathError::InvalidArgument(format!(
            "batch of {key_count} keys exceeds scratch capacity {}",
            scratch.size()
        )));
    }
    if priv_keys.len() != key_count * 32 {
        return Err(MathError::InvalidArgument(format!(
            "priv_keys length {} does not match key_count {key_count} * 32",
            priv_keys.len()
        )));
    }
    let out_len = serialized_len(compressed);
    if out.len() != key_count * out_len {
        return Err(MathError::InvalidArgument(format!(
            "out length {} does not match key_count {key_count} * {out_len}",
            out.len()
        )));
    }

    out.fill(0);

    let gej = scratch.gej_mut();
    let fe_in = scratch.fe_in_mut();
    for i in 0..key_count {
        let priv_bytes: [u8; 32] = priv_keys[i * 32..(i + 1) * 32].try_into().unwrap();
        let scalar = Scalar::from_bytes_be(&priv_bytes);
        let point = derive_point(bmul, &scalar);
        // A placeholder of 1 (always invertible) stands in for infinity's
        // z = 0 so the batch inversion below can run over the full range
        // without an index-compaction pass; its inverse is discarded.
        fe_in[i] = if point.is_infinity { FieldElement::from_u64(1) } else { point.z };
        gej[i] = point;
    }

    let fe_out = scratch.fe_out_mut();
    FieldElement::batch_invert_in_place(&fe_in[..key_count], &mut fe_out[..key_count])?;

    let mut out_count = 0usize;
    for i in 0..key_count {
        if gej[i].is_infinity {
            trace!(index = i, "skipping soft failure (zero key or point at infinity)");
            continue;
        }
        let affine = gej[i].to_affine_given_inv_z(&fe_out[i]);
        serialize_point(&affine, compressed, &mut out[i * out_len..(i + 1) * out_len]);
        out_count += 1;
    }

    Ok(out_count)
}

/// Derives and serializes a single public key, without a heap [`Scratch`]
/// — the hot single-key path pays one field inversion directly instead of
/// allocating batch-pipeline machinery for a batch of one.
#[instrument(level = "trace", skip_all, fields(compressed))]
pub fn pubkey_create_serialized(
    bmul: Option<&BigMultContext>,
    out: &mut [u8],
    priv_key: &[u8; 32],
    compressed: bool,
) -> Result<usize, MathError> {
    let out_len = serialized_len(compressed);
    if out.len() != out_len {
        return Err(MathError::InvalidArgument(format!(
            "out length {} does not match expected {out_len}",
            out.len()
        )));
    }
    out.fill(0);

    let scalar = Scalar::from_bytes_be(priv_key);
    let point = derive_point(bmul, &scalar);
    if point.is_infinity {
        return Ok(0);
    }

    let inv_z = point.z.invert()?;
    let affine = point.to_affine_given_inv_z(&inv_z);
    serialize_point(&affine, compressed, out);
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigmult::BigMultContext;

    #[test]
    fn zero_key_is_soft_failure() {
        let mut out = [0u8; 33];
        let count = pubkey_create_serialized(None, &mut out, &[0u8; 32], true).unwrap();
        assert_eq!(count, 0);
        assert_eq!(out, [0u8; 33]);
    }

    #[test]
    fn single_key_fallback_and_bigmult_agree() {
        let mut priv_key = [0u8; 32];
        priv_key[31] = 99;

        let mut out_fallback = [0u8; 65];
        pubkey_create_serialized(None, &mut out_fallback, &priv_key, false).unwrap();

        let ctx = BigMultContext::create(8).unwrap();
        let mut out_bigmult = [0u8; 65];
        pubkey_create_serialized(Some(&ctx), &mut out_bigmult, &priv_key, false).unwrap();

        assert_eq!(out_fallback, out_bigmult);
    }

    #[test]
    fn compressed_prefix_reflects_y_parity() {
        let mut priv_key = [0u8; 32];
        priv_key[31] = 7;
        let mut out = [0u8; 33];
        pubkey_create_serialized(None, &mut out, &priv_key, true).unwrap();
        assert!(out[0] == 0x02 || out[0] == 0x03);
    }

    #[test]
    fn batch_matches_repeated_single_key_calls() {
        let ctx = BigMultContext::create(6).unwrap();
        let key_count = 5;
        let mut priv_keys = vec![0u8; key_count * 32];
        for i in 0..key_count {
            priv_keys[i * 32 + 31] = (i + 1) as u8 * 11;
        }

        let mut scratch = Scratch::create(key_count).unwrap();
        let mut batch_out = vec![0u8; key_count * 33];
        let batch_count = pubkey_create_serialized_batch(
            Some(&ctx),
            &mut scratch,
            &mut batch_out,
            &priv_keys,
            key_count,
            true,
        )
        .unwrap();
        assert_eq!(batch_count, key_count);

        for i in 0..key_count {
            let priv_key: [u8; 32] = priv_keys[i * 32..(i + 1) * 32].try_into().unwrap();
            let mut single_out = [0u8; 33];
            pubkey_create_serialized(Some(&ctx), &mut single_out, &priv_key, true).unwrap();
            assert_eq!(&batch_out[i * 33..(i + 1) * 33], &single_out[..]);
        }
    }

    #[test]
    fn batch_with_zero_key_leaves_slot_zero_and_excludes_count() {
        let ctx = BigMultContext::create(6).unwrap();
        let key_count = 3;
        let mut priv_keys = vec![0u8; key_count * 32];
        priv_keys[0 * 32 + 31] = 5; // valid
        // index 1 stays zero (the zero key)
        priv_keys[2 * 32 + 31] = 9; // valid

        let mut scratch = Scratch::create(key_count).unwrap();
        let mut out = vec![0u8; key_count * 33];
        let count =
            pubkey_create_serialized_batch(Some(&ctx), &mut scratch, &mut out, &priv_keys, key_count, true)
                .unwrap();

        assert_eq!(count, 2);
        assert_eq!(&out[33..66], &[0u8; 33][..]);
        assert_ne!(&out[0..33], &[0u8; 33][..]);
        assert_ne!(&out[66..99], &[0u8; 33][..]);
    }

    #[test]
    fn batch_larger_than_scratch_is_rejected() {
        let mut scratch = Scratch::create(2).unwrap();
        let priv_keys = vec![0u8; 3 * 32];
        let mut out = vec![0u8; 3 * 33];
        let result = pubkey_create_serialized_batch(None, &mut scratch, &mut out, &priv_keys, 3, true);
        assert!(result.is_err());
    }
}
