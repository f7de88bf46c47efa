// src/bigmult.rs
//! Large-window fixed-base scalar multiplication against the secp256k1
//! generator.
//!
//! [`BigMultContext`] precomputes a table of small multiples of `G` at a
//! caller-chosen window width and uses it, together with signed-digit
//! recoding, to turn `k * G` into a handful of table lookups and Jacobian
//! additions instead of ~256 doublings.

use tracing::{debug, instrument, trace};

use crate::affine::PointStorage;
use crate::errors::MathError;
use crate::field::FieldElement;
use crate::point::{generator_affine, JacobianPoint};
use crate::scalar::Scalar;

/// Smallest window width this crate accepts.
pub const MIN_BITS: u32 = 4;
/// Largest window width this crate accepts.
pub const MAX_BITS: u32 = 62;

/// A precomputed table of multiples of the secp256k1 generator, at a
/// fixed window width, used for fast fixed-base scalar multiplication.
///
/// Immutable after construction and holds no interior mutability, so it
/// is `Sync`: many threads may call [`Self::mul`] against one shared
/// context concurrently.
#[derive(Debug)]
pub struct BigMultContext {
    bits: u32,
    windows: u32,
    /// One contiguous allocation. Row `r` starts at `row_offset(r)` and
    /// holds `row_len(r)` entries; entry `i` (0-indexed) within a row
    /// holds `(i + 1) * 2^(r * bits) * G`.
    table: Box<[PointStorage]>,
}

impl BigMultContext {
    /// Builds a table at window width `bits` (must be in `[4, 62]`).
    #[instrument(level = "debug", skip_all, fields(bits))]
    pub fn create(bits: u32) -> Result<Self, MathError> {
        if !(MIN_BITS..=MAX_BITS).contains(&bits) {
            return Err(MathError::InvalidArgument(format!(
                "window width must be in [{MIN_BITS}, {MAX_BITS}], got {bits}"
            )));
        }

        let windows = full_window_count(bits) + 1;
        let total_entries = total_table_entries(bits);
        debug!(bits, windows, total_entries, "building big-mult table");

        let mut table: Vec<PointStorage> = Vec::new();
        table.try_reserve_exact(total_entries).map_err(|e| {
            MathError::AllocationFailed(format!("failed to reserve big-mult table: {e}"))
        })?;
        table.resize(total_entries, PointStorage::PLACEHOLDER);

        let mut row_base = generator_affine();
        let mut offset = 0usize;

        for row in 0..windows {
            let row_len = row_len_for(row, windows, bits);
            trace!(row, row_len, offset, "filling table row");

            let mut jacobian_entries: Vec<JacobianPoint> = Vec::new();
            jacobian_entries.try_reserve_exact(row_len).map_err(|e| {
                MathError::AllocationFailed(format!("failed to reserve table row: {e}"))
            })?;
            let mut z_ratios: Vec<FieldElement> = Vec::with_capacity(row_len);

            let mut running = JacobianPoint::from_affine(&row_base);
            jacobian_entries.push(running);
            z_ratios.push(FieldElement::from_u64(1));

            for _ in 1..row_len {
                let (next, ratio) = running.add_affine_var(&row_base);
                running = next;
                jacobian_entries.push(running);
                z_ratios.push(ratio);
            }

            // Backward walk: one inversion recovers every entry's Z^-1.
            // z_ratios[i] holds entries[i].z / entries[i-1].z (entries[0]'s
            // ratio is 1 by construction, since entries[0].z == row_base's z).
            let last_z = jacobian_entries[row_len - 1].z;
            let mut inv_z = last_z.invert()?;
            for i in (0..row_len).rev() {
                let affine = jacobian_entries[i].to_affine_given_inv_z(&inv_z);
                table[offset + i] = PointStorage::from_affine(&affine);
                if i > 0 {
                    inv_z = inv_z.multiply_modular(&z_ratios[i]);
                }
            }

            offset += row_len;

            if row + 1 < windows {
                // Advance the running base by 2^bits: the row's last Jacobian
                // entry already holds 2^(bits-1) * row_base, so one more
                // doubling reaches 2^bits * row_base, seeding the next row.
                let next_base_jacobian = jacobian_entries[row_len - 1].double();
                let inv_next_z = next_base_jacobian.z.invert()?;
                row_base = next_base_jacobian.to_affine_given_inv_z(&inv_next_z);
            }
        }

        debug_assert_eq!(offset, total_entries);
        Ok(Self { bits, windows, table: table.into_boxed_slice() })
    }

    /// The window width this context was built with.
    #[must_use]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Computes `k * G` using the precomputed table. Returns the point at
    /// infinity if `k` is zero.
    ///
    /// Every row but the last is recoded at the table's full window width;
    /// the last row is narrower (`(256 % bits) + 1` bits), matching its
    /// smaller table row and absorbing the recoding's potential 257th
    /// carry bit. Using the full width for that row too would let its
    /// digit magnitude overrun the row's actual table capacity.
    #[instrument(level = "trace", skip_all)]
    #[must_use]
    pub fn mul(&self, k: &Scalar) -> JacobianPoint {
        if k.is_zero() {
            return JacobianPoint::infinity();
        }

        let mut remaining = *k;
        let mut accumulator = JacobianPoint::infinity();

        for row in 0..self.windows {
            let row_width = recoding_width_for(row, self.windows, self.bits);
            let digit = remaining.sdigit_single(row_width);
            if digit == 0 {
                continue;
            }

            let magnitude = digit.unsigned_abs() as usize;
            let row_len = row_len_for(row, self.windows, self.bits);
            debug_assert!(magnitude <= row_len, "sdigit magnitude exceeds table row length");

            let offset = row_offset(row, self.bits);
            let entry = self.table[offset + magnitude - 1];
            let affine = if digit < 0 { entry.negate().to_affine() } else { entry.to_affine() };

            let (next, _ratio) = accumulator.add_affine_var(&affine);
            accumulator = next;
        }

        debug_assert!(remaining.is_zero(), "recoding did not fully consume the scalar");
        accumulator
    }
}

/// Window width used to recode row `row`'s digit: the table's full width
/// for every row but the last, and `(256 % bits) + 1` for the last row —
/// matching that row's smaller table capacity (`row_len_for`'s
/// `2^(256 % bits)`), since a width-`w` signed digit's magnitude tops out
/// at `2^(w-1)`.
#[must_use]
pub fn recoding_width_for(row: u32, windows: u32, bits: u32) -> u32 {
    if row + 1 == windows { (256 % bits) + 1 } else { bits }
}

/// Number of full-width rows (`floor(256 / bits)`), before the final,
/// possibly-narrower row that absorbs the leftover bits plus the
/// recoding's potential 257th carry bit.
#[must_use]
pub fn full_window_count(bits: u32) -> u32 {
    256 / bits
}

/// Number of entries in row `row` of a `bits`-wide table with `windows`
/// total rows.
#[must_use]
pub fn row_len_for(row: u32, windows: u32, bits: u32) -> usize {
    if row + 1 == windows {
        let remainder = 256 % bits;
        1usize << remainder
    } else {
        1usize << (bits - 1)
    }
}

/// Starting offset of row `row` within the flattened table, for a table
/// built at window width `bits`.
#[must_use]
pub fn row_offset(row: u32, bits: u32) -> usize {
    (row as usize) * (1usize << (bits - 1))
}

/// Total entries across every row of a `bits`-wide table.
#[must_use]
pub fn total_table_entries(bits: u32) -> usize {
    let remainder = 256 % bits;
    (full_window_count(bits) as usize) * (1usize << (bits - 1)) + (1usize << remainder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_window_width_out_of_range() {
        assert!(BigMultContext::create(3).is_err());
        assert!(BigMultContext::create(63).is_err());
    }

    #[test]
    fn table_entry_counts_match_spec_formula() {
        for bits in [4u32, 8, 16, 18] {
            let ctx = BigMultContext::create(bits).unwrap();
            assert_eq!(ctx.table.len(), total_table_entries(bits));
        }
    }

    #[test]
    fn zero_scalar_yields_infinity() {
        let ctx = BigMultContext::create(8).unwrap();
        let result = ctx.mul(&Scalar::ZERO);
        assert!(result.is_infinity);
    }

    #[test]
    fn mul_by_one_matches_generator() {
        let ctx = BigMultContext::create(8).unwrap();
        let result = ctx.mul(&Scalar::from_u64(1));
        let inv_z = result.z.invert().unwrap();
        let affine = result.to_affine_given_inv_z(&inv_z);
        let expected = generator_affine();
        assert_eq!(affine.x, expected.x);
        assert_eq!(affine.y, expected.y);
    }

    #[test]
    fn mul_matches_library_for_small_scalar() {
        let ctx = BigMultContext::create(5).unwrap();
        let mut bytes = [0u8; 32];
        bytes[31] = 200;
        let k = Scalar::from_bytes_be(&bytes);
        let result = ctx.mul(&k);
        let inv_z = result.z.invert().unwrap();
        let affine = result.to_affine_given_inv_z(&inv_z);

        let secret = secp256k1::SecretKey::from_slice(&bytes).unwrap();
        let public = secp256k1::PublicKey::from_secret_key(crate::context::global_context(), &secret);
        let uncompressed = public.serialize_uncompressed();
        let expected_x = FieldElement::from_bytes_be(uncompressed[1..33].try_into().unwrap());
        let expected_y = FieldElement::from_bytes_be(uncompressed[33..65].try_into().unwrap());

        assert_eq!(affine.x, expected_x);
        assert_eq!(affine.y, expected_y);
    }

    #[test]
    fn different_window_widths_agree() {
        let mut bytes = [0u8; 32];
        bytes[20] = 0x11;
        bytes[31] = 0x7F;
        let k = Scalar::from_bytes_be(&bytes);

        let ctx4 = BigMultContext::create(4).unwrap();
        let ctx9 = BigMultContext::create(9).unwrap();

        let r4 = ctx4.mul(&k);
        let r9 = ctx9.mul(&k);
        let a4 = r4.to_affine_given_inv_z(&r4.z.invert().unwrap());
        let a9 = r9.to_affine_given_inv_z(&r9.z.invert().unwrap());

        assert_eq!(a4.x, a9.x);
        assert_eq!(a4.y, a9.y);
    }

    #[test]
    fn table_entry_decompresses_to_expected_multiple() {
        let ctx = BigMultContext::create(6).unwrap();
        // Row 0, index 2 holds 3 * G.
        let entry = ctx.table[2];
        let mut three = [0u8; 32];
        three[31] = 3;
        let secret = secp256k1::SecretKey::from_slice(&three).unwrap();
        let public = secp256k1::PublicKey::from_secret_key(crate::context::global_context(), &secret);
        let uncompressed = public.serialize_uncompressed();
        let expected_x = FieldElement::from_bytes_be(uncompressed[1..33].try_into().unwrap());
        assert_eq!(entry.x, expected_x);
    }
}
