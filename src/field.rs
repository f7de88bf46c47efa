// src/field.rs
//! GF(p) arithmetic for secp256k1, p = 2^256 - 2^32 - 977.
//!
//! Internally every element is carried in Montgomery form for multiplication
//! and squaring; callers never see the Montgomery representation directly,
//! only through `multiply_modular`/`square_modular`, which round-trip in and
//! out of it.

use crate::errors::MathError;
use serde::{Deserialize, Serialize};

/// p, little-endian 64-bit limbs.
pub const SECP256K1_FIELD_PRIME: [u64; 4] =
    [0xFFFFFFFEFFFFFC2F, 0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF];

/// -p^-1 mod 2^64, the REDC multiplier.
const MONTGOMERY_NEG_INV_P: u64 = 0xD838091DD2253531;

/// R^2 mod p, for entering Montgomery form.
const MONTGOMERY_R2_MOD_P: [u64; 4] = [0x00000001000003D1, 0x0000000000000001, 0, 0];

/// An element of GF(p), always reduced to `[0, p)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldElement {
    /// Little-endian 64-bit limbs.
    pub internal_words: [u64; 4],
}

impl FieldElement {
    /// Zero.
    pub const ZERO: Self = Self { internal_words: [0, 0, 0, 0] };

    /// Builds an element from a single 64-bit value.
    #[inline(always)]
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self { internal_words: [value, 0, 0, 0] }
    }

    /// Builds an element directly from its limbs. Caller guarantees `limbs < p`.
    #[inline(always)]
    #[must_use]
    pub const fn from_limbs(limbs: [u64; 4]) -> Self {
        Self { internal_words: limbs }
    }

    /// Parses a big-endian 32-byte buffer. No reduction is performed; the
    /// caller guarantees the value is already `< p` (true for every X/Y
    /// coordinate this crate produces or consumes).
    #[must_use]
    pub fn from_bytes_be(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (index, limb) in limbs.iter_mut().enumerate() {
            let offset = (3 - index) * 8;
            *limb = u64::from_be_bytes(bytes[offset..offset + 8].try_into().unwrap());
        }
        Self { internal_words: limbs }
    }

    /// Serializes to a big-endian 32-byte buffer.
    #[must_use]
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (index, limb) in self.internal_words.iter().enumerate() {
            let offset = (3 - index) * 8;
            bytes[offset..offset + 8].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    /// `(self * other) mod p`.
    #[inline(always)]
    #[must_use]
    pub fn multiply_modular(&self, other: &Self) -> Self {
        let a = self.to_montgomery_domain();
        let b = other.to_montgomery_domain();
        a.multiply_modular_montgomery(&b).from_montgomery_domain()
    }

    /// `(self^2) mod p`.
    #[inline(always)]
    #[must_use]
    pub fn square_modular(&self) -> Self {
        self.multiply_modular(self)
    }

    /// `(self - other) mod p`.
    #[inline(always)]
    #[must_use]
    pub fn subtract_modular(&self, other: &Self) -> Self {
        let mut limbs = [0u64; 4];
        let mut borrow: i128 = 0;
        for i in 0..4 {
            let diff = (self.internal_words[i] as i128) - (other.internal_words[i] as i128) - borrow;
            if diff < 0 {
                limbs[i] = (diff + (1i128 << 64)) as u64;
                borrow = 1;
            } else {
                limbs[i] = diff as u64;
                borrow = 0;
            }
        }
        let result = Self { internal_words: limbs };
        if borrow != 0 { result.add_prime() } else { result }
    }

    /// `(self + other) mod p`.
    #[inline(always)]
    #[must_use]
    pub fn add_modular(&self, other: &Self) -> Self {
        let mut limbs = [0u64; 4];
        let mut carry: u128 = 0;
        for i in 0..4 {
            let sum = (self.internal_words[i] as u128) + (other.internal_words[i] as u128) + carry;
            limbs[i] = sum as u64;
            carry = sum >> 64;
        }
        let result = Self { internal_words: limbs };
        if carry != 0 || result.is_greater_or_equal_to_prime() { result.subtract_prime() } else { result }
    }

    /// `(self * multiplier) mod p` for a small scalar multiplier.
    #[inline(always)]
    #[must_use]
    pub fn multiply_by_u64(&self, multiplier: u64) -> Self {
        let mut product = [0u64; 8];
        let mut carry: u128 = 0;
        for i in 0..4 {
            let term = (self.internal_words[i] as u128) * (multiplier as u128) + carry;
            product[i] = term as u64;
            carry = term >> 64;
        }
        product[4] = carry as u64;
        Self::reduce_solinas(product)
    }

    #[inline(always)]
    #[must_use]
    fn to_montgomery_domain(&self) -> Self {
        let r2 = Self { internal_words: MONTGOMERY_R2_MOD_P };
        let (low, high) = self.multiply_256x256(&r2);
        Self::redc(low, high)
    }

    #[inline(always)]
    #[must_use]
    fn from_montgomery_domain(&self) -> Self {
        Self::redc(self.internal_words, [0u64; 4])
    }

    #[inline(always)]
    #[must_use]
    fn multiply_modular_montgomery(&self, other: &Self) -> Self {
        let (low, high) = self.multiply_256x256(other);
        Self::redc(low, high)
    }

    fn multiply_256x256(&self, other: &Self) -> ([u64; 4], [u64; 4]) {
        let mut product = [0u64; 8];
        for i in 0..4 {
            let mut carry: u128 = 0;
            for j in 0..4 {
                let term = (self.internal_words[i] as u128) * (other.internal_words[j] as u128)
                    + (product[i + j] as u128)
                    + carry;
                product[i + j] = term as u64;
                carry = term >> 64;
            }
            product[i + 4] = carry as u64;
        }
        let mut low = [0u64; 4];
        let mut high = [0u64; 4];
        low.copy_from_slice(&product[0..4]);
        high.copy_from_slice(&product[4..8]);
        (low, high)
    }

    /// Montgomery REDC: folds a 512-bit product back down to a reduced
    /// 256-bit element in the same domain it started in.
    fn redc(low: [u64; 4], high: [u64; 4]) -> Self {
        let mut acc = [0u64; 9];
        acc[0..4].copy_from_slice(&low);
        acc[4..8].copy_from_slice(&high);

        for i in 0..4 {
            let m = acc[i].wrapping_mul(MONTGOMERY_NEG_INV_P);
            let mut carry: u128 = 0;
            for j in 0..4 {
                let term =
                    (m as u128) * (SECP256K1_FIELD_PRIME[j] as u128) + (acc[i + j] as u128) + carry;
                acc[i + j] = term as u64;
                carry = term >> 64;
            }
            let mut k = i + 4;
            while carry > 0 && k < 9 {
                let sum = (acc[k] as u128) + carry;
                acc[k] = sum as u64;
                carry = sum >> 64;
                k += 1;
            }
        }

        let mut words = [0u64; 4];
        words.copy_from_slice(&acc[4..8]);
        let result = Self { internal_words: words };
        if result.is_greater_or_equal_to_prime() { result.subtract_prime() } else { result }
    }

    fn reduce_solinas(product: [u64; 8]) -> Self {
        let low = Self { internal_words: [product[0], product[1], product[2], product[3]] };
        let high = [product[4], product[5], product[6], product[7]];
        let mut folded = [0u64; 4];
        let mut carry: u128 = 0;
        for i in 0..4 {
            let term = (high[i] as u128) * 0x1000003D1u128 + carry;
            folded[i] = term as u64;
            carry = term >> 64;
        }
        low.add_modular(&Self { internal_words: folded })
    }

    #[inline(always)]
    fn is_greater_or_equal_to_prime(&self) -> bool {
        for i in (0..4).rev() {
            if self.internal_words[i] > SECP256K1_FIELD_PRIME[i] {
                return true;
            }
            if self.internal_words[i] < SECP256K1_FIELD_PRIME[i] {
                return false;
            }
        }
        true
    }

    fn subtract_prime(&self) -> Self {
        let mut limbs = [0u64; 4];
        let mut borrow: i128 = 0;
        for i in 0..4 {
            let diff = (self.internal_words[i] as i128) - (SECP256K1_FIELD_PRIME[i] as i128) - borrow;
            if diff < 0 {
                limbs[i] = (diff + (1i128 << 64)) as u64;
                borrow = 1;
            } else {
                limbs[i] = diff as u64;
                borrow = 0;
            }
        }
        Self { internal_words: limbs }
    }

    fn add_prime(&self) -> Self {
        let mut limbs = [0u64; 4];
        let mut carry: u128 = 0;
        for i in 0..4 {
            let sum = (self.internal_words[i] as u128) + (SECP256K1_FIELD_PRIME[i] as u128) + carry;
            limbs[i] = sum as u64;
            carry = sum >> 64;
        }
        Self { internal_words: limbs }
    }

    /// True if this element is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.internal_words.iter().all(|&w| w == 0)
    }

    /// True if this element is odd (lowest limb's low bit set).
    #[must_use]
    pub fn is_odd(&self) -> bool {
        (self.internal_words[0] & 1) == 1
    }

    /// Modular inverse via Fermat's little theorem (`self^(p-2) mod p`).
    ///
    /// Variable-time: the square-and-multiply loop below branches on every
    /// bit of the exponent. That is fine here — see the crate-level
    /// variable-time notice — but this must never be used on a value an
    /// adversary can observe the timing of.
    ///
    /// # Errors
    /// Returns an error if `self` is zero (no inverse exists).
    pub fn invert(&self) -> Result<Self, MathError> {
        if self.is_zero() {
            return Err(MathError::InvalidArgument("cannot invert zero field element".into()));
        }
        let mut base = self.to_montgomery_domain();
        let mut result = FieldElement::from_u64(1).to_montgomery_domain();
        let mut exponent = SECP256K1_FIELD_PRIME;
        exponent[0] -= 2;

        for &word in &exponent {
            let mut bits = word;
            for _ in 0..64 {
                if bits & 1 == 1 {
                    result = result.multiply_modular_montgomery(&base);
                }
                base = base.multiply_modular_montgomery(&base);
                bits >>= 1;
            }
        }
        Ok(result.from_montgomery_domain())
    }

    /// Montgomery's simultaneous-inversion trick: computes the modular
    /// inverse of every element in `elements` using exactly one [`invert`]
    /// call and `3 * (n - 1)` multiplications, instead of `n` inversions.
    ///
    /// `scratch` must have the same length as `elements`; its contents on
    /// return are unspecified (it holds the running-product prefix used
    /// internally). `results` receives the inverses in the same order as
    /// `elements`.
    ///
    /// # Errors
    /// Returns an error if any element of `elements` is zero.
    pub fn batch_invert_into(
        elements: &[FieldElement],
        results: &mut [FieldElement],
        scratch: &mut [FieldElement],
    ) -> Result<(), MathError> {
        let n = elements.len();
        if n == 0 {
            return Ok(());
        }

        let mut running_product = FieldElement::from_u64(1);
        for (i, element) in elements.iter().enumerate() {
            if element.is_zero() {
                return Err(MathError::InvalidArgument("cannot invert zero field element".into()));
            }
            running_product = running_product.multiply_modular(element);
            scratch[i] = running_product;
        }

        let mut inverse_accumulator = running_product.invert()?;
        for i in (1..n).rev() {
            results[i] = inverse_accumulator.multiply_modular(&scratch[i - 1]);
            inverse_accumulator = inverse_accumulator.multiply_modular(&elements[i]);
        }
        results[0] = inverse_accumulator;

        Ok(())
    }

    /// Same trick as [`Self::batch_invert_into`], using `out` as both the
    /// running-product scratch and the final result buffer, so the caller
    /// only needs two same-length buffers instead of three.
    ///
    /// Safe to overwrite in place because the backward pass only ever
    /// reads `out[i - 1]` (the forward pass's prefix product) before it
    /// writes `out[i]` — by the time index `i - 1` is itself overwritten,
    /// nothing later in the pass still needs its old value.
    ///
    /// # Errors
    /// Returns an error if any element of `elements` is zero.
    pub fn batch_invert_in_place(elements: &[FieldElement], out: &mut [FieldElement]) -> Result<(), MathError> {
        let n = elements.len();
        if n == 0 {
            return Ok(());
        }

        let mut running_product = FieldElement::from_u64(1);
        for (i, element) in elements.iter().enumerate() {
            if element.is_zero() {
                return Err(MathError::InvalidArgument("cannot invert zero field element".into()));
            }
            running_product = running_product.multiply_modular(element);
            out[i] = running_product;
        }

        let mut inverse_accumulator = running_product.invert()?;
        for i in (1..n).rev() {
            let prefix_product = out[i - 1];
            out[i] = inverse_accumulator.multiply_modular(&prefix_product);
            inverse_accumulator = inverse_accumulator.multiply_modular(&elements[i]);
        }
        out[0] = inverse_accumulator;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn montgomery_round_trip_is_identity() {
        let original = FieldElement::from_u64(0x1337_BEEF_CAFE_BABE);
        let recovered = original.to_montgomery_domain().from_montgomery_domain();
        assert_eq!(original, recovered);
    }

    #[test]
    fn multiply_matches_known_product() {
        let a = FieldElement::from_u64(0xDEAD_BEEF);
        let b = FieldElement::from_u64(0xCAFE_BABE);
        let product = a.multiply_modular(&b);
        let expected = 0xDEAD_BEEFu128 * 0xCAFE_BABEu128;
        assert_eq!(product, FieldElement::from_u64(expected as u64));
    }

    #[test]
    fn invert_is_multiplicative_identity() {
        let a = FieldElement::from_u64(12345);
        let inverse = a.invert().unwrap();
        assert_eq!(a.multiply_modular(&inverse), FieldElement::from_u64(1));
    }

    #[test]
    fn invert_rejects_zero() {
        assert!(FieldElement::ZERO.invert().is_err());
    }

    #[test]
    fn batch_invert_matches_individual_inverts() {
        let elements = vec![FieldElement::from_u64(2), FieldElement::from_u64(3), FieldElement::from_u64(4)];
        let mut results = vec![FieldElement::default(); 3];
        let mut scratch = vec![FieldElement::default(); 3];
        FieldElement::batch_invert_into(&elements, &mut results, &mut scratch).unwrap();
        for (element, result) in elements.iter().zip(results.iter()) {
            assert_eq!(element.invert().unwrap(), *result);
            assert_eq!(element.multiply_modular(result), FieldElement::from_u64(1));
        }
    }

    #[test]
    fn bytes_round_trip() {
        let bytes = [0x42u8; 32];
        let element = FieldElement::from_bytes_be(&bytes);
        assert_eq!(element.to_bytes_be(), bytes);
    }

    #[test]
    fn batch_invert_in_place_matches_batch_invert_into() {
        let elements =
            vec![FieldElement::from_u64(5), FieldElement::from_u64(11), FieldElement::from_u64(97)];

        let mut via_three_buffers = vec![FieldElement::default(); 3];
        let mut scratch = vec![FieldElement::default(); 3];
        FieldElement::batch_invert_into(&elements, &mut via_three_buffers, &mut scratch).unwrap();

        let mut via_in_place = vec![FieldElement::default(); 3];
        FieldElement::batch_invert_in_place(&elements, &mut via_in_place).unwrap();

        assert_eq!(via_three_buffers, via_in_place);
    }
}
