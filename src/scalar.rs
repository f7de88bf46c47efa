// src/scalar.rs
//! Arithmetic mod the secp256k1 curve order `n`.
//!
//! Unlike [`crate::field::FieldElement`] this type carries no Montgomery
//! representation — scalars here are consumed almost entirely through
//! shifts and small additions on the way to signed-digit recoding, where a
//! Montgomery transform would buy nothing.

use serde::{Deserialize, Serialize};

/// The curve order `n`, little-endian 64-bit limbs.
pub const SECP256K1_CURVE_ORDER_N: [u64; 4] = [
    0xBFD25E8CD0364141,
    0xBAAEDCE6AF48A03B,
    0xFFFFFFFFFFFFFFFE,
    0xFFFFFFFFFFFFFFFF,
];

/// An integer mod `n`, little-endian 64-bit limbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scalar {
    pub limbs: [u64; 4],
}

impl Scalar {
    /// Zero.
    pub const ZERO: Self = Self { limbs: [0, 0, 0, 0] };

    /// Builds a scalar from a single 64-bit value. `value` is always `< n`,
    /// so no reduction is needed.
    #[inline(always)]
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self { limbs: [value, 0, 0, 0] }
    }

    /// Parses a big-endian 32-byte buffer, reducing mod `n`.
    ///
    /// Because `2n > 2^256`, a single conditional subtraction suffices —
    /// the raw 256-bit value is at most `2n - 1`.
    #[must_use]
    pub fn from_bytes_be(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (index, limb) in limbs.iter_mut().enumerate() {
            let offset = (3 - index) * 8;
            *limb = u64::from_be_bytes(bytes[offset..offset + 8].try_into().unwrap());
        }
        let raw = Self { limbs };
        if raw.is_greater_or_equal_to_order() { raw.perform_subtraction_of_order() } else { raw }
    }

    /// Serializes to a big-endian 32-byte buffer.
    #[must_use]
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (index, limb) in self.limbs.iter().enumerate() {
            let offset = (3 - index) * 8;
            bytes[offset..offset + 8].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    /// True if this scalar is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&w| w == 0)
    }

    /// `(self + other) mod n`.
    #[must_use]
    pub fn add_mod_n(&self, other: &Self) -> Self {
        let mut limbs = [0u64; 4];
        let mut carry: u128 = 0;
        for i in 0..4 {
            let sum = (self.limbs[i] as u128) + (other.limbs[i] as u128) + carry;
            limbs[i] = sum as u64;
            carry = sum >> 64;
        }
        let result = Self { limbs };
        if carry != 0 || result.is_greater_or_equal_to_order() {
            result.perform_subtraction_of_order()
        } else {
            result
        }
    }

    /// `(-self) mod n`. Zero negates to zero.
    #[must_use]
    pub fn negate_mod_n(&self) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }
        let mut limbs = [0u64; 4];
        let mut borrow: i128 = 0;
        for i in 0..4 {
            let diff = (SECP256K1_CURVE_ORDER_N[i] as i128) - (self.limbs[i] as i128) - borrow;
            if diff < 0 {
                limbs[i] = (diff + (1i128 << 64)) as u64;
                borrow = 1;
            } else {
                limbs[i] = diff as u64;
                borrow = 0;
            }
        }
        Self { limbs }
    }

    #[inline(always)]
    fn is_greater_or_equal_to_order(&self) -> bool {
        for i in (0..4).rev() {
            if self.limbs[i] > SECP256K1_CURVE_ORDER_N[i] {
                return true;
            }
            if self.limbs[i] < SECP256K1_CURVE_ORDER_N[i] {
                return false;
            }
        }
        true
    }

    fn perform_subtraction_of_order(&self) -> Self {
        let mut limbs = [0u64; 4];
        let mut borrow: i128 = 0;
        for i in 0..4 {
            let diff = (self.limbs[i] as i128) - (SECP256K1_CURVE_ORDER_N[i] as i128) - borrow;
            if diff < 0 {
                limbs[i] = (diff + (1i128 << 64)) as u64;
                borrow = 1;
            } else {
                limbs[i] = diff as u64;
                borrow = 0;
            }
        }
        Self { limbs }
    }

    /// Shifts this scalar right by up to 15 bits in place, returning the
    /// bits shifted out (as the low bits of the result).
    ///
    /// Mirrors the narrow primitive the upstream big-mult table builder
    /// shifts with (`secp256k1_scalar_shr_int`): wide shifts are built on
    /// top of this one in [`Self::shr_bits`] rather than the other way
    /// around.
    pub fn shr_small(&mut self, n: u32) -> u64 {
        debug_assert!(n <= 15);
        if n == 0 {
            return 0;
        }
        let mask = (1u64 << n) - 1;
        let shifted_out = self.limbs[0] & mask;
        let mut carry_in = 0u64;
        for i in (0..4).rev() {
            let next_carry = self.limbs[i] & mask;
            self.limbs[i] = (self.limbs[i] >> n) | (carry_in << (64 - n));
            carry_in = next_carry;
        }
        shifted_out
    }

    /// Shifts this scalar right by up to 64 bits in place, returning the
    /// bits shifted out. Built from repeated [`Self::shr_small`] calls.
    pub fn shr_bits(&mut self, n: u32) -> u64 {
        debug_assert!(n <= 64);
        let mut result: u64 = 0;
        let mut produced = 0u32;
        let mut remaining = n;
        while remaining > 0 {
            let chunk = remaining.min(15);
            let bits = self.shr_small(chunk);
            result |= bits << produced;
            produced += chunk;
            remaining -= chunk;
        }
        result
    }

    /// Adds a small non-negative value directly to the integer (not mod
    /// `n` — this is used mid-recoding, on an already-shifted value that
    /// never approaches 256 bits, never on a scalar meant to stay `< n`).
    fn add_raw_u64(&mut self, value: u64) {
        let mut carry = value as u128;
        for limb in self.limbs.iter_mut() {
            if carry == 0 {
                break;
            }
            let sum = (*limb as u128) + carry;
            *limb = sum as u64;
            carry = sum >> 64;
        }
    }

    /// Extracts one signed digit of `w` bits from the low end of this
    /// scalar, consuming it destructively: on return, `self` holds
    /// `(old_self - digit) >> w`.
    ///
    /// `digit` lies in `[-(2^(w-1) - 1), 2^(w-1)]`. This is Bodo Möller's
    /// signed-digit windowing: shift out the low `w` bits, and if they
    /// exceed the window's half, treat them as negative and carry a
    /// compensating `+1` into the remaining (already shifted) value so
    /// the decomposition still sums to the original scalar.
    pub fn sdigit_single(&mut self, w: u32) -> i64 {
        debug_assert!((1..=62).contains(&w));
        let low = self.shr_bits(w) as i64;
        let half = 1i64 << (w - 1);
        if low > half {
            self.add_raw_u64(1);
            low - (1i64 << w)
        } else {
            low
        }
    }

    /// Fully recodes this scalar into a sequence of width-`w` signed
    /// digits, least-significant first, consuming a by-value copy so the
    /// caller's own scalar is untouched.
    #[must_use]
    pub fn sdigit(mut self, w: u32) -> Vec<i64> {
        let mut digits = Vec::new();
        while !self.is_zero() {
            digits.push(self.sdigit_single(w));
        }
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_traits::Zero;

    fn to_bigint(scalar: &Scalar) -> BigInt {
        let mut value = BigInt::zero();
        for &limb in scalar.limbs.iter().rev() {
            value = (value << 64) + BigInt::from(limb);
        }
        value
    }

    #[test]
    fn from_bytes_round_trips_small_value() {
        let mut bytes = [0u8; 32];
        bytes[31] = 42;
        let scalar = Scalar::from_bytes_be(&bytes);
        assert_eq!(scalar.to_bytes_be(), bytes);
    }

    #[test]
    fn negate_is_involutive() {
        let scalar = Scalar::from_u64(777);
        let negated_twice = scalar.negate_mod_n().negate_mod_n();
        assert_eq!(scalar, negated_twice);
    }

    #[test]
    fn negate_zero_is_zero() {
        assert_eq!(Scalar::ZERO.negate_mod_n(), Scalar::ZERO);
    }

    #[test]
    fn shr_bits_matches_plain_shift() {
        let mut scalar = Scalar::from_u64(0b1010_1100);
        let out = scalar.shr_bits(4);
        assert_eq!(out, 0b1100);
        assert_eq!(scalar.limbs[0], 0b1010);
    }

    #[test]
    fn sdigit_recoding_sums_back_to_original() {
        let original = Scalar::from_u64(0x0123_4567_89AB_CDEF);
        let digits = original.sdigit(5);

        let mut reconstructed = BigInt::zero();
        for (i, &digit) in digits.iter().enumerate() {
            reconstructed += BigInt::from(digit) << (5 * i as u32);
        }
        assert_eq!(reconstructed, to_bigint(&original));
    }

    #[test]
    fn sdigit_digits_stay_within_window_bound() {
        let original = Scalar::from_bytes_be(&[0xAB; 32]);
        let w = 6;
        let bound = 1i64 << (w - 1);
        for digit in original.sdigit(w) {
            assert!(digit >= -bound && digit < bound, "digit {digit} out of bound {bound}");
        }
    }
}
