// src/point.rs
//! Jacobian points and the variable-time group law.
//!
//! Every operation here is variable-time: branch timing and memory access
//! patterns depend on the point/scalar values involved. That is the
//! correct tradeoff for a public-key derivation engine (nothing here is
//! secret once it leaves the caller's hand), never for signing.

use crate::affine::PointA;
use crate::field::FieldElement;

/// A point in Jacobian coordinates: the affine point is `(x/z^2, y/z^3)`.
#[derive(Debug, Clone, Copy)]
pub struct JacobianPoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub z: FieldElement,
    pub is_infinity: bool,
}

impl JacobianPoint {
    /// The point at infinity.
    #[must_use]
    pub const fn infinity() -> Self {
        Self { x: FieldElement::ZERO, y: FieldElement::ZERO, z: FieldElement::ZERO, is_infinity: true }
    }

    /// Lifts an affine point into Jacobian coordinates (`z = 1`).
    #[must_use]
    pub fn from_affine(point: &PointA) -> Self {
        if point.is_infinity {
            return Self::infinity();
        }
        Self { x: point.x, y: point.y, z: FieldElement::from_u64(1), is_infinity: false }
    }

    /// The secp256k1 generator point, bootstrapped from the `secp256k1`
    /// crate's own verified context rather than a hand-transcribed
    /// constant.
    #[must_use]
    pub fn generator() -> Self {
        Self::from_affine(&generator_affine())
    }

    /// Doubles this point (`2 * self`), via the standard `a = 0` Jacobian
    /// doubling formula (3M + 4S).
    #[must_use]
    pub fn double(&self) -> Self {
        if self.is_infinity || self.y.is_zero() {
            return Self::infinity();
        }

        let a = self.x.square_modular();
        let b = self.y.square_modular();
        let c = b.square_modular();
        let x_plus_b_squared = self.x.add_modular(&b).square_modular();
        let d_half = x_plus_b_squared.subtract_modular(&a).subtract_modular(&c);
        let d = d_half.add_modular(&d_half);
        let e = a.add_modular(&a).add_modular(&a);
        let f = e.square_modular();

        let x3 = f.subtract_modular(&d).subtract_modular(&d);
        let eight_c = {
            let four_c = c.add_modular(&c).add_modular(&c).add_modular(&c);
            four_c.add_modular(&four_c)
        };
        let y3 = e.multiply_modular(&d.subtract_modular(&x3)).subtract_modular(&eight_c);
        let z3 = {
            let two_yz = self.y.multiply_modular(&self.z);
            two_yz.add_modular(&two_yz)
        };

        Self { x: x3, y: y3, z: z3, is_infinity: false }
    }

    /// Mixed Jacobian + affine addition (`self + other`), variable-time.
    ///
    /// Returns the sum along with the "z-ratio" `H` such that
    /// `result.z == self.z * H`. Because `other` is affine (`z2 = 1`), this
    /// ratio falls out of the addition formula for free — `Z3 = Z1 * H` —
    /// which is exactly what lets a big-mult table row, or a whole batch of
    /// keys, be converted to affine with a single shared field inversion
    /// instead of one inversion per point.
    #[must_use]
    pub fn add_affine_var(&self, other: &PointA) -> (Self, FieldElement) {
        if other.is_infinity {
            return (*self, FieldElement::from_u64(1));
        }
        if self.is_infinity {
            return (Self::from_affine(other), FieldElement::from_u64(1));
        }

        let z1z1 = self.z.square_modular();
        let u2 = other.x.multiply_modular(&z1z1);
        let s2 = other.y.multiply_modular(&self.z).multiply_modular(&z1z1);
        let h = u2.subtract_modular(&self.x);
        let r = s2.subtract_modular(&self.y);

        if h.is_zero() {
            if r.is_zero() {
                return (self.double(), self.y.add_modular(&self.y));
            }
            return (Self::infinity(), FieldElement::from_u64(1));
        }

        let hh = h.square_modular();
        let hhh = h.multiply_modular(&hh);
        let x1_hh = self.x.multiply_modular(&hh);

        let x3 = r.square_modular().subtract_modular(&hhh).subtract_modular(&x1_hh).subtract_modular(&x1_hh);
        let y3 = r.multiply_modular(&x1_hh.subtract_modular(&x3)).subtract_modular(&self.y.multiply_modular(&hhh));
        let z3 = self.z.multiply_modular(&h);

        (Self { x: x3, y: y3, z: z3, is_infinity: false }, h)
    }

    /// Converts to affine given the precomputed inverse of `self.z`
    /// (`inv_z = self.z^-1`), as produced by a batch inversion pass. The
    /// point at infinity maps to [`PointA::INFINITY`] regardless of
    /// `inv_z`.
    #[must_use]
    pub fn to_affine_given_inv_z(&self, inv_z: &FieldElement) -> PointA {
        if self.is_infinity {
            return PointA::INFINITY;
        }
        let inv_z2 = inv_z.square_modular();
        let inv_z3 = inv_z2.multiply_modular(inv_z);
        let x = self.x.multiply_modular(&inv_z2);
        let y = self.y.multiply_modular(&inv_z3);
        PointA::new(x, y)
    }
}

/// Recovers the secp256k1 generator's affine coordinates from the
/// `secp256k1` crate's own (externally verified) context, avoiding a
/// hand-transcribed 64-hex-digit constant in this codebase.
#[must_use]
pub fn generator_affine() -> PointA {
    let mut one = [0u8; 32];
    one[31] = 1;
    let secret = secp256k1::SecretKey::from_slice(&one).expect("1 is a valid secp256k1 scalar");
    let public = secp256k1::PublicKey::from_secret_key(crate::context::global_context(), &secret);
    let uncompressed = public.serialize_uncompressed();
    let x = FieldElement::from_bytes_be(uncompressed[1..33].try_into().unwrap());
    let y = FieldElement::from_bytes_be(uncompressed[33..65].try_into().unwrap());
    PointA::new(x, y)
}
