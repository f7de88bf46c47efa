// src/affine.rs
//! Affine point representations.
//!
//! Two shapes, for two different jobs: [`PointA`] is the general-purpose
//! affine point (it can represent infinity), [`PointStorage`] is the
//! table-resident shape — exactly two field elements, no infinity flag,
//! because a big-mult table never stores the identity.

use crate::field::FieldElement;
use serde::{Deserialize, Serialize};

/// An affine point, possibly the point at infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointA {
    pub x: FieldElement,
    pub y: FieldElement,
    pub is_infinity: bool,
}

impl PointA {
    /// The point at infinity.
    pub const INFINITY: Self =
        Self { x: FieldElement::ZERO, y: FieldElement::ZERO, is_infinity: true };

    /// A finite affine point.
    #[must_use]
    pub const fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y, is_infinity: false }
    }
}

/// A compact, infinity-free affine point: exactly what a big-mult table
/// row stores (two 32-byte field elements, 64 bytes total, no padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointStorage {
    pub x: FieldElement,
    pub y: FieldElement,
}

impl PointStorage {
    /// A placeholder entry for table slots not yet computed. Never
    /// produced by a finished [`crate::bigmult::BigMultContext`] — every
    /// slot of a built table is overwritten with a real point before the
    /// table is returned to the caller.
    pub const PLACEHOLDER: Self = Self { x: FieldElement::ZERO, y: FieldElement::ZERO };

    #[must_use]
    pub const fn from_affine(point: &PointA) -> Self {
        Self { x: point.x, y: point.y }
    }

    #[must_use]
    pub const fn to_affine(&self) -> PointA {
        PointA { x: self.x, y: self.y, is_infinity: false }
    }

    /// The negation `(x, -y)` of this point, computed without a field
    /// inversion (negation only needs a subtraction).
    #[must_use]
    pub fn negate(&self) -> Self {
        Self { x: self.x, y: FieldElement::ZERO.subtract_modular(&self.y) }
    }
}
