// src/scratch.rs
//! Reusable per-batch working memory for the batch pipeline.

use crate::errors::MathError;
use crate::field::FieldElement;
use crate::point::JacobianPoint;

/// Working memory for one call to
/// [`crate::batch::pubkey_create_serialized_batch`], sized once and reused
/// across calls by the caller.
///
/// Not `Sync` by convention: a `Scratch` is owned exclusively by whichever
/// thread is driving a batch call. Callers wanting parallel batches keep
/// one `Scratch` per worker (a `rayon::ThreadLocal<Scratch>`, or one per
/// pool thread, both work).
#[derive(Debug)]
pub struct Scratch {
    size: usize,
    gej: Vec<JacobianPoint>,
    fe_in: Vec<FieldElement>,
    fe_out: Vec<FieldElement>,
}

impl Scratch {
    /// Allocates working memory for batches of up to `size` keys.
    pub fn create(size: usize) -> Result<Self, MathError> {
        let mut gej = Vec::new();
        gej.try_reserve_exact(size)
            .map_err(|e| MathError::AllocationFailed(format!("failed to reserve scratch.gej: {e}")))?;
        gej.resize(size, JacobianPoint::infinity());

        let mut fe_in = Vec::new();
        fe_in
            .try_reserve_exact(size)
            .map_err(|e| MathError::AllocationFailed(format!("failed to reserve scratch.fe_in: {e}")))?;
        fe_in.resize(size, FieldElement::ZERO);

        let mut fe_out = Vec::new();
        fe_out
            .try_reserve_exact(size)
            .map_err(|e| MathError::AllocationFailed(format!("failed to reserve scratch.fe_out: {e}")))?;
        fe_out.resize(size, FieldElement::ZERO);

        Ok(Self { size, gej, fe_in, fe_out })
    }

    /// Capacity this scratch was built for.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn gej_mut(&mut self) -> &mut [JacobianPoint] {
        &mut self.gej
    }

    pub(crate) fn fe_in_mut(&mut self) -> &mut [FieldElement] {
        &mut self.fe_in
    }

    pub(crate) fn fe_out_mut(&mut self) -> &mut [FieldElement] {
        &mut self.fe_out
    }
}
