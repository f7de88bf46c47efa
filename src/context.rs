// src/context.rs
//! Process-wide secp256k1 context used by the fallback multiplication path.

use secp256k1::{All, Secp256k1};
use std::sync::LazyLock;

/// Global secp256k1 context, built once on first use.
///
/// The `secp256k1` crate precomputes its own generator-multiplication tables
/// inside this context. This is what `keys::SafePublicKey::from_private`
/// multiplies against when a caller has no `BigMultContext` of their own.
static GLOBAL_CONTEXT: LazyLock<Secp256k1<All>> = LazyLock::new(Secp256k1::new);

/// Returns a reference to the shared secp256k1 context.
#[inline]
#[must_use]
pub fn global_context() -> &'static Secp256k1<All> {
    &GLOBAL_CONTEXT
}
