// tests/concurrency.rs
//! `BigMultContext` is immutable and holds no interior mutability, so one
//! context can serve many concurrent callers. This exercises that pattern
//! with `rayon`: each worker owns its own `Scratch` (scratch buffers are
//! not `Sync` by convention) while sharing one `BigMultContext`.

use rayon::prelude::*;
use secp256k1_bigmult::prelude::*;

fn sample_priv_key(seed: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[0] = seed;
    bytes[31] = seed.wrapping_mul(37).wrapping_add(1);
    bytes
}

#[test]
fn parallel_batches_against_one_shared_context_match_sequential() {
    let ctx = BigMultContext::create(10).unwrap();
    let chunk_size = 6;
    let chunk_count = 12;

    let chunks: Vec<Vec<u8>> = (0..chunk_count)
        .map(|chunk| (0..chunk_size).flat_map(|i| sample_priv_key((chunk * chunk_size + i) as u8)).collect())
        .collect();

    // Each rayon worker builds its own Scratch — Scratch is not Sync, so it
    // must never be shared across threads, only the BigMultContext is.
    let parallel_results: Vec<Vec<u8>> = chunks
        .par_iter()
        .map(|priv_keys| {
            let mut scratch = Scratch::create(chunk_size).unwrap();
            let mut out = vec![0u8; chunk_size * 33];
            let count = pubkey_create_serialized_batch(
                Some(&ctx),
                &mut scratch,
                &mut out,
                priv_keys,
                chunk_size,
                true,
            )
            .unwrap();
            assert_eq!(count, chunk_size);
            out
        })
        .collect();

    for (chunk, parallel_out) in chunks.iter().zip(parallel_results.iter()) {
        let mut scratch = Scratch::create(chunk_size).unwrap();
        let mut sequential_out = vec![0u8; chunk_size * 33];
        pubkey_create_serialized_batch(
            Some(&ctx),
            &mut scratch,
            &mut sequential_out,
            chunk,
            chunk_size,
            true,
        )
        .unwrap();
        assert_eq!(parallel_out, &sequential_out);
    }
}
