//! Deterministic randomness for test/KAT modes.
//!
//! The MtA `SERVER` step and the range/MtA-ZK proofs normally draw their
//! blinding randomness from the system RNG. Testable-property and
//! known-answer tests instead need a reproducible stream derived from a
//! caller-supplied seed. This is a plain SHA-256-expanded seed into
//! `ChaCha20Rng`, not an RFC 6979-style secret-derived nonce scheme: nothing
//! here is asked to hide a long-term secret, it only has to be repeatable.
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

/// Build a deterministic RNG from an arbitrary-length seed.
pub(crate) fn rng_from_seed(seed: &[u8]) -> ChaCha20Rng {
    let digest: [u8; 32] = Sha256::digest(seed).into();
    ChaCha20Rng::from_seed(digest)
}
