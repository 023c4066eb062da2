//! Field arithmetic, Paillier, MtA and their zero-knowledge proofs.

pub mod arith;
pub mod constants;
pub mod k256_serde;
pub mod message_digest;
pub mod mta;
pub mod paillier;
mod rng;
