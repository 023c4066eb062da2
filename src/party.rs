//! A bare party identifier used only for Fiat-Shamir domain separation
//! between the prover and verifier sides of a proof transcript.
//!
//! This is deliberately not the richer indexed-collection machinery a
//! multi-party protocol would need (there are never more than two parties
//! here); it exists solely so proofs bind to "who proved this to whom" and
//! a swapped identity is rejected by `verify`.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyId(u32);

impl PartyId {
    pub fn from_u32(id: u32) -> Self {
        Self(id)
    }

    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
