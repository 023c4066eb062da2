//! Crate-wide result type for the MtA/RP/ZK core.
use std::fmt;

/// The three protocol-level failure kinds, plus an internal escape hatch for
/// defects that should never arise from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A scalar exceeded the curve order, or a purported ciphertext/modulus
    /// element fell outside its expected range.
    InputOutOfRange,
    /// A range or congruence check in a Σ-protocol verifier failed.
    /// Carries no further detail: a single uniform rejection channel.
    ProofRejected,
    /// Paillier decryption produced a value outside `[0, N)`. Structurally
    /// impossible with a correct key and a valid ciphertext.
    DecryptFailure,
    /// This crate's own invariant was violated (RNG failure, a precondition
    /// this crate itself should have upheld). Never caused by caller input.
    Internal,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::InputOutOfRange => "input value out of range",
            Error::ProofRejected => "proof rejected",
            Error::DecryptFailure => "paillier decryption failure",
            Error::Internal => "internal error",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
