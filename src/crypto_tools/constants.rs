//! Domain separation constants for Fiat-Shamir hash calls.

pub const MTA_PROOF_TAG: u8 = 0x01;
pub const MTA_PROOF_WC_TAG: u8 = 0x02;
pub const RANGE_PROOF_TAG: u8 = 0x03;
pub const RANGE_PROOF_WC_TAG: u8 = 0x04;

pub const COMPOSITE_DLOG_PROOF_TAG: u8 = 0x0A;

/// The max size of each Paillier/bit-commitment prime is 1024 bits.
pub const MODULUS_MAX_SIZE: usize = 2048;

/// The min size of each prime is 1023 bits, so the product can be 2045 bits
/// at a minimum.
pub const MODULUS_MIN_SIZE: usize = 2045;

// Domain separation between the two directions of a composite dlog setup
// proof (h1 w.r.t. h2, and h2 w.r.t. h1).
pub const COMPOSITE_DLOG_PROOF1: u8 = 0x00;
pub const COMPOSITE_DLOG_PROOF2: u8 = 0x01;
