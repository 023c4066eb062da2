//! Protocol-level wrappers around the arbitrary-precision integer type
//! (`libpaillier::unknown_order::BigNumber`) used by the Paillier and
//! bit-commitment moduli arithmetic below.
//!
//! `BigNumber` already provides safe, non-truncating `modmul`/`modpow` over
//! operands of arbitrary, independent bit-widths, so there is no limb-array
//! chunking to hand-roll here (as a C-style fixed-width bignum library would
//! need). What this module names are the *combined* exponentiations the
//! range proof and MtA-ZK Σ-protocols actually call for: simultaneous
//! double/triple/quadruple-base modular exponentiation, and the CRT split
//! used on the verifier's side to check a congruence mod `P` and mod `Q`
//! separately instead of mod the full `Ñ` or `N²`.
//!
//! The `sk*` names mark the call sites where one of the bases or exponents
//! is secret (prover side); those are composed from `modpow`/`modmul` in the
//! same way the non-`sk*` verifier-side forms are, because `BigNumber` has a
//! single constant-time `modpow` implementation regardless of caller. The
//! naming distinction exists so a future swap to a true simultaneous-ladder
//! exponentiation routine, if ever required for performance, has one call
//! site per combination to change instead of forcing a grep through every
//! proof module.
use libpaillier::unknown_order::BigNumber;

/// `b1^e1 * b2^e2 mod m`. Used by the prover (secret exponents).
pub fn skpow2(b1: &BigNumber, e1: &BigNumber, b2: &BigNumber, e2: &BigNumber, m: &BigNumber) -> BigNumber {
    b1.modpow(e1, m).modmul(&b2.modpow(e2, m), m)
}

/// `b1^e1 * b2^e2 * b3^e3 mod m`. Used by the prover (secret exponents).
pub fn skpow3(
    b1: &BigNumber,
    e1: &BigNumber,
    b2: &BigNumber,
    e2: &BigNumber,
    b3: &BigNumber,
    e3: &BigNumber,
    m: &BigNumber,
) -> BigNumber {
    skpow2(b1, e1, b2, e2, m).modmul(&b3.modpow(e3, m), m)
}

/// `b1^e1 * b2^e2 * b3^e3 mod m`. Verifier-side; need not be constant-time.
pub fn pow3(
    b1: &BigNumber,
    e1: &BigNumber,
    b2: &BigNumber,
    e2: &BigNumber,
    b3: &BigNumber,
    e3: &BigNumber,
    m: &BigNumber,
) -> BigNumber {
    skpow3(b1, e1, b2, e2, b3, e3, m)
}

/// `b1^e1 * b2^e2 * b3^e3 * b4^e4 mod m`. Verifier-side; need not be
/// constant-time.
#[allow(clippy::too_many_arguments)]
pub fn pow4(
    b1: &BigNumber,
    e1: &BigNumber,
    b2: &BigNumber,
    e2: &BigNumber,
    b3: &BigNumber,
    e3: &BigNumber,
    b4: &BigNumber,
    e4: &BigNumber,
    m: &BigNumber,
) -> BigNumber {
    pow3(b1, e1, b2, e2, b3, e3, m).modmul(&b4.modpow(e4, m), m)
}

/// Reconstruct `x mod (p*q)` given `x mod p` and `x mod q`, for coprime
/// `p`, `q`, via the textbook CRT combination `x_p + p * ((x_q - x_p) * p^-1 mod q)`.
pub fn crt(x_p: &BigNumber, x_q: &BigNumber, p: &BigNumber, q: &BigNumber) -> Option<BigNumber> {
    let p_inv_mod_q = p.invert(q)?;
    let h = (x_q - x_p).modmul(&p_inv_mod_q, q);
    Some(x_p + p * &h)
}

/// Check a congruence `lhs == rhs (mod n)` by splitting into the two CRT
/// residues `mod p` and `mod q`. Equivalent to a single comparison
/// `lhs mod n == rhs mod n` when `n == p*q`, but matches the verifier-side
/// CRT-accelerated check the proof modules are specified against.
pub fn crt_eq(lhs: &BigNumber, rhs: &BigNumber, p: &BigNumber, q: &BigNumber) -> bool {
    lhs.modmul(&BigNumber::one(), p) == rhs.modmul(&BigNumber::one(), p)
        && lhs.modmul(&BigNumber::one(), q) == rhs.modmul(&BigNumber::one(), q)
}
