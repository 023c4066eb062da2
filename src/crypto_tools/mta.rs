//! The three-message MtA (Multiplicative-to-Additive) exchange and its
//! companion combinator.
//!
//! Two parties each hold a scalar (`a` for the initiator, `b` for the
//! responder) and want additive shares `alpha`, `beta` of their product:
//! `a * b = alpha + beta (mod q)`, without revealing `a` or `b` to each
//! other. The initiator (`CLIENT1`) Paillier-encrypts `a` under its own
//! key and sends the ciphertext to the responder (`SERVER`), who uses the
//! Paillier ciphertext's homomorphism to fold in `b` and a fresh blinding
//! value `beta_prime`, returning a ciphertext the initiator alone can
//! decrypt (`CLIENT2`) to recover `alpha = a*b + beta_prime`, while the
//! responder keeps `beta = -beta_prime mod q`.
use crate::{
    crypto_tools::{
        k256_serde,
        paillier::{
            zk::{mta, ZkSetup},
            Ciphertext, DecryptionKey, EncryptionKey, Plaintext, Randomness,
        },
        rng::rng_from_seed,
    },
    party::PartyId,
    Result,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

#[derive(Debug, Clone, Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
pub struct Secret {
    pub beta: k256_serde::Scalar,
    pub beta_prime: Plaintext,
    pub beta_prime_randomness: Randomness,
}

/// `CLIENT1`: the initiator encrypts its secret share `a` under its own
/// Paillier key and hands the ciphertext to the responder.
pub fn mta_client1(a_ek: &EncryptionKey, a: &k256::Scalar) -> (Ciphertext, Randomness) {
    a_ek.encrypt(&Plaintext::from_scalar(a))
}

/// `SERVER`: the responder folds `b` into the initiator's ciphertext via
/// the Paillier homomorphism and blinds the result with a fresh
/// `beta_prime`, sampled uniformly from `[0, q)`.
pub fn mta_server(
    a_ek: &EncryptionKey,
    a_ciphertext: &Ciphertext,
    b: &k256::Scalar,
) -> (Ciphertext, Secret) {
    let beta_prime = a_ek.random_plaintext();
    let beta_prime_randomness = a_ek.sample_randomness();
    mta_server_from_randomness(a_ek, a_ciphertext, b, &beta_prime, &beta_prime_randomness)
}

/// Deterministic `SERVER` variant for known-answer tests: `z` is a
/// caller-supplied 32-byte (curve-scalar-width) value, zero-extended up
/// to the Paillier plaintext width and used in place of a freshly sampled
/// `beta_prime`. This makes the exchange reproducible without shrinking
/// the space `beta_prime` is drawn from in the random path: callers who
/// need a wider deterministic blind should derive it themselves and call
/// [`mta_server_from_randomness`] directly.
pub fn mta_server_deterministic(
    a_ek: &EncryptionKey,
    a_ciphertext: &Ciphertext,
    b: &k256::Scalar,
    z: &[u8; 32],
) -> (Ciphertext, Secret) {
    use crate::crypto_tools::message_digest::MessageDigest;

    let digest = MessageDigest::try_from(&z[..]).expect("z is exactly 32 bytes");
    let beta_prime = Plaintext::from_scalar(&k256::Scalar::from(&digest));
    let mut rng = rng_from_seed(z);
    let beta_prime_randomness = a_ek.sample_randomness_with_rng(&mut rng);
    mta_server_from_randomness(a_ek, a_ciphertext, b, &beta_prime, &beta_prime_randomness)
}

fn mta_server_from_randomness(
    a_ek: &EncryptionKey,
    a_ciphertext: &Ciphertext,
    b: &k256::Scalar,
    beta_prime: &Plaintext,
    beta_prime_randomness: &Randomness,
) -> (Ciphertext, Secret) {
    let beta_prime_ciphertext = a_ek.encrypt_with_randomness(beta_prime, beta_prime_randomness);
    let c_b = a_ek.add(
        &a_ek.mul(a_ciphertext, &Plaintext::from_scalar(b)),
        &beta_prime_ciphertext,
    );
    let beta = k256_serde::Scalar::from(beta_prime.to_scalar().negate());
    (
        c_b,
        Secret {
            beta,
            beta_prime: beta_prime.clone(),
            beta_prime_randomness: beta_prime_randomness.clone(),
        },
    )
}

/// Return `true` iff `mta_server_from_randomness(a_ek, a_ciphertext, b, s.beta_prime, s.beta_prime_randomness) == (c_b, s)`
pub fn verify_mta_response(
    a_ek: &EncryptionKey,
    a_ciphertext: &Ciphertext,
    b: &k256::Scalar,
    c_b: &Ciphertext,
    s: &Secret,
) -> bool {
    let (check_c_b, check_secret) =
        mta_server_from_randomness(a_ek, a_ciphertext, b, &s.beta_prime, &s.beta_prime_randomness);
    check_c_b == *c_b && check_secret.beta == s.beta
}

/// `CLIENT2`: the initiator decrypts the responder's ciphertext with its
/// own Paillier private key to recover its additive share `alpha`. Fails
/// with [`crate::Error::InputOutOfRange`] if `c_b` isn't a well-formed
/// ciphertext under `a_dk`, or [`crate::Error::DecryptFailure`] if
/// decryption recovers a value outside the Paillier plaintext space.
pub fn mta_client2(a_dk: &DecryptionKey, c_b: &Ciphertext) -> Result<k256::Scalar> {
    Ok(a_dk.decrypt(c_b)?.to_scalar())
}

/// `SUM_MTA`: combine one party's own factor, its local additive share
/// from the other party's `SERVER` response, and its own `beta` blind
/// (when it also played `SERVER` in the mirrored exchange) into the
/// signing-share identity `a*b + alpha + beta (mod q)`.
pub fn sum_mta(a: &k256::Scalar, b: &k256::Scalar, alpha: &k256::Scalar, beta: &k256::Scalar) -> k256::Scalar {
    a * b + alpha + beta
}

pub fn mta_response_with_proof(
    prover_id: PartyId,
    verifier_id: PartyId,
    a_zkp: &ZkSetup,
    a_ek: &EncryptionKey,
    a_ciphertext: &Ciphertext,
    b: &k256::Scalar,
) -> (Ciphertext, mta::Proof, Secret) {
    let (c_b, s) = mta_server(a_ek, a_ciphertext, b);
    let proof = a_zkp.mta_proof(
        &mta::Statement {
            prover_id,
            verifier_id,
            ciphertext1: a_ciphertext,
            ciphertext2: &c_b,
            ek: a_ek,
        },
        &mta::Witness {
            x: b,
            msg: &s.beta_prime,
            randomness: &s.beta_prime_randomness,
        },
    );
    (c_b, proof, s)
}

pub fn mta_response_with_proof_wc(
    prover_id: PartyId,
    verifier_id: PartyId,
    a_zkp: &ZkSetup,
    a_ek: &EncryptionKey,
    a_ciphertext: &Ciphertext,
    b: &k256::Scalar,
) -> Result<(Ciphertext, mta::ProofWc, Secret)> {
    let (c_b, s) = mta_server(a_ek, a_ciphertext, b);
    let proof_wc = a_zkp.mta_proof_wc(
        &mta::StatementWc {
            stmt: mta::Statement {
                prover_id,
                verifier_id,
                ciphertext1: a_ciphertext,
                ciphertext2: &c_b,
                ek: a_ek,
            },
            x_g: &(k256::ProjectivePoint::generator() * b),
        },
        &mta::Witness {
            x: b,
            msg: &s.beta_prime,
            randomness: &s.beta_prime_randomness,
        },
    )?;
    Ok((c_b, proof_wc, s))
}
