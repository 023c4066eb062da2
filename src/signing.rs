//! Pure combinators that glue the MtA/RP/ZK core into a full two-party
//! ECDSA signature.
//!
//! Key generation and message transport are out of scope for this crate;
//! these functions only combine values a caller already produced by running
//! two mirrored [`crate::crypto_tools::mta`] exchanges (through the range
//! and MtA-with-check proofs of `crypto_tools::paillier::zk`) and summing
//! the results with [`crate::crypto_tools::mta::sum_mta`]. Each function
//! here is a pure scalar/point computation with no protocol state of its
//! own.
use crypto_bigint::ArrayEncoding;
use ecdsa::elliptic_curve::{ops::Reduce, point::AffineCoordinates};
use k256::U256;

pub use crate::crypto_tools::message_digest::hash_message;

/// `(kgamma1 + kgamma2)⁻¹ mod q`.
///
/// `kgamma1`/`kgamma2` are each party's `SUM_MTA` output for the `k*gamma`
/// MtA pair; inverting their sum recovers the ECDSA nonce's inverse without
/// either party learning `k` or `gamma` individually.
pub fn invert_kgamma(kgamma1: &k256::Scalar, kgamma2: &k256::Scalar) -> k256::Scalar {
    (kgamma1 + kgamma2).invert().unwrap()
}

/// `r = x((gamma_pt1 + gamma_pt2) * inv_kgamma) mod q`.
pub fn compute_r(
    inv_kgamma: &k256::Scalar,
    gamma_pt1: &k256::ProjectivePoint,
    gamma_pt2: &k256::ProjectivePoint,
) -> k256::Scalar {
    let r_point = (gamma_pt1 + gamma_pt2) * inv_kgamma;
    let x_bytes = r_point.to_affine().x();
    k256::Scalar::reduce(U256::from_be_byte_array(x_bytes))
}

/// `s_i = k_i·hashed_msg + r·sigma_i mod q`.
///
/// `sigma_i` is this party's `SUM_MTA` output for the `k*w` MtA pair.
pub fn compute_s_share(
    hashed_msg: &k256::Scalar,
    r: &k256::Scalar,
    k_i: &k256::Scalar,
    sigma_i: &k256::Scalar,
) -> k256::Scalar {
    k_i * hashed_msg + r * sigma_i
}

/// `s = s1 + s2 mod q`.
pub fn sum_s_shares(s1: &k256::Scalar, s2: &k256::Scalar) -> k256::Scalar {
    s1 + s2
}

/// `W = pk1 + pk2`, the joint public key under which `(r, s)` verifies.
pub fn sum_public_key_shares(
    pk1: &k256::ProjectivePoint,
    pk2: &k256::ProjectivePoint,
) -> k256::ProjectivePoint {
    pk1 + pk2
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecdsa::elliptic_curve::Field;

    #[test]
    fn invert_kgamma_round_trips() {
        let kgamma1 = k256::Scalar::random(rand::thread_rng());
        let kgamma2 = k256::Scalar::random(rand::thread_rng());
        let inv = invert_kgamma(&kgamma1, &kgamma2);
        assert_eq!((kgamma1 + kgamma2) * inv, k256::Scalar::ONE);
    }

    #[test]
    fn compute_r_matches_known_point() {
        let k = k256::Scalar::random(rand::thread_rng());
        let inv_k = k.invert().unwrap();
        let g = k256::ProjectivePoint::generator();
        let gamma_pt1 = g * k;
        let gamma_pt2 = k256::ProjectivePoint::IDENTITY;

        let r = compute_r(&inv_k, &gamma_pt1, &gamma_pt2);
        let expected_x = g.to_affine().x();
        let expected_r = k256::Scalar::reduce(U256::from_be_byte_array(expected_x));
        assert_eq!(r, expected_r);
    }

    #[test]
    fn sum_s_shares_is_commutative() {
        let s1 = k256::Scalar::random(rand::thread_rng());
        let s2 = k256::Scalar::random(rand::thread_rng());
        assert_eq!(sum_s_shares(&s1, &s2), sum_s_shares(&s2, &s1));
    }

    #[test]
    fn end_to_end_signature_verifies_under_joint_public_key() {
        use crate::crypto_tools::{
            mta::{mta_client1, mta_client2, mta_server, sum_mta, verify_mta_response},
            paillier::{keygen_unsafe, DecryptionKey, EncryptionKey},
        };
        use ecdsa::hazmat::VerifyPrimitive;

        let g = k256::ProjectivePoint::generator();

        // Each party's local multiplicative shares.
        let k1 = k256::Scalar::random(rand::thread_rng());
        let gamma1 = k256::Scalar::random(rand::thread_rng());
        let w1 = k256::Scalar::random(rand::thread_rng());
        let k2 = k256::Scalar::random(rand::thread_rng());
        let gamma2 = k256::Scalar::random(rand::thread_rng());
        let w2 = k256::Scalar::random(rand::thread_rng());

        let (ek1, dk1) = keygen_unsafe(&mut rand::thread_rng()).unwrap();
        let (ek2, dk2) = keygen_unsafe(&mut rand::thread_rng()).unwrap();

        // Run one mirrored pair of MtA exchanges for `k*gamma`, one party
        // playing CLIENT and the other SERVER in each direction.
        let run_mta = |a_ek: &EncryptionKey,
                        a_dk: &DecryptionKey,
                        a: &k256::Scalar,
                        b: &k256::Scalar|
         -> (k256::Scalar, k256::Scalar) {
            let (a_ciphertext, _) = mta_client1(a_ek, a);
            let (c_b, secret) = mta_server(a_ek, &a_ciphertext, b);
            assert!(verify_mta_response(a_ek, &a_ciphertext, b, &c_b, &secret));
            let alpha = mta_client2(a_dk, &c_b).unwrap();
            (alpha, *secret.beta.as_ref())
        };

        // party 1 as CLIENT/initiator, party 2 as SERVER, for k1*gamma2
        let (alpha_kgamma_1, beta_kgamma_2): (k256::Scalar, k256::Scalar) =
            run_mta(&ek1, &dk1, &k1, &gamma2);
        // party 2 as CLIENT/initiator, party 1 as SERVER, for k2*gamma1
        let (alpha_kgamma_2, beta_kgamma_1): (k256::Scalar, k256::Scalar) =
            run_mta(&ek2, &dk2, &k2, &gamma1);

        let kgamma1 = sum_mta(&k1, &gamma1, &alpha_kgamma_1, &beta_kgamma_1);
        let kgamma2 = sum_mta(&k2, &gamma2, &alpha_kgamma_2, &beta_kgamma_2);

        // Same shape for `k*w`.
        let (alpha_kw_1, beta_kw_2): (k256::Scalar, k256::Scalar) = run_mta(&ek1, &dk1, &k1, &w2);
        let (alpha_kw_2, beta_kw_1): (k256::Scalar, k256::Scalar) = run_mta(&ek2, &dk2, &k2, &w1);

        let sigma1 = sum_mta(&k1, &w1, &alpha_kw_1, &beta_kw_1);
        let sigma2 = sum_mta(&k2, &w2, &alpha_kw_2, &beta_kw_2);

        let inv_kgamma = invert_kgamma(&kgamma1, &kgamma2);
        let gamma_pt1 = g * gamma1;
        let gamma_pt2 = g * gamma2;
        let r = compute_r(&inv_kgamma, &gamma_pt1, &gamma_pt2);

        let hashed_msg = hash_message(b"two-party ecdsa test message");
        let s1 = compute_s_share(&hashed_msg, &r, &k1, &sigma1);
        let s2 = compute_s_share(&hashed_msg, &r, &k2, &sigma2);
        let s = sum_s_shares(&s1, &s2);

        let pk1 = g * w1;
        let pk2 = g * w2;
        let joint_pk = sum_public_key_shares(&pk1, &pk2);

        let sig = k256::ecdsa::Signature::from_scalars(r.to_bytes(), s.to_bytes())
            .expect("r, s both nonzero");

        joint_pk
            .to_affine()
            .verify_prehashed(&hashed_msg.to_bytes(), &sig)
            .expect("two-party signature verifies under the joint public key");
    }
}
