use crypto_bigint::ArrayEncoding;
use ecdsa::elliptic_curve::ops::Reduce;
use k256::U256;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    array::TryFromSliceError,
    convert::{TryFrom, TryInto},
};

/// Sign only 32-byte hash digests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDigest(pub(crate) [u8; 32]);

impl TryFrom<&[u8]> for MessageDigest {
    type Error = TryFromSliceError;
    fn try_from(v: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(v.try_into()?))
    }
}

/// Convert a 32-byte hash digest into a scalar as per SEC1:
/// <https://www.secg.org/sec1-v2.pdf< Section 4.1.3 steps 5-6 page 45
///
/// SEC1 specifies to subtract the secp256k1 modulus when the byte array is larger than the modulus.
impl From<&MessageDigest> for k256::Scalar {
    fn from(v: &MessageDigest) -> Self {
        k256::Scalar::reduce(U256::from_be_byte_array(v.0.into()))
    }
}

/// SHA-256 the message and reduce the digest into `Z_q`. The hash primitive
/// itself is delegated to `sha2`; this is only the digest-to-scalar step.
pub fn hash_message(message: &[u8]) -> k256::Scalar {
    let digest: [u8; 32] = Sha256::digest(message).into();
    k256::Scalar::from(&MessageDigest(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_message_is_deterministic() {
        let a = hash_message(b"hello");
        let b = hash_message(b"hello");
        assert_eq!(a, b);

        let c = hash_message(b"hellO");
        assert_ne!(a, c);
    }
}
