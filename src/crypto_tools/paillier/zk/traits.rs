/// A non-interactive (Fiat-Shamir) zero-knowledge proof of a statement about
/// a witness, bound to a caller-supplied domain-separation tag.
pub trait NIZKStatement {
    type Witness;
    type Proof;

    fn prove(&self, wit: &Self::Witness, domain: &[u8]) -> Self::Proof;
    fn verify(&self, proof: &Self::Proof, domain: &[u8]) -> bool;
}
