//! Proofs that a contributor knows the secret it folded into the
//! parameters. A contribution publishes `[x]₁`, `[x]₂` and a Schnorr proof
//! for `[x]₁` bound to the state it was applied to.

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand_core::{CryptoRng, RngCore};
use sha3::{Digest, Keccak256};

use crate::utils::transcript::KeccakTranscript;

/// Keccak-256 of the compressed encoding of `value`.
pub fn digest<T: CanonicalSerialize>(value: &T) -> [u8; 32] {
    let mut bytes = Vec::with_capacity(value.compressed_size());
    value
        .serialize_compressed(&mut bytes)
        .expect("serializing into a Vec cannot fail");
    Keccak256::digest(&bytes).into()
}

/// `e(a.0, b.1) == e(a.1, b.0)`: both pairs are related by the same secret ratio.
pub fn same_ratio<E: Pairing>(g1: (E::G1Affine, E::G1Affine), g2: (E::G2Affine, E::G2Affine)) -> bool {
    E::pairing(g1.0, g2.1) == E::pairing(g1.1, g2.0)
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SecretCommitment<E: Pairing> {
    /// `[x]₁`
    pub g1: E::G1Affine,
    /// `[x]₂`
    pub g2: E::G2Affine,
    /// Schnorr commitment `[k]₁`
    pub r: E::G1Affine,
    /// Schnorr response `k + c·x`
    pub z: E::ScalarField,
}

impl<E: Pairing> SecretCommitment<E> {
    fn challenge(
        label: &'static [u8],
        context: &[u8; 32],
        g1: &E::G1Affine,
        g2: &E::G2Affine,
        r: &E::G1Affine,
    ) -> E::ScalarField {
        let mut transcript = KeccakTranscript::new(b"secret_commitment");
        transcript.append_message(label);
        transcript.append_bytes(context);
        transcript.append_affine(g1);
        transcript.append_affine(g2);
        transcript.append_affine(r);
        transcript.challenge_scalar()
    }

    pub fn new<R: RngCore + CryptoRng>(
        secret: E::ScalarField,
        label: &'static [u8],
        context: &[u8; 32],
        rng: &mut R,
    ) -> Self {
        let g1 = (E::G1Affine::generator() * secret).into_affine();
        let g2 = (E::G2Affine::generator() * secret).into_affine();
        let k = E::ScalarField::rand(rng);
        let r = (E::G1Affine::generator() * k).into_affine();
        let c = Self::challenge(label, context, &g1, &g2, &r);
        Self {
            g1,
            g2,
            r,
            z: k + c * secret,
        }
    }

    pub fn verify(&self, label: &'static [u8], context: &[u8; 32]) -> Result<(), String> {
        if self.g1.is_zero() || self.g2.is_zero() {
            return Err(format!(
                "{} commitment is the identity",
                String::from_utf8_lossy(label)
            ));
        }
        let c = Self::challenge(label, context, &self.g1, &self.g2, &self.r);
        if E::G1Affine::generator() * self.z != self.r.into_group() + self.g1 * c {
            return Err(format!(
                "{} proof of knowledge is invalid",
                String::from_utf8_lossy(label)
            ));
        }
        if !same_ratio::<E>(
            (E::G1Affine::generator(), self.g1),
            (E::G2Affine::generator(), self.g2),
        ) {
            return Err(format!(
                "{} G1 and G2 commitments disagree",
                String::from_utf8_lossy(label)
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Bn254, Fr};
    use crate::groth16::test_rng;

    #[test]
    fn commitment_verifies_in_context() {
        let mut rng = test_rng();
        let context = [7u8; 32];
        let x = Fr::rand(&mut rng);
        let commitment = SecretCommitment::<Bn254>::new(x, b"tau", &context, &mut rng);
        assert_eq!(commitment.verify(b"tau", &context), Ok(()));
        // Bound to the label and the context
        assert!(commitment.verify(b"alpha", &context).is_err());
        assert!(commitment.verify(b"tau", &[8u8; 32]).is_err());
    }

    #[test]
    fn mismatched_g2_is_rejected() {
        let mut rng = test_rng();
        let context = [0u8; 32];
        let mut commitment = SecretCommitment::<Bn254>::new(Fr::from(5u64), b"tau", &context, &mut rng);
        commitment.g2 = (commitment.g2 * Fr::from(2u64)).into_affine();
        assert!(commitment.verify(b"tau", &context).is_err());
    }

    #[test]
    fn same_ratio_detects_relation() {
        let g1 = <Bn254 as Pairing>::G1Affine::generator();
        let g2 = <Bn254 as Pairing>::G2Affine::generator();
        let x = Fr::from(11u64);
        let g1x = (g1 * x).into_affine();
        let g2x = (g2 * x).into_affine();
        assert!(same_ratio::<Bn254>((g1, g1x), (g2, g2x)));
        assert!(!same_ratio::<Bn254>((g1, g1x), (g2x, g2)));
    }
}
