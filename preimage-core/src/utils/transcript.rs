use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_serialize::CanonicalSerialize;
use sha3::{Digest, Keccak256};

/// Fiat-Shamir transcript used by the setup contribution proofs.
#[derive(Clone)]
pub struct KeccakTranscript {
    /// 256-bit running state
    pub state: [u8; 32],
    /// We append an ordinal to each invocation of the hash
    n_rounds: u32,
    #[cfg(test)]
    /// A complete history of the transcript's `state`; used for testing.
    state_history: Vec<[u8; 32]>,
}

impl KeccakTranscript {
    pub fn new(label: &'static [u8]) -> Self {
        assert!(label.len() < 33);
        let mut padded = label.to_vec();
        padded.resize(32, 0);
        let out: [u8; 32] = Keccak256::new().chain_update(padded).finalize().into();

        Self {
            state: out,
            n_rounds: 0,
            #[cfg(test)]
            state_history: vec![out],
        }
    }

    /// Gives the hasher object with the running seed and index added
    fn hasher(&self) -> Keccak256 {
        let mut packed = [0_u8; 28].to_vec();
        packed.extend_from_slice(&self.n_rounds.to_be_bytes());
        Keccak256::new()
            .chain_update(self.state)
            .chain_update(&packed)
    }

    fn update_state(&mut self, new_state: [u8; 32]) {
        self.state = new_state;
        self.n_rounds += 1;
        #[cfg(test)]
        self.state_history.push(new_state);
    }

    pub fn append_message(&mut self, msg: &'static [u8]) {
        // Messages occupy one 32-byte word, right padded
        assert!(msg.len() < 33);
        let mut packed = msg.to_vec();
        packed.resize(32, 0);
        let hasher = self.hasher().chain_update(packed);
        self.update_state(hasher.finalize().into());
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) {
        let hasher = self.hasher().chain_update(bytes);
        self.update_state(hasher.finalize().into());
    }

    pub fn append_u64(&mut self, x: u64) {
        let mut packed = [0_u8; 24].to_vec();
        packed.extend_from_slice(&x.to_be_bytes());
        let hasher = self.hasher().chain_update(packed);
        self.update_state(hasher.finalize().into());
    }

    pub fn append_point<G: CurveGroup>(&mut self, point: &G) {
        self.append_affine(&point.into_affine());
    }

    pub fn append_affine<A: AffineRepr>(&mut self, point: &A) {
        // The point at infinity is hashed as a region of zeros
        if point.is_zero() {
            self.append_bytes(&[0_u8; 64]);
            return;
        }
        let mut buf = vec![];
        point
            .serialize_uncompressed(&mut buf)
            .expect("serializing into a Vec cannot fail");
        self.append_bytes(&buf);
    }

    /// Squeezes 32 bytes and reduces them, big-endian, into the scalar field.
    pub fn challenge_scalar<F: PrimeField>(&mut self) -> F {
        let rand: [u8; 32] = self.hasher().finalize().into();
        self.update_state(rand);
        F::from_be_bytes_mod_order(&rand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Fr, G1Affine, G1Projective};
    use ark_std::{test_rng, UniformRand};

    #[test]
    fn transcripts_agree_on_same_messages() {
        let mut rng = test_rng();
        let point = G1Projective::rand(&mut rng);

        let mut prover = KeccakTranscript::new(b"test");
        let mut verifier = KeccakTranscript::new(b"test");
        for transcript in [&mut prover, &mut verifier] {
            transcript.append_message(b"label");
            transcript.append_u64(42);
            transcript.append_point(&point);
            transcript.append_affine(&G1Affine::zero());
        }
        let a: Fr = prover.challenge_scalar();
        let b: Fr = verifier.challenge_scalar();
        assert_eq!(a, b);
        assert_eq!(prover.state_history, verifier.state_history);
    }

    #[test]
    fn challenges_depend_on_messages() {
        let mut first = KeccakTranscript::new(b"test");
        let mut second = KeccakTranscript::new(b"test");
        first.append_u64(1);
        second.append_u64(2);
        assert_ne!(
            first.challenge_scalar::<Fr>(),
            second.challenge_scalar::<Fr>()
        );
        // Consecutive challenges differ as the state advances
        assert_ne!(
            first.challenge_scalar::<Fr>(),
            first.challenge_scalar::<Fr>()
        );
    }
}
