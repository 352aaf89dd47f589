//! Powers of tau: the circuit-independent half of the trusted setup.

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{Field, UniformRand};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use common::constants::MAX_SETUP_POWER;
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use sha3::{Digest, Keccak256};

use super::{
    ceremony::Contribute,
    pok::{digest, same_ratio, SecretCommitment},
    SetupOptions,
};
use crate::{
    msm::scale_bases,
    utils::{
        cancel::CancellationToken, errors::SetupError, math::Math, transcript::KeccakTranscript,
    },
};

/// Structured reference string for a domain of size `n`:
/// `[τ^i]₁` for `i < 2n - 1`, `[τ^i]₂`, `[α·τ^i]₁` and `[β·τ^i]₁` for `i < n`,
/// and `[β]₂`.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Phase1Srs<E: Pairing> {
    pub tau_powers_g1: Vec<E::G1Affine>,
    pub tau_powers_g2: Vec<E::G2Affine>,
    pub alpha_tau_powers_g1: Vec<E::G1Affine>,
    pub beta_tau_powers_g1: Vec<E::G1Affine>,
    pub beta_g2: E::G2Affine,
}

/// Public record of one phase-1 contribution.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Phase1Contribution<E: Pairing> {
    pub tau: SecretCommitment<E>,
    pub alpha: SecretCommitment<E>,
    pub beta: SecretCommitment<E>,
}

impl<E: Pairing> Phase1Srs<E> {
    /// The starting point of a ceremony, `τ = α = β = 1`, for a domain of
    /// `2^power` points.
    pub fn new(power: usize) -> Result<Self, SetupError> {
        if power == 0 || power > MAX_SETUP_POWER {
            return Err(SetupError::InvalidPower(power));
        }
        let n = power.pow2();
        let g1 = E::G1Affine::generator();
        let g2 = E::G2Affine::generator();
        Ok(Self {
            tau_powers_g1: vec![g1; 2 * n - 1],
            tau_powers_g2: vec![g2; n],
            alpha_tau_powers_g1: vec![g1; n],
            beta_tau_powers_g1: vec![g1; n],
            beta_g2: g2,
        })
    }

    /// Largest evaluation domain this SRS supports.
    pub fn domain_size(&self) -> usize {
        self.tau_powers_g2.len()
    }

    /// Folds `(x_τ, x_α, x_β)` into every element.
    #[tracing::instrument(skip_all, name = "Phase1Srs::apply_secrets")]
    fn apply_secrets(
        &self,
        tau: E::ScalarField,
        alpha: E::ScalarField,
        beta: E::ScalarField,
        options: &SetupOptions,
        cancel: &CancellationToken,
    ) -> Result<Self, SetupError> {
        let n = self.domain_size();
        let powers: Vec<E::ScalarField> =
            std::iter::successors(Some(E::ScalarField::ONE), |x| Some(*x * tau))
                .take(2 * n - 1)
                .collect();
        let alpha_powers: Vec<E::ScalarField> = powers[..n].iter().map(|p| *p * alpha).collect();
        let beta_powers: Vec<E::ScalarField> = powers[..n].iter().map(|p| *p * beta).collect();
        let chunk = options.msm_chunk_size;

        let tau_powers_g1 = scale_bases::<E::G1>(&self.tau_powers_g1, &powers, chunk, cancel)?;
        let tau_powers_g2 = scale_bases::<E::G2>(&self.tau_powers_g2, &powers[..n], chunk, cancel)?;
        let alpha_tau_powers_g1 =
            scale_bases::<E::G1>(&self.alpha_tau_powers_g1, &alpha_powers, chunk, cancel)?;
        let beta_tau_powers_g1 =
            scale_bases::<E::G1>(&self.beta_tau_powers_g1, &beta_powers, chunk, cancel)?;

        Ok(Self {
            tau_powers_g1,
            tau_powers_g2,
            alpha_tau_powers_g1,
            beta_tau_powers_g1,
            beta_g2: (self.beta_g2 * beta).into_affine(),
        })
    }

    /// Vector lengths agree with a domain of at least two points.
    pub fn check_lengths(&self) -> Result<(), String> {
        let n = self.domain_size();
        if n < 2
            || self.tau_powers_g1.len() != 2 * n - 1
            || self.alpha_tau_powers_g1.len() != n
            || self.beta_tau_powers_g1.len() != n
        {
            return Err("vector lengths are inconsistent".to_string());
        }
        Ok(())
    }

    /// Checks that the vectors really are consecutive powers of a single τ,
    /// scaled by a single α (resp. β), using random linear combinations.
    #[tracing::instrument(skip_all, name = "Phase1Srs::check_powers")]
    pub fn check_powers(&self) -> Result<(), String> {
        self.check_lengths()?;
        let g1 = E::G1Affine::generator();
        let g2 = E::G2Affine::generator();
        if self.tau_powers_g1[0] != g1 || self.tau_powers_g2[0] != g2 {
            return Err("first powers must be the generators".to_string());
        }
        if self.tau_powers_g1[1].is_zero()
            || self.tau_powers_g2[1].is_zero()
            || self.alpha_tau_powers_g1[0].is_zero()
            || self.beta_tau_powers_g1[0].is_zero()
        {
            return Err("secret collapsed to zero".to_string());
        }

        let mut rng = ChaCha20Rng::from_seed(digest(self));
        let tau_g2 = self.tau_powers_g2[1];
        let tau_g1 = self.tau_powers_g1[1];

        let g1_vectors: [(&str, &[E::G1Affine]); 3] = [
            ("tau_powers_g1", &self.tau_powers_g1),
            ("alpha_tau_powers_g1", &self.alpha_tau_powers_g1),
            ("beta_tau_powers_g1", &self.beta_tau_powers_g1),
        ];
        for (name, points) in g1_vectors {
            let (shifted, next) = random_shifted_pair::<E::G1, _>(points, &mut rng);
            if !same_ratio::<E>((shifted, next), (g2, tau_g2)) {
                return Err(format!("{name} are not successive powers of tau"));
            }
        }
        let (shifted, next) = random_shifted_pair::<E::G2, _>(&self.tau_powers_g2, &mut rng);
        if !same_ratio::<E>((g1, tau_g1), (shifted, next)) {
            return Err("tau_powers_g2 are not successive powers of tau".to_string());
        }
        if !same_ratio::<E>((g1, self.beta_tau_powers_g1[0]), (g2, self.beta_g2)) {
            return Err("beta_g2 does not match beta_tau_powers_g1".to_string());
        }
        Ok(())
    }
}

/// `(Σ ρ_i·P_i, Σ ρ_i·P_{i+1})` for random `ρ`. If `P_{i+1} = τ·P_i` for
/// every `i` the second sum is `τ` times the first.
fn random_shifted_pair<G: CurveGroup, R: RngCore>(points: &[G::Affine], rng: &mut R) -> (G::Affine, G::Affine) {
    let m = points.len() - 1;
    let rho: Vec<G::ScalarField> = (0..m).map(|_| G::ScalarField::rand(rng)).collect();
    let lhs = G::msm_unchecked(&points[..m], &rho);
    let rhs = G::msm_unchecked(&points[1..], &rho);
    (lhs.into_affine(), rhs.into_affine())
}

impl<E: Pairing> Contribute for Phase1Srs<E> {
    type Contribution = Phase1Contribution<E>;

    #[tracing::instrument(skip_all, name = "Phase1Srs::contribute")]
    fn contribute<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        options: &SetupOptions,
        cancel: &CancellationToken,
    ) -> Result<(Self, Self::Contribution), SetupError> {
        let context = digest(self);
        let tau = E::ScalarField::rand(rng);
        let alpha = E::ScalarField::rand(rng);
        let beta = E::ScalarField::rand(rng);

        let next = self.apply_secrets(tau, alpha, beta, options, cancel)?;
        let contribution = Phase1Contribution {
            tau: SecretCommitment::new(tau, b"tau", &context, rng),
            alpha: SecretCommitment::new(alpha, b"alpha", &context, rng),
            beta: SecretCommitment::new(beta, b"beta", &context, rng),
        };
        tracing::info!("phase 1 contribution applied");
        Ok((next, contribution))
    }

    #[tracing::instrument(skip_all, name = "Phase1Srs::verify_contribution")]
    fn verify_contribution(&self, next: &Self, contribution: &Self::Contribution) -> Result<(), String> {
        self.check_lengths()?;
        next.check_lengths()?;
        if next.domain_size() != self.domain_size() {
            return Err("SRS size changed".to_string());
        }
        let context = digest(self);
        contribution.tau.verify(b"tau", &context)?;
        contribution.alpha.verify(b"alpha", &context)?;
        contribution.beta.verify(b"beta", &context)?;

        let g1 = E::G1Affine::generator();
        let g2 = E::G2Affine::generator();
        let ratios = [
            (
                "tau",
                same_ratio::<E>(
                    (self.tau_powers_g1[1], next.tau_powers_g1[1]),
                    (g2, contribution.tau.g2),
                ),
            ),
            (
                "tau G2",
                same_ratio::<E>(
                    (g1, contribution.tau.g1),
                    (self.tau_powers_g2[1], next.tau_powers_g2[1]),
                ),
            ),
            (
                "alpha",
                same_ratio::<E>(
                    (self.alpha_tau_powers_g1[0], next.alpha_tau_powers_g1[0]),
                    (g2, contribution.alpha.g2),
                ),
            ),
            (
                "beta",
                same_ratio::<E>(
                    (self.beta_tau_powers_g1[0], next.beta_tau_powers_g1[0]),
                    (g2, contribution.beta.g2),
                ),
            ),
            (
                "beta G2",
                same_ratio::<E>((g1, contribution.beta.g1), (self.beta_g2, next.beta_g2)),
            ),
        ];
        if let Some((name, _)) = ratios.iter().find(|(_, ok)| !ok) {
            return Err(format!("{name} update does not match the published secret"));
        }
        next.check_powers()
    }
}

/// Deterministic randomness for a beacon contribution: `beacon` hashed
/// `2^iterations_exp` times with Keccak-256 seeds a ChaCha20 stream.
pub fn beacon_rng(beacon: &[u8], iterations_exp: u32) -> ChaCha20Rng {
    let mut transcript = KeccakTranscript::new(b"beacon");
    transcript.append_bytes(beacon);
    let mut seed = transcript.state;
    for _ in 0..(1u64 << iterations_exp.min(63)) {
        seed = Keccak256::digest(seed).into();
    }
    ChaCha20Rng::from_seed(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Bn254, Fr};
    use crate::groth16::test_rng;

    #[test]
    fn identity_srs_is_well_formed() {
        let srs = Phase1Srs::<Bn254>::new(3).unwrap();
        assert_eq!(srs.domain_size(), 8);
        assert_eq!(srs.tau_powers_g1.len(), 15);
        // tau = 1 passes the power checks
        assert_eq!(srs.check_powers(), Ok(()));
        assert_eq!(
            Phase1Srs::<Bn254>::new(0),
            Err(SetupError::InvalidPower(0))
        );
    }

    #[test]
    fn contributions_verify() {
        let mut rng = test_rng();
        let options = SetupOptions::default();
        let cancel = CancellationToken::new();
        let srs = Phase1Srs::<Bn254>::new(3).unwrap();
        let (next, contribution) = srs.contribute(&mut rng, &options, &cancel).unwrap();
        assert_ne!(next, srs);
        assert_eq!(srs.verify_contribution(&next, &contribution), Ok(()));

        let (third, second_contribution) = next.contribute(&mut rng, &options, &cancel).unwrap();
        assert_eq!(next.verify_contribution(&third, &second_contribution), Ok(()));
        // Contributions are bound to the state they were applied to
        assert!(srs.verify_contribution(&third, &second_contribution).is_err());
    }

    #[test]
    fn tampered_srs_is_rejected() {
        let mut rng = test_rng();
        let options = SetupOptions::default();
        let cancel = CancellationToken::new();
        let srs = Phase1Srs::<Bn254>::new(3).unwrap();
        let (mut next, contribution) = srs.contribute(&mut rng, &options, &cancel).unwrap();
        next.tau_powers_g1[5] = (next.tau_powers_g1[5] * Fr::from(2u64)).into_affine();
        assert!(next.check_powers().is_err());
        assert!(srs.verify_contribution(&next, &contribution).is_err());
    }

    #[test]
    fn truncated_srs_is_rejected() {
        let mut rng = test_rng();
        let options = SetupOptions::default();
        let cancel = CancellationToken::new();
        let srs = Phase1Srs::<Bn254>::new(3).unwrap();
        let (next, contribution) = srs.contribute(&mut rng, &options, &cancel).unwrap();

        let mut truncated = next.clone();
        truncated.tau_powers_g1.truncate(1);
        assert_eq!(
            srs.verify_contribution(&truncated, &contribution),
            Err("vector lengths are inconsistent".to_string())
        );

        let mut empty = next.clone();
        empty.alpha_tau_powers_g1.clear();
        assert!(srs.verify_contribution(&empty, &contribution).is_err());

        let mut shrunk = next;
        shrunk.tau_powers_g2.truncate(1);
        assert!(shrunk.check_powers().is_err());
        assert!(srs.verify_contribution(&shrunk, &contribution).is_err());
    }

    #[test]
    fn secrets_must_match_commitments() {
        let mut rng = test_rng();
        let options = SetupOptions::default();
        let cancel = CancellationToken::new();
        let srs = Phase1Srs::<Bn254>::new(2).unwrap();
        let (_, contribution) = srs.contribute(&mut rng, &options, &cancel).unwrap();
        // Well-formed SRS built from secrets other than the published ones
        let other = srs
            .apply_secrets(Fr::from(3u64), Fr::from(5u64), Fr::from(7u64), &options, &cancel)
            .unwrap();
        assert_eq!(other.check_powers(), Ok(()));
        assert!(srs.verify_contribution(&other, &contribution).is_err());
    }

    #[test]
    fn beacon_is_reproducible() {
        let options = SetupOptions::default();
        let cancel = CancellationToken::new();
        let srs = Phase1Srs::<Bn254>::new(2).unwrap();
        let (first, _) = srs
            .contribute(&mut beacon_rng(b"beacon value", 3), &options, &cancel)
            .unwrap();
        let (second, _) = srs
            .contribute(&mut beacon_rng(b"beacon value", 3), &options, &cancel)
            .unwrap();
        let (third, _) = srs
            .contribute(&mut beacon_rng(b"another beacon", 3), &options, &cancel)
            .unwrap();
        assert_eq!(first, second);
        assert_ne!(first, third);
    }

    #[test]
    fn cancelled_contribution() {
        let mut rng = test_rng();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let srs = Phase1Srs::<Bn254>::new(2).unwrap();
        assert_eq!(
            srs.contribute(&mut rng, &SetupOptions::default(), &cancel)
                .map(|_| ()),
            Err(SetupError::Cancelled)
        );
    }
}
