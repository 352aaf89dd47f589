//! Circuit-specific half of the trusted setup: the powers of tau are turned
//! into Lagrange bases, combined with the constraint matrices into a proving
//! key, and δ is then re-randomised by each contributor.

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{Field, UniformRand};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use itertools::Itertools;
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use rayon::prelude::*;

use super::{
    ceremony::Contribute,
    domain::Radix2Domain,
    keys::{ProvingKey, VerifyingKey},
    phase1::Phase1Srs,
    pok::{digest, same_ratio, SecretCommitment},
    SetupOptions,
};
use crate::{
    field::SnarkField,
    msm::scale_all,
    r1cs::key::R1CSMatrices,
    utils::{cancel::CancellationToken, errors::SetupError},
};

/// Public record of one phase-2 contribution.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Phase2Contribution<E: Pairing> {
    pub delta: SecretCommitment<E>,
}

fn column_msm<G: CurveGroup>(column: &[(usize, G::ScalarField)], bases: &[G::Affine]) -> G {
    let (points, scalars): (Vec<G::Affine>, Vec<G::ScalarField>) =
        column.iter().map(|(row, coeff)| (bases[*row], *coeff)).unzip();
    G::msm_unchecked(&points, &scalars)
}

fn to_projective<A: AffineRepr>(points: &[A]) -> Vec<A::Group> {
    points.par_iter().map(|p| p.into_group()).collect()
}

/// Derives the initial proving key (`γ = δ = 1`) for `matrices` from a
/// phase-1 SRS.
#[tracing::instrument(skip_all, name = "phase2::initialize")]
pub fn initialize<E: Pairing>(
    matrices: &R1CSMatrices<E::ScalarField>,
    srs: &Phase1Srs<E>,
    cancel: &CancellationToken,
) -> Result<ProvingKey<E>, SetupError>
where
    E::ScalarField: SnarkField,
{
    let required = matrices.num_qap_rows().next_power_of_two();
    let available = srs.domain_size();
    if required > available {
        return Err(SetupError::InsufficientSrsSize {
            required,
            available,
        });
    }
    let domain = Radix2Domain::<E::ScalarField>::new(required)
        .ok_or(SetupError::InsufficientSrsSize { required, available })?;
    let n = domain.size;
    tracing::debug!(domain_size = n, srs_size = available, "deriving Lagrange bases");

    let ((lagrange_g1, lagrange_g2), (alpha_lagrange_g1, beta_lagrange_g1)) = rayon::join(
        || {
            rayon::join(
                || domain.ifft(&to_projective(&srs.tau_powers_g1[..n])),
                || domain.ifft(&to_projective(&srs.tau_powers_g2[..n])),
            )
        },
        || {
            rayon::join(
                || domain.ifft(&to_projective(&srs.alpha_tau_powers_g1[..n])),
                || domain.ifft(&to_projective(&srs.beta_tau_powers_g1[..n])),
            )
        },
    );
    if cancel.is_cancelled() {
        return Err(SetupError::Cancelled);
    }
    let lagrange_g1 = E::G1::normalize_batch(&lagrange_g1);
    let lagrange_g2 = E::G2::normalize_batch(&lagrange_g2);
    let alpha_lagrange_g1 = E::G1::normalize_batch(&alpha_lagrange_g1);
    let beta_lagrange_g1 = E::G1::normalize_batch(&beta_lagrange_g1);

    let num_variables = matrices.num_variables;
    let num_instance = matrices.num_instance_variables();
    let mut a_columns = matrices.a.columns(num_variables);
    for (i, column) in a_columns.iter_mut().take(num_instance).enumerate() {
        column.push((matrices.num_rows + i, E::ScalarField::ONE));
    }
    let b_columns = matrices.b.columns(num_variables);
    let c_columns = matrices.c.columns(num_variables);

    let queries: Vec<(E::G1, E::G1, E::G2, E::G1)> = (0..num_variables)
        .into_par_iter()
        .map(|i| {
            if cancel.is_cancelled() {
                return Err(SetupError::Cancelled);
            }
            let a = column_msm::<E::G1>(&a_columns[i], &lagrange_g1);
            let b_g1 = column_msm::<E::G1>(&b_columns[i], &lagrange_g1);
            let b_g2 = column_msm::<E::G2>(&b_columns[i], &lagrange_g2);
            let abc = column_msm::<E::G1>(&a_columns[i], &beta_lagrange_g1)
                + column_msm::<E::G1>(&b_columns[i], &alpha_lagrange_g1)
                + column_msm::<E::G1>(&c_columns[i], &lagrange_g1);
            Ok((a, b_g1, b_g2, abc))
        })
        .collect::<Result<_, _>>()?;

    let a_query = E::G1::normalize_batch(&queries.iter().map(|q| q.0).collect_vec());
    let b_g1_query = E::G1::normalize_batch(&queries.iter().map(|q| q.1).collect_vec());
    let b_g2_query = E::G2::normalize_batch(&queries.iter().map(|q| q.2).collect_vec());
    let mut l_query = E::G1::normalize_batch(&queries.iter().map(|q| q.3).collect_vec());
    let gamma_abc_g1: Vec<E::G1Affine> = l_query.drain(..num_instance).collect();

    // Z(τ)·τ^i = τ^(n+i) - τ^i
    let h_query: Vec<E::G1> = (0..n - 1)
        .into_par_iter()
        .map(|i| srs.tau_powers_g1[n + i].into_group() - srs.tau_powers_g1[i])
        .collect();
    let h_query = E::G1::normalize_batch(&h_query);

    let g1 = E::G1Affine::generator();
    let g2 = E::G2Affine::generator();
    tracing::info!(
        num_variables,
        domain_size = n,
        "initial proving key derived"
    );
    Ok(ProvingKey {
        vk: VerifyingKey {
            alpha_g1: srs.alpha_tau_powers_g1[0],
            beta_g2: srs.beta_g2,
            gamma_g2: g2,
            delta_g2: g2,
            gamma_abc_g1,
            circuit_digest: matrices.digest,
        },
        beta_g1: srs.beta_tau_powers_g1[0],
        delta_g1: g1,
        a_query,
        b_g1_query,
        b_g2_query,
        h_query,
        l_query,
        matrices: matrices.clone(),
    })
}

/// A phase-2 transcript is only as good as its starting point: recomputes
/// the initial key from `matrices` and `srs` and compares.
#[tracing::instrument(skip_all, name = "phase2::verify_initial_key")]
pub fn verify_initial_key<E: Pairing>(
    initial: &ProvingKey<E>,
    matrices: &R1CSMatrices<E::ScalarField>,
    srs: &Phase1Srs<E>,
    cancel: &CancellationToken,
) -> Result<(), SetupError>
where
    E::ScalarField: SnarkField,
{
    if &initialize(matrices, srs, cancel)? != initial {
        return Err(SetupError::InitialKeyMismatch);
    }
    Ok(())
}

fn random_combination<G: CurveGroup>(points: &[G::Affine], rho: &[G::ScalarField]) -> G::Affine {
    G::msm_unchecked(points, &rho[..points.len()]).into_affine()
}

impl<E: Pairing> ProvingKey<E>
where
    E::ScalarField: SnarkField,
{
    /// Everything except δ and the queries divided by it.
    fn delta_independent_eq(&self, other: &Self) -> bool {
        let vk = &self.vk;
        let other_vk = &other.vk;
        vk.alpha_g1 == other_vk.alpha_g1
            && vk.beta_g2 == other_vk.beta_g2
            && vk.gamma_g2 == other_vk.gamma_g2
            && vk.gamma_abc_g1 == other_vk.gamma_abc_g1
            && vk.circuit_digest == other_vk.circuit_digest
            && self.beta_g1 == other.beta_g1
            && self.a_query == other.a_query
            && self.b_g1_query == other.b_g1_query
            && self.b_g2_query == other.b_g2_query
            && self.matrices == other.matrices
            && self.l_query.len() == other.l_query.len()
            && self.h_query.len() == other.h_query.len()
    }
}

impl<E: Pairing> Contribute for ProvingKey<E>
where
    E::ScalarField: SnarkField,
{
    type Contribution = Phase2Contribution<E>;

    #[tracing::instrument(skip_all, name = "ProvingKey::contribute")]
    fn contribute<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        options: &SetupOptions,
        cancel: &CancellationToken,
    ) -> Result<(Self, Self::Contribution), SetupError> {
        let context = digest(self);
        let (x, x_inv) = loop {
            let x = E::ScalarField::rand(rng);
            if let Some(x_inv) = Field::inverse(&x) {
                break (x, x_inv);
            }
        };
        let chunk = options.msm_chunk_size;

        let mut next = self.clone();
        next.delta_g1 = (self.delta_g1 * x).into_affine();
        next.vk.delta_g2 = (self.vk.delta_g2 * x).into_affine();
        next.l_query = scale_all::<E::G1>(&self.l_query, x_inv, chunk, cancel)?;
        next.h_query = scale_all::<E::G1>(&self.h_query, x_inv, chunk, cancel)?;

        let contribution = Phase2Contribution {
            delta: SecretCommitment::new(x, b"delta", &context, rng),
        };
        tracing::info!("phase 2 contribution applied");
        Ok((next, contribution))
    }

    #[tracing::instrument(skip_all, name = "ProvingKey::verify_contribution")]
    fn verify_contribution(&self, next: &Self, contribution: &Self::Contribution) -> Result<(), String> {
        if !self.delta_independent_eq(next) {
            return Err("contribution modified more than delta".to_string());
        }
        let context = digest(self);
        contribution.delta.verify(b"delta", &context)?;

        let g1 = E::G1Affine::generator();
        let g2 = E::G2Affine::generator();
        if !same_ratio::<E>((self.delta_g1, next.delta_g1), (g2, contribution.delta.g2)) {
            return Err("delta update does not match the published secret".to_string());
        }
        if !same_ratio::<E>((g1, next.delta_g1), (g2, next.vk.delta_g2)) {
            return Err("delta in G1 and G2 disagree".to_string());
        }

        // L and H must be divided by the same factor δ was multiplied by.
        let mut rng = ChaCha20Rng::from_seed(digest(next));
        let len = self.l_query.len().max(self.h_query.len());
        let rho: Vec<E::ScalarField> = (0..len).map(|_| E::ScalarField::rand(&mut rng)).collect();
        for (name, before, after) in [
            ("l_query", &self.l_query, &next.l_query),
            ("h_query", &self.h_query, &next.h_query),
        ] {
            let before = random_combination::<E::G1>(before, &rho);
            let after = random_combination::<E::G1>(after, &rho);
            if !same_ratio::<E>((after, before), (self.vk.delta_g2, next.vk.delta_g2)) {
                return Err(format!("{name} was not rescaled by the inverse of the secret"));
            }
        }
        Ok(())
    }
}
