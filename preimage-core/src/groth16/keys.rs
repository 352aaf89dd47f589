use ark_ec::pairing::{Pairing, PairingOutput};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::{field::SnarkField, r1cs::key::R1CSMatrices};

/// Groth16 verifying key. `gamma_abc_g1[i]` is
/// `[(β·A_i(τ) + α·B_i(τ) + C_i(τ)) / γ]₁` for the constant one (`i = 0`) and
/// each public variable.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct VerifyingKey<E: Pairing> {
    pub alpha_g1: E::G1Affine,
    pub beta_g2: E::G2Affine,
    pub gamma_g2: E::G2Affine,
    pub delta_g2: E::G2Affine,
    pub gamma_abc_g1: Vec<E::G1Affine>,
    /// Digest of the constraint system the key was derived from
    pub circuit_digest: [u8; 32],
}

impl<E: Pairing> VerifyingKey<E> {
    /// Number of public inputs, excluding the constant one.
    pub fn num_public(&self) -> usize {
        self.gamma_abc_g1.len().saturating_sub(1)
    }
}

/// Verifying key with `e(α, β)` and the prepared G2 elements cached.
#[derive(Clone, Debug)]
pub struct PreparedVerifyingKey<E: Pairing> {
    pub vk: VerifyingKey<E>,
    pub alpha_g1_beta_g2: PairingOutput<E>,
    pub gamma_g2_prepared: E::G2Prepared,
    pub delta_g2_prepared: E::G2Prepared,
}

impl<E: Pairing> From<VerifyingKey<E>> for PreparedVerifyingKey<E> {
    fn from(vk: VerifyingKey<E>) -> Self {
        Self {
            alpha_g1_beta_g2: E::pairing(vk.alpha_g1, vk.beta_g2),
            gamma_g2_prepared: vk.gamma_g2.into(),
            delta_g2_prepared: vk.delta_g2.into(),
            vk,
        }
    }
}

/// Groth16 proving key. Queries are indexed by witness variable except
/// `h_query` (by coefficient of the quotient) and `l_query` (by private
/// variable, i.e. witness index minus the instance size).
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ProvingKey<E: Pairing>
where
    E::ScalarField: SnarkField,
{
    pub vk: VerifyingKey<E>,
    pub beta_g1: E::G1Affine,
    pub delta_g1: E::G1Affine,
    /// `[A_i(τ)]₁`
    pub a_query: Vec<E::G1Affine>,
    /// `[B_i(τ)]₁`
    pub b_g1_query: Vec<E::G1Affine>,
    /// `[B_i(τ)]₂`
    pub b_g2_query: Vec<E::G2Affine>,
    /// `[τ^i·Z(τ) / δ]₁` for `i < n - 1`
    pub h_query: Vec<E::G1Affine>,
    /// `[(β·A_i(τ) + α·B_i(τ) + C_i(τ)) / δ]₁` for private variables
    pub l_query: Vec<E::G1Affine>,
    pub matrices: R1CSMatrices<E::ScalarField>,
}

impl<E: Pairing> ProvingKey<E>
where
    E::ScalarField: SnarkField,
{
    pub fn num_variables(&self) -> usize {
        self.matrices.num_variables
    }

    pub fn num_public(&self) -> usize {
        self.matrices.num_public
    }

    /// Size of the evaluation domain the key was built for.
    pub fn domain_size(&self) -> usize {
        self.h_query.len() + 1
    }
}

/// A Groth16 proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof<E: Pairing> {
    pub a: E::G1Affine,
    pub b: E::G2Affine,
    pub c: E::G1Affine,
}
