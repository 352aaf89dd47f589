use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{FftField, Field, UniformRand};
use rand_core::{CryptoRng, RngCore};
use rayon::prelude::*;

use super::{domain::Radix2Domain, keys::ProvingKey, Proof, ProverOptions};
use crate::{
    field::SnarkField,
    msm::chunked_msm,
    r1cs::witness::Witness,
    utils::{cancel::CancellationToken, errors::ProofError},
};

/// Coefficients of `h(X) = (A(X)·B(X) - C(X)) / Z(X)`. The division happens
/// on a coset of the domain, where `Z` is the non-zero constant `g^n - 1`.
#[tracing::instrument(skip_all, name = "prover::compute_h")]
fn compute_h<F: FftField>(
    pk_domain: &Radix2Domain<F>,
    qap: [Vec<F>; 3],
) -> Vec<F> {
    let [a, b, c] = qap;
    let (mut a, (b, c)) = rayon::join(
        || pk_domain.coset_fft(&pk_domain.ifft(&a)),
        || {
            rayon::join(
                || pk_domain.coset_fft(&pk_domain.ifft(&b)),
                || pk_domain.coset_fft(&pk_domain.ifft(&c)),
            )
        },
    );
    let z_inv = pk_domain
        .evaluate_vanishing_polynomial(pk_domain.coset_offset)
        .inverse()
        .unwrap_or_else(F::zero);
    a.par_iter_mut()
        .zip(b.par_iter())
        .zip(c.par_iter())
        .for_each(|((a, b), c)| *a = (*a * *b - *c) * z_inv);
    let mut h = pk_domain.coset_ifft(&a);
    h.truncate(pk_domain.size - 1);
    h
}

/// Produces a zero-knowledge proof that `witness` satisfies the circuit
/// `pk` was derived for. Fresh blinding factors `r, s` are drawn from `rng`
/// for every call.
#[tracing::instrument(skip_all, name = "Groth16::prove")]
pub fn prove<E: Pairing, R: RngCore + CryptoRng>(
    pk: &ProvingKey<E>,
    witness: &Witness<E::ScalarField>,
    rng: &mut R,
    options: &ProverOptions,
    cancel: &CancellationToken,
) -> Result<Proof<E>, ProofError>
where
    E::ScalarField: SnarkField,
{
    if witness.len() != pk.num_variables() {
        return Err(ProofError::DimensionMismatch {
            expected: pk.num_variables(),
            actual: witness.len(),
        });
    }
    if witness.num_public() != pk.num_public() {
        return Err(ProofError::DimensionMismatch {
            expected: pk.num_public(),
            actual: witness.num_public(),
        });
    }
    if witness.circuit_digest() != pk.matrices.digest {
        return Err(ProofError::CircuitMismatch);
    }
    let w = witness.values();
    if w[0] != E::ScalarField::ONE {
        return Err(ProofError::InvalidWitness);
    }
    let n = pk.domain_size();
    let domain = Radix2Domain::<E::ScalarField>::new(n)
        .filter(|domain| domain.size == n && n >= pk.matrices.num_qap_rows())
        .ok_or_else(|| ProofError::InvalidProvingKey(format!("unsupported domain size {n}")))?;
    if pk.vk.gamma_abc_g1.len() != pk.matrices.num_instance_variables()
        || pk.a_query.len() != w.len()
        || pk.b_g1_query.len() != w.len()
        || pk.b_g2_query.len() != w.len()
        || pk.l_query.len() + pk.matrices.num_instance_variables() != w.len()
    {
        return Err(ProofError::InvalidProvingKey(
            "query lengths do not match the constraint system".to_string(),
        ));
    }

    let qap = pk.matrices.evaluate_qap_rows(w, n);
    let h = compute_h(&domain, qap);
    if cancel.is_cancelled() {
        return Err(ProofError::Cancelled);
    }

    let chunk = options.msm_chunk_size;
    let private = &w[pk.matrices.num_instance_variables()..];
    let a_acc = chunked_msm::<E::G1>(&pk.a_query, w, chunk, cancel)?;
    let b_g1_acc = chunked_msm::<E::G1>(&pk.b_g1_query, w, chunk, cancel)?;
    let b_g2_acc = chunked_msm::<E::G2>(&pk.b_g2_query, w, chunk, cancel)?;
    let l_acc = chunked_msm::<E::G1>(&pk.l_query, private, chunk, cancel)?;
    let h_acc = chunked_msm::<E::G1>(&pk.h_query, &h, chunk, cancel)?;

    let r = E::ScalarField::rand(rng);
    let s = E::ScalarField::rand(rng);
    let delta_g1 = pk.delta_g1.into_group();

    let g_a = a_acc + pk.vk.alpha_g1 + delta_g1 * r;
    let g1_b = b_g1_acc + pk.beta_g1 + delta_g1 * s;
    let g2_b = b_g2_acc + pk.vk.beta_g2 + pk.vk.delta_g2 * s;
    let g_c = l_acc + h_acc + g_a * s + g1_b * r - delta_g1 * (r * s);

    tracing::debug!(num_variables = w.len(), domain_size = n, "proof computed");
    Ok(Proof {
        a: g_a.into_affine(),
        b: g2_b.into_affine(),
        c: g_c.into_affine(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        groth16::{phase1::Phase1Srs, phase2::initialize},
        poseidon2::{Poseidon2, Poseidon2Params},
        r1cs::{poseidon2::PreimageCircuit, witness::WitnessEvaluator},
    };
    use ark_bn254::{Bn254, Fr};
    use crate::groth16::test_rng;

    fn setup() -> (PreimageCircuit<Fr>, ProvingKey<Bn254>) {
        let circuit = PreimageCircuit::build(Poseidon2::bn254()).unwrap();
        let srs = Phase1Srs::<Bn254>::new(8).unwrap();
        let pk = initialize(
            &circuit.constraint_system().to_matrices(),
            &srs,
            &CancellationToken::new(),
        )
        .unwrap();
        (circuit, pk)
    }

    fn witness(circuit: &PreimageCircuit<Fr>) -> Witness<Fr> {
        let preimage = [Fr::from(3u64), Fr::from(4u64)];
        let digest = Poseidon2::bn254().hash(&preimage);
        let mut evaluator = WitnessEvaluator::new(circuit.constraint_system());
        evaluator
            .assign_all(&circuit.assignment(preimage, digest))
            .unwrap();
        evaluator.evaluate().unwrap()
    }

    #[test]
    fn h_divides_exactly() {
        let (circuit, pk) = setup();
        let witness = witness(&circuit);
        let domain = Radix2Domain::<Fr>::new(pk.domain_size()).unwrap();
        let h = compute_h(&domain, pk.matrices.evaluate_qap_rows(witness.values(), domain.size));
        assert_eq!(h.len(), domain.size - 1);

        // A(x)·B(x) - C(x) = h(x)·Z(x) at a point outside the domain
        let [a, b, c] = pk.matrices.evaluate_qap_rows(witness.values(), domain.size);
        let x = Fr::from(7u64);
        let eval = |evals: &[Fr]| {
            domain
                .ifft(evals)
                .iter()
                .rev()
                .fold(Fr::from(0u64), |acc, coeff| acc * x + coeff)
        };
        let h_x = h.iter().rev().fold(Fr::from(0u64), |acc, coeff| acc * x + coeff);
        assert_eq!(
            eval(&a) * eval(&b) - eval(&c),
            h_x * domain.evaluate_vanishing_polynomial(x)
        );
    }

    #[test]
    fn wrong_witness_length() {
        let (_, pk) = setup();
        let witness = Witness::from_values(vec![Fr::from(1u64); 10], 1, pk.matrices.digest);
        let result = prove(
            &pk,
            &witness,
            &mut test_rng(),
            &ProverOptions::default(),
            &CancellationToken::new(),
        );
        assert_eq!(
            result,
            Err(ProofError::DimensionMismatch {
                expected: 244,
                actual: 10
            })
        );
    }

    #[test]
    fn constant_slot_must_be_one() {
        let (circuit, pk) = setup();
        let mut values = witness(&circuit).values().to_vec();
        values[0] = Fr::from(2u64);
        let witness = Witness::from_values(values, 1, pk.matrices.digest);
        let result = prove(
            &pk,
            &witness,
            &mut test_rng(),
            &ProverOptions::default(),
            &CancellationToken::new(),
        );
        assert_eq!(result, Err(ProofError::InvalidWitness));
    }

    #[test]
    fn key_without_ic_is_rejected() {
        let (circuit, mut pk) = setup();
        pk.vk.gamma_abc_g1.clear();
        let result = prove(
            &pk,
            &witness(&circuit),
            &mut test_rng(),
            &ProverOptions::default(),
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(ProofError::InvalidProvingKey(_))));
    }

    #[test]
    fn witness_of_another_circuit_is_rejected() {
        let (_, pk) = setup();
        // Same shape, one round constant changed
        let mut params = Poseidon2Params::generate();
        params.internal_round_constants[0] += Fr::from(1u64);
        let poseidon = Poseidon2::new(params);
        let foreign = PreimageCircuit::build(&poseidon).unwrap();
        assert_eq!(foreign.constraint_system().num_variables(), pk.num_variables());

        let preimage = [Fr::from(3u64), Fr::from(4u64)];
        let mut evaluator = WitnessEvaluator::new(foreign.constraint_system());
        evaluator
            .assign_all(&foreign.assignment(preimage, poseidon.hash(&preimage)))
            .unwrap();
        let witness = evaluator.evaluate().unwrap();

        let result = prove(
            &pk,
            &witness,
            &mut test_rng(),
            &ProverOptions::default(),
            &CancellationToken::new(),
        );
        assert_eq!(result, Err(ProofError::CircuitMismatch));
    }

    #[test]
    fn cancelled_before_msm() {
        let (circuit, pk) = setup();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = prove(
            &pk,
            &witness(&circuit),
            &mut test_rng(),
            &ProverOptions::default(),
            &cancel,
        );
        assert_eq!(result, Err(ProofError::Cancelled));
    }
}
