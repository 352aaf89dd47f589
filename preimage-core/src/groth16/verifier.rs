use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, VariableBaseMSM};
use ark_serialize::Valid;

use super::keys::{PreparedVerifyingKey, Proof, VerifyingKey};
use crate::utils::errors::VerificationInputError;

/// Checks `proof` against `vk` for the given public signals. A proof that
/// fails the pairing equation yields `Ok(false)`; errors are reserved for
/// inputs that cannot be checked at all.
pub fn verify<E: Pairing>(
    vk: &VerifyingKey<E>,
    public_signals: &[E::ScalarField],
    proof: &Proof<E>,
) -> Result<bool, VerificationInputError> {
    let pvk = PreparedVerifyingKey::from(vk.clone());
    verify_prepared(&pvk, public_signals, proof)
}

#[tracing::instrument(skip_all, name = "Groth16::verify")]
pub fn verify_prepared<E: Pairing>(
    pvk: &PreparedVerifyingKey<E>,
    public_signals: &[E::ScalarField],
    proof: &Proof<E>,
) -> Result<bool, VerificationInputError> {
    let Some((ic_one, ic_public)) = pvk.vk.gamma_abc_g1.split_first() else {
        return Err(VerificationInputError::MalformedVerifyingKey(
            "IC holds no base for the constant one".to_string(),
        ));
    };
    let expected = ic_public.len();
    if public_signals.len() != expected {
        return Err(VerificationInputError::SignalCountMismatch {
            expected,
            actual: public_signals.len(),
        });
    }
    pvk.vk
        .check()
        .map_err(|err| VerificationInputError::MalformedVerifyingKey(err.to_string()))?;
    proof
        .check()
        .map_err(|err| VerificationInputError::MalformedProof(err.to_string()))?;

    let vk_x = E::G1::msm_unchecked(ic_public, public_signals) + *ic_one;

    let lhs = E::multi_pairing(
        [
            proof.a,
            (-vk_x).into_affine(),
            (-proof.c.into_group()).into_affine(),
        ],
        [
            E::G2Prepared::from(proof.b),
            pvk.gamma_g2_prepared.clone(),
            pvk.delta_g2_prepared.clone(),
        ],
    );
    let accepted = lhs == pvk.alpha_g1_beta_g2;
    tracing::debug!(accepted, "pairing check evaluated");
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Bn254, Fr, G1Affine, G2Affine};
    use ark_ff::MontFp;

    fn trivial_vk() -> VerifyingKey<Bn254> {
        VerifyingKey {
            alpha_g1: G1Affine::generator(),
            beta_g2: G2Affine::generator(),
            gamma_g2: G2Affine::generator(),
            delta_g2: G2Affine::generator(),
            gamma_abc_g1: vec![G1Affine::generator(); 2],
            circuit_digest: [0; 32],
        }
    }

    #[test]
    fn signal_count_is_checked() {
        let proof = Proof::<Bn254> {
            a: G1Affine::generator(),
            b: G2Affine::generator(),
            c: G1Affine::generator(),
        };
        assert_eq!(
            verify(&trivial_vk(), &[], &proof),
            Err(VerificationInputError::SignalCountMismatch {
                expected: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn empty_ic_is_malformed() {
        let mut vk = trivial_vk();
        vk.gamma_abc_g1.clear();
        let proof = Proof::<Bn254> {
            a: G1Affine::generator(),
            b: G2Affine::generator(),
            c: G1Affine::generator(),
        };
        for signals in [&[][..], &[Fr::from(1u64)][..]] {
            assert!(matches!(
                verify(&vk, signals, &proof),
                Err(VerificationInputError::MalformedVerifyingKey(_))
            ));
        }
    }

    #[test]
    fn off_curve_point_is_malformed() {
        let proof = Proof::<Bn254> {
            a: G1Affine::new_unchecked(MontFp!("1"), MontFp!("1")),
            b: G2Affine::generator(),
            c: G1Affine::generator(),
        };
        assert!(matches!(
            verify(&trivial_vk(), &[Fr::from(1u64)], &proof),
            Err(VerificationInputError::MalformedProof(_))
        ));
    }

    #[test]
    fn off_curve_key_is_malformed() {
        let mut vk = trivial_vk();
        vk.gamma_abc_g1[1] = G1Affine::new_unchecked(MontFp!("1"), MontFp!("1"));
        let proof = Proof::<Bn254> {
            a: G1Affine::generator(),
            b: G2Affine::generator(),
            c: G1Affine::generator(),
        };
        assert!(matches!(
            verify(&vk, &[Fr::from(1u64)], &proof),
            Err(VerificationInputError::MalformedVerifyingKey(_))
        ));
    }

    #[test]
    fn bogus_proof_is_rejected() {
        let proof = Proof::<Bn254> {
            a: G1Affine::generator(),
            b: G2Affine::generator(),
            c: G1Affine::generator(),
        };
        assert_eq!(verify(&trivial_vk(), &[Fr::from(1u64)], &proof), Ok(false));
    }
}
