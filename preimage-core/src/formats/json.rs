//! snarkjs JSON encodings of BN254 verification keys, proofs and public
//! signals. Every coordinate is a decimal string; points are projective
//! triples with `z = 1`, or `z = 0` for the point at infinity.

use ark_bn254::{Bn254, Fq, Fq12, Fq2, Fr, G1Affine, G2Affine};
use ark_ec::{
    pairing::Pairing,
    short_weierstrass::{Affine, SWCurveConfig},
    AffineRepr,
};
use common::constants::{CURVE_NAME, PROTOCOL_NAME};
use serde::{Deserialize, Serialize};

use crate::{
    field::{
        ark::{prime_from_decimal, prime_to_decimal},
        SnarkField,
    },
    groth16::{Proof, VerifyingKey},
    utils::errors::EncodingError,
};

pub type G1Json = [String; 3];
pub type G2Json = [[String; 2]; 3];

fn fq2_to_json(value: &Fq2) -> [String; 2] {
    [prime_to_decimal(&value.c0), prime_to_decimal(&value.c1)]
}

fn fq2_from_json(value: &[String; 2]) -> Result<Fq2, EncodingError> {
    Ok(Fq2::new(
        prime_from_decimal(&value[0])?,
        prime_from_decimal(&value[1])?,
    ))
}

pub fn g1_to_json(point: &G1Affine) -> G1Json {
    match point.xy() {
        Some((x, y)) => [prime_to_decimal(&x), prime_to_decimal(&y), "1".to_string()],
        None => ["0".to_string(), "1".to_string(), "0".to_string()],
    }
}

pub fn g2_to_json(point: &G2Affine) -> G2Json {
    match point.xy() {
        Some((x, y)) => [
            fq2_to_json(&x),
            fq2_to_json(&y),
            ["1".to_string(), "0".to_string()],
        ],
        None => [
            ["0".to_string(), "0".to_string()],
            ["1".to_string(), "0".to_string()],
            ["0".to_string(), "0".to_string()],
        ],
    }
}

fn check_point<P: SWCurveConfig>(point: Affine<P>) -> Result<Affine<P>, EncodingError> {
    if !point.is_on_curve() {
        return Err(EncodingError::PointNotOnCurve);
    }
    if !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(EncodingError::PointNotInSubgroup);
    }
    Ok(point)
}

fn unexpected(field: &'static str, expected: &str, actual: impl ToString) -> EncodingError {
    EncodingError::UnexpectedValue {
        field,
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

pub fn g1_from_json(value: &G1Json) -> Result<G1Affine, EncodingError> {
    match value[2].as_str() {
        "0" => Ok(G1Affine::zero()),
        "1" => {
            let x: Fq = prime_from_decimal(&value[0])?;
            let y: Fq = prime_from_decimal(&value[1])?;
            check_point(G1Affine::new_unchecked(x, y))
        }
        other => Err(unexpected("G1 z coordinate", "0 or 1", other)),
    }
}

pub fn g2_from_json(value: &G2Json) -> Result<G2Affine, EncodingError> {
    let z = fq2_from_json(&value[2])?;
    if z == Fq2::from(0u64) {
        return Ok(G2Affine::zero());
    }
    if z != Fq2::from(1u64) {
        return Err(unexpected("G2 z coordinate", "[0, 0] or [1, 0]", value[2].join(", ")));
    }
    let x = fq2_from_json(&value[0])?;
    let y = fq2_from_json(&value[1])?;
    check_point(G2Affine::new_unchecked(x, y))
}

fn check_header(protocol: &str, curve: &str) -> Result<(), EncodingError> {
    if protocol != PROTOCOL_NAME {
        return Err(unexpected("protocol", PROTOCOL_NAME, protocol));
    }
    if curve != CURVE_NAME {
        return Err(unexpected("curve", CURVE_NAME, curve));
    }
    Ok(())
}

/// Layout of `verification_key.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKeyJson {
    pub protocol: String,
    pub curve: String,
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    pub vk_alpha_1: G1Json,
    pub vk_beta_2: G2Json,
    pub vk_gamma_2: G2Json,
    pub vk_delta_2: G2Json,
    /// `e(α, β)`; informational, recomputed on decoding.
    pub vk_alphabeta_12: [[[String; 2]; 3]; 2],
    #[serde(rename = "IC")]
    pub ic: Vec<G1Json>,
    /// Hex digest of the constraint system, absent in keys produced by
    /// other tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_digest: Option<String>,
}

fn fq12_to_json(value: &Fq12) -> [[[String; 2]; 3]; 2] {
    [value.c0, value.c1].map(|fq6| [fq6.c0, fq6.c1, fq6.c2].map(|fq2| fq2_to_json(&fq2)))
}

impl VerificationKeyJson {
    pub fn from_key(vk: &VerifyingKey<Bn254>) -> Self {
        let alpha_beta = Bn254::pairing(vk.alpha_g1, vk.beta_g2);
        Self {
            protocol: PROTOCOL_NAME.to_string(),
            curve: CURVE_NAME.to_string(),
            n_public: vk.num_public(),
            vk_alpha_1: g1_to_json(&vk.alpha_g1),
            vk_beta_2: g2_to_json(&vk.beta_g2),
            vk_gamma_2: g2_to_json(&vk.gamma_g2),
            vk_delta_2: g2_to_json(&vk.delta_g2),
            vk_alphabeta_12: fq12_to_json(&alpha_beta.0),
            ic: vk.gamma_abc_g1.iter().map(g1_to_json).collect(),
            circuit_digest: Some(hex::encode(vk.circuit_digest)),
        }
    }

    pub fn to_key(&self) -> Result<VerifyingKey<Bn254>, EncodingError> {
        check_header(&self.protocol, &self.curve)?;
        if self.ic.len() != self.n_public + 1 {
            return Err(unexpected(
                "IC length",
                &(self.n_public + 1).to_string(),
                self.ic.len(),
            ));
        }
        let circuit_digest = match &self.circuit_digest {
            Some(digest) => {
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(digest, &mut bytes)
                    .map_err(|_| unexpected("circuit digest", "64 hex digits", digest))?;
                bytes
            }
            None => [0u8; 32],
        };
        Ok(VerifyingKey {
            alpha_g1: g1_from_json(&self.vk_alpha_1)?,
            beta_g2: g2_from_json(&self.vk_beta_2)?,
            gamma_g2: g2_from_json(&self.vk_gamma_2)?,
            delta_g2: g2_from_json(&self.vk_delta_2)?,
            gamma_abc_g1: self.ic.iter().map(g1_from_json).collect::<Result<_, _>>()?,
            circuit_digest,
        })
    }
}

/// Layout of `proof.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofJson {
    pub pi_a: G1Json,
    pub pi_b: G2Json,
    pub pi_c: G1Json,
    pub protocol: String,
    pub curve: String,
}

impl ProofJson {
    pub fn from_proof(proof: &Proof<Bn254>) -> Self {
        Self {
            pi_a: g1_to_json(&proof.a),
            pi_b: g2_to_json(&proof.b),
            pi_c: g1_to_json(&proof.c),
            protocol: PROTOCOL_NAME.to_string(),
            curve: CURVE_NAME.to_string(),
        }
    }

    pub fn to_proof(&self) -> Result<Proof<Bn254>, EncodingError> {
        check_header(&self.protocol, &self.curve)?;
        Ok(Proof {
            a: g1_from_json(&self.pi_a)?,
            b: g2_from_json(&self.pi_b)?,
            c: g1_from_json(&self.pi_c)?,
        })
    }
}

/// The proof together with its public signals in one document, as
/// `{ "proof": { .. }, "publicSignals": [ .. ] }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofWithSignalsJson {
    pub proof: ProofJson,
    #[serde(rename = "publicSignals")]
    pub public_signals: Vec<String>,
}

impl ProofWithSignalsJson {
    pub fn new(proof: &Proof<Bn254>, public_signals: &[Fr]) -> Self {
        Self {
            proof: ProofJson::from_proof(proof),
            public_signals: encode_public_signals(public_signals),
        }
    }

    pub fn decode(&self) -> Result<(Proof<Bn254>, Vec<Fr>), EncodingError> {
        Ok((
            self.proof.to_proof()?,
            decode_public_signals(&self.public_signals)?,
        ))
    }
}

/// `public.json` is a bare array of decimal strings.
pub fn encode_public_signals(signals: &[Fr]) -> Vec<String> {
    signals.iter().map(|s| s.to_decimal()).collect()
}

pub fn decode_public_signals(signals: &[String]) -> Result<Vec<Fr>, EncodingError> {
    signals.iter().map(|s| Fr::from_decimal(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::CurveGroup;
    use ark_std::{test_rng, UniformRand};

    fn random_vk() -> VerifyingKey<Bn254> {
        let mut rng = test_rng();
        VerifyingKey {
            alpha_g1: G1Affine::rand(&mut rng),
            beta_g2: G2Affine::rand(&mut rng),
            gamma_g2: G2Affine::generator(),
            delta_g2: G2Affine::rand(&mut rng),
            gamma_abc_g1: vec![G1Affine::rand(&mut rng), G1Affine::zero()],
            circuit_digest: [7; 32],
        }
    }

    #[test]
    fn generator_encoding() {
        assert_eq!(g1_to_json(&G1Affine::generator()), ["1", "2", "1"]);
        assert_eq!(g1_to_json(&G1Affine::zero()), ["0", "1", "0"]);
        assert_eq!(g2_from_json(&g2_to_json(&G2Affine::zero())).unwrap(), G2Affine::zero());
    }

    #[test]
    fn verification_key_json() {
        let vk = random_vk();
        let json = VerificationKeyJson::from_key(&vk);
        assert_eq!(json.n_public, 1);
        assert_eq!(json.vk_gamma_2[2], ["1", "0"]);

        let text = serde_json::to_string(&json).unwrap();
        assert!(text.contains("\"nPublic\":1"));
        assert!(text.contains("\"IC\""));
        let parsed: VerificationKeyJson = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.to_key().unwrap(), vk);
    }

    #[test]
    fn rejects_foreign_headers() {
        let mut json = ProofJson::from_proof(&Proof {
            a: G1Affine::generator(),
            b: G2Affine::generator(),
            c: G1Affine::generator(),
        });
        json.curve = "bls12381".to_string();
        assert!(matches!(
            json.to_proof(),
            Err(EncodingError::UnexpectedValue { field: "curve", .. })
        ));
    }

    #[test]
    fn rejects_invalid_points() {
        let off_curve = ["1".to_string(), "1".to_string(), "1".to_string()];
        assert!(matches!(g1_from_json(&off_curve), Err(EncodingError::PointNotOnCurve)));

        // BN254 G2 has a cofactor: a random point on the twist is almost
        // never in the prime-order subgroup.
        let mut rng = test_rng();
        let point = loop {
            let x = Fq2::rand(&mut rng);
            if let Some(p) = G2Affine::get_point_from_x_unchecked(x, false) {
                break p;
            }
        };
        assert!(point.is_on_curve());
        assert!(matches!(
            g2_from_json(&g2_to_json(&point)),
            Err(EncodingError::PointNotInSubgroup)
        ));

        let non_canonical = [
            "21888242871839275222246405745257275088696311157297823662689037894645226208584"
                .to_string(),
            "2".to_string(),
            "1".to_string(),
        ];
        assert!(matches!(
            g1_from_json(&non_canonical),
            Err(EncodingError::NonCanonical(_))
        ));
        let double = (G1Affine::generator() * Fr::from(2u64)).into_affine();
        assert_eq!(g1_from_json(&g1_to_json(&double)).unwrap(), double);
    }

    #[test]
    fn proof_with_signals_json() {
        let proof = Proof::<Bn254> {
            a: G1Affine::generator(),
            b: G2Affine::generator(),
            c: (G1Affine::generator() * Fr::from(3u64)).into_affine(),
        };
        let bundle = ProofWithSignalsJson::new(&proof, &[Fr::from(42u64)]);
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["publicSignals"], serde_json::json!(["42"]));
        assert_eq!(value["proof"]["protocol"], "groth16");
        assert_eq!(value["proof"]["pi_a"], serde_json::json!(["1", "2", "1"]));

        let parsed: ProofWithSignalsJson = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.decode().unwrap(), (proof, vec![Fr::from(42u64)]));

        let mut bad = bundle;
        bad.public_signals.push("not a number".to_string());
        assert!(bad.decode().is_err());
    }

    #[test]
    fn public_signals() {
        let signals = vec![Fr::from(3u64), -Fr::from(1u64)];
        let encoded = encode_public_signals(&signals);
        assert_eq!(encoded[0], "3");
        assert_eq!(decode_public_signals(&encoded).unwrap(), signals);
        assert!(decode_public_signals(&["abc".to_string()]).is_err());
    }
}
