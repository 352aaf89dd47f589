//! In-process driver: trusted setup, witness generation, proving,
//! verification and the snarkjs-compatible artifact files.

use std::{fs::File, io::BufWriter, path::Path};

use ark_bn254::{Bn254, Fr};
use common::{
    constants::{
        PREIMAGE_LEN, PROOF_FILE, PROOF_WITH_SIGNALS_FILE, PROVING_KEY_FILE, PUBLIC_SIGNALS_FILE,
        VERIFICATION_KEY_FILE, WITNESS_FILE,
    },
    serializable::{CanonicalFile, Serializable},
};
use eyre::{ensure, WrapErr};
use preimage_core::{
    formats::{
        decode_public_signals, encode_public_signals, read_wtns, write_wtns, ProofJson,
        ProofWithSignalsJson, VerificationKeyJson,
    },
    groth16::{
        phase2, prove, verify_initial_key, verify_prepared, Ceremony, Phase1Srs, PreparedVerifyingKey, Proof,
        ProvingKey, VerifyingKey,
    },
    poseidon2::Poseidon2,
    r1cs::{
        poseidon2::PreimageCircuit,
        witness::{Witness, WitnessEvaluator},
    },
    utils::{cancel::CancellationToken, errors::SnarkError},
};
use rand::{CryptoRng, RngCore};

use crate::config::PipelineConfig;

/// Poseidon2 digest of a two-element preimage.
pub fn digest(preimage: [Fr; PREIMAGE_LEN]) -> Fr {
    Poseidon2::bn254().hash(&preimage)
}

/// A built circuit together with keys from a completed setup.
pub struct PreimagePipeline {
    config: PipelineConfig,
    circuit: PreimageCircuit<Fr>,
    proving_key: ProvingKey<Bn254>,
    prepared_vk: PreparedVerifyingKey<Bn254>,
}

impl PreimagePipeline {
    /// Runs both ceremony phases with the configured number of random
    /// contributions, applies the beacon if one is set and replays every
    /// transcript before accepting the keys.
    #[tracing::instrument(skip_all, name = "PreimagePipeline::setup")]
    pub fn setup<R: RngCore + CryptoRng>(config: PipelineConfig, rng: &mut R) -> eyre::Result<Self> {
        let beacon = config.beacon_bytes()?;
        let circuit = PreimageCircuit::build(Poseidon2::bn254())?;
        let cancel = CancellationToken::new();
        let options = config.setup_options();

        let mut phase1 = Ceremony::new(Phase1Srs::<Bn254>::new(config.setup_power)?);
        for _ in 0..config.phase1_contributions {
            phase1.contribute(rng, &options, &cancel)?;
        }
        if let Some(beacon) = beacon {
            phase1.apply_beacon(&beacon, config.beacon_iterations_exp, &options)?;
        }
        phase1.verify_transcript()?;

        let matrices = circuit.constraint_system().to_matrices();
        let mut phase2 = Ceremony::new(phase2::initialize(&matrices, phase1.current(), &cancel)?);
        for _ in 0..config.phase2_contributions {
            phase2.contribute(rng, &options, &cancel)?;
        }
        verify_initial_key(phase2.initial(), &matrices, phase1.current(), &cancel)?;
        phase2.verify_transcript()?;
        tracing::info!(
            phase1_contributions = phase1.num_contributions(),
            phase2_contributions = phase2.num_contributions(),
            "trusted setup complete"
        );
        Ok(Self::from_parts(config, circuit, phase2.into_current()))
    }

    /// Reuses a proving key from an earlier setup. The key must have been
    /// derived from this circuit.
    pub fn with_proving_key(config: PipelineConfig, proving_key: ProvingKey<Bn254>) -> eyre::Result<Self> {
        let circuit = PreimageCircuit::build(Poseidon2::bn254())?;
        ensure!(
            proving_key.vk.circuit_digest == circuit.constraint_system().digest(),
            "proving key was derived from a different circuit"
        );
        Ok(Self::from_parts(config, circuit, proving_key))
    }

    fn from_parts(
        config: PipelineConfig,
        circuit: PreimageCircuit<Fr>,
        proving_key: ProvingKey<Bn254>,
    ) -> Self {
        let prepared_vk = PreparedVerifyingKey::from(proving_key.vk.clone());
        Self {
            config,
            circuit,
            proving_key,
            prepared_vk,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn circuit(&self) -> &PreimageCircuit<Fr> {
        &self.circuit
    }

    pub fn proving_key(&self) -> &ProvingKey<Bn254> {
        &self.proving_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.proving_key.vk
    }

    /// Assigns `preimage` and its digest and evaluates the remaining
    /// variables.
    pub fn witness(&self, preimage: [Fr; PREIMAGE_LEN]) -> Result<Witness<Fr>, SnarkError> {
        let mut evaluator =
            WitnessEvaluator::with_options(self.circuit.constraint_system(), self.config.witness);
        evaluator.assign_all(&self.circuit.assignment(preimage, digest(preimage)))?;
        Ok(evaluator.evaluate()?)
    }

    /// Proves knowledge of `preimage`; returns the proof and the public
    /// signals (the digest).
    pub fn prove<R: RngCore + CryptoRng>(
        &self,
        preimage: [Fr; PREIMAGE_LEN],
        rng: &mut R,
    ) -> Result<(Proof<Bn254>, Vec<Fr>), SnarkError> {
        self.prove_with_cancel(preimage, rng, &CancellationToken::new())
    }

    /// Like [`Self::prove`], aborting with `ProofError::Cancelled` once
    /// `cancel` fires. The token only affects this call.
    #[tracing::instrument(skip_all, name = "PreimagePipeline::prove")]
    pub fn prove_with_cancel<R: RngCore + CryptoRng>(
        &self,
        preimage: [Fr; PREIMAGE_LEN],
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> Result<(Proof<Bn254>, Vec<Fr>), SnarkError> {
        let witness = self.witness(preimage)?;
        let proof = prove(
            &self.proving_key,
            &witness,
            rng,
            &self.config.prover_options(),
            cancel,
        )?;
        Ok((proof, witness.public_signals()))
    }

    pub fn verify(&self, public_signals: &[Fr], proof: &Proof<Bn254>) -> Result<bool, SnarkError> {
        Ok(verify_prepared(&self.prepared_vk, public_signals, proof)?)
    }

    /// Reads a witness file written for this circuit; `.wtns` records
    /// neither the public count nor the circuit, both come from `self`.
    pub fn read_witness(&self, path: &Path) -> eyre::Result<Witness<Fr>> {
        let cs = self.circuit.constraint_system();
        let file = File::open(path).wrap_err_with(|| format!("failed to open {}", path.display()))?;
        let values = read_wtns(std::io::BufReader::new(file))?;
        ensure!(
            values.len() == cs.num_variables(),
            "witness holds {} values, the circuit has {} variables",
            values.len(),
            cs.num_variables()
        );
        Ok(Witness::from_values(values, cs.num_public(), cs.digest()))
    }

    /// Writes the proving key (binary) and the verification key, proof,
    /// public signals and witness in snarkjs formats into `dir`, plus the
    /// proof and its signals combined in one JSON document.
    pub fn write_artifacts(
        &self,
        dir: &Path,
        proof: &Proof<Bn254>,
        witness: &Witness<Fr>,
    ) -> eyre::Result<()> {
        self.proving_key
            .write_to_file(&dir.join(PROVING_KEY_FILE))
            .wrap_err("failed to write proving key")?;
        VerificationKeyJson::from_key(self.verifying_key())
            .serialize_to_file(&dir.join(VERIFICATION_KEY_FILE))
            .wrap_err("failed to write verification key")?;
        ProofJson::from_proof(proof)
            .serialize_to_file(&dir.join(PROOF_FILE))
            .wrap_err("failed to write proof")?;
        encode_public_signals(&witness.public_signals())
            .serialize_to_file(&dir.join(PUBLIC_SIGNALS_FILE))
            .wrap_err("failed to write public signals")?;
        ProofWithSignalsJson::new(proof, &witness.public_signals())
            .serialize_to_file(&dir.join(PROOF_WITH_SIGNALS_FILE))
            .wrap_err("failed to write proof with public signals")?;
        let file = File::create(dir.join(WITNESS_FILE)).wrap_err("failed to create witness file")?;
        write_wtns(witness.values(), BufWriter::new(file))?;
        tracing::info!(dir = %dir.display(), "artifacts written");
        Ok(())
    }
}

pub fn read_proving_key(path: &Path) -> eyre::Result<ProvingKey<Bn254>> {
    ProvingKey::read_from_file(path)
        .wrap_err_with(|| format!("failed to read proving key from {}", path.display()))
}

pub fn read_verification_key(path: &Path) -> eyre::Result<VerifyingKey<Bn254>> {
    let json = VerificationKeyJson::deserialize_from_file(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(json.to_key()?)
}

pub fn read_proof(path: &Path) -> eyre::Result<Proof<Bn254>> {
    let json = ProofJson::deserialize_from_file(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(json.to_proof()?)
}

pub fn read_public_signals(path: &Path) -> eyre::Result<Vec<Fr>> {
    let signals = Vec::<String>::deserialize_from_file(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(decode_public_signals(&signals)?)
}

/// Reads the combined `{ proof, publicSignals }` document.
pub fn read_proof_with_signals(path: &Path) -> eyre::Result<(Proof<Bn254>, Vec<Fr>)> {
    let json = ProofWithSignalsJson::deserialize_from_file(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(json.decode()?)
}

/// Verifies the proof stored in `dir` against the verification key and
/// public signals stored next to it.
#[tracing::instrument(skip_all, name = "verify_artifacts")]
pub fn verify_artifacts(dir: &Path) -> eyre::Result<bool> {
    let vk = read_verification_key(&dir.join(VERIFICATION_KEY_FILE))?;
    let proof = read_proof(&dir.join(PROOF_FILE))?;
    let public_signals = read_public_signals(&dir.join(PUBLIC_SIGNALS_FILE))?;
    let pvk = PreparedVerifyingKey::from(vk);
    Ok(verify_prepared(&pvk, &public_signals, &proof)?)
}

/// Verifies a combined proof document against a verification key file.
#[tracing::instrument(skip_all, name = "verify_proof_with_signals")]
pub fn verify_proof_with_signals(vk_path: &Path, proof_path: &Path) -> eyre::Result<bool> {
    let vk = read_verification_key(vk_path)?;
    let (proof, public_signals) = read_proof_with_signals(proof_path)?;
    let pvk = PreparedVerifyingKey::from(vk);
    Ok(verify_prepared(&pvk, &public_signals, &proof)?)
}
