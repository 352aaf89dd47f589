use common::constants::{
    DEFAULT_BEACON_ITERATIONS_EXP, DEFAULT_MSM_CHUNK_SIZE, DEFAULT_SETUP_POWER,
};
use eyre::WrapErr;
use preimage_core::{
    groth16::{ProverOptions, SetupOptions},
    r1cs::witness::WitnessOptions,
};
use serde::{Deserialize, Serialize};

/// Knobs of the in-process pipeline. Stored as JSON through
/// [`common::serializable::Serializable`]; missing fields take their
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// The phase-1 SRS supports circuits of up to `2^setup_power` QAP rows.
    pub setup_power: usize,
    pub phase1_contributions: usize,
    pub phase2_contributions: usize,
    /// Hex-encoded beacon applied after the random phase-1 contributions.
    pub beacon: Option<String>,
    pub beacon_iterations_exp: u32,
    pub witness: WitnessOptions,
    pub msm_chunk_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            setup_power: DEFAULT_SETUP_POWER,
            phase1_contributions: 1,
            phase2_contributions: 1,
            beacon: None,
            beacon_iterations_exp: DEFAULT_BEACON_ITERATIONS_EXP,
            witness: WitnessOptions::default(),
            msm_chunk_size: DEFAULT_MSM_CHUNK_SIZE,
        }
    }
}

impl PipelineConfig {
    pub fn setup_options(&self) -> SetupOptions {
        SetupOptions {
            msm_chunk_size: self.msm_chunk_size,
        }
    }

    pub fn prover_options(&self) -> ProverOptions {
        ProverOptions {
            msm_chunk_size: self.msm_chunk_size,
        }
    }

    pub fn beacon_bytes(&self) -> eyre::Result<Option<Vec<u8>>> {
        self.beacon
            .as_deref()
            .map(|beacon| hex::decode(beacon).wrap_err("beacon is not valid hex"))
            .transpose()
    }
}
