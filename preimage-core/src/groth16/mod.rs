//! Groth16 over a pairing-friendly curve: the two-phase setup ceremony,
//! proving and verification.

use common::constants::DEFAULT_MSM_CHUNK_SIZE;
use serde::{Deserialize, Serialize};

pub mod ceremony;
pub mod domain;
pub mod keys;
pub mod phase1;
pub mod phase2;
pub mod pok;
pub mod prover;
pub mod verifier;


/// Same seeded `StdRng` as `ark_std::test_rng()`, but exposed as a concrete
/// type so it satisfies the `CryptoRng` bound on the setup/prover APIs.
#[cfg(test)]
pub(crate) fn test_rng() -> rand::rngs::StdRng {
    use rand::SeedableRng;
    let seed = [
        1, 0, 0, 0, 23, 0, 0, 0, 200, 1, 0, 0, 210, 30, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0,
    ];
    rand::rngs::StdRng::from_seed(seed)
}

pub use ceremony::{Ceremony, Contribute};
pub use keys::{PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
pub use phase1::{Phase1Contribution, Phase1Srs};
pub use phase2::{verify_initial_key, Phase2Contribution};
pub use prover::prove;
pub use verifier::{verify, verify_prepared};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupOptions {
    /// Number of bases each rayon task rescales before checking for
    /// cancellation.
    pub msm_chunk_size: usize,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            msm_chunk_size: DEFAULT_MSM_CHUNK_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverOptions {
    pub msm_chunk_size: usize,
}

impl Default for ProverOptions {
    fn default() -> Self {
        Self {
            msm_chunk_size: DEFAULT_MSM_CHUNK_SIZE,
        }
    }
}
