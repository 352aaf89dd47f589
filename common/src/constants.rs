/// State width of the Poseidon2 permutation.
pub const POSEIDON2_WIDTH: usize = 3;
/// Number of full rounds, split evenly before and after the partial rounds.
pub const POSEIDON2_FULL_ROUNDS: usize = 8;
pub const POSEIDON2_PARTIAL_ROUNDS: usize = 56;
pub const POSEIDON2_SBOX_DEGREE: u64 = 5;
/// Sponge rate of the fixed-length hash. The remaining lane is capacity.
pub const POSEIDON2_RATE: usize = 2;

/// Number of field elements in a preimage.
pub const PREIMAGE_LEN: usize = 2;

/// log2 of the default powers-of-tau domain. 2^8 rows fit the 241 preimage
/// constraints plus the instance rows.
pub const DEFAULT_SETUP_POWER: usize = 8;
/// Largest powers-of-tau domain supported, bounded by the two-adicity of BN254 Fr.
pub const MAX_SETUP_POWER: usize = 28;

pub const DEFAULT_MSM_CHUNK_SIZE: usize = 1 << 12;
/// Beacon hashing rounds are `2^exp`; snarkjs uses 10 in its examples.
pub const DEFAULT_BEACON_ITERATIONS_EXP: u32 = 10;

pub const PROTOCOL_NAME: &str = "groth16";
pub const CURVE_NAME: &str = "bn128";

pub const WTNS_MAGIC: &[u8; 4] = b"wtns";
pub const WTNS_VERSION: u32 = 2;
pub const WTNS_FIELD_BYTES: u32 = 32;

pub const VERIFICATION_KEY_FILE: &str = "verification_key.json";
pub const PROVING_KEY_FILE: &str = "proving_key.bin";
pub const PROOF_FILE: &str = "proof.json";
pub const PUBLIC_SIGNALS_FILE: &str = "public.json";
/// Proof and public signals in one document.
pub const PROOF_WITH_SIGNALS_FILE: &str = "proof_with_public.json";
pub const WITNESS_FILE: &str = "witness.wtns";
