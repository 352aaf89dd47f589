//! Interchange formats compatible with the circom/snarkjs tool chain.

pub mod json;
pub mod wtns;

pub use json::{
    decode_public_signals, encode_public_signals, ProofJson, ProofWithSignalsJson,
    VerificationKeyJson,
};
pub use wtns::{read_wtns, write_wtns};
