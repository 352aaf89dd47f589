#![allow(clippy::too_long_first_doc_paragraph)]

//! Zero-knowledge proofs of knowledge of a Poseidon2 preimage, using Groth16
//! over BN254.

pub use preimage_core::{
    field, formats, groth16, poseidon2, r1cs,
    utils::{cancel::CancellationToken, errors},
};

pub mod config;
pub mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::PreimagePipeline;

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, defaulting to
/// `info`. Fails if a subscriber is already installed.
pub fn init_logging() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .compact()
        .with_target(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| eyre::eyre!(err))
}
