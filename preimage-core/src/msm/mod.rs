use ark_ec::CurveGroup;
use rayon::prelude::*;

use crate::utils::{cancel::CancellationToken, errors::MsmError};

/// Variable-base MSM split into chunks of `chunk_size` bases. Chunks run on
/// the rayon pool and are reduced by summation once all of them finished;
/// the token is polled before each chunk starts.
#[tracing::instrument(skip_all, name = "msm::chunked_msm", fields(len = bases.len()))]
pub fn chunked_msm<G: CurveGroup>(
    bases: &[G::Affine],
    scalars: &[G::ScalarField],
    chunk_size: usize,
    cancel: &CancellationToken,
) -> Result<G, MsmError> {
    if bases.len() != scalars.len() {
        return Err(MsmError::LengthMismatch(bases.len(), scalars.len()));
    }
    let chunk_size = chunk_size.max(1);
    let partial_sums: Vec<G> = bases
        .par_chunks(chunk_size)
        .zip(scalars.par_chunks(chunk_size))
        .map(|(bases, scalars)| {
            if cancel.is_cancelled() {
                return Err(MsmError::Cancelled);
            }
            Ok(G::msm_unchecked(bases, scalars))
        })
        .collect::<Result<_, _>>()?;
    if cancel.is_cancelled() {
        return Err(MsmError::Cancelled);
    }
    Ok(partial_sums.into_iter().sum())
}

/// Scales every base by the matching scalar and returns normalized points.
/// Used to fold setup secrets into SRS and key vectors.
#[tracing::instrument(skip_all, name = "msm::scale_bases", fields(len = bases.len()))]
pub fn scale_bases<G: CurveGroup>(
    bases: &[G::Affine],
    scalars: &[G::ScalarField],
    chunk_size: usize,
    cancel: &CancellationToken,
) -> Result<Vec<G::Affine>, MsmError> {
    if bases.len() != scalars.len() {
        return Err(MsmError::LengthMismatch(bases.len(), scalars.len()));
    }
    let chunk_size = chunk_size.max(1);
    let chunks: Vec<Vec<G::Affine>> = bases
        .par_chunks(chunk_size)
        .zip(scalars.par_chunks(chunk_size))
        .map(|(bases, scalars)| {
            if cancel.is_cancelled() {
                return Err(MsmError::Cancelled);
            }
            let scaled: Vec<G> = bases
                .iter()
                .zip(scalars.iter())
                .map(|(base, scalar)| *base * *scalar)
                .collect();
            Ok(G::normalize_batch(&scaled))
        })
        .collect::<Result<_, _>>()?;
    Ok(chunks.concat())
}

/// Scales every base by the same scalar.
pub fn scale_all<G: CurveGroup>(
    bases: &[G::Affine],
    scalar: G::ScalarField,
    chunk_size: usize,
    cancel: &CancellationToken,
) -> Result<Vec<G::Affine>, MsmError> {
    scale_bases::<G>(bases, &vec![scalar; bases.len()], chunk_size, cancel)
}
