//! Poseidon2 permutation over a width-3 state and the fixed-length sponge
//! hash built on it.

use std::ops::{Add, Mul};

use ark_bn254::Fr;
use common::constants::{POSEIDON2_RATE, POSEIDON2_WIDTH};

use crate::{field::SnarkField, utils::errors::HashError};

pub mod params;

pub use params::{Poseidon2Params, Round};

pub type State<F> = [F; POSEIDON2_WIDTH];

lazy_static::lazy_static! {
    static ref BN254_POSEIDON2: Poseidon2<Fr> = Poseidon2::new(Poseidon2Params::generate());
}

/// `M_E = circ(2, 1, 1)`: every lane gets the sum of all lanes added to it.
#[inline]
pub fn external_linear_layer<T>(state: &mut [T; POSEIDON2_WIDTH])
where
    T: Clone + Add<Output = T>,
{
    let sum = state[0].clone() + state[1].clone() + state[2].clone();
    for lane in state.iter_mut() {
        *lane = lane.clone() + sum.clone();
    }
}

/// `M_I = J + diag(d)`: lane `i` becomes `d_i * x_i + sum`.
#[inline]
pub fn internal_linear_layer<F, T>(state: &mut [T; POSEIDON2_WIDTH], diag_minus_one: &[F; POSEIDON2_WIDTH])
where
    F: SnarkField,
    T: Clone + Add<Output = T> + Mul<F, Output = T>,
{
    let sum = state[0].clone() + state[1].clone() + state[2].clone();
    for (lane, d) in state.iter_mut().zip(diag_minus_one.iter()) {
        *lane = lane.clone() * *d + sum.clone();
    }
}

/// Domain tag placed in the capacity lane: `len * 2^64 + (outputs - 1)`.
pub fn domain_tag<F: SnarkField>(input_len: usize, output_len: usize) -> F {
    F::from_u128(((input_len as u128) << 64) + (output_len.saturating_sub(1) as u128))
}

#[derive(Clone, Debug)]
pub struct Poseidon2<F: SnarkField> {
    params: Poseidon2Params<F>,
}

impl Poseidon2<Fr> {
    /// Shared BN254 instance; the constants are generated on first use.
    pub fn bn254() -> &'static Self {
        &BN254_POSEIDON2
    }
}

impl<F: SnarkField> Poseidon2<F> {
    pub fn new(params: Poseidon2Params<F>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Poseidon2Params<F> {
        &self.params
    }

    #[inline]
    fn sbox(x: F) -> F {
        let x2 = x * x;
        let x4 = x2 * x2;
        x4 * x
    }

    pub fn permute(&self, input: &State<F>) -> State<F> {
        let params = &self.params;
        let mut state = *input;
        external_linear_layer(&mut state);

        for round in params.rounds() {
            match round {
                Round::Full(constants) => {
                    for (lane, c) in state.iter_mut().zip(constants.iter()) {
                        *lane = Self::sbox(*lane + c);
                    }
                    external_linear_layer(&mut state);
                }
                Round::Partial(c) => {
                    state[0] = Self::sbox(state[0] + c);
                    internal_linear_layer(&mut state, &params.internal_diag_minus_one);
                }
            }
        }
        state
    }

    /// Fixed-length sponge: the capacity lane is seeded with the domain tag,
    /// inputs are absorbed `POSEIDON2_RATE` at a time and `output_len` lanes
    /// are squeezed after the last permutation.
    pub fn hash_with_outputs(&self, inputs: &[F], output_len: usize) -> Result<Vec<F>, HashError> {
        if !(1..=POSEIDON2_RATE).contains(&output_len) {
            return Err(HashError::InvalidOutputLength {
                requested: output_len,
                max: POSEIDON2_RATE,
            });
        }
        Ok(self.sponge(inputs, output_len)[..output_len].to_vec())
    }

    pub fn hash(&self, inputs: &[F]) -> F {
        self.sponge(inputs, 1)[0]
    }

    fn sponge(&self, inputs: &[F], output_len: usize) -> State<F> {
        let mut state: State<F> = [F::zero(); POSEIDON2_WIDTH];
        state[POSEIDON2_RATE] = domain_tag(inputs.len(), output_len);

        if inputs.is_empty() {
            state = self.permute(&state);
        }
        for block in inputs.chunks(POSEIDON2_RATE) {
            for (lane, x) in state.iter_mut().zip(block.iter()) {
                *lane += x;
            }
            state = self.permute(&state);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::PrimeField;
    use ark_std::{test_rng, One, UniformRand, Zero};

    #[test]
    fn permutation_is_deterministic() {
        let poseidon = Poseidon2::bn254();
        let mut rng = test_rng();
        for _ in 0..10 {
            let input = [Fr::rand(&mut rng), Fr::rand(&mut rng), Fr::rand(&mut rng)];
            assert_eq!(poseidon.permute(&input), poseidon.permute(&input));
        }
        let fresh = Poseidon2::new(Poseidon2Params::<Fr>::generate());
        let input = [Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)];
        assert_eq!(fresh.permute(&input), poseidon.permute(&input));
    }

    fn from_hex(s: &str) -> Fr {
        Fr::from_be_bytes_mod_order(&hex::decode(s.trim_start_matches("0x")).unwrap())
    }

    #[test]
    fn known_answer() {
        let output = Poseidon2::bn254().permute(&[Fr::from(0u64), Fr::from(1u64), Fr::from(2u64)]);
        assert_eq!(
            output,
            [
                from_hex("0x0bb61d24daca55eebcb1929a82650f328134334da98ea4f847f760054f4a3033"),
                from_hex("0x303b6f7c86d043bfcbcc80214f26a30277a15d3f74ca654992defe7ff8d03570"),
                from_hex("0x1ed25194542b12eef8617361c3ba7c52e660b145994427cc86296242cf766ec8"),
            ]
        );
    }

    #[test]
    fn permutation_diffuses() {
        let poseidon = Poseidon2::bn254();
        let zero = poseidon.permute(&[Fr::zero(); 3]);
        assert_ne!(zero, [Fr::zero(); 3]);
        for lane in 0..3 {
            let mut input = [Fr::zero(); 3];
            input[lane] = Fr::one();
            let output = poseidon.permute(&input);
            for i in 0..3 {
                assert_ne!(output[i], zero[i]);
            }
        }
    }

    #[test]
    fn linear_layers() {
        let mut state = [Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)];
        external_linear_layer(&mut state);
        // circ(2, 1, 1) * (1, 2, 3)
        assert_eq!(state, [Fr::from(7u64), Fr::from(8u64), Fr::from(9u64)]);

        let diag = Poseidon2::bn254().params().internal_diag_minus_one;
        let mut state = [Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)];
        internal_linear_layer(&mut state, &diag);
        // [[2,1,1],[1,2,1],[1,1,3]] * (1, 2, 3)
        assert_eq!(state, [Fr::from(7u64), Fr::from(8u64), Fr::from(12u64)]);
    }

    #[test]
    fn hash_is_one_permutation_of_tagged_state() {
        let poseidon = Poseidon2::bn254();
        let (a, b) = (Fr::from(3u64), Fr::from(4u64));
        let tag = Fr::from(2u64 << 32) * Fr::from(1u64 << 32);
        assert_eq!(domain_tag::<Fr>(2, 1), tag);
        assert_eq!(poseidon.hash(&[a, b]), poseidon.permute(&[a, b, tag])[0]);
    }

    #[test]
    fn hash_separates_inputs() {
        let poseidon = Poseidon2::bn254();
        let h = poseidon.hash(&[Fr::from(3u64), Fr::from(4u64)]);
        assert_ne!(h, poseidon.hash(&[Fr::from(4u64), Fr::from(3u64)]));
        assert_ne!(h, poseidon.hash(&[Fr::from(3u64), Fr::from(5u64)]));
        // Same lanes, different length tag
        assert_ne!(
            poseidon.hash(&[Fr::from(3u64)]),
            poseidon.hash(&[Fr::from(3u64), Fr::zero()])
        );
        let two = poseidon.hash_with_outputs(&[Fr::from(3u64)], 2).unwrap();
        assert_eq!(two.len(), 2);
        // The output count is part of the domain tag
        assert_ne!(two[0], poseidon.hash(&[Fr::from(3u64)]));
        for bad in [0, 3] {
            assert_eq!(
                poseidon.hash_with_outputs(&[Fr::from(3u64)], bad),
                Err(HashError::InvalidOutputLength {
                    requested: bad,
                    max: 2
                })
            );
        }
    }
}
