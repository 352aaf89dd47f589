//! Poseidon2 parameters: round constants drawn from the Grain LFSR of the
//! Poseidon reference parameter generator, and the width-3 linear layers.

use std::collections::VecDeque;

use common::constants::{
    POSEIDON2_FULL_ROUNDS, POSEIDON2_PARTIAL_ROUNDS, POSEIDON2_SBOX_DEGREE, POSEIDON2_WIDTH,
};

use crate::field::SnarkField;

/// Grain LFSR in self-shrinking mode, seeded from the instance description.
struct GrainLfsr {
    state: VecDeque<bool>,
}

impl GrainLfsr {
    const STATE_BITS: usize = 80;
    const WARMUP: usize = 160;

    fn new(field_bits: u32, width: usize, full_rounds: usize, partial_rounds: usize) -> Self {
        let mut state = VecDeque::with_capacity(Self::STATE_BITS);
        let mut push = |value: u64, bits: usize| {
            for i in (0..bits).rev() {
                state.push_back((value >> i) & 1 == 1);
            }
        };
        // field type 1 = prime field, S-box type 0 = x^alpha
        push(1, 2);
        push(0, 4);
        push(field_bits as u64, 12);
        push(width as u64, 12);
        push(full_rounds as u64, 10);
        push(partial_rounds as u64, 10);
        push((1 << 30) - 1, 30);
        debug_assert_eq!(state.len(), Self::STATE_BITS);

        let mut lfsr = Self { state };
        for _ in 0..Self::WARMUP {
            lfsr.step();
        }
        lfsr
    }

    fn step(&mut self) -> bool {
        let s = &self.state;
        let bit = s[62] ^ s[51] ^ s[38] ^ s[23] ^ s[13] ^ s[0];
        self.state.pop_front();
        self.state.push_back(bit);
        bit
    }

    /// Bits are consumed in pairs: the second bit is emitted only when the
    /// first one is set.
    fn next_bit(&mut self) -> bool {
        loop {
            let keep = self.step();
            let bit = self.step();
            if keep {
                return bit;
            }
        }
    }

    /// Samples `bits` bits MSB-first and rejects values outside the field.
    fn next_field_element<F: SnarkField>(&mut self, bits: u32) -> F {
        loop {
            let mut le_bytes = vec![0u8; F::NUM_BYTES];
            for i in (0..bits as usize).rev() {
                if self.next_bit() {
                    le_bytes[i / 8] |= 1 << (i % 8);
                }
            }
            if let Some(value) = F::from_canonical_bytes(&le_bytes) {
                return value;
            }
        }
    }
}

/// One round of the permutation with its constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Round<'a, F> {
    /// Constants added to every lane before a full S-box layer.
    Full(&'a [F; POSEIDON2_WIDTH]),
    /// Constant added to lane 0 before its S-box.
    Partial(F),
}

/// Parameters of the width-3 Poseidon2 permutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poseidon2Params<F: SnarkField> {
    pub full_rounds: usize,
    pub partial_rounds: usize,
    pub sbox_degree: u64,
    /// Constants of the full rounds in execution order: the first half runs
    /// before the partial rounds, the second half after them.
    pub external_round_constants: Vec<[F; POSEIDON2_WIDTH]>,
    pub internal_round_constants: Vec<F>,
    /// Diagonal of `M_I - J`, where `J` is the all-ones matrix.
    pub internal_diag_minus_one: [F; POSEIDON2_WIDTH],
}

impl<F: SnarkField> Poseidon2Params<F> {
    /// Draws `width` constants per full round and one per partial round,
    /// in round order.
    #[tracing::instrument(skip_all, name = "Poseidon2Params::generate")]
    pub fn generate() -> Self {
        let full_rounds = POSEIDON2_FULL_ROUNDS;
        let partial_rounds = POSEIDON2_PARTIAL_ROUNDS;
        let half = full_rounds / 2;
        let mut grain = GrainLfsr::new(F::MODULUS_BITS, POSEIDON2_WIDTH, full_rounds, partial_rounds);

        let mut external_round_constants: Vec<[F; POSEIDON2_WIDTH]> = Vec::with_capacity(full_rounds);
        for _ in 0..half {
            external_round_constants.push(std::array::from_fn(|_| {
                grain.next_field_element::<F>(F::MODULUS_BITS)
            }));
        }
        let internal_round_constants = (0..partial_rounds)
            .map(|_| grain.next_field_element::<F>(F::MODULUS_BITS))
            .collect();
        for _ in half..full_rounds {
            external_round_constants.push(std::array::from_fn(|_| {
                grain.next_field_element::<F>(F::MODULUS_BITS)
            }));
        }

        Self {
            full_rounds,
            partial_rounds,
            sbox_degree: POSEIDON2_SBOX_DEGREE,
            external_round_constants,
            internal_round_constants,
            internal_diag_minus_one: [F::one(), F::one(), F::from_u64(2)],
        }
    }

    pub fn half_full_rounds(&self) -> usize {
        self.full_rounds / 2
    }

    pub fn total_rounds(&self) -> usize {
        self.full_rounds + self.partial_rounds
    }

    /// Rounds in execution order.
    pub fn rounds(&self) -> impl Iterator<Item = Round<'_, F>> + '_ {
        let (first, last) = self.external_round_constants.split_at(self.half_full_rounds());
        first
            .iter()
            .map(Round::Full)
            .chain(self.internal_round_constants.iter().map(|c| Round::Partial(*c)))
            .chain(last.iter().map(Round::Full))
    }
}
