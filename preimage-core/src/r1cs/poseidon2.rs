//! Poseidon2 as constraints. Each S-box costs three multiplications
//! (`x^2`, `x^4`, `x^5`); round constants and linear layers are folded into
//! the linear combinations carried between S-boxes and cost nothing.

use common::constants::{POSEIDON2_RATE, POSEIDON2_WIDTH, PREIMAGE_LEN};

use super::{
    builder::{ConstraintSystem, R1CSBuilder},
    ops::{Variable, Visibility, LC},
};
use crate::{
    field::SnarkField,
    poseidon2::{domain_tag, external_linear_layer, internal_linear_layer, Poseidon2, Round},
    utils::errors::BuildError,
};

/// Constrains `x^5` and returns the variable holding it.
pub fn sbox<F: SnarkField>(builder: &mut R1CSBuilder<F>, x: LC<F>) -> Result<Variable, BuildError> {
    let x2 = builder.mul(x.clone(), x.clone())?;
    let x4 = builder.mul(x2, x2)?;
    builder.mul(x4, x)
}

/// Applies the permutation to a state of linear combinations.
pub fn permute<F: SnarkField>(
    builder: &mut R1CSBuilder<F>,
    poseidon: &Poseidon2<F>,
    input: [LC<F>; POSEIDON2_WIDTH],
) -> Result<[LC<F>; POSEIDON2_WIDTH], BuildError> {
    let params = poseidon.params();
    let mut state = input;
    external_linear_layer(&mut state);

    for round in params.rounds() {
        match round {
            Round::Full(constants) => {
                for (lane, c) in state.iter_mut().zip(constants.iter()) {
                    let x = std::mem::replace(lane, LC::zero()) + *c;
                    *lane = sbox(builder, x)?.into();
                }
                external_linear_layer(&mut state);
            }
            Round::Partial(c) => {
                let x = std::mem::replace(&mut state[0], LC::zero()) + c;
                state[0] = sbox(builder, x)?.into();
                internal_linear_layer(&mut state, &params.internal_diag_minus_one);
            }
        }
    }
    Ok(state)
}

/// Relation "I know `preimage` such that `hash(preimage) == digest`".
/// `digest` is the only public variable.
#[derive(Clone, Debug)]
pub struct PreimageCircuit<F: SnarkField> {
    cs: ConstraintSystem<F>,
    digest: Variable,
    preimage: [Variable; PREIMAGE_LEN],
}

impl<F: SnarkField> PreimageCircuit<F> {
    #[tracing::instrument(skip_all, name = "PreimageCircuit::build")]
    pub fn build(poseidon: &Poseidon2<F>) -> Result<Self, BuildError> {
        let mut builder = R1CSBuilder::new();
        let digest = builder.allocate_variable(Visibility::Public)?;
        let preimage = [
            builder.allocate_variable(Visibility::Private)?,
            builder.allocate_variable(Visibility::Private)?,
        ];

        let mut state: [LC<F>; POSEIDON2_WIDTH] = [LC::zero(), LC::zero(), LC::zero()];
        for (lane, var) in state.iter_mut().zip(preimage.iter()) {
            *lane = (*var).into();
        }
        state[POSEIDON2_RATE] = LC::constant(domain_tag(PREIMAGE_LEN, 1));

        let [out, _, _] = permute(&mut builder, poseidon, state)?;
        builder.enforce_equal(out, digest)?;

        let cs = builder.build();
        tracing::info!(
            num_constraints = cs.num_constraints(),
            num_variables = cs.num_variables(),
            "built Poseidon2 preimage circuit"
        );
        Ok(Self {
            cs,
            digest,
            preimage,
        })
    }

    pub fn constraint_system(&self) -> &ConstraintSystem<F> {
        &self.cs
    }

    pub fn digest_variable(&self) -> Variable {
        self.digest
    }

    pub fn preimage_variables(&self) -> [Variable; PREIMAGE_LEN] {
        self.preimage
    }

    /// Input assignments for the witness evaluator.
    pub fn assignment(&self, preimage: [F; PREIMAGE_LEN], digest: F) -> Vec<(Variable, F)> {
        vec![
            (self.digest, digest),
            (self.preimage[0], preimage[0]),
            (self.preimage[1], preimage[1]),
        ]
    }
}
