use serde::{Deserialize, Serialize};

use super::{builder::ConstraintSystem, ops::Variable};
use crate::{field::SnarkField, utils::errors::WitnessError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessOptions {
    /// Re-check every constraint once all variables are assigned. Debug
    /// builds always check.
    pub check_constraints: bool,
}

impl Default for WitnessOptions {
    fn default() -> Self {
        Self {
            check_constraints: true,
        }
    }
}

/// Complete assignment of a constraint system. Entry 0 is the constant one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness<F: SnarkField> {
    values: Vec<F>,
    num_public: usize,
    circuit_digest: [u8; 32],
}

impl<F: SnarkField> Witness<F> {
    /// Wraps raw values, e.g. read back from a witness file. The caller
    /// vouches that they belong to the constraint system with
    /// `circuit_digest`.
    pub fn from_values(values: Vec<F>, num_public: usize, circuit_digest: [u8; 32]) -> Self {
        Self {
            values,
            num_public,
            circuit_digest,
        }
    }

    pub fn values(&self) -> &[F] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn num_public(&self) -> usize {
        self.num_public
    }

    /// Structure digest of the constraint system the values were solved for.
    pub fn circuit_digest(&self) -> [u8; 32] {
        self.circuit_digest
    }

    /// Values of the public variables, without the constant one.
    pub fn public_signals(&self) -> Vec<F> {
        self.values[1..=self.num_public].to_vec()
    }

    pub fn get(&self, var: Variable) -> F {
        self.values[var.index()]
    }
}

/// Solves a constraint system in declaration order from its input
/// assignments. Each defining constraint yields
/// `out = ((A·w) * (B·w) - C'·w) / c_out`, where `C'` is `C` without `out`.
pub struct WitnessEvaluator<'a, F: SnarkField> {
    cs: &'a ConstraintSystem<F>,
    assignment: Vec<Option<F>>,
    options: WitnessOptions,
}

impl<'a, F: SnarkField> WitnessEvaluator<'a, F> {
    pub fn new(cs: &'a ConstraintSystem<F>) -> Self {
        Self::with_options(cs, WitnessOptions::default())
    }

    pub fn with_options(cs: &'a ConstraintSystem<F>, options: WitnessOptions) -> Self {
        let mut assignment = vec![None; cs.num_variables()];
        assignment[0] = Some(F::one());
        Self {
            cs,
            assignment,
            options,
        }
    }

    pub fn assign(&mut self, var: Variable, value: F) -> Result<(), WitnessError> {
        if !self.cs.inputs().contains(&var) {
            return Err(WitnessError::UnknownInput(var.index()));
        }
        let slot = &mut self.assignment[var.index()];
        if slot.is_some() {
            return Err(WitnessError::DuplicateInput(var.index()));
        }
        *slot = Some(value);
        Ok(())
    }

    pub fn assign_all(&mut self, values: &[(Variable, F)]) -> Result<(), WitnessError> {
        values
            .iter()
            .try_for_each(|(var, value)| self.assign(*var, *value))
    }

    #[tracing::instrument(skip_all, name = "WitnessEvaluator::evaluate")]
    pub fn evaluate(mut self) -> Result<Witness<F>, WitnessError> {
        if let Some(missing) = self
            .cs
            .inputs()
            .iter()
            .find(|var| self.assignment[var.index()].is_none())
        {
            return Err(WitnessError::MissingInput(missing.index()));
        }

        for (index, constraint) in self.cs.constraints().iter().enumerate() {
            let Some(output) = constraint.output else {
                continue;
            };
            let unassigned = |var: Variable| WitnessError::UnassignedVariable {
                constraint: index,
                variable: var.index(),
            };
            let a = constraint.a.evaluate(&self.assignment).map_err(unassigned)?;
            let b = constraint.b.evaluate(&self.assignment).map_err(unassigned)?;
            let rest = constraint
                .c
                .without(output)
                .evaluate(&self.assignment)
                .map_err(unassigned)?;
            let coeff = constraint
                .c
                .coefficient(output)
                .ok_or(WitnessError::ConstraintViolation(index))?;
            self.assignment[output.index()] = Some((a * b - rest) * coeff.try_inverse()?);
        }

        let mut values = Vec::with_capacity(self.assignment.len());
        for (variable, value) in self.assignment.into_iter().enumerate() {
            match value {
                Some(value) => values.push(value),
                // A variable neither assigned nor defined by any constraint
                None => return Err(WitnessError::MissingInput(variable)),
            }
        }

        if self.options.check_constraints || cfg!(debug_assertions) {
            self.cs
                .is_satisfied(&values)
                .map_err(WitnessError::ConstraintViolation)?;
        }

        Ok(Witness::from_values(
            values,
            self.cs.num_public(),
            self.cs.digest(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r1cs::{
        builder::R1CSBuilder,
        ops::{Visibility, LC},
    };
    use ark_bn254::Fr;
    use ark_std::One;

    /// out = x^3 + x + 5
    fn cubic() -> (ConstraintSystem<Fr>, Variable, Variable) {
        let mut builder = R1CSBuilder::<Fr>::new();
        let out = builder.allocate_variable(Visibility::Public).unwrap();
        let x = builder.allocate_variable(Visibility::Private).unwrap();
        let x2 = builder.mul(x, x).unwrap();
        let x3 = builder.mul(x2, x).unwrap();
        builder
            .enforce_equal(LC::from(x3) + x + Fr::from(5u64), out)
            .unwrap();
        (builder.build(), out, x)
    }

    #[test]
    fn evaluates_in_order() {
        let (cs, out, x) = cubic();
        let mut evaluator = WitnessEvaluator::new(&cs);
        evaluator
            .assign_all(&[(out, Fr::from(35u64)), (x, Fr::from(3u64))])
            .unwrap();
        let witness = evaluator.evaluate().unwrap();
        assert_eq!(
            witness.values(),
            &[
                Fr::one(),
                Fr::from(35u64),
                Fr::from(3u64),
                Fr::from(9u64),
                Fr::from(27u64)
            ]
        );
        assert_eq!(witness.public_signals(), vec![Fr::from(35u64)]);
        assert_eq!(witness.circuit_digest(), cs.digest());
    }

    #[test]
    fn reports_violation() {
        let (cs, out, x) = cubic();
        let mut evaluator = WitnessEvaluator::new(&cs);
        evaluator
            .assign_all(&[(out, Fr::from(36u64)), (x, Fr::from(3u64))])
            .unwrap();
        assert_eq!(
            evaluator.evaluate(),
            Err(WitnessError::ConstraintViolation(2))
        );
    }

    #[test]
    fn input_bookkeeping() {
        let (cs, out, x) = cubic();
        let mut evaluator = WitnessEvaluator::new(&cs);
        evaluator.assign(x, Fr::from(3u64)).unwrap();
        assert_eq!(
            evaluator.assign(x, Fr::from(4u64)),
            Err(WitnessError::DuplicateInput(x.index()))
        );
        // x^2 is defined by a constraint, not an input
        let x2 = cs.constraints()[0].output.unwrap();
        assert_eq!(
            evaluator.assign(x2, Fr::from(9u64)),
            Err(WitnessError::UnknownInput(x2.index()))
        );
        assert_eq!(
            evaluator.evaluate(),
            Err(WitnessError::MissingInput(out.index()))
        );
    }

    #[test]
    fn reads_before_definition_are_reported() {
        let mut builder = R1CSBuilder::<Fr>::new();
        let x = builder.allocate_variable(Visibility::Private).unwrap();
        let y = builder.allocate_variable(Visibility::Private).unwrap();
        let z = builder.allocate_variable(Visibility::Private).unwrap();
        // z = x * y, but y is only defined afterwards
        builder.add_constraint_with_output(x, y, z, z).unwrap();
        builder.add_constraint_with_output(x, x, y, y).unwrap();
        let cs = builder.build();

        let mut evaluator = WitnessEvaluator::new(&cs);
        evaluator.assign(x, Fr::from(2u64)).unwrap();
        assert_eq!(
            evaluator.evaluate(),
            Err(WitnessError::UnassignedVariable {
                constraint: 0,
                variable: y.index()
            })
        );
    }
}
