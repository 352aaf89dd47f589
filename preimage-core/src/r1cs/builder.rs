use sha3::{Digest, Sha3_256};

use super::{
    key::{R1CSMatrices, SparseConstraints},
    ops::{Variable, Visibility, LC},
};
use crate::{field::SnarkField, utils::errors::BuildError};

/// Constraint over a single row: `(A·w) * (B·w) == C·w`.
/// `output`, when set, names the variable this constraint defines; the
/// witness evaluator solves for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint<F: SnarkField> {
    pub a: LC<F>,
    pub b: LC<F>,
    pub c: LC<F>,
    pub output: Option<Variable>,
}

impl<F: SnarkField> Constraint<F> {
    pub fn is_satisfied(&self, witness: &[F]) -> bool {
        self.a.evaluate_dense(witness) * self.b.evaluate_dense(witness)
            == self.c.evaluate_dense(witness)
    }
}

/// A finished rank-1 constraint system. Public variables occupy indices
/// `1..=num_public`, private variables follow.
#[derive(Clone, Debug)]
pub struct ConstraintSystem<F: SnarkField> {
    constraints: Vec<Constraint<F>>,
    num_variables: usize,
    num_public: usize,
    inputs: Vec<Variable>,
    digest: [u8; 32],
}

impl<F: SnarkField> ConstraintSystem<F> {
    pub fn constraints(&self) -> &[Constraint<F>] {
        &self.constraints
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Number of witness entries, including the constant one.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Number of public variables, excluding the constant one.
    pub fn num_public(&self) -> usize {
        self.num_public
    }

    pub fn num_private(&self) -> usize {
        self.num_variables - self.num_public - 1
    }

    /// Variables that no constraint defines and which the caller must assign.
    pub fn inputs(&self) -> &[Variable] {
        &self.inputs
    }

    /// SHA3-256 over the variable layout and every coefficient.
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    pub fn is_satisfied(&self, witness: &[F]) -> Result<(), usize> {
        match self
            .constraints
            .iter()
            .position(|constraint| !constraint.is_satisfied(witness))
        {
            Some(index) => Err(index),
            None => Ok(()),
        }
    }

    pub fn to_matrices(&self) -> R1CSMatrices<F> {
        let mut a = SparseConstraints::empty_with_capacity(self.num_constraints());
        let mut b = SparseConstraints::empty_with_capacity(self.num_constraints());
        let mut c = SparseConstraints::empty_with_capacity(self.num_constraints());
        for (row, constraint) in self.constraints.iter().enumerate() {
            a.push_row(row, &constraint.a);
            b.push_row(row, &constraint.b);
            c.push_row(row, &constraint.c);
        }
        R1CSMatrices {
            a,
            b,
            c,
            num_rows: self.num_constraints(),
            num_variables: self.num_variables,
            num_public: self.num_public,
            digest: self.digest,
        }
    }

    fn compute_digest(constraints: &[Constraint<F>], num_variables: usize, num_public: usize) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(b"r1cs");
        hasher.update((num_variables as u64).to_le_bytes());
        hasher.update((num_public as u64).to_le_bytes());
        hasher.update((constraints.len() as u64).to_le_bytes());
        for constraint in constraints {
            for lc in [&constraint.a, &constraint.b, &constraint.c] {
                hasher.update((lc.num_terms() as u64).to_le_bytes());
                for term in lc.terms() {
                    hasher.update((term.0.index() as u64).to_le_bytes());
                    hasher.update(term.1.to_le_bytes());
                }
            }
        }
        hasher.finalize().into()
    }
}

pub struct R1CSBuilder<F: SnarkField> {
    constraints: Vec<Constraint<F>>,
    visibilities: Vec<Visibility>,
    is_output: Vec<bool>,
}

impl<F: SnarkField> Default for R1CSBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SnarkField> R1CSBuilder<F> {
    pub fn new() -> Self {
        Self {
            constraints: vec![],
            visibilities: vec![Visibility::Public],
            is_output: vec![false],
        }
    }

    pub fn num_variables(&self) -> usize {
        self.visibilities.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Appends a new witness variable. All public variables must be
    /// allocated before the first private one.
    pub fn allocate_variable(&mut self, visibility: Visibility) -> Result<Variable, BuildError> {
        let index = self.visibilities.len();
        if visibility == Visibility::Public {
            if let Some(private) = self
                .visibilities
                .iter()
                .position(|v| *v == Visibility::Private)
            {
                return Err(BuildError::PublicAfterPrivate(private));
            }
        }
        self.visibilities.push(visibility);
        self.is_output.push(false);
        Ok(Variable::new(index, visibility))
    }

    fn check_lc(&self, lc: &LC<F>) -> Result<(), BuildError> {
        match lc.variables().find(|var| var.index() >= self.visibilities.len()) {
            Some(var) => Err(BuildError::InvalidVariable(var.index())),
            None => Ok(()),
        }
    }

    pub fn add_constraint(
        &mut self,
        a: impl Into<LC<F>>,
        b: impl Into<LC<F>>,
        c: impl Into<LC<F>>,
    ) -> Result<(), BuildError> {
        let (a, b, c) = (a.into(), b.into(), c.into());
        self.check_lc(&a)?;
        self.check_lc(&b)?;
        self.check_lc(&c)?;
        self.constraints.push(Constraint {
            a,
            b,
            c,
            output: None,
        });
        Ok(())
    }

    /// Adds a constraint that defines `output`: it must occur in `c` only,
    /// and no other constraint may define it.
    pub fn add_constraint_with_output(
        &mut self,
        a: impl Into<LC<F>>,
        b: impl Into<LC<F>>,
        c: impl Into<LC<F>>,
        output: Variable,
    ) -> Result<(), BuildError> {
        let (a, b, c) = (a.into(), b.into(), c.into());
        self.check_lc(&a)?;
        self.check_lc(&b)?;
        self.check_lc(&c)?;
        if output == Variable::ONE {
            return Err(BuildError::ConstantOutput);
        }
        if output.index() >= self.visibilities.len() {
            return Err(BuildError::InvalidVariable(output.index()));
        }
        if self.is_output[output.index()] {
            return Err(BuildError::DuplicateOutput(output.index()));
        }
        if c.coefficient(output).is_none()
            || a.coefficient(output).is_some()
            || b.coefficient(output).is_some()
        {
            return Err(BuildError::InvalidOutput(output.index()));
        }
        self.is_output[output.index()] = true;
        self.constraints.push(Constraint {
            a,
            b,
            c,
            output: Some(output),
        });
        Ok(())
    }

    /// left - right == 0
    pub fn enforce_equal(
        &mut self,
        left: impl Into<LC<F>>,
        right: impl Into<LC<F>>,
    ) -> Result<(), BuildError> {
        let left: LC<F> = left.into();
        let right: LC<F> = right.into();
        self.add_constraint(left - right, Variable::ONE, LC::zero())
    }

    /// Allocates a private variable constrained to `a * b`.
    pub fn mul(&mut self, a: impl Into<LC<F>>, b: impl Into<LC<F>>) -> Result<Variable, BuildError> {
        let out = self.allocate_variable(Visibility::Private)?;
        self.add_constraint_with_output(a, b, out, out)?;
        Ok(out)
    }

    #[tracing::instrument(skip_all, name = "R1CSBuilder::build")]
    pub fn build(self) -> ConstraintSystem<F> {
        let num_variables = self.visibilities.len();
        let num_public = self
            .visibilities
            .iter()
            .skip(1)
            .filter(|v| **v == Visibility::Public)
            .count();
        let inputs = self
            .visibilities
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(index, _)| !self.is_output[*index])
            .map(|(index, visibility)| Variable::new(index, *visibility))
            .collect();
        let digest = ConstraintSystem::<F>::compute_digest(&self.constraints, num_variables, num_public);
        tracing::debug!(
            num_constraints = self.constraints.len(),
            num_variables,
            num_public,
            "built constraint system"
        );

        ConstraintSystem {
            constraints: self.constraints,
            num_variables,
            num_public,
            inputs,
            digest,
        }
    }
}
