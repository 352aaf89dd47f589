//! Defines the Linear Combination (LC) object and associated operations.
//! A LinearCombination is a vector of Terms, where each Term is a pair of a Variable and a field coefficient.

use crate::field::SnarkField;
use std::fmt::Debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visibility {
    Public,
    Private,
}

/// Index into the witness vector. Index 0 is the constant one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    index: usize,
    visibility: Visibility,
}

impl Variable {
    pub const ONE: Variable = Variable {
        index: 0,
        visibility: Visibility::Public,
    };

    pub(crate) fn new(index: usize, visibility: Visibility) -> Self {
        Self { index, visibility }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Term<F: SnarkField>(pub Variable, pub F);

/// Linear Combination of terms. Each variable appears at most once.
#[derive(Clone, PartialEq, Eq)]
pub struct LC<F: SnarkField>(Vec<Term<F>>);

impl<F: SnarkField> LC<F> {
    pub fn new(terms: Vec<Term<F>>) -> Self {
        #[cfg(test)]
        Self::assert_no_duplicate_terms(&terms);

        LC(terms)
    }

    pub fn zero() -> Self {
        LC::new(vec![])
    }

    pub fn constant(value: F) -> Self {
        LC::new(vec![Term(Variable::ONE, value)])
    }

    pub fn terms(&self) -> &[Term<F>] {
        &self.0
    }

    pub fn num_terms(&self) -> usize {
        self.0.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.0.iter().map(|term| term.0)
    }

    pub fn coefficient(&self, var: Variable) -> Option<F> {
        self.0.iter().find(|term| term.0 == var).map(|term| term.1)
    }

    /// Returns this LC with `var` removed.
    pub fn without(&self, var: Variable) -> Self {
        LC(self.0.iter().filter(|term| term.0 != var).copied().collect())
    }

    /// Evaluates against a partial assignment, reporting the first variable
    /// that has no value yet.
    pub fn evaluate(&self, assignment: &[Option<F>]) -> Result<F, Variable> {
        let mut result = F::zero();
        for Term(var, coeff) in self.0.iter() {
            match assignment.get(var.index).copied().flatten() {
                Some(value) => result += value * coeff,
                None => return Err(*var),
            }
        }
        Ok(result)
    }

    /// Evaluates against a complete witness.
    pub fn evaluate_dense(&self, witness: &[F]) -> F {
        self.0
            .iter()
            .map(|Term(var, coeff)| witness[var.index] * coeff)
            .sum()
    }

    fn push_term(terms: &mut Vec<Term<F>>, other: Term<F>) {
        if let Some(term) = terms.iter_mut().find(|term| term.0 == other.0) {
            term.1 += other.1;
        } else {
            terms.push(other);
        }
    }

    #[cfg(test)]
    fn assert_no_duplicate_terms(terms: &[Term<F>]) {
        let mut term_vec = Vec::new();
        for term in terms {
            if term_vec.contains(&term.0) {
                panic!("Duplicate variable found in terms: {:?}", term.0);
            } else {
                term_vec.push(term.0);
            }
        }
    }
}

impl<F: SnarkField> Debug for LC<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LC(")?;
        for (index, term) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{:?}", term)?;
        }
        write!(f, ")")
    }
}

impl<F: SnarkField> Debug for Term<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*w[{}]", self.1, self.0.index)
    }
}

// Arithmetic for LC

impl<F: SnarkField> std::ops::Add for LC<F> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        let mut combined_terms = self.0;
        for other_term in other.0 {
            Self::push_term(&mut combined_terms, other_term);
        }
        combined_terms.retain(|term| !term.1.is_zero());
        LC::new(combined_terms)
    }
}

impl<F: SnarkField> std::ops::Neg for LC<F> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        LC::new(self.0.into_iter().map(|term| -term).collect())
    }
}

impl<F: SnarkField> std::ops::Sub for LC<F> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        self + (-other)
    }
}

impl<F: SnarkField> std::ops::Mul<F> for LC<F> {
    type Output = Self;

    fn mul(self, scalar: F) -> Self::Output {
        if scalar.is_zero() {
            return LC::zero();
        }
        LC::new(
            self.0
                .into_iter()
                .map(|Term(var, coeff)| Term(var, coeff * scalar))
                .collect(),
        )
    }
}

impl<F: SnarkField> std::ops::Add<F> for LC<F> {
    type Output = Self;

    fn add(self, constant: F) -> Self::Output {
        self + LC::constant(constant)
    }
}

impl<F: SnarkField> std::ops::Add<Variable> for LC<F> {
    type Output = Self;

    fn add(self, other: Variable) -> Self::Output {
        self + LC::from(other)
    }
}

impl<F: SnarkField> std::ops::Sub<Variable> for LC<F> {
    type Output = Self;

    fn sub(self, other: Variable) -> Self::Output {
        self - LC::from(other)
    }
}

// Arithmetic for Term<F>

impl<F: SnarkField> std::ops::Neg for Term<F> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Term(self.0, -self.1)
    }
}

impl<F: SnarkField> std::ops::Add for Term<F> {
    type Output = LC<F>;

    fn add(self, other: Self) -> Self::Output {
        LC::from(self) + LC::from(other)
    }
}

// Arithmetic for Variable

impl<F: SnarkField> std::ops::Mul<F> for Variable {
    type Output = Term<F>;

    fn mul(self, coeff: F) -> Self::Output {
        Term(self, coeff)
    }
}

// Into<LC<F>>

impl<F: SnarkField> From<Variable> for LC<F> {
    fn from(val: Variable) -> Self {
        LC::new(vec![Term(val, F::one())])
    }
}

impl<F: SnarkField> From<Term<F>> for LC<F> {
    fn from(val: Term<F>) -> Self {
        if val.1.is_zero() {
            return LC::zero();
        }
        LC::new(vec![val])
    }
}

impl<F: SnarkField> From<Vec<Term<F>>> for LC<F> {
    fn from(terms: Vec<Term<F>>) -> Self {
        terms.into_iter().fold(LC::zero(), |lc, term| lc + LC::from(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use ark_std::{One, Zero};

    fn var(index: usize) -> Variable {
        Variable::new(index, Visibility::Private)
    }

    #[test]
    fn add_merges_terms() {
        let x = var(1);
        let y = var(2);
        let lc = LC::from(x) + LC::from(y) + LC::from(x) + Fr::from(5u64);
        assert_eq!(lc.num_terms(), 3);
        assert_eq!(lc.coefficient(x), Some(Fr::from(2u64)));
        assert_eq!(lc.coefficient(Variable::ONE), Some(Fr::from(5u64)));
    }

    #[test]
    fn sub_cancels_terms() {
        let x = var(1);
        let lc: LC<Fr> = LC::from(x) - x;
        assert_eq!(lc, LC::zero());
    }

    #[test]
    fn scale_and_evaluate() {
        let x = var(1);
        let y = var(2);
        let lc = (LC::<Fr>::from(x) + LC::from(y * Fr::from(3u64))) * Fr::from(2u64) + Fr::one();
        let witness = [Fr::one(), Fr::from(10u64), Fr::from(7u64)];
        // 2 * (10 + 3 * 7) + 1
        assert_eq!(lc.evaluate_dense(&witness), Fr::from(63u64));
        let partial = [Some(Fr::one()), Some(Fr::from(10u64)), None];
        assert_eq!(lc.evaluate(&partial), Err(y));
        assert_eq!(lc.without(y).evaluate(&partial), Ok(Fr::from(21u64)));
        assert_eq!(lc * Fr::zero(), LC::zero());
    }

    #[test]
    #[should_panic(expected = "Duplicate variable")]
    fn duplicate_terms_rejected() {
        let x = var(1);
        let _ = LC::new(vec![Term(x, Fr::one()), Term(x, Fr::one())]);
    }
}
