use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use super::ops::LC;
use crate::field::SnarkField;

/// (row, col, value)
pub type Coeff<F> = (usize, usize, F);

/// Sparse representation of a single R1CS matrix.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SparseConstraints<F: SnarkField> {
    /// Non-zero coefficients, row-major
    pub entries: Vec<Coeff<F>>,
}

impl<F: SnarkField> SparseConstraints<F> {
    pub fn empty_with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push_row(&mut self, row: usize, lc: &LC<F>) {
        self.entries
            .extend(lc.terms().iter().map(|term| (row, term.0.index(), term.1)));
    }

    /// `M·w`, one value per row; rows past the last constraint are zero.
    pub fn evaluate_rows(&self, witness: &[F], num_rows: usize) -> Vec<F> {
        let mut rows = vec![F::zero(); num_rows];
        for (row, col, value) in self.entries.iter() {
            rows[*row] += witness[*col] * value;
        }
        rows
    }

    /// Entries grouped by column: `columns[col]` lists `(row, value)`.
    pub fn columns(&self, num_columns: usize) -> Vec<Vec<(usize, F)>> {
        let mut columns = vec![vec![]; num_columns];
        for (row, col, value) in self.entries.iter() {
            columns[*col].push((*row, *value));
        }
        columns
    }
}

/// The three matrices of a constraint system together with the layout
/// information setup and proving need.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct R1CSMatrices<F: SnarkField> {
    pub a: SparseConstraints<F>,
    pub b: SparseConstraints<F>,
    pub c: SparseConstraints<F>,

    /// Number of constraints.
    pub num_rows: usize,
    /// Witness length, including the constant one.
    pub num_variables: usize,
    pub num_public: usize,

    /// Digest of the originating constraint system
    pub digest: [u8; 32],
}

impl<F: SnarkField> R1CSMatrices<F> {
    /// The constant one and the public variables.
    pub fn num_instance_variables(&self) -> usize {
        self.num_public + 1
    }

    /// Rows of the quadratic arithmetic program: every constraint plus one
    /// row per instance variable, which keeps the instance polynomials
    /// linearly independent.
    pub fn num_qap_rows(&self) -> usize {
        self.num_rows + self.num_instance_variables()
    }

    /// Evaluations of the A, B and C polynomials on the first `domain_size`
    /// domain points.
    #[tracing::instrument(skip_all, name = "R1CSMatrices::evaluate_qap_rows")]
    pub fn evaluate_qap_rows(&self, witness: &[F], domain_size: usize) -> [Vec<F>; 3] {
        let (mut a, (b, c)) = rayon::join(
            || self.a.evaluate_rows(witness, domain_size),
            || {
                rayon::join(
                    || self.b.evaluate_rows(witness, domain_size),
                    || self.c.evaluate_rows(witness, domain_size),
                )
            },
        );
        for i in 0..self.num_instance_variables() {
            a[self.num_rows + i] = witness[i];
        }
        [a, b, c]
    }
}
