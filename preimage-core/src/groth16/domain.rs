//! Radix-2 evaluation domains. The transforms are generic over anything
//! that can be scaled by the field, so the same code interpolates scalars
//! in the prover and group elements (Lagrange bases) in the setup.

use std::ops::{Add, Mul, Sub};

use ark_ff::FftField;
use ark_std::Zero;
use rayon::prelude::*;

use crate::utils::math::Math;

pub trait DomainCoeff<F>:
    Copy + Send + Sync + Zero + Add<Output = Self> + Sub<Output = Self> + Mul<F, Output = Self>
{
}

impl<F, T> DomainCoeff<F> for T where
    T: Copy + Send + Sync + Zero + Add<Output = T> + Sub<Output = T> + Mul<F, Output = T>
{
}

/// The multiplicative subgroup `{1, ω, ..., ω^(n-1)}` of size `n = 2^k`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Radix2Domain<F: FftField> {
    pub size: usize,
    pub log_size: usize,
    pub group_gen: F,
    pub group_gen_inv: F,
    pub size_inv: F,
    /// Offset of the coset `g·H` used to divide by the vanishing polynomial.
    pub coset_offset: F,
    pub coset_offset_inv: F,
}

impl<F: FftField> Radix2Domain<F> {
    /// Smallest domain holding `num_coeffs` points, or `None` if it exceeds
    /// the two-adicity of the field.
    pub fn new(num_coeffs: usize) -> Option<Self> {
        let size = num_coeffs.max(1).next_power_of_two();
        let log_size = size.log_2();
        if log_size as u32 > F::TWO_ADICITY {
            return None;
        }
        let group_gen = F::get_root_of_unity(size as u64)?;
        let coset_offset = F::GENERATOR;
        Some(Self {
            size,
            log_size,
            group_gen,
            group_gen_inv: group_gen.inverse()?,
            size_inv: F::from(size as u64).inverse()?,
            coset_offset,
            coset_offset_inv: coset_offset.inverse()?,
        })
    }

    pub fn elements(&self) -> impl Iterator<Item = F> + '_ {
        std::iter::successors(Some(F::one()), move |x| Some(*x * self.group_gen)).take(self.size)
    }

    /// `Z_H(x) = x^n - 1`
    pub fn evaluate_vanishing_polynomial(&self, x: F) -> F {
        x.pow([self.size as u64]) - F::one()
    }

    pub fn fft<T: DomainCoeff<F>>(&self, coeffs: &[T]) -> Vec<T> {
        let mut values = self.padded(coeffs);
        self.fft_in_place(&mut values, self.group_gen);
        values
    }

    pub fn ifft<T: DomainCoeff<F>>(&self, evals: &[T]) -> Vec<T> {
        let mut values = self.padded(evals);
        self.fft_in_place(&mut values, self.group_gen_inv);
        let size_inv = self.size_inv;
        values.par_iter_mut().for_each(|v| *v = *v * size_inv);
        values
    }

    /// Evaluations on `g·H`.
    pub fn coset_fft<T: DomainCoeff<F>>(&self, coeffs: &[T]) -> Vec<T> {
        let mut values = self.padded(coeffs);
        Self::distribute_powers(&mut values, self.coset_offset);
        self.fft_in_place(&mut values, self.group_gen);
        values
    }

    /// Interpolates evaluations on `g·H` back to coefficients.
    pub fn coset_ifft<T: DomainCoeff<F>>(&self, evals: &[T]) -> Vec<T> {
        let mut values = self.ifft(evals);
        Self::distribute_powers(&mut values, self.coset_offset_inv);
        values
    }

    fn padded<T: DomainCoeff<F>>(&self, input: &[T]) -> Vec<T> {
        assert!(input.len() <= self.size, "input exceeds domain size");
        let mut values = input.to_vec();
        values.resize(self.size, T::zero());
        values
    }

    fn distribute_powers<T: DomainCoeff<F>>(values: &mut [T], g: F) {
        let powers: Vec<F> = std::iter::successors(Some(F::one()), |x| Some(*x * g))
            .take(values.len())
            .collect();
        values
            .par_iter_mut()
            .zip(powers.par_iter())
            .for_each(|(v, p)| *v = *v * *p);
    }

    /// Iterative Cooley-Tukey over bit-reversed input.
    fn fft_in_place<T: DomainCoeff<F>>(&self, values: &mut [T], omega: F) {
        let n = values.len();
        if n == 1 {
            return;
        }
        bit_reverse_permutation(values);

        let mut m = 1;
        while m < n {
            let omega_m = omega.pow([(n / (2 * m)) as u64]);
            let twiddles: Vec<F> = std::iter::successors(Some(F::one()), |x| Some(*x * omega_m))
                .take(m)
                .collect();
            values.par_chunks_mut(2 * m).for_each(|chunk| {
                let (lo, hi) = chunk.split_at_mut(m);
                for ((u, v), w) in lo.iter_mut().zip(hi.iter_mut()).zip(twiddles.iter()) {
                    let t = *v * *w;
                    *v = *u - t;
                    *u = *u + t;
                }
            });
            m *= 2;
        }
    }
}

fn bit_reverse_permutation<T>(values: &mut [T]) {
    let n = values.len();
    let log_n = n.log_2();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS as usize - log_n);
        if i < j {
            values.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Fr, G1Projective};
    use ark_ff::Field;
    use ark_std::{test_rng, One, UniformRand};

    fn evaluate(coeffs: &[Fr], x: Fr) -> Fr {
        coeffs.iter().rev().fold(Fr::zero(), |acc, c| acc * x + c)
    }

    #[test]
    fn fft_evaluates_on_domain() {
        let mut rng = test_rng();
        let domain = Radix2Domain::<Fr>::new(13).unwrap();
        assert_eq!(domain.size, 16);
        let coeffs: Vec<Fr> = (0..13).map(|_| Fr::rand(&mut rng)).collect();
        let evals = domain.fft(&coeffs);
        for (x, eval) in domain.elements().zip(evals.iter()) {
            assert_eq!(evaluate(&coeffs, x), *eval);
        }
        let mut padded = coeffs.clone();
        padded.resize(16, Fr::zero());
        assert_eq!(domain.ifft(&evals), padded);
    }

    #[test]
    fn coset_round_trip() {
        let mut rng = test_rng();
        let domain = Radix2Domain::<Fr>::new(8).unwrap();
        let coeffs: Vec<Fr> = (0..8).map(|_| Fr::rand(&mut rng)).collect();
        let evals = domain.coset_fft(&coeffs);
        let x = domain.coset_offset * domain.group_gen.pow([3u64]);
        assert_eq!(evals[3], evaluate(&coeffs, x));
        assert_eq!(domain.coset_ifft(&evals), coeffs);
        // The vanishing polynomial is constant and non-zero on the coset
        let z = domain.evaluate_vanishing_polynomial(domain.coset_offset);
        assert!(!z.is_zero());
        assert_eq!(domain.evaluate_vanishing_polynomial(x), z);
        assert!(domain.evaluate_vanishing_polynomial(domain.group_gen).is_zero());
    }

    #[test]
    fn group_ifft_gives_lagrange_basis() {
        let mut rng = test_rng();
        let domain = Radix2Domain::<Fr>::new(8).unwrap();
        let tau = Fr::rand(&mut rng);
        let g = G1Projective::rand(&mut rng);
        let powers: Vec<G1Projective> = std::iter::successors(Some(Fr::one()), |x| Some(*x * tau))
            .take(8)
            .map(|p| g * p)
            .collect();
        let lagrange = domain.ifft(&powers);

        // L_i(tau) = Z(tau) * w^i / (n * (tau - w^i))
        let z = domain.evaluate_vanishing_polynomial(tau);
        for (i, w) in domain.elements().enumerate() {
            let l_i = z * w * domain.size_inv * (tau - w).inverse().unwrap();
            assert_eq!(lagrange[i], g * l_i);
        }
    }

    #[test]
    fn domain_too_large() {
        assert!(Radix2Domain::<Fr>::new(1 << 28).is_some());
        assert!(Radix2Domain::<Fr>::new((1 << 28) + 1).is_none());
    }
}
