use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{One, Zero};

use crate::utils::errors::{ArithmeticError, EncodingError};

pub mod ark;

pub trait FieldOps<Rhs = Self, Output = Self>:
    Add<Rhs, Output = Output> + Sub<Rhs, Output = Output> + Mul<Rhs, Output = Output>
{
}

/// Prime-field arithmetic used by the hash, the circuit builder and the
/// witness evaluator. Values are always fully reduced.
pub trait SnarkField:
    'static
    + Sized
    + Zero
    + One
    + Neg<Output = Self>
    + FieldOps<Self, Self>
    + for<'a> FieldOps<&'a Self, Self>
    + AddAssign<Self>
    + SubAssign<Self>
    + MulAssign<Self>
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + Sum<Self>
    + for<'a> Sum<&'a Self>
    + Product<Self>
    + Clone
    + Copy
    + Sync
    + Send
    + Display
    + Debug
    + Default
    + Eq
    + Hash
    + CanonicalSerialize
    + CanonicalDeserialize
{
    /// Number of bytes occupied by a single field element.
    const NUM_BYTES: usize;
    /// Bit length of the modulus.
    const MODULUS_BITS: u32;

    fn random<R: rand_core::RngCore>(rng: &mut R) -> Self;
    fn from_u64(n: u64) -> Self;
    fn from_u128(n: u128) -> Self;
    fn from_i64(n: i64) -> Self;

    /// Multiplicative inverse. Zero has none.
    fn try_inverse(&self) -> Result<Self, ArithmeticError>;

    /// `self^exponent` with the exponent given as little-endian 64-bit limbs.
    /// Runs a Montgomery ladder over every bit of every limb, so the sequence
    /// of multiplications does not depend on the exponent's value.
    fn ladder_pow(&self, exponent: &[u64]) -> Self {
        let mut r0 = Self::one();
        let mut r1 = *self;
        for limb in exponent.iter().rev() {
            for bit in (0..64).rev() {
                if (limb >> bit) & 1 == 1 {
                    r0 *= r1;
                    r1 = r1 * r1;
                } else {
                    r1 *= r0;
                    r0 = r0 * r0;
                }
            }
        }
        r0
    }

    /// Reduces arbitrary little-endian bytes modulo the field order.
    fn from_bytes(bytes: &[u8]) -> Self;
    /// Decodes exactly `NUM_BYTES` little-endian bytes; `None` unless the
    /// value is already reduced.
    fn from_canonical_bytes(bytes: &[u8]) -> Option<Self>;
    fn to_le_bytes(&self) -> Vec<u8>;
    fn modulus_le_bytes() -> Vec<u8>;

    fn to_decimal(&self) -> String;
    fn from_decimal(s: &str) -> Result<Self, EncodingError>;
}
