use ark_ff::{BigInteger, PrimeField, UniformRand};
use num::{BigUint, Num};

use super::{FieldOps, SnarkField};
use crate::utils::errors::{ArithmeticError, EncodingError};

impl FieldOps for ark_bn254::Fr {}
impl FieldOps<&ark_bn254::Fr, ark_bn254::Fr> for ark_bn254::Fr {}

/// Decimal representation of any arkworks prime field element, as used by
/// the circom/snarkjs JSON formats.
pub fn prime_to_decimal<P: PrimeField>(value: &P) -> String {
    BigUint::from_bytes_le(&value.into_bigint().to_bytes_le()).to_str_radix(10)
}

/// Parses a decimal string, rejecting anything outside `[0, p)`.
pub fn prime_from_decimal<P: PrimeField>(s: &str) -> Result<P, EncodingError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EncodingError::InvalidNumber(s.to_string()));
    }
    if s.len() > 1 && s.starts_with('0') {
        return Err(EncodingError::NonCanonical(s.to_string()));
    }
    let value = BigUint::from_str_radix(s, 10)
        .map_err(|_| EncodingError::InvalidNumber(s.to_string()))?;
    let modulus: BigUint = P::MODULUS.into();
    if value >= modulus {
        return Err(EncodingError::NonCanonical(s.to_string()));
    }
    Ok(P::from_le_bytes_mod_order(&value.to_bytes_le()))
}

impl SnarkField for ark_bn254::Fr {
    const NUM_BYTES: usize = 32;
    const MODULUS_BITS: u32 = <Self as PrimeField>::MODULUS_BIT_SIZE;

    fn random<R: rand_core::RngCore>(rng: &mut R) -> Self {
        <Self as UniformRand>::rand(rng)
    }

    #[inline]
    fn from_u64(n: u64) -> Self {
        Self::from(n)
    }

    #[inline]
    fn from_u128(n: u128) -> Self {
        Self::from(n)
    }

    #[inline]
    fn from_i64(n: i64) -> Self {
        if n.is_negative() {
            -Self::from(n.unsigned_abs())
        } else {
            Self::from(n as u64)
        }
    }

    fn try_inverse(&self) -> Result<Self, ArithmeticError> {
        <Self as ark_ff::Field>::inverse(self).ok_or(ArithmeticError::DivisionByZero)
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        <Self as PrimeField>::from_le_bytes_mod_order(bytes)
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::NUM_BYTES {
            return None;
        }
        let value = BigUint::from_bytes_le(bytes);
        let modulus: BigUint = Self::MODULUS.into();
        (value < modulus).then(|| <Self as PrimeField>::from_le_bytes_mod_order(bytes))
    }

    fn to_le_bytes(&self) -> Vec<u8> {
        self.into_bigint().to_bytes_le()
    }

    fn modulus_le_bytes() -> Vec<u8> {
        Self::MODULUS.to_bytes_le()
    }

    fn to_decimal(&self) -> String {
        prime_to_decimal(self)
    }

    fn from_decimal(s: &str) -> Result<Self, EncodingError> {
        prime_from_decimal(s)
    }
}
