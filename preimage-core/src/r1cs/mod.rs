pub mod builder;
pub mod key;
pub mod ops;
pub mod poseidon2;
pub mod witness;
