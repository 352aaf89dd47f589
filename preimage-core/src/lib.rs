#![allow(non_snake_case)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::too_long_first_doc_paragraph)]

pub mod field;
pub mod formats;
pub mod groth16;
pub mod msm;
pub mod poseidon2;
pub mod r1cs;
pub mod utils;
