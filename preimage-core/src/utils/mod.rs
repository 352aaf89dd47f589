pub mod cancel;
pub mod errors;
pub mod math;
pub mod transcript;
