pub mod constants;
pub mod serializable;
