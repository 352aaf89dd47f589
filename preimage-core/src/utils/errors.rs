use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("Division by zero: zero has no multiplicative inverse")]
    DivisionByZero,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashError {
    #[error("Output length {requested} outside of 1..={max}")]
    InvalidOutputLength { requested: usize, max: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Constraint references unallocated variable {0}")]
    InvalidVariable(usize),
    #[error("Public variable allocated after private variable {0}")]
    PublicAfterPrivate(usize),
    #[error("Variable {0} is already the output of another constraint")]
    DuplicateOutput(usize),
    #[error("Output variable {0} must appear in C and must not appear in A or B")]
    InvalidOutput(usize),
    #[error("The constant-one variable cannot be a constraint output")]
    ConstantOutput,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WitnessError {
    #[error("Constraint {constraint} reads variable {variable} before it is assigned")]
    UnassignedVariable { constraint: usize, variable: usize },
    #[error("Constraint {0} is not satisfied by the witness")]
    ConstraintViolation(usize),
    #[error("Variable {0} is not an input of the constraint system")]
    UnknownInput(usize),
    #[error("Input variable {0} was not assigned")]
    MissingInput(usize),
    #[error("Input variable {0} was assigned twice")]
    DuplicateInput(usize),
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MsmError {
    #[error("Length Error: bases length {0}, scalars length {1}")]
    LengthMismatch(usize, usize),
    #[error("Multi-scalar multiplication was cancelled")]
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("Insufficient SRS size: circuit requires a domain of {required}, SRS supports {available}")]
    InsufficientSrsSize { required: usize, available: usize },
    #[error("Malformed contribution {index}: {reason}")]
    MalformedContribution { index: usize, reason: String },
    #[error("Initial proving key was not derived from this SRS and constraint system")]
    InitialKeyMismatch,
    #[error("Invalid setup power {0}")]
    InvalidPower(usize),
    #[error("Setup was cancelled")]
    Cancelled,
}

impl From<MsmError> for SetupError {
    fn from(err: MsmError) -> Self {
        match err {
            MsmError::Cancelled => SetupError::Cancelled,
            MsmError::LengthMismatch(bases, scalars) => SetupError::MalformedContribution {
                index: 0,
                reason: format!("query length {bases} does not match {scalars} scalars"),
            },
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("Witness length mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Witness entry 0 must be the constant one")]
    InvalidWitness,
    #[error("Witness was evaluated for a different constraint system than the proving key")]
    CircuitMismatch,
    #[error("Proving key is inconsistent: {0}")]
    InvalidProvingKey(String),
    #[error("Proving was cancelled")]
    Cancelled,
}

impl From<MsmError> for ProofError {
    fn from(err: MsmError) -> Self {
        match err {
            MsmError::Cancelled => ProofError::Cancelled,
            MsmError::LengthMismatch(bases, scalars) => ProofError::InvalidProvingKey(format!(
                "query of length {bases} used with {scalars} scalars"
            )),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationInputError {
    #[error("Public signal count mismatch: expected {expected}, got {actual}")]
    SignalCountMismatch { expected: usize, actual: usize },
    #[error("Malformed proof: {0}")]
    MalformedProof(String),
    #[error("Malformed verifying key: {0}")]
    MalformedVerifyingKey(String),
}

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Invalid decimal number: {0:?}")]
    InvalidNumber(String),
    #[error("Value {0} is not a canonical field element")]
    NonCanonical(String),
    #[error("Point is not on the curve")]
    PointNotOnCurve,
    #[error("Point is not in the prime-order subgroup")]
    PointNotInSubgroup,
    #[error("Unexpected {field}: expected {expected}, got {actual}")]
    UnexpectedValue {
        field: &'static str,
        expected: String,
        actual: String,
    },
    #[error("Malformed witness file: {0}")]
    MalformedWitness(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Any failure of the engine, for callers that drive the whole pipeline.
#[derive(Error, Debug)]
pub enum SnarkError {
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Witness(#[from] WitnessError),
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Proof(#[from] ProofError),
    #[error(transparent)]
    VerificationInput(#[from] VerificationInputError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
