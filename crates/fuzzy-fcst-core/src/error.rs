//! Error types for fuzzy inference and prediction.

use thiserror::Error;

/// Result type for fuzzy prediction operations.
pub type Result<T> = std::result::Result<T, FuzzyError>;

/// Reasons a single row's inference pass can fail.
///
/// These never abort a prediction run: the prediction loop records them in the
/// row's status and substitutes the persistence fallback.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InferenceFailure {
    #[error("no rule fired: aggregated membership profile is all zero")]
    DegenerateProfile,

    #[error("lag_{lag} is not a finite number: {value}")]
    NonFiniteInput { lag: usize, value: f64 },

    #[error("defuzzification produced a non-finite value: {0}")]
    NonFiniteOutput(f64),
}

/// Error types for fuzzy prediction operations.
#[derive(Error, Debug)]
pub enum FuzzyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Rule alignment error: variable '{variable}' has {found} terms, expected {expected}")]
    RuleAlignment {
        variable: String,
        expected: usize,
        found: usize,
    },

    #[error("Inference failure: {0}")]
    InferenceFailure(#[from] InferenceFailure),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Invalid parameter '{param}' = '{value}': {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },
}

impl FuzzyError {
    /// Convert to an error code for FFI.
    pub fn to_code(&self) -> i32 {
        match self {
            FuzzyError::InvalidConfiguration(_) => 1,
            FuzzyError::RuleAlignment { .. } => 2,
            FuzzyError::InferenceFailure(_) => 3,
            FuzzyError::InvalidInput(_) => 4,
            FuzzyError::InsufficientData { .. } => 5,
            FuzzyError::InvalidParameter { .. } => 6,
        }
    }
}
